//! Caption tracks and caption payload parsing.
//!
//! Caption payloads come back in several shapes: `json3` event lists, plain
//! `<text>` XML, CDATA-wrapped XML, or something that only loosely resembles
//! any of them. Each shape has an independent parser; [`first_successful`]
//! tries them in order and keeps the first that produces text.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static TEXT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text(?:\s[^>]*)?>(.*?)</text>").expect("Invalid regex"));

static CDATA_TEXT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<text(?:\s[^>]*)?>\s*<!\[CDATA\[(.*?)\]\]>\s*</text>").expect("Invalid regex")
});

static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">([^<]+)<").expect("Invalid regex"));

static DOUBLE_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|amp);").expect("Invalid regex"));

/// Whether a track was uploaded or generated by speech recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Normal,
    AutoGenerated,
}

/// A single caption track advertised by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub kind: CaptionKind,
    pub base_url: String,
    pub display_name: String,
}

impl CaptionTrack {
    /// Build a track from one `captionTracks[]` entry. Entries without a `baseUrl` are skipped.
    pub fn from_json(value: &Value) -> Option<Self> {
        let base_url = value["baseUrl"].as_str()?.to_string();
        let language_code = value["languageCode"].as_str().unwrap_or_default().to_string();
        let kind = match value["kind"].as_str() {
            Some("asr") => CaptionKind::AutoGenerated,
            _ => CaptionKind::Normal,
        };
        let display_name = value["name"]["simpleText"]
            .as_str()
            .or_else(|| value["name"]["runs"][0]["text"].as_str())
            .unwrap_or(&language_code)
            .to_string();

        Some(Self {
            language_code,
            kind,
            base_url,
            display_name,
        })
    }
}

/// Parse a JSON array of caption track objects.
pub fn parse_tracks(value: &Value) -> Vec<CaptionTrack> {
    value
        .as_array()
        .map(|tracks| tracks.iter().filter_map(CaptionTrack::from_json).collect())
        .unwrap_or_default()
}

/// Pick the best track for `preferred` (a language code such as `en`).
///
/// Order: exact language with uploaded captions, exact language of any kind,
/// any language code starting with `preferred`, then the first track.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], preferred: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == preferred && t.kind == CaptionKind::Normal)
        .or_else(|| tracks.iter().find(|t| t.language_code == preferred))
        .or_else(|| tracks.iter().find(|t| t.language_code.starts_with(preferred)))
        .or_else(|| tracks.first())
}

/// A caption parser: raw payload in, text fragments out, `None` when the shape doesn't fit.
pub type CaptionParser = fn(&str) -> Option<Vec<String>>;

/// Parsers for XML-format payloads, in the order they are tried.
pub const XML_PARSERS: &[(&str, CaptionParser)] = &[
    ("text", parse_text_tags),
    ("cdata", parse_cdata_text_tags),
    ("embedded_json", parse_embedded_json),
    ("generic", parse_generic_tags),
];

/// Run `parsers` in order and return the name and output of the first that succeeds.
pub fn first_successful(
    body: &str,
    parsers: &[(&'static str, CaptionParser)],
) -> Option<(&'static str, Vec<String>)> {
    parsers
        .iter()
        .find_map(|(name, parser)| parser(body).map(|fragments| (*name, fragments)))
}

#[derive(Debug, Deserialize)]
struct Json3Payload {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// `json3` payload: `events[].segs[].utf8`, skipping newline-only segments.
pub fn parse_json_events(body: &str) -> Option<Vec<String>> {
    let payload: Json3Payload = serde_json::from_str(body.trim()).ok()?;
    let fragments: Vec<String> = payload
        .events
        .into_iter()
        .flat_map(|event| event.segs)
        .map(|seg| seg.utf8)
        .filter(|text| text != "\n")
        .collect();
    non_empty(fragments)
}

/// Plain `<text>` bodies. Bodies wrapped in CDATA are left for [`parse_cdata_text_tags`].
pub fn parse_text_tags(body: &str) -> Option<Vec<String>> {
    let fragments = TEXT_TAG
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|text| !text.contains("<![CDATA["))
        .map(str::to_string)
        .collect();
    non_empty(fragments)
}

/// `<text>` bodies holding CDATA sections.
pub fn parse_cdata_text_tags(body: &str) -> Option<Vec<String>> {
    let fragments = CDATA_TEXT_TAG
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    non_empty(fragments)
}

/// A `json3`-shaped object embedded somewhere in the response body.
pub fn parse_embedded_json(body: &str) -> Option<Vec<String>> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_json_events(&body[start..=end])
}

/// Last resort: any text between two tags that is at least two characters long.
/// Fragments mentioning `encoding` are metadata, not speech.
pub fn parse_generic_tags(body: &str) -> Option<Vec<String>> {
    let fragments = BETWEEN_TAGS
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| text.chars().count() >= 2)
        .filter(|text| !text.contains("encoding"))
        .map(str::to_string)
        .collect();
    non_empty(fragments)
}

/// Decode HTML entities. Caption XML is often double-encoded (`&amp;#39;`), so
/// numeric references and `&amp;` left after the first pass are decoded again.
/// Named entities that survive it (`&amp;lt;` becomes `&lt;`) stay literal.
pub fn decode_entities(text: &str) -> String {
    let once = html_escape::decode_html_entities(text);
    let decoded = DOUBLE_ENCODED.replace_all(&once, |caps: &regex::Captures| {
        html_escape::decode_html_entities(&caps[0]).into_owned()
    });
    decoded.replace('\u{a0}', " ")
}

/// Decode one fragment and turn escaped or literal newlines into spaces.
pub fn clean_fragment(fragment: &str) -> String {
    decode_entities(fragment)
        .replace("\\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Clean every fragment and join them with single spaces.
pub fn normalize_segments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = fragments
        .into_iter()
        .map(|f| clean_fragment(f.as_ref()))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(fragments: Vec<String>) -> Option<Vec<String>> {
    let has_text = fragments.iter().any(|f| !clean_fragment(f).is_empty());
    has_text.then_some(fragments)
}

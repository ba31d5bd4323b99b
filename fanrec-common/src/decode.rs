use encoding_rs::SHIFT_JIS;
use serde::{Deserialize, Serialize};

/// Full-width (ideographic) space used for padding inside CP932 name fields.
pub const FULLWIDTH_SPACE: char = '\u{3000}';

/// Width of one metric token.
pub const CHUNK_WIDTH: usize = 4;

/// Returns `bytes[start..end]`, clamped to what the line actually holds.
pub fn slice_clamped(bytes: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(bytes.len());
    let start = start.min(end);
    &bytes[start..end]
}

/// CP932 decode that drops undecodable bytes instead of failing.
pub fn decode_legacy(segment: &[u8]) -> String {
    let (text, _, had_errors) = SHIFT_JIS.decode(segment);
    if had_errors {
        text.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect()
    } else {
        text.into_owned()
    }
}

/// ASCII decode that drops every byte outside the 7-bit range.
pub fn decode_plain(segment: &[u8]) -> String {
    segment
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}

/// Plain decode with surrounding whitespace removed.
pub fn decode_plain_trimmed(segment: &[u8]) -> String {
    decode_plain(segment).trim().to_string()
}

/// Legacy decode for name-like fields: full-width spaces become ASCII spaces.
pub fn decode_name(segment: &[u8]) -> String {
    decode_legacy(segment)
        .trim_end()
        .replace(FULLWIDTH_SPACE, " ")
        .trim()
        .to_string()
}

/// Legacy decode with full-width spaces removed entirely (branch names).
pub fn decode_compact(segment: &[u8]) -> String {
    decode_legacy(segment)
        .trim_end()
        .replace(FULLWIDTH_SPACE, "")
        .trim()
        .to_string()
}

/// A metrics block split into 4-byte numeric tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkedMetrics {
    pub raw: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub suffix: String,
}

/// Splits `segment` into 4-byte chunks.
///
/// Each chunk is plain-decoded and trimmed. A non-empty, digits-only chunk is
/// normalised to `value / 100.0`; anything else keeps its raw text and gets
/// `None`. The 0–3 bytes past the last full chunk are returned as `suffix`.
pub fn chunk_four(segment: &[u8]) -> ChunkedMetrics {
    if segment.is_empty() {
        return ChunkedMetrics::default();
    }

    let usable = segment.len() - segment.len() % CHUNK_WIDTH;
    let (body, tail) = segment.split_at(usable);

    let mut raw = Vec::with_capacity(usable / CHUNK_WIDTH);
    let mut values = Vec::with_capacity(usable / CHUNK_WIDTH);

    for chunk in body.chunks_exact(CHUNK_WIDTH) {
        let token = decode_plain_trimmed(chunk);
        values.push(normalise_token(&token));
        raw.push(token);
    }

    ChunkedMetrics {
        raw,
        values,
        suffix: decode_plain(tail),
    }
}

fn normalise_token(token: &str) -> Option<f64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u64>().ok().map(|v| v as f64 / 100.0)
}

//! Byte layout of one fixed-width fan record line.
//!
//! Offsets are byte positions in the raw CP932 line, not character positions.
//! The leading fields have absolute offsets and are listed in [`HEADER_LAYOUT`].
//! Everything after the primary metrics block is laid out relative to the end
//! of the line, see [`split_trailer`].

use crate::decode::{
    decode_compact, decode_legacy, decode_name, decode_plain_trimmed, slice_clamped,
};

/// How the bytes of a field are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// ASCII subset, trimmed.
    Plain,
    /// CP932, trimmed.
    Legacy,
    /// CP932, full-width spaces turned into spaces, trimmed.
    Name,
    /// CP932, full-width spaces removed, trimmed.
    Compact,
}

impl DecodeMode {
    pub fn decode(self, segment: &[u8]) -> String {
        match self {
            DecodeMode::Plain => decode_plain_trimmed(segment),
            DecodeMode::Legacy => decode_legacy(segment).trim().to_string(),
            DecodeMode::Name => decode_name(segment),
            DecodeMode::Compact => decode_compact(segment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub mode: DecodeMode,
}

impl FieldSpec {
    pub const fn new(name: &'static str, start: usize, end: usize, mode: DecodeMode) -> Self {
        Self { name, start, end, mode }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start
    }

    /// Slices this field out of `line` and decodes it. Short lines give a
    /// truncated or empty value.
    pub fn decode(&self, line: &[u8]) -> String {
        self.mode.decode(slice_clamped(line, self.start, self.end))
    }
}

pub const HEADER_FIELD_COUNT: usize = 6;

pub const HEADER_LAYOUT: [FieldSpec; HEADER_FIELD_COUNT] = [
    FieldSpec::new("register_number", 0, 4, DecodeMode::Plain),
    FieldSpec::new("name_kanji", 4, 20, DecodeMode::Name),
    FieldSpec::new("name_kana", 20, 35, DecodeMode::Legacy),
    FieldSpec::new("branch", 35, 39, DecodeMode::Compact),
    FieldSpec::new("grade", 39, 41, DecodeMode::Plain),
    FieldSpec::new("profile_code", 41, 58, DecodeMode::Plain),
];

pub const PRIMARY_METRICS_START: usize = 58;
pub const PRIMARY_METRICS_END: usize = 158;

pub const GRADE_INFO_LEN: usize = 10;
pub const GRADE_INFO_MODE: DecodeMode = DecodeMode::Plain;

pub const BIRTHPLACE_LEN: usize = 6;
pub const BIRTHPLACE_MODE: DecodeMode = DecodeMode::Name;

/// Decodes every header field in table order.
pub fn decode_header(line: &[u8]) -> [String; HEADER_FIELD_COUNT] {
    HEADER_LAYOUT.map(|spec| spec.decode(line))
}

pub fn primary_metrics_segment(line: &[u8]) -> &[u8] {
    slice_clamped(line, PRIMARY_METRICS_START, PRIMARY_METRICS_END)
}

/// The variable-length tail after the primary metrics block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer<'a> {
    pub grade_info: &'a [u8],
    pub secondary: &'a [u8],
    pub birthplace: &'a [u8],
}

/// Splits the bytes after the primary block into grade info, secondary
/// metrics and birthplace.
///
/// The secondary block is `rest[10..len - 6]` and is empty whenever that range
/// would be inverted. Birthplace is the last six bytes, or the whole rest when
/// it is shorter than that.
pub fn split_trailer(line: &[u8]) -> Trailer<'_> {
    let rest = slice_clamped(line, PRIMARY_METRICS_END, line.len());
    let birthplace_start = rest.len().saturating_sub(BIRTHPLACE_LEN);

    Trailer {
        grade_info: slice_clamped(rest, 0, GRADE_INFO_LEN),
        secondary: slice_clamped(rest, GRADE_INFO_LEN, birthplace_start),
        birthplace: &rest[birthplace_start..],
    }
}

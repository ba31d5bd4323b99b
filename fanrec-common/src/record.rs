use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::decode::{chunk_four, decode_legacy};
use crate::layout::{
    decode_header, primary_metrics_segment, split_trailer, BIRTHPLACE_MODE, GRADE_INFO_MODE,
};
use crate::release::{ReleaseInfo, ReleaseTerm};

/// One decoded fixed-width fan record line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanRecord {
    pub source: String,
    pub register_number: String,
    pub name_kanji: String,
    pub name_kana: String,
    pub branch: String,
    pub grade: String,
    pub profile_code: String,
    pub release_year: Option<i32>,
    pub release_month: Option<u32>,
    pub release_term: Option<ReleaseTerm>,
    pub metrics_primary_raw: Vec<String>,
    pub metrics_primary: Vec<Option<f64>>,
    pub grade_info: String,
    pub metrics_secondary_raw: Vec<String>,
    pub metrics_secondary: Vec<Option<f64>>,
    pub metrics_secondary_suffix: String,
    pub birthplace: String,
    pub raw_line: String,
}

/// Strips any trailing CR/LF bytes.
pub fn trim_line_end(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |pos| pos + 1);
    &raw[..end]
}

/// Decodes one raw line. Never fails: bad bytes are dropped, short lines give
/// empty trailing fields and non-numeric metric tokens give `None`.
pub fn decode_record(raw: &[u8], source: &str, release: ReleaseInfo) -> FanRecord {
    let line = trim_line_end(raw);

    let [register_number, name_kanji, name_kana, branch, grade, profile_code] =
        decode_header(line);
    let primary = chunk_four(primary_metrics_segment(line));

    let trailer = split_trailer(line);
    let secondary = chunk_four(trailer.secondary);

    FanRecord {
        source: source.to_string(),
        register_number,
        name_kanji,
        name_kana,
        branch,
        grade,
        profile_code,
        release_year: release.year,
        release_month: release.month,
        release_term: release.term,
        metrics_primary_raw: primary.raw,
        metrics_primary: primary.values,
        grade_info: GRADE_INFO_MODE.decode(trailer.grade_info),
        metrics_secondary_raw: secondary.raw,
        metrics_secondary: secondary.values,
        metrics_secondary_suffix: secondary.suffix,
        birthplace: BIRTHPLACE_MODE.decode(trailer.birthplace),
        raw_line: decode_legacy(line),
    }
}

fn format_metrics(prefix: char, values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(idx, val)| format!("{prefix}{:02}:{val}", idx + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

impl FanRecord {
    pub fn release(&self) -> ReleaseInfo {
        ReleaseInfo {
            year: self.release_year,
            month: self.release_month,
            term: self.release_term,
        }
    }

    /// `2023年10月後期` style label, empty when nothing is known.
    pub fn release_label(&self) -> String {
        let mut label = String::new();
        if let Some(year) = self.release_year {
            let _ = write!(label, "{year}年");
        }
        if let Some(month) = self.release_month {
            let _ = write!(label, "{month:02}月");
        }
        if let Some(term) = self.release_term {
            label.push_str(term.label());
        }
        label
    }

    /// Flattened one-line summary of every field, for consumers that only
    /// take plain text.
    pub fn text(&self) -> String {
        let primary = format_metrics('P', &self.metrics_primary_raw);
        let secondary = format_metrics('S', &self.metrics_secondary_raw);

        let mut out = format!(
            "登録番号:{} 氏名:{} (ﾌﾘｶﾞﾅ:{}) 支部:{} 級別:{} プロフィールコード:{} グレード情報:{}",
            self.register_number,
            self.name_kanji,
            self.name_kana,
            self.branch,
            self.grade,
            self.profile_code,
            self.grade_info,
        );

        let release = self.release_label();
        if !release.is_empty() {
            let _ = write!(out, " リリース:{release}");
        }

        let _ = write!(out, " 主要指標[{primary}] 追加指標[{secondary}");
        if !self.metrics_secondary_suffix.is_empty() {
            let _ = write!(out, " {}", self.metrics_secondary_suffix);
        }
        let _ = write!(out, "] 出身:{}", self.birthplace);
        out
    }
}

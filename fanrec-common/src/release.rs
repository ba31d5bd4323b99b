use std::fmt;

use serde::{Deserialize, Serialize};

/// Filename prefix of files that carry a release code.
pub const RELEASE_PREFIX: &str = "fan";

/// Half-year edition of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseTerm {
    #[serde(rename = "前期")]
    FirstHalf,
    #[serde(rename = "後期")]
    SecondHalf,
}

impl ReleaseTerm {
    pub fn from_month(month: u32) -> Self {
        if month <= 6 {
            ReleaseTerm::FirstHalf
        } else {
            ReleaseTerm::SecondHalf
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReleaseTerm::FirstHalf => "前期",
            ReleaseTerm::SecondHalf => "後期",
        }
    }
}

impl fmt::Display for ReleaseTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Release year, month and term. Every part may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub term: Option<ReleaseTerm>,
}

impl ReleaseInfo {
    pub const UNKNOWN: ReleaseInfo = ReleaseInfo { year: None, month: None, term: None };

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Field-wise merge: values set on `self` win over `fallback`.
    pub fn or(self, fallback: ReleaseInfo) -> ReleaseInfo {
        ReleaseInfo {
            year: self.year.or(fallback.year),
            month: self.month.or(fallback.month),
            term: self.term.or(fallback.term),
        }
    }
}

/// Infers the release from a stem such as `fan2310` (2023, October, second half).
///
/// Stems that do not start with `fan` followed by four digits give
/// [`ReleaseInfo::UNKNOWN`].
pub fn infer_release_info(stem: &str) -> ReleaseInfo {
    let Some(rest) = stem.strip_prefix(RELEASE_PREFIX) else {
        return ReleaseInfo::UNKNOWN;
    };

    let code: Vec<u32> = rest.chars().take(4).map_while(|c| c.to_digit(10)).collect();
    let &[y1, y2, m1, m2] = code.as_slice() else {
        return ReleaseInfo::UNKNOWN;
    };

    let month = m1 * 10 + m2;
    ReleaseInfo {
        year: Some(2000 + (y1 * 10 + y2) as i32),
        month: Some(month),
        term: Some(ReleaseTerm::from_month(month)),
    }
}

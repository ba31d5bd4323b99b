use std::cmp::Ordering;
use std::path::Path;

use anyhow::Result;
use log::info;

use fanrec_common::{FanRecord, YearBounds};

use crate::writer::write_jsonl;

/// Register numbers sort numerically when they are all digits, otherwise as
/// text. Numeric keys come before text keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegisterKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl<'a> RegisterKey<'a> {
    pub fn of(register_number: &'a str) -> Self {
        let numeric =
            !register_number.is_empty() && register_number.bytes().all(|b| b.is_ascii_digit());
        match register_number.parse::<u64>() {
            Ok(n) if numeric => RegisterKey::Number(n),
            _ => RegisterKey::Text(register_number),
        }
    }
}

fn sort_key(record: &FanRecord) -> (i32, u32, RegisterKey<'_>) {
    (
        record.release_year.unwrap_or(0),
        record.release_month.unwrap_or(0),
        RegisterKey::of(&record.register_number),
    )
}

pub fn compare_records(a: &FanRecord, b: &FanRecord) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Drops records whose known release year lies outside `bounds`.
pub fn filter_by_year(records: Vec<FanRecord>, bounds: &YearBounds) -> Vec<FanRecord> {
    records
        .into_iter()
        .filter(|r| bounds.contains(r.release_year))
        .collect()
}

/// Stable sort by release year, release month, then register number.
pub fn sort_combined(records: &mut [FanRecord]) {
    records.sort_by(compare_records);
}

/// Filters, sorts and writes the combined output. Nothing is written when no
/// record survives; the number of written records is returned.
pub fn write_combined(
    records: Vec<FanRecord>,
    bounds: &YearBounds,
    output_path: &Path,
) -> Result<usize> {
    let mut kept = filter_by_year(records, bounds);
    if kept.is_empty() {
        info!("[combined] no records within {:?}, skipping {}", bounds, output_path.display());
        return Ok(0);
    }
    sort_combined(&mut kept);
    write_jsonl(&kept, output_path)
}

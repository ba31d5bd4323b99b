use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;

use fanrec_common::FanRecord;

/// One output line: every record field plus the flattened text summary.
#[derive(Serialize)]
struct RecordLine<'a> {
    #[serde(flatten)]
    record: &'a FanRecord,
    text: String,
}

/// Writes one JSON object per line, creating parent directories as needed.
/// Returns the number of records written.
pub fn write_jsonl<'a, I>(records: I, output_path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a FanRecord>,
{
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .with_context(|| format!("Could not create {}", output_path.display()))?;
    let mut out = BufWriter::new(file);

    let mut written = 0usize;
    for record in records {
        let line = RecordLine { record, text: record.text() };
        serde_json::to_writer(&mut out, &line)
            .with_context(|| format!("Could not serialize record for {}", output_path.display()))?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()
        .with_context(|| format!("Could not write {}", output_path.display()))?;

    debug!("[writer] {} records → {}", written, output_path.display());
    Ok(written)
}

/// Reads a file produced by [`write_jsonl`]. The `text` field is ignored.
pub fn read_jsonl(path: &Path) -> Result<Vec<FanRecord>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Could not read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FanRecord = serde_json::from_str(&line)
            .with_context(|| format!("Bad record on line {} of {}", idx + 1, path.display()))?;
        records.push(record);
    }
    Ok(records)
}

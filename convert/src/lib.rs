// convert/src/lib.rs

pub mod aggregate;
pub mod writer;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use walkdir::WalkDir;

use fanrec_common::common_config::{is_text_member, TEXT_EXTENSION};
use fanrec_common::{ConversionReport, ConvertConfig, FanFile, FanRecord};

pub use aggregate::{filter_by_year, sort_combined, write_combined, RegisterKey};
pub use writer::{read_jsonl, write_jsonl};

/// Every `*.txt` file below `dir`, sorted.
pub fn find_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not walk {}", dir.display()))?;
        let is_txt = entry.path().extension().and_then(|e| e.to_str()) == Some(TEXT_EXTENSION);
        if entry.file_type().is_file() && is_txt {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Picks the record files among the extracted members. Falls back to a scan
/// of `interim_dir` when nothing was extracted in this run.
pub fn select_text_files(extracted: &[PathBuf], interim_dir: &Path) -> Result<Vec<PathBuf>> {
    let selected: BTreeSet<PathBuf> = extracted
        .iter()
        .filter(|p| is_text_member(p))
        .cloned()
        .collect();

    if selected.is_empty() {
        debug!("[convert] nothing extracted, scanning {}", interim_dir.display());
        return find_text_files(interim_dir);
    }
    Ok(selected.into_iter().collect())
}

/// Runs the whole pipeline: extract, parse, write per-file and combined output.
pub fn convert_dir(config: &ConvertConfig) -> Result<ConversionReport> {
    let mut report = ConversionReport::default();

    let archives = extract::list_archives(&config.raw_dir)?;
    report.archives = archives.len() as u64;
    let extracted = extract::extract_archive_list(&archives, &config.interim_dir)?;
    report.extracted_files = extracted.len() as u64;

    let text_files = select_text_files(&extracted, &config.interim_dir)?;
    report.text_files = text_files.len() as u64;

    let mut aggregated: Vec<FanRecord> = Vec::new();

    for txt_path in &text_files {
        let fan_file = FanFile::new(txt_path);
        let records = fan_file.read_all()?;
        if records.is_empty() {
            debug!("[convert] {} has no records", txt_path.display());
            continue;
        }

        let output_path = config.output_path_for(fan_file.source());
        write_jsonl(&records, &output_path)?;
        info!(
            "[convert] {} → {} ({} records)",
            txt_path.display(),
            output_path.display(),
            records.len()
        );

        report.files_written += 1;
        report.records += records.len() as u64;

        if config.combined_output.is_some() {
            aggregated.extend(records);
        }
    }

    if let Some(combined_path) = &config.combined_output {
        let written = write_combined(aggregated, &config.year_bounds, combined_path)?;
        report.combined_records = written as u64;
    }

    Ok(report)
}

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use walkdir::WalkDir;

use fanrec_common::common_config::is_archive_extension;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub supported: bool,
}

/// Keeps only normal components so entries cannot escape the target directory.
fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            sanitized.push(part);
        }
    }
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

fn entry_name(header: &delharc::LhaHeader) -> String {
    header.parse_pathname().to_string_lossy().trim().to_string()
}

/// Every `.lzh` archive directly inside `raw_dir`, sorted by file name.
pub fn list_archives(raw_dir: &Path) -> Result<Vec<PathBuf>> {
    if !raw_dir.is_dir() {
        warn!("[extract] raw directory {} does not exist", raw_dir.display());
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in WalkDir::new(raw_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Could not list {}", raw_dir.display()))?;
        let is_archive = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_archive_extension);
        if entry.file_type().is_file() && is_archive {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

/// `true` when the archive holds nothing but the end-of-archive marker.
fn is_empty_archive(archive_path: &Path) -> Result<bool> {
    let mut file = File::open(archive_path)
        .with_context(|| format!("Could not open archive {}", archive_path.display()))?;
    let mut first = [0u8; 1];
    let n = file
        .read(&mut first)
        .with_context(|| format!("Could not read archive {}", archive_path.display()))?;
    Ok(n == 1 && first[0] == 0)
}

pub fn list_lzh_archive(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    if is_empty_archive(archive_path)? {
        return Ok(Vec::new());
    }

    let mut reader = delharc::parse_file(archive_path)
        .with_context(|| format!("Could not open archive {}", archive_path.display()))?;

    let mut entries = Vec::new();
    loop {
        let header = reader.header();
        if !header.is_directory() {
            entries.push(ArchiveEntry {
                name: entry_name(header),
                size: header.original_size,
                supported: reader.is_decoder_supported(),
            });
        }
        let more = reader
            .next_file()
            .with_context(|| format!("Corrupt archive {}", archive_path.display()))?;
        if !more {
            break;
        }
    }
    Ok(entries)
}

/// Extracts one archive into `target_root`.
///
/// Entry names are deduplicated within this archive: the first entry with a
/// given name is written, later ones are skipped. The archive handle lives in
/// this function only and is closed on every return path.
pub fn extract_lzh_archive(archive_path: &Path, target_root: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_root)
        .with_context(|| format!("Could not create {}", target_root.display()))?;

    if is_empty_archive(archive_path)? {
        debug!("[extract] {} has no members", archive_path.display());
        return Ok(Vec::new());
    }

    let mut reader = delharc::parse_file(archive_path)
        .with_context(|| format!("Could not open archive {}", archive_path.display()))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut extracted = Vec::new();

    loop {
        let header = reader.header();
        let name = entry_name(header);

        if header.is_directory() || name.is_empty() {
            debug!("[extract] skipping directory or unnamed entry {:?}", name);
        } else if !seen.insert(name.clone()) {
            debug!(
                "[extract] duplicate entry {} in {}, keeping the first",
                name,
                archive_path.display()
            );
        } else if let Some(relative) = sanitize_entry_path(&name) {
            if !reader.is_decoder_supported() {
                anyhow::bail!(
                    "Unsupported compression method for {} in {}",
                    name,
                    archive_path.display()
                );
            }

            let dest_path = target_root.join(relative);
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create {}", parent.display()))?;
            }

            let mut out_file = BufWriter::new(
                File::create(&dest_path)
                    .with_context(|| format!("Could not create {}", dest_path.display()))?,
            );
            io::copy(&mut reader, &mut out_file).with_context(|| {
                format!("Could not extract {} from {}", name, archive_path.display())
            })?;
            out_file.flush()?;
            reader.crc_check().with_context(|| {
                format!("CRC mismatch for {} in {}", name, archive_path.display())
            })?;

            debug!("[extract] wrote {}", dest_path.display());
            extracted.push(dest_path);
        } else {
            warn!(
                "[extract] skipping unsafe entry path {:?} in {}",
                name,
                archive_path.display()
            );
        }

        let more = reader
            .next_file()
            .with_context(|| format!("Corrupt archive {}", archive_path.display()))?;
        if !more {
            break;
        }
    }

    Ok(extracted)
}

/// Extracts every archive of `raw_dir` into `interim_dir/<archive stem>/`.
///
/// Archives are handled one after another; deduplication does not cross
/// archive boundaries.
pub fn extract_archives(raw_dir: &Path, interim_dir: &Path) -> Result<Vec<PathBuf>> {
    let archives = list_archives(raw_dir)?;
    extract_archive_list(&archives, interim_dir)
}

/// Same as [`extract_archives`] for an archive list the caller already has.
pub fn extract_archive_list(archives: &[PathBuf], interim_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(interim_dir)
        .with_context(|| format!("Could not create {}", interim_dir.display()))?;

    let mut extracted = Vec::new();
    for archive_path in archives {
        let stem = archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target_root = interim_dir.join(&stem);

        let files = extract_lzh_archive(archive_path, &target_root)?;
        info!("[extract] {} → {} files", archive_path.display(), files.len());
        extracted.extend(files);
    }

    Ok(extracted)
}

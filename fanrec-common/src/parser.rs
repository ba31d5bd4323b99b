use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::record::{decode_record, trim_line_end, FanRecord};
use crate::release::{infer_release_info, ReleaseInfo};

/// File stem used as the record `source`.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A fan record text file on disk.
///
/// Holds no read state: every call to [`FanFile::records`] reopens the file
/// and yields the same sequence.
#[derive(Debug, Clone)]
pub struct FanFile {
    path: PathBuf,
    source: String,
    release: ReleaseInfo,
}

impl FanFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_release(path, ReleaseInfo::UNKNOWN)
    }

    /// Explicit release values win over the ones inferred from the stem.
    pub fn with_release(path: impl Into<PathBuf>, explicit: ReleaseInfo) -> Self {
        let path = path.into();
        let source = source_stem(&path);
        let release = explicit.or(infer_release_info(&source));
        Self { path, source, release }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn release(&self) -> ReleaseInfo {
        self.release
    }

    pub fn records(&self) -> Result<FanRecords> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open {}", self.path.display()))?;
        debug!("[parser] reading {} as source {:?}", self.path.display(), self.source);
        Ok(FanRecords {
            reader: BufReader::new(file),
            path: self.path.clone(),
            source: self.source.clone(),
            release: self.release,
            buf: Vec::new(),
            line_no: 0,
            done: false,
        })
    }

    pub fn read_all(&self) -> Result<Vec<FanRecord>> {
        self.records()?.collect()
    }
}

/// Lazy iterator over the non-blank lines of one file.
pub struct FanRecords {
    reader: BufReader<File>,
    path: PathBuf,
    source: String,
    release: ReleaseInfo,
    buf: Vec<u8>,
    line_no: usize,
    done: bool,
}

impl Iterator for FanRecords {
    type Item = Result<FanRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            let n = match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(n) => n,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e).with_context(|| {
                        format!(
                            "Read failed in {} after line {}",
                            self.path.display(),
                            self.line_no
                        )
                    }));
                }
            };
            if n == 0 {
                self.done = true;
                break;
            }
            self.line_no += 1;

            let line = trim_line_end(&self.buf);
            if line.is_empty() {
                continue;
            }
            return Some(Ok(decode_record(line, &self.source, self.release)));
        }
        None
    }
}

/// Parses a whole file with optional explicit release values.
pub fn parse_text_file(path: &Path, explicit: ReleaseInfo) -> Result<Vec<FanRecord>> {
    FanFile::with_release(path, explicit).read_all()
}

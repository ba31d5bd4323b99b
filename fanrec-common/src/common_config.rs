use std::path::PathBuf;

pub const DEFAULT_RAW_DIR: &str = "data/raw";
pub const DEFAULT_INTERIM_DIR: &str = "data/interim";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

/// Extension of the source archives, compared case-insensitively.
pub const ARCHIVE_EXTENSION: &str = "lzh";
/// Extension of the record text members.
pub const TEXT_EXTENSION: &str = "txt";
/// Extension of every written output file.
pub const OUTPUT_EXTENSION: &str = "jsonl";

/// Inclusive release-year window for the combined output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearBounds {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearBounds {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    /// Records with an unknown year always pass.
    pub fn contains(&self, year: Option<i32>) -> bool {
        let Some(year) = year else {
            return true;
        };
        self.min.map_or(true, |min| year >= min) && self.max.map_or(true, |max| year <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub raw_dir: PathBuf,
    pub interim_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub combined_output: Option<PathBuf>,
    pub year_bounds: YearBounds,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            interim_dir: PathBuf::from(DEFAULT_INTERIM_DIR),
            processed_dir: PathBuf::from(DEFAULT_PROCESSED_DIR),
            combined_output: None,
            year_bounds: YearBounds::default(),
        }
    }
}

impl ConvertConfig {
    pub fn output_path_for(&self, stem: &str) -> PathBuf {
        self.processed_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"))
    }
}

/// `true` when `ext` names an LZH archive, in any letter case.
pub fn is_archive_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION)
}

/// Members with a `.txt` extension (any case), an empty one (`name.`) or none
/// at all hold records.
pub fn is_text_member(path: &std::path::Path) -> bool {
    match path.extension() {
        None => true,
        Some(ext) if ext.is_empty() => true,
        Some(ext) => ext.to_str().is_some_and(|e| e.eq_ignore_ascii_case(TEXT_EXTENSION)),
    }
}

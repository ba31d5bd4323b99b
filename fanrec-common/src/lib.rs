pub mod common_config;
pub mod decode;
pub mod layout;
pub mod parser;
pub mod record;
pub mod release;

pub use common_config::{ConvertConfig, YearBounds};
pub use decode::{chunk_four, ChunkedMetrics};
pub use layout::{DecodeMode, FieldSpec, HEADER_LAYOUT};
pub use parser::{parse_text_file, source_stem, FanFile, FanRecords};
pub use record::{decode_record, FanRecord};
pub use release::{infer_release_info, ReleaseInfo, ReleaseTerm};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub archives: u64,
    pub extracted_files: u64,
    pub text_files: u64,
    pub files_written: u64,
    pub records: u64,
    pub combined_records: u64,
}

// extract/src/lib.rs

pub mod unpacker;

pub use unpacker::{
    extract_archive_list,
    extract_archives,
    extract_lzh_archive,
    list_archives,
    list_lzh_archive,
    ArchiveEntry,
};

//! Zip container handling for Cinder animation packages.
//!
//! This crate repackages a vendor animation archive for one specific display:
//! every entry is streamed into a new archive using the stored (uncompressed)
//! method, only the `desc.txt` descriptor entry is rewritten, and the result
//! can be re-walked to verify its declared checksums before install.

pub mod integrity;
pub mod transcode;

pub use integrity::{verify_archive, IntegrityReport};
pub use transcode::{
    contains_descriptor, list_entries, read_descriptor, transcode, transcode_file, EntrySummary,
    DESCRIPTOR_ENTRY,
};

use cinder_desc::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("descriptor entry 'desc.txt' not found in archive")]
    DescriptorEntryMissing,
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("archive is missing or empty: {0}")]
    EmptyArchive(PathBuf),
    #[error("checksum mismatch for entry '{entry}': declared {declared:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        entry: String,
        declared: u32,
        computed: u32,
    },
    #[error("size mismatch for entry '{entry}': declared {declared}, found {found}")]
    SizeMismatch {
        entry: String,
        declared: u64,
        found: u64,
    },
    #[error("entry '{0}' is not stored uncompressed")]
    UnexpectedCompression(String),
}

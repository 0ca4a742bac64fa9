//! Core install orchestration for Cinder.
//!
//! This crate ties the descriptor codec, archive transcoder, and device
//! platform together into the `Installer` — a staged, failure-aware pipeline
//! that materializes a source package, rescales it for the device's display,
//! verifies the result, and atomically swaps it into the resolved animation
//! slot with a backup of whatever was there first. Stage progression is an
//! explicit state machine; every exit path reclaims the scratch directory.

pub mod concurrency;
pub mod engine;
pub mod pipeline;
pub mod staging;

pub use concurrency::InstallLock;
pub use engine::{InstallOptions, InstallReport, Installer};
pub use pipeline::{validate_transition, PipelineState, Stage};
pub use staging::{sanitize_package_name, Scratch};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("descriptor error: {0}")]
    Descriptor(#[from] cinder_desc::DescriptorError),
    #[error("resolution error: {0}")]
    Resolution(#[from] cinder_desc::ResolutionError),
    #[error("archive error: {0}")]
    Archive(#[from] cinder_archive::ArchiveError),
    #[error("device error: {0}")]
    Device(#[from] cinder_device::DeviceError),
    #[error("integrity check failed: {0}")]
    IntegrityCheckFailed(String),
    #[error("invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

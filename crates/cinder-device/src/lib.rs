//! Device platform surface for Cinder.
//!
//! This crate draws the boundary between the install pipeline and the machine
//! it installs onto: the `DevicePlatform` trait covers package streams,
//! display metrics, capability probes, privileged mount toggles, and the slot
//! filesystem primitives. A `HostPlatform` operates on a rooted directory
//! tree for development and testing against real files; a `MockPlatform`
//! keeps everything in memory for unit tests. Slot selection itself is a pure
//! decision function in [`slot`].

pub mod host;
pub mod mock;
pub mod platform;
pub mod profile;
pub mod slot;

pub use host::HostPlatform;
pub use mock::{MockConfig, MockPlatform};
pub use platform::{AppliedRecord, DevicePlatform, DisplayMetrics};
pub use profile::{parse_profile_file, parse_profile_str, DeviceProfile, ProfileError};
pub use slot::{resolve, AnimationVariant, InstallPlan, SYSTEM_MEDIA_DIR, THEME_SLOT_DIR};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("package source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("filesystem {op} failed for {path}: {source}")]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

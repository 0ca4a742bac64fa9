use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read device profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse device profile: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported profile_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("invalid display metrics {width_px}x{height_px}: both must be non-zero")]
    InvalidDisplay { width_px: u32, height_px: u32 },
}

/// Static description of the device a host-side install run targets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeviceProfile {
    pub profile_version: u32,
    pub display: DisplaySection,
    #[serde(default)]
    pub capabilities: CapabilitiesSection,
    #[serde(default)]
    pub source: SourceSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DisplaySection {
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesSection {
    /// Device exposes the per-theme animation slot.
    #[serde(default)]
    pub theme_slot: bool,
    /// Data partition is encrypted at rest.
    #[serde(default)]
    pub encrypted: bool,
    /// Legacy platform without per-theme slot plumbing.
    #[serde(default)]
    pub legacy: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    /// Directory animation packages are provided from, resolved against the
    /// device root when relative.
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
        }
    }
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from("packages")
}

pub fn parse_profile_str(input: &str) -> Result<DeviceProfile, ProfileError> {
    let profile: DeviceProfile = toml::from_str(input)?;
    if profile.profile_version != 1 {
        return Err(ProfileError::UnsupportedVersion(profile.profile_version));
    }
    if profile.display.width_px == 0 || profile.display.height_px == 0 {
        return Err(ProfileError::InvalidDisplay {
            width_px: profile.display.width_px,
            height_px: profile.display.height_px,
        });
    }
    Ok(profile)
}

pub fn parse_profile_file(path: impl AsRef<Path>) -> Result<DeviceProfile, ProfileError> {
    let content = fs::read_to_string(path)?;
    parse_profile_str(&content)
}

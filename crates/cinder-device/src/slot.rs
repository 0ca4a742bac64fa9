use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-theme animation slot, readable only after user unlock on
/// encrypted-at-rest devices.
pub const THEME_SLOT_DIR: &str = "/data/system/theme";

/// Shared system media slot, always readable during early boot.
pub const SYSTEM_MEDIA_DIR: &str = "/system/media";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationVariant {
    Boot,
    Shutdown,
}

impl AnimationVariant {
    /// File name the platform reads this variant's animation from.
    pub fn archive_name(self) -> &'static str {
        match self {
            AnimationVariant::Boot => "bootanimation.zip",
            AnimationVariant::Shutdown => "shutdownanimation.zip",
        }
    }

    /// Sibling file name a displaced stock animation is preserved under.
    pub fn backup_name(self) -> &'static str {
        match self {
            AnimationVariant::Boot => "bootanimation-backup.zip",
            AnimationVariant::Shutdown => "shutdownanimation-backup.zip",
        }
    }
}

impl std::fmt::Display for AnimationVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationVariant::Boot => write!(f, "boot"),
            AnimationVariant::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Resolved install target, produced once per run and consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub slot_dir: PathBuf,
    pub slot_file: PathBuf,
    pub backup_file: PathBuf,
    /// Whether the chosen slot is readable before unlock on an
    /// encrypted-at-rest device.
    pub encrypted_safe: bool,
    pub requires_backup: bool,
}

/// Pick the install slot for one run.
///
/// The per-theme slot is used when the device supports it AND the animation
/// will actually be readable there: boot animations play before unlock, so an
/// encrypted device routes them to the shared media slot instead. Shutdown
/// animations play after unlock and may use the per-theme slot regardless of
/// encryption. Devices without per-theme slot support always get the shared
/// slot. Only boot installs into the shared slot displace a stock animation,
/// so only they request a backup.
pub fn resolve(
    supports_theme_slot: bool,
    device_encrypted: bool,
    variant: AnimationVariant,
) -> InstallPlan {
    let use_theme_slot = supports_theme_slot
        && (!device_encrypted || variant == AnimationVariant::Shutdown);

    let slot_dir = PathBuf::from(if use_theme_slot {
        THEME_SLOT_DIR
    } else {
        SYSTEM_MEDIA_DIR
    });

    InstallPlan {
        slot_file: slot_dir.join(variant.archive_name()),
        backup_file: slot_dir.join(variant.backup_name()),
        encrypted_safe: !use_theme_slot,
        requires_backup: !use_theme_slot && variant == AnimationVariant::Boot,
        slot_dir,
    }
}

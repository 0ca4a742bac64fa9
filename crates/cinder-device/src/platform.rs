use crate::slot::AnimationVariant;
use crate::DeviceError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Physical display dimensions in pixels, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width_px: u32,
    pub height_px: u32,
}

/// Persisted record of which package currently occupies a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
    pub package: String,
    pub variant: AnimationVariant,
    pub slot_file: PathBuf,
    pub applied_at: String,
}

/// Everything the install pipeline needs from the machine it targets.
///
/// Implementations own the privileged details: how package bytes are
/// acquired (and decrypted, for encrypted sources), how protected partitions
/// are remounted, and how files move into slot paths. The pipeline only
/// sequences these calls; it never touches a slot path directly.
pub trait DevicePlatform: Send + Sync {
    fn name(&self) -> &str;

    fn display_metrics(&self) -> Result<DisplayMetrics, DeviceError>;

    fn supports_theme_slot(&self) -> bool;

    fn is_encrypted(&self) -> bool;

    fn is_legacy(&self) -> bool;

    /// Open a readable stream of the raw archive bytes for `package_id`.
    /// Decryption of encrypted sources happens behind this call.
    fn open_package(
        &self,
        package_id: &str,
        encrypted: bool,
    ) -> Result<Box<dyn Read + Send>, DeviceError>;

    /// Remount protected paths read-write. Always paired with [`mount_ro`]
    /// around the narrowest window that writes them.
    ///
    /// [`mount_ro`]: DevicePlatform::mount_ro
    fn mount_rw(&self) -> Result<(), DeviceError>;

    fn mount_ro(&self) -> Result<(), DeviceError>;

    fn exists(&self, path: &Path) -> bool;

    fn create_dir(&self, path: &Path) -> Result<(), DeviceError>;

    /// Move a file between two device paths.
    fn move_file(&self, src: &Path, dst: &Path) -> Result<(), DeviceError>;

    fn remove_file(&self, path: &Path) -> Result<(), DeviceError>;

    /// Move a file prepared in host scratch space into a device path.
    fn push_file(&self, local_src: &Path, dst: &Path) -> Result<(), DeviceError>;

    /// Tell the platform to pick up the newly installed animation.
    fn activate_animation(
        &self,
        slot_file: &Path,
        variant: AnimationVariant,
    ) -> Result<(), DeviceError>;

    fn record_applied(&self, record: &AppliedRecord) -> Result<(), DeviceError>;

    fn read_applied(
        &self,
        variant: AnimationVariant,
    ) -> Result<Option<AppliedRecord>, DeviceError>;
}

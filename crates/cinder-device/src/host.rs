use crate::platform::{AppliedRecord, DevicePlatform, DisplayMetrics};
use crate::profile::DeviceProfile;
use crate::slot::AnimationVariant;
use crate::DeviceError;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// State directory (device-relative) for host-side bookkeeping.
const STATE_DIR: &str = "/data/system/cinder";

/// Platform implementation over a rooted host directory tree.
///
/// Device-absolute paths are rebased under `root`, so a run against
/// `root = "/"` writes the real slot paths while a run against a scratch
/// directory exercises the full pipeline without privileges. Mount toggles
/// are no-ops on a host tree; every other primitive is a real filesystem
/// operation.
#[derive(Debug)]
pub struct HostPlatform {
    root: PathBuf,
    profile: DeviceProfile,
}

impl HostPlatform {
    pub fn new(root: impl Into<PathBuf>, profile: DeviceProfile) -> Self {
        Self {
            root: root.into(),
            profile,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, device: &Path) -> PathBuf {
        let rel = device.strip_prefix("/").unwrap_or(device);
        self.root.join(rel)
    }

    fn packages_dir(&self) -> PathBuf {
        let dir = &self.profile.source.packages_dir;
        if dir.is_absolute() {
            dir.clone()
        } else {
            self.root.join(dir)
        }
    }

    fn applied_path(&self, variant: AnimationVariant) -> PathBuf {
        self.host_path(Path::new(STATE_DIR))
            .join(format!("applied-{variant}.json"))
    }
}

impl DevicePlatform for HostPlatform {
    fn name(&self) -> &str {
        "host"
    }

    fn display_metrics(&self) -> Result<DisplayMetrics, DeviceError> {
        Ok(DisplayMetrics {
            width_px: self.profile.display.width_px,
            height_px: self.profile.display.height_px,
        })
    }

    fn supports_theme_slot(&self) -> bool {
        self.profile.capabilities.theme_slot
    }

    fn is_encrypted(&self) -> bool {
        self.profile.capabilities.encrypted
    }

    fn is_legacy(&self) -> bool {
        self.profile.capabilities.legacy
    }

    fn open_package(
        &self,
        package_id: &str,
        encrypted: bool,
    ) -> Result<Box<dyn Read + Send>, DeviceError> {
        if encrypted {
            return Err(DeviceError::SourceUnavailable(format!(
                "encrypted package '{package_id}' requires the external decryption provider"
            )));
        }
        let path = self.packages_dir().join(format!("{package_id}.zip"));
        match fs::File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) => Err(DeviceError::SourceUnavailable(format!(
                "{}: {e}",
                path.display()
            ))),
        }
    }

    fn mount_rw(&self) -> Result<(), DeviceError> {
        debug!("mount rw requested; host tree is always writable");
        Ok(())
    }

    fn mount_ro(&self) -> Result<(), DeviceError> {
        debug!("mount ro requested; host tree is always writable");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.host_path(path).exists()
    }

    fn create_dir(&self, path: &Path) -> Result<(), DeviceError> {
        let host = self.host_path(path);
        fs::create_dir_all(&host).map_err(|source| DeviceError::Filesystem {
            op: "create_dir",
            path: host,
            source,
        })
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<(), DeviceError> {
        let host_src = self.host_path(src);
        let host_dst = self.host_path(dst);
        fs::rename(&host_src, &host_dst).map_err(|source| DeviceError::Filesystem {
            op: "move",
            path: host_src,
            source,
        })
    }

    fn remove_file(&self, path: &Path) -> Result<(), DeviceError> {
        let host = self.host_path(path);
        fs::remove_file(&host).map_err(|source| DeviceError::Filesystem {
            op: "remove",
            path: host,
            source,
        })
    }

    fn push_file(&self, local_src: &Path, dst: &Path) -> Result<(), DeviceError> {
        let host_dst = self.host_path(dst);
        // Scratch space may live on a different filesystem than the rooted
        // tree; fall back to copy+remove when rename crosses devices.
        if fs::rename(local_src, &host_dst).is_ok() {
            return Ok(());
        }
        fs::copy(local_src, &host_dst).map_err(|source| DeviceError::Filesystem {
            op: "push",
            path: host_dst.clone(),
            source,
        })?;
        fs::remove_file(local_src).map_err(|source| DeviceError::Filesystem {
            op: "push",
            path: local_src.to_owned(),
            source,
        })
    }

    fn activate_animation(
        &self,
        slot_file: &Path,
        variant: AnimationVariant,
    ) -> Result<(), DeviceError> {
        debug!(
            "{variant} animation activation requested for {}",
            slot_file.display()
        );
        Ok(())
    }

    fn record_applied(&self, record: &AppliedRecord) -> Result<(), DeviceError> {
        let dir = self.host_path(Path::new(STATE_DIR));
        fs::create_dir_all(&dir)?;
        let path = self.applied_path(record.variant);

        let content = serde_json::to_string_pretty(record)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| DeviceError::Io(e.error))?;
        Ok(())
    }

    fn read_applied(
        &self,
        variant: AnimationVariant,
    ) -> Result<Option<AppliedRecord>, DeviceError> {
        let path = self.applied_path(variant);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

use crate::CoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive lock serializing install runs against the same device.
///
/// The pipeline assumes at most one run at a time and does not guard slot
/// paths against concurrent writers itself; callers hold this lock for the
/// duration of a run to get that guarantee.
pub struct InstallLock {
    lock_file: File,
}

impl InstallLock {
    pub fn acquire(lock_path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?;

        file.lock_exclusive()
            .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::WouldBlock, e)))?;

        Ok(Self { lock_file: file })
    }

    pub fn try_acquire(lock_path: &Path) -> Result<Option<Self>, CoreError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { lock_file: file })),
            Err(_) => Ok(None),
        }
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}

use crate::platform::{AppliedRecord, DevicePlatform, DisplayMetrics};
use crate::slot::AnimationVariant;
use crate::DeviceError;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Scripted device capabilities for a [`MockPlatform`].
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub metrics: DisplayMetrics,
    pub theme_slot: bool,
    pub encrypted: bool,
    pub legacy: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            metrics: DisplayMetrics {
                width_px: 1080,
                height_px: 1920,
            },
            theme_slot: true,
            encrypted: false,
            legacy: false,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    packages: HashMap<String, Vec<u8>>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    mount_calls: Vec<&'static str>,
    activations: Vec<(PathBuf, AnimationVariant)>,
    applied: Vec<AppliedRecord>,
    fail_push: bool,
}

/// In-memory device for pipeline tests: a fake device filesystem, scripted
/// capabilities, and call recording for mount pairing and activation checks.
pub struct MockPlatform {
    config: MockConfig,
    state: Mutex<MockState>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::with_config(MockConfig::default())
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Register package bytes served by [`DevicePlatform::open_package`].
    pub fn add_package(&self, package_id: &str, bytes: Vec<u8>) {
        self.state().packages.insert(package_id.to_owned(), bytes);
    }

    /// Seed a file directly into the fake device filesystem.
    pub fn seed_file(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.state().files.insert(path.into(), bytes);
    }

    /// Make subsequent [`DevicePlatform::push_file`] calls fail.
    pub fn inject_push_failure(&self) {
        self.state().fail_push = true;
    }

    pub fn file_bytes(&self, path: &Path) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.state().files.len()
    }

    pub fn mount_calls(&self) -> Vec<&'static str> {
        self.state().mount_calls.clone()
    }

    pub fn activations(&self) -> Vec<(PathBuf, AnimationVariant)> {
        self.state().activations.clone()
    }

    pub fn applied_records(&self) -> Vec<AppliedRecord> {
        self.state().applied.clone()
    }
}

impl DevicePlatform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn display_metrics(&self) -> Result<DisplayMetrics, DeviceError> {
        Ok(self.config.metrics)
    }

    fn supports_theme_slot(&self) -> bool {
        self.config.theme_slot
    }

    fn is_encrypted(&self) -> bool {
        self.config.encrypted
    }

    fn is_legacy(&self) -> bool {
        self.config.legacy
    }

    fn open_package(
        &self,
        package_id: &str,
        _encrypted: bool,
    ) -> Result<Box<dyn Read + Send>, DeviceError> {
        // The mock serves the same bytes either way: decryption is internal
        // to the provider interface.
        match self.state().packages.get(package_id) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(DeviceError::SourceUnavailable(format!(
                "no mock package '{package_id}'"
            ))),
        }
    }

    fn mount_rw(&self) -> Result<(), DeviceError> {
        self.state().mount_calls.push("rw");
        Ok(())
    }

    fn mount_ro(&self) -> Result<(), DeviceError> {
        self.state().mount_calls.push("ro");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn create_dir(&self, path: &Path) -> Result<(), DeviceError> {
        self.state().dirs.insert(path.to_owned());
        Ok(())
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<(), DeviceError> {
        let mut state = self.state();
        match state.files.remove(src) {
            Some(bytes) => {
                state.files.insert(dst.to_owned(), bytes);
                Ok(())
            }
            None => Err(DeviceError::Filesystem {
                op: "move",
                path: src.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<(), DeviceError> {
        match self.state().files.remove(path) {
            Some(_) => Ok(()),
            None => Err(DeviceError::Filesystem {
                op: "remove",
                path: path.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }

    fn push_file(&self, local_src: &Path, dst: &Path) -> Result<(), DeviceError> {
        if self.state().fail_push {
            return Err(DeviceError::Filesystem {
                op: "push",
                path: dst.to_owned(),
                source: std::io::Error::other("injected push failure"),
            });
        }
        let bytes = std::fs::read(local_src)?;
        std::fs::remove_file(local_src)?;
        self.state().files.insert(dst.to_owned(), bytes);
        Ok(())
    }

    fn activate_animation(
        &self,
        slot_file: &Path,
        variant: AnimationVariant,
    ) -> Result<(), DeviceError> {
        self.state()
            .activations
            .push((slot_file.to_owned(), variant));
        Ok(())
    }

    fn record_applied(&self, record: &AppliedRecord) -> Result<(), DeviceError> {
        self.state().applied.push(record.clone());
        Ok(())
    }

    fn read_applied(
        &self,
        variant: AnimationVariant,
    ) -> Result<Option<AppliedRecord>, DeviceError> {
        Ok(self
            .state()
            .applied
            .iter()
            .rev()
            .find(|r| r.variant == variant)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_round_trip() {
        let mock = MockPlatform::new();
        mock.add_package("aurora", b"zipbytes".to_vec());

        let mut stream = mock.open_package("aurora", false).unwrap();
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, b"zipbytes");

        assert!(matches!(
            mock.open_package("ghost", false).err().unwrap(),
            DeviceError::SourceUnavailable(_)
        ));
    }

    #[test]
    fn move_file_relocates_bytes() {
        let mock = MockPlatform::new();
        mock.seed_file("/system/media/bootanimation.zip", b"stock".to_vec());

        mock.move_file(
            Path::new("/system/media/bootanimation.zip"),
            Path::new("/system/media/bootanimation-backup.zip"),
        )
        .unwrap();

        assert!(!mock.exists(Path::new("/system/media/bootanimation.zip")));
        assert_eq!(
            mock.file_bytes(Path::new("/system/media/bootanimation-backup.zip")),
            Some(b"stock".to_vec())
        );
    }

    #[test]
    fn push_consumes_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("scaled.zip");
        std::fs::write(&local, b"scaled").unwrap();

        let mock = MockPlatform::new();
        mock.push_file(&local, Path::new("/system/media/bootanimation.zip"))
            .unwrap();
        assert!(!local.exists());
        assert_eq!(
            mock.file_bytes(Path::new("/system/media/bootanimation.zip")),
            Some(b"scaled".to_vec())
        );
    }

    #[test]
    fn injected_push_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("scaled.zip");
        std::fs::write(&local, b"scaled").unwrap();

        let mock = MockPlatform::new();
        mock.inject_push_failure();
        assert!(mock
            .push_file(&local, Path::new("/system/media/bootanimation.zip"))
            .is_err());
        assert!(local.exists(), "failed push must not consume the source");
    }

    #[test]
    fn mount_calls_are_recorded_in_order() {
        let mock = MockPlatform::new();
        mock.mount_rw().unwrap();
        mock.mount_ro().unwrap();
        assert_eq!(mock.mount_calls(), vec!["rw", "ro"]);
    }

    #[test]
    fn read_applied_returns_latest_for_variant() {
        let mock = MockPlatform::new();
        let mut record = AppliedRecord {
            package: "aurora".to_owned(),
            variant: AnimationVariant::Boot,
            slot_file: PathBuf::from("/data/system/theme/bootanimation.zip"),
            applied_at: "t0".to_owned(),
        };
        mock.record_applied(&record).unwrap();
        record.package = "dusk".to_owned();
        mock.record_applied(&record).unwrap();

        let read = mock.read_applied(AnimationVariant::Boot).unwrap().unwrap();
        assert_eq!(read.package, "dusk");
        assert!(mock
            .read_applied(AnimationVariant::Shutdown)
            .unwrap()
            .is_none());
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const STAGING_DIR: &str = "staging";

/// Private scratch directory of one install run.
///
/// Created empty at run start — a stale directory left by a crashed run is
/// deleted and recreated — and removed on every exit path. Exactly one run
/// owns it for the run's duration.
#[derive(Debug)]
pub struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    pub fn prepare(root: &Path) -> std::io::Result<Self> {
        let dir = root.join(STAGING_DIR);
        if dir.exists() {
            debug!("removing stale staging directory {}", dir.display());
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Where the materialized source archive lands.
    pub fn source_archive(&self, package_name: &str) -> PathBuf {
        self.dir.join(format!("{package_name}.zip"))
    }

    /// Where the rescaled output archive lands, distinctly named so a failed
    /// transcode can never be confused with the source.
    pub fn scaled_archive(&self, package_name: &str) -> PathBuf {
        self.dir.join(format!("scaled-{package_name}.zip"))
    }

    pub fn remove(&self) -> std::io::Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

/// Strip whitespace and every non-alphanumeric character from a declared
/// package name before using it as a scratch filename. This keeps hostile
/// names ("../../x", separators, shell metacharacters) from escaping the
/// scratch directory.
pub fn sanitize_package_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if cleaned.is_empty() {
        "animation".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::prepare(root.path()).unwrap();
        assert!(scratch.path().is_dir());
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn prepare_replaces_stale_directory() {
        let root = tempfile::tempdir().unwrap();
        let stale = root.path().join(STAGING_DIR);
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.zip"), b"junk").unwrap();

        let scratch = Scratch::prepare(root.path()).unwrap();
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::prepare(root.path()).unwrap();
        scratch.remove().unwrap();
        assert!(!scratch.path().exists());
        scratch.remove().unwrap();
    }

    #[test]
    fn archive_paths_are_distinct() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::prepare(root.path()).unwrap();
        let source = scratch.source_archive("aurora");
        let scaled = scratch.scaled_archive("aurora");
        assert_ne!(source, scaled);
        assert!(scaled.file_name().unwrap().to_str().unwrap().starts_with("scaled-"));
    }

    #[test]
    fn sanitize_strips_whitespace_and_symbols() {
        assert_eq!(sanitize_package_name("Aurora Borealis"), "AuroraBorealis");
        assert_eq!(sanitize_package_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_package_name("dusk_v2!"), "duskv2");
        assert_eq!(sanitize_package_name("plain"), "plain");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_package_name("../!!"), "animation");
        assert_eq!(sanitize_package_name(""), "animation");
    }
}

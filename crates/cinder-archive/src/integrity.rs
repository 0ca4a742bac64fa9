use crate::transcode::DESCRIPTOR_ENTRY;
use crate::ArchiveError;
use cinder_desc::parse_descriptor;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::read::ZipArchive;
use zip::CompressionMethod;

/// Result of a successful archive verification walk.
#[derive(Debug, Clone, Copy)]
pub struct IntegrityReport {
    pub entries: usize,
    pub payload_bytes: u64,
}

/// Verify a transcoded animation archive before it is installed.
///
/// Checks that the file exists and is non-empty, that every entry uses the
/// stored method with its declared checksum and size matching the payload,
/// and that the descriptor entry is present and parses. Stored entries make
/// the checksum walk total: payload bytes are exactly the declared bytes.
pub fn verify_archive(path: &Path) -> Result<IntegrityReport, ArchiveError> {
    let len = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Err(ArchiveError::EmptyArchive(path.to_owned())),
    };
    if len == 0 {
        return Err(ArchiveError::EmptyArchive(path.to_owned()));
    }

    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut payload_bytes = 0u64;
    let mut descriptor_seen = false;

    for index in 0..archive.len() {
        let mut entry = archive.by_index_raw(index)?;
        let name = entry.name().to_owned();

        if entry.compression() != CompressionMethod::Stored {
            return Err(ArchiveError::UnexpectedCompression(name));
        }
        if name.ends_with('/') {
            continue;
        }

        let declared_crc = entry.crc32();
        let declared_size = entry.size();

        let mut hasher = crc32fast::Hasher::new();
        let mut found = 0u64;
        let mut buf = [0u8; 8192];
        loop {
            let n = entry.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            found += n as u64;
        }

        if found != declared_size {
            return Err(ArchiveError::SizeMismatch {
                entry: name,
                declared: declared_size,
                found,
            });
        }
        let computed = hasher.finalize();
        if computed != declared_crc {
            return Err(ArchiveError::ChecksumMismatch {
                entry: name,
                declared: declared_crc,
                computed,
            });
        }

        payload_bytes += found;
        if name == DESCRIPTOR_ENTRY {
            descriptor_seen = true;
        }
    }

    if !descriptor_seen {
        return Err(ArchiveError::DescriptorEntryMissing);
    }

    // The descriptor must still parse after the rewrite.
    let entries = archive.len();
    let mut entry = archive.by_name(DESCRIPTOR_ENTRY)?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    parse_descriptor(&bytes)?;

    Ok(IntegrityReport {
        entries,
        payload_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::transcode;
    use cinder_desc::TargetResolution;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};

    const TARGET: TargetResolution = TargetResolution {
        width: 1080,
        height: 1920,
    };

    fn build_fixture(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, payload, method) in entries {
            writer
                .start_file(*name, FileOptions::default().compression_method(*method))
                .unwrap();
            writer.write_all(payload).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn transcoded_fixture() -> Vec<u8> {
        let source = build_fixture(&[
            (
                "part0/0000.png",
                b"FRAME-A-PAYLOAD",
                CompressionMethod::Deflated,
            ),
            ("desc.txt", b"720 1280 30\n", CompressionMethod::Stored),
        ]);
        transcode(Cursor::new(source), Cursor::new(Vec::new()), TARGET)
            .unwrap()
            .into_inner()
    }

    fn write_temp(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaled-anim.zip");
        std::fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn verifies_transcoded_archive() {
        let (_dir, path) = write_temp(&transcoded_fixture());
        let report = verify_archive(&path).unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.payload_bytes, 15 + 13);
    }

    #[test]
    fn detects_corrupted_payload() {
        let mut bytes = transcoded_fixture();
        // Stored entries keep their payload verbatim in the file, so the
        // frame bytes can be located and flipped directly.
        let needle = b"FRAME-A-PAYLOAD";
        let pos = bytes
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap();
        bytes[pos] ^= 0xff;

        let (_dir, path) = write_temp(&bytes);
        assert!(matches!(
            verify_archive(&path).unwrap_err(),
            ArchiveError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn rejects_empty_file() {
        let (_dir, path) = write_temp(b"");
        assert!(matches!(
            verify_archive(&path).unwrap_err(),
            ArchiveError::EmptyArchive(_)
        ));
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.zip");
        assert!(matches!(
            verify_archive(&path).unwrap_err(),
            ArchiveError::EmptyArchive(_)
        ));
    }

    #[test]
    fn rejects_compressed_entries() {
        let bytes = build_fixture(&[
            ("desc.txt", b"720 1280 30\n", CompressionMethod::Stored),
            ("part0/0000.png", b"FRAME", CompressionMethod::Deflated),
        ]);
        let (_dir, path) = write_temp(&bytes);
        assert!(matches!(
            verify_archive(&path).unwrap_err(),
            ArchiveError::UnexpectedCompression(_)
        ));
    }

    #[test]
    fn rejects_archive_without_descriptor() {
        let bytes = build_fixture(&[("a.bin", b"x", CompressionMethod::Stored)]);
        let (_dir, path) = write_temp(&bytes);
        assert!(matches!(
            verify_archive(&path).unwrap_err(),
            ArchiveError::DescriptorEntryMissing
        ));
    }
}

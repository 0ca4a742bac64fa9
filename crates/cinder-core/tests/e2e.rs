//! End-to-end pipeline tests against the in-memory mock platform.

use cinder_core::{CoreError, InstallOptions, Installer};
use cinder_device::{
    AnimationVariant, DevicePlatform, DisplayMetrics, MockConfig, MockPlatform,
};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use zip::write::FileOptions;
use zip::CompressionMethod;

fn animation_package(desc: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("desc.txt", deflated).unwrap();
    writer.write_all(desc).unwrap();
    writer.start_file("part0/0000.png", stored).unwrap();
    writer.write_all(b"\x89PNG-FRAME-PAYLOAD").unwrap();
    writer.finish().unwrap().into_inner()
}

fn package_without_descriptor() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("part0/0000.png", stored).unwrap();
    writer.write_all(b"frame").unwrap();
    writer.finish().unwrap().into_inner()
}

fn descriptor_of(archive_bytes: &[u8]) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
    let mut entry = archive.by_name("desc.txt").unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    bytes
}

fn installer(mock: &Arc<MockPlatform>, scratch: &tempfile::TempDir) -> Installer {
    Installer::new(
        Arc::clone(mock) as Arc<dyn DevicePlatform>,
        scratch.path(),
    )
}

#[test]
fn end_to_end_install_rescales_descriptor() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("Aurora Borealis", animation_package(b"500 500 30\n"));

    let report = installer(&mock, &scratch)
        .install("Aurora Borealis", InstallOptions::default())
        .unwrap();

    assert_eq!(report.package_name, "AuroraBorealis");
    assert_eq!(
        report.slot_file,
        Path::new("/data/system/theme/bootanimation.zip")
    );
    assert_eq!(report.resolution.width, 1080);
    assert_eq!(report.resolution.height, 1080);
    assert!(!report.backed_up);

    let installed = mock.file_bytes(&report.slot_file).unwrap();
    assert_eq!(descriptor_of(&installed), b"1080 1080 30\n");

    assert_eq!(mock.mount_calls(), vec!["rw", "ro"]);
    assert_eq!(mock.activations().len(), 1);
    let applied = mock.applied_records();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].package, "Aurora Borealis");
    assert_eq!(applied[0].variant, AnimationVariant::Boot);

    assert!(
        !scratch.path().join("staging").exists(),
        "scratch must be reclaimed on success"
    );
}

#[test]
fn backup_happens_exactly_once_across_two_runs() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::with_config(MockConfig {
        theme_slot: false,
        ..MockConfig::default()
    }));
    mock.seed_file("/system/media/bootanimation.zip", b"stock animation".to_vec());
    mock.add_package("aurora", animation_package(b"500 500 30\n"));
    mock.add_package("dusk", animation_package(b"720 1280 24\n"));

    let install = installer(&mock, &scratch);
    let first = install.install("aurora", InstallOptions::default()).unwrap();
    assert!(first.backed_up);

    let second = install.install("dusk", InstallOptions::default()).unwrap();
    assert!(!second.backed_up, "second run must not overwrite the backup");

    let backup = mock
        .file_bytes(Path::new("/system/media/bootanimation-backup.zip"))
        .unwrap();
    assert_eq!(backup, b"stock animation", "first backup wins");

    // Exactly the slot file and its single backup remain.
    assert_eq!(mock.file_count(), 2);
    let slot = mock
        .file_bytes(Path::new("/system/media/bootanimation.zip"))
        .unwrap();
    assert_eq!(descriptor_of(&slot), b"1080 1920 24\n");
}

#[test]
fn missing_descriptor_aborts_cleanly() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("plain", package_without_descriptor());

    let err = installer(&mock, &scratch)
        .install("plain", InstallOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Archive(cinder_archive::ArchiveError::DescriptorEntryMissing)
    ));
    assert_eq!(mock.file_count(), 0, "no slot file may be produced");
    assert!(mock.mount_calls().is_empty(), "mounts must not be touched");
    assert!(
        !scratch.path().join("staging").exists(),
        "scratch must be reclaimed on failure"
    );
}

#[test]
fn malformed_descriptor_aborts() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("bad", animation_package(b"wide tall 30\n"));

    let err = installer(&mock, &scratch)
        .install("bad", InstallOptions::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::Archive(_)));
    assert_eq!(mock.file_count(), 0);
}

#[test]
fn zero_dimension_descriptor_aborts_before_transcode() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("zero", animation_package(b"0 0 30\n"));

    let err = installer(&mock, &scratch)
        .install("zero", InstallOptions::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::Resolution(_)));
    assert_eq!(mock.file_count(), 0);
}

#[test]
fn unknown_package_is_source_unavailable() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());

    let err = installer(&mock, &scratch)
        .install("ghost", InstallOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Device(cinder_device::DeviceError::SourceUnavailable(_))
    ));
}

#[test]
fn push_failure_still_remounts_read_only() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("aurora", animation_package(b"500 500 30\n"));
    mock.inject_push_failure();

    let err = installer(&mock, &scratch)
        .install("aurora", InstallOptions::default())
        .unwrap_err();

    assert!(matches!(err, CoreError::Device(_)));
    assert_eq!(
        mock.mount_calls(),
        vec!["rw", "ro"],
        "mount toggles must stay paired on failure"
    );
    assert!(mock.applied_records().is_empty());
    assert!(!scratch.path().join("staging").exists());
}

#[test]
fn encrypted_device_routes_boot_to_system_media() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::with_config(MockConfig {
        encrypted: true,
        ..MockConfig::default()
    }));
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    let report = installer(&mock, &scratch)
        .install("aurora", InstallOptions::default())
        .unwrap();
    assert_eq!(
        report.slot_file,
        Path::new("/system/media/bootanimation.zip")
    );
}

#[test]
fn encrypted_device_keeps_shutdown_in_theme_slot() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::with_config(MockConfig {
        encrypted: true,
        ..MockConfig::default()
    }));
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    let report = installer(&mock, &scratch)
        .install(
            "aurora",
            InstallOptions {
                encrypted: false,
                variant: AnimationVariant::Shutdown,
            },
        )
        .unwrap();
    assert_eq!(
        report.slot_file,
        Path::new("/data/system/theme/shutdownanimation.zip")
    );
    assert_eq!(mock.applied_records()[0].variant, AnimationVariant::Shutdown);
}

#[test]
fn legacy_platform_uses_system_media() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::with_config(MockConfig {
        legacy: true,
        ..MockConfig::default()
    }));
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    let report = installer(&mock, &scratch)
        .install("aurora", InstallOptions::default())
        .unwrap();
    assert_eq!(
        report.slot_file,
        Path::new("/system/media/bootanimation.zip")
    );
}

#[test]
fn landscape_metrics_are_normalized_before_scaling() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::with_config(MockConfig {
        metrics: DisplayMetrics {
            width_px: 1920,
            height_px: 1080,
        },
        ..MockConfig::default()
    }));
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    let report = installer(&mock, &scratch)
        .install("aurora", InstallOptions::default())
        .unwrap();
    assert_eq!(report.resolution.width, 1080);
    assert_eq!(report.resolution.height, 1080);
}

#[test]
fn stale_staging_directory_is_replaced() {
    let scratch = tempfile::tempdir().unwrap();
    let stale = scratch.path().join("staging");
    std::fs::create_dir_all(&stale).unwrap();
    std::fs::write(stale.join("leftover.zip"), b"junk").unwrap();

    let mock = Arc::new(MockPlatform::new());
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    installer(&mock, &scratch)
        .install("aurora", InstallOptions::default())
        .unwrap();
    assert!(!stale.exists());
}

#[test]
fn background_install_reports_through_callback() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());
    mock.add_package("aurora", animation_package(b"500 500 30\n"));

    let (tx, rx) = mpsc::channel();
    let handle = installer(&mock, &scratch)
        .install_background("aurora", InstallOptions::default(), move |result| {
            tx.send(result).unwrap();
        })
        .unwrap();

    let result = rx.recv().unwrap();
    handle.join().unwrap();

    let report = result.unwrap();
    assert_eq!(report.resolution.width, 1080);
    assert!(mock.file_bytes(&report.slot_file).is_some());
}

#[test]
fn background_install_reports_failure_through_callback() {
    let scratch = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockPlatform::new());

    let (tx, rx) = mpsc::channel();
    let handle = installer(&mock, &scratch)
        .install_background("ghost", InstallOptions::default(), move |result| {
            tx.send(result.is_err()).unwrap();
        })
        .unwrap();

    assert!(rx.recv().unwrap(), "failure must reach the callback");
    handle.join().unwrap();
}

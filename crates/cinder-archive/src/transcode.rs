use crate::ArchiveError;
use cinder_desc::{parse_descriptor, DescriptorRecord, TargetResolution};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::read::ZipArchive;
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// Entry name of the animation descriptor inside every package.
pub const DESCRIPTOR_ENTRY: &str = "desc.txt";

/// Whether the archive at `path` carries a descriptor entry.
pub fn contains_descriptor(path: &Path) -> Result<bool, ArchiveError> {
    let archive = open_archive(path)?;
    let found = archive.file_names().any(|name| name == DESCRIPTOR_ENTRY);
    Ok(found)
}

/// Extract and parse the descriptor entry of the archive at `path`.
pub fn read_descriptor(path: &Path) -> Result<DescriptorRecord, ArchiveError> {
    let mut archive = open_archive(path)?;
    let mut entry = archive.by_name(DESCRIPTOR_ENTRY).map_err(|e| match e {
        ZipError::FileNotFound => ArchiveError::DescriptorEntryMissing,
        other => ArchiveError::Zip(other),
    })?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(parse_descriptor(&bytes)?)
}

/// Summary of one archive entry, for inspection output.
#[derive(Debug, Clone)]
pub struct EntrySummary {
    pub name: String,
    pub size: u64,
    pub crc32: u32,
    pub stored: bool,
}

pub fn list_entries(path: &Path) -> Result<Vec<EntrySummary>, ArchiveError> {
    let mut archive = open_archive(path)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        entries.push(EntrySummary {
            name: entry.name().to_owned(),
            size: entry.size(),
            crc32: entry.crc32(),
            stored: entry.compression() == CompressionMethod::Stored,
        });
    }
    Ok(entries)
}

/// Repackage `source` into `sink`, rescaling the descriptor to `target`.
///
/// Every entry is written with the stored method in its original order and
/// under its original name. Only the descriptor entry's payload changes:
/// width and height are replaced, the frame-rate token and body lines are
/// carried through untouched, and the entry's checksum and size are
/// recomputed over the new bytes. All other payloads are preserved
/// byte-for-byte, so their checksums and sizes are unchanged too.
pub fn transcode<R, W>(source: R, sink: W, target: TargetResolution) -> Result<W, ArchiveError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut archive = ZipArchive::new(source)?;
    if !archive.file_names().any(|name| name == DESCRIPTOR_ENTRY) {
        return Err(ArchiveError::DescriptorEntryMissing);
    }

    let mut writer = ZipWriter::new(sink);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_owned();

        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut payload = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut payload)?;

        if name == DESCRIPTOR_ENTRY {
            let mut record = parse_descriptor(&payload)?;
            debug!(
                "rescaling descriptor {}x{} -> {}x{}",
                record.width, record.height, target.width, target.height
            );
            record.width = target.width;
            record.height = target.height;
            payload = record.to_bytes();
        }

        writer.start_file(name, options)?;
        writer.write_all(&payload)?;
    }

    Ok(writer.finish()?)
}

/// File-level [`transcode`]: reads `source`, writes `dest`.
///
/// No output file is left behind on failure, including when the source has
/// no descriptor entry at all.
pub fn transcode_file(
    source: &Path,
    dest: &Path,
    target: TargetResolution,
) -> Result<(), ArchiveError> {
    if !contains_descriptor(source)? {
        return Err(ArchiveError::DescriptorEntryMissing);
    }

    let reader = BufReader::new(File::open(source)?);
    let sink = BufWriter::new(File::create(dest)?);

    match transcode(reader, sink, target) {
        Ok(mut out) => {
            out.flush()?;
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(dest);
            Err(e)
        }
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, ArchiveError> {
    Ok(ZipArchive::new(BufReader::new(File::open(path)?))?)
}

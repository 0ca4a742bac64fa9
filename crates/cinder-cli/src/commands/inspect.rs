use super::{json_pretty, EXIT_SUCCESS};
use cinder_archive::{list_entries, read_descriptor};
use std::path::Path;

pub fn run(archive: &Path, json: bool) -> Result<u8, String> {
    let descriptor = read_descriptor(archive).map_err(|e| e.to_string())?;
    let entries = list_entries(archive).map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "archive": archive,
            "width": descriptor.width,
            "height": descriptor.height,
            "frame_rate": descriptor.frame_rate,
            "body_lines": descriptor.body.len(),
            "entries": entries.iter().map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "size": e.size,
                    "crc32": format!("{:08x}", e.crc32),
                    "stored": e.stored,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{}: {}x{} @ {}",
            archive.display(),
            descriptor.width,
            descriptor.height,
            descriptor.frame_rate
        );
        for line in &descriptor.body {
            println!("  {line}");
        }
        println!("{} entries:", entries.len());
        for entry in &entries {
            println!(
                "  {:>9}  {:08x}  {}  {}",
                entry.size,
                entry.crc32,
                if entry.stored { "stored  " } else { "deflated" },
                entry.name
            );
        }
    }
    Ok(EXIT_SUCCESS)
}

use super::{colorize_variant, json_pretty, load_platform, variant_for, EXIT_SUCCESS};
use cinder_archive::read_descriptor;
use cinder_desc::resolution;
use cinder_device::{resolve, DevicePlatform};
use std::path::Path;

pub fn run(
    profile: &Path,
    root: &Path,
    shutdown: bool,
    source: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let platform = load_platform(profile, root)?;
    let variant = variant_for(shutdown);

    let supports_theme_slot = platform.supports_theme_slot() && !platform.is_legacy();
    let plan = resolve(supports_theme_slot, platform.is_encrypted(), variant);
    let metrics = platform.display_metrics().map_err(|e| e.to_string())?;
    let applied = platform.read_applied(variant).map_err(|e| e.to_string())?;

    let target = source
        .map(|path| {
            let descriptor = read_descriptor(path).map_err(|e| e.to_string())?;
            resolution::plan(
                descriptor.width,
                descriptor.height,
                metrics.width_px,
                metrics.height_px,
            )
            .map_err(|e| e.to_string())
        })
        .transpose()?;

    if json {
        let payload = serde_json::json!({
            "variant": variant.to_string(),
            "display": { "width_px": metrics.width_px, "height_px": metrics.height_px },
            "slot_file": plan.slot_file,
            "backup_file": plan.backup_file,
            "encrypted_safe": plan.encrypted_safe,
            "requires_backup": plan.requires_backup,
            "target": target,
            "applied": applied.as_ref().map(|a| serde_json::json!({
                "package": a.package,
                "applied_at": a.applied_at,
            })),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{} animation slot: {}",
            colorize_variant(variant),
            plan.slot_file.display()
        );
        println!("display: {}x{}", metrics.width_px, metrics.height_px);
        if let Some(target) = target {
            println!("planned resolution: {target}");
        }
        if plan.requires_backup {
            println!("backup on install: {}", plan.backup_file.display());
        }
        match applied {
            Some(a) => println!("currently applied: '{}' ({})", a.package, a.applied_at),
            None => println!("currently applied: none recorded"),
        }
    }
    Ok(EXIT_SUCCESS)
}

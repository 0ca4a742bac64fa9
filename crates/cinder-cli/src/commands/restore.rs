use super::{json_pretty, load_platform, variant_for, EXIT_SUCCESS};
use cinder_device::{resolve, DevicePlatform};
use std::path::Path;

/// Move the preserved backup back into its slot, displacing the themed
/// animation that replaced it.
pub fn run(profile: &Path, root: &Path, shutdown: bool, json: bool) -> Result<u8, String> {
    let platform = load_platform(profile, root)?;
    let variant = variant_for(shutdown);

    let supports_theme_slot = platform.supports_theme_slot() && !platform.is_legacy();
    let plan = resolve(supports_theme_slot, platform.is_encrypted(), variant);

    if !platform.exists(&plan.backup_file) {
        return Err(format!(
            "no backup present at {}",
            plan.backup_file.display()
        ));
    }

    platform.mount_rw().map_err(|e| e.to_string())?;
    let restored = restore_into_slot(&platform, &plan);
    let remounted = platform.mount_ro();
    restored?;
    remounted.map_err(|e| e.to_string())?;

    platform
        .activate_animation(&plan.slot_file, variant)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "variant": variant.to_string(),
            "slot_file": plan.slot_file,
            "status": "restored"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("restored backup into {}", plan.slot_file.display());
    }
    Ok(EXIT_SUCCESS)
}

fn restore_into_slot(
    platform: &impl DevicePlatform,
    plan: &cinder_device::InstallPlan,
) -> Result<(), String> {
    if platform.exists(&plan.slot_file) {
        platform
            .remove_file(&plan.slot_file)
            .map_err(|e| e.to_string())?;
    }
    platform
        .move_file(&plan.backup_file, &plan.slot_file)
        .map_err(|e| e.to_string())
}

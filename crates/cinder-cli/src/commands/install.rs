use super::{json_pretty, load_platform, spin_fail, spin_ok, spinner, variant_for, EXIT_SUCCESS};
use cinder_core::{InstallLock, InstallOptions, Installer};
use std::path::Path;
use std::sync::Arc;

pub fn run(
    profile: &Path,
    root: &Path,
    cache: &Path,
    package: &str,
    encrypted: bool,
    shutdown: bool,
    json: bool,
) -> Result<u8, String> {
    let platform = load_platform(profile, root)?;

    // One run at a time per cache; a second invocation blocks here.
    let _lock = InstallLock::acquire(&cache.join("install.lock"))
        .map_err(|e| format!("install lock: {e}"))?;

    let installer = Installer::new(Arc::new(platform), cache);
    let options = InstallOptions {
        encrypted,
        variant: variant_for(shutdown),
    };

    let pb = if json {
        None
    } else {
        Some(spinner("installing animation..."))
    };

    let report = match installer.install(package, options) {
        Ok(report) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "animation installed");
            }
            report
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "installation failed");
            }
            return Err(format!("install failed: {e}"));
        }
    };

    if json {
        let payload = serde_json::json!({
            "package": report.package,
            "variant": options.variant.to_string(),
            "slot_file": report.slot_file,
            "width": report.resolution.width,
            "height": report.resolution.height,
            "backed_up": report.backed_up,
            "status": "installed"
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "installed '{}' into {} at {}",
            report.package,
            report.slot_file.display(),
            report.resolution
        );
        if report.backed_up {
            println!("previous animation backed up alongside the slot");
        }
    }
    Ok(EXIT_SUCCESS)
}

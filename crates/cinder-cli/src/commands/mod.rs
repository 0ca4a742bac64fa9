pub mod completions;
pub mod inspect;
pub mod install;
pub mod plan;
pub mod restore;

use cinder_device::{parse_profile_file, AnimationVariant, HostPlatform};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_PROFILE_ERROR: u8 = 2;
pub const EXIT_INSTALL_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn load_platform(profile_path: &Path, root: &Path) -> Result<HostPlatform, String> {
    let profile = parse_profile_file(profile_path).map_err(|e| format!("profile error: {e}"))?;
    Ok(HostPlatform::new(root, profile))
}

pub fn variant_for(shutdown: bool) -> AnimationVariant {
    if shutdown {
        AnimationVariant::Shutdown
    } else {
        AnimationVariant::Boot
    }
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_variant(variant: AnimationVariant) -> String {
    use console::Style;
    match variant {
        AnimationVariant::Boot => Style::new().cyan().apply_to("boot").to_string(),
        AnimationVariant::Shutdown => Style::new().magenta().apply_to("shutdown").to_string(),
    }
}

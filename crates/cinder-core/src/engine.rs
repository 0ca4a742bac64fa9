use crate::pipeline::{PipelineState, Stage};
use crate::staging::{sanitize_package_name, Scratch};
use crate::CoreError;
use cinder_archive::{read_descriptor, transcode_file, verify_archive};
use cinder_desc::{resolution, TargetResolution};
use cinder_device::{resolve, AnimationVariant, AppliedRecord, DevicePlatform, InstallPlan};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Per-run install parameters.
#[derive(Debug, Clone, Copy)]
pub struct InstallOptions {
    /// Source package stream must be decrypted by the provider.
    pub encrypted: bool,
    pub variant: AnimationVariant,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            encrypted: false,
            variant: AnimationVariant::Boot,
        }
    }
}

/// Outcome of a successful install run.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub package: String,
    /// Sanitized name the package was staged under.
    pub package_name: String,
    pub slot_file: PathBuf,
    pub resolution: TargetResolution,
    pub backed_up: bool,
}

/// The staged install pipeline, driven against one [`DevicePlatform`].
///
/// A run is fully self-contained: it owns a private scratch directory for
/// its duration and a single-owner [`PipelineState`]. Failures are terminal —
/// the caller may re-invoke the whole pipeline from the start, and is
/// expected to serialize runs targeting the same slot (see [`InstallLock`]).
///
/// [`InstallLock`]: crate::concurrency::InstallLock
#[derive(Clone)]
pub struct Installer {
    platform: Arc<dyn DevicePlatform>,
    scratch_root: PathBuf,
}

impl Installer {
    pub fn new(platform: Arc<dyn DevicePlatform>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            scratch_root: scratch_root.into(),
        }
    }

    pub fn platform(&self) -> &dyn DevicePlatform {
        self.platform.as_ref()
    }

    /// Run the full install pipeline to completion, blocking the caller.
    pub fn install(
        &self,
        package_id: &str,
        options: InstallOptions,
    ) -> Result<InstallReport, CoreError> {
        let mut state = PipelineState::new();
        info!(
            "installing {} animation from package '{package_id}' via {} platform",
            options.variant,
            self.platform.name()
        );

        match self.run_stages(&mut state, package_id, options) {
            Ok(report) => {
                state.advance(Stage::CleanedUp)?;
                info!(
                    "installed '{package_id}' into {} at {}",
                    report.slot_file.display(),
                    report.resolution
                );
                Ok(report)
            }
            Err(e) => {
                state.abort(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the pipeline on a dedicated worker thread and deliver the result
    /// through `on_complete`. There is no cancellation: the run always ends
    /// installed or aborted.
    pub fn install_background<F>(
        &self,
        package_id: &str,
        options: InstallOptions,
        on_complete: F,
    ) -> Result<thread::JoinHandle<()>, CoreError>
    where
        F: FnOnce(Result<InstallReport, CoreError>) + Send + 'static,
    {
        let installer = self.clone();
        let package = package_id.to_owned();
        let handle = thread::Builder::new()
            .name("cinder-install".to_owned())
            .spawn(move || {
                let result = installer.install(&package, options);
                on_complete(result);
            })?;
        Ok(handle)
    }

    fn run_stages(
        &self,
        state: &mut PipelineState,
        package_id: &str,
        options: InstallOptions,
    ) -> Result<InstallReport, CoreError> {
        let scratch = Scratch::prepare(&self.scratch_root)?;
        state.advance(Stage::StagingPrepared)?;

        let result = self.run_with_scratch(state, &scratch, package_id, options);

        // The scratch directory is reclaimed on success and failure alike.
        if let Err(e) = scratch.remove() {
            warn!("failed to remove scratch directory: {e}");
        }
        result
    }

    fn run_with_scratch(
        &self,
        state: &mut PipelineState,
        scratch: &Scratch,
        package_id: &str,
        options: InstallOptions,
    ) -> Result<InstallReport, CoreError> {
        let package_name = sanitize_package_name(package_id);
        let source_path = scratch.source_archive(&package_name);

        let mut stream = self.platform.open_package(package_id, options.encrypted)?;
        let mut sink = File::create(&source_path)?;
        std::io::copy(&mut stream, &mut sink)?;
        state.advance(Stage::SourceMaterialized)?;

        let descriptor = read_descriptor(&source_path)?;
        state.advance(Stage::DescriptorEntryVerified)?;

        let metrics = self.platform.display_metrics()?;
        let target = resolution::plan(
            descriptor.width,
            descriptor.height,
            metrics.width_px,
            metrics.height_px,
        )?;
        debug!(
            "rescaling '{package_name}' {}x{} -> {target} for {}x{} display",
            descriptor.width, descriptor.height, metrics.width_px, metrics.height_px
        );
        let scaled_path = scratch.scaled_archive(&package_name);
        transcode_file(&source_path, &scaled_path, target)?;
        state.advance(Stage::Transcoded)?;

        verify_archive(&scaled_path)
            .map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))?;
        state.advance(Stage::IntegrityVerified)?;

        let supports_theme_slot =
            self.platform.supports_theme_slot() && !self.platform.is_legacy();
        let plan = resolve(supports_theme_slot, self.platform.is_encrypted(), options.variant);
        debug!("resolved install slot {}", plan.slot_file.display());
        state.advance(Stage::SlotResolved)?;

        // Protected paths are writable only inside this bracket; the ro
        // remount runs regardless of how the install went.
        self.platform.mount_rw()?;
        let installed = self.install_into_slot(state, &scaled_path, &plan, options.variant);
        let remounted = self.platform.mount_ro();
        let backed_up = installed?;
        remounted?;

        let applied = AppliedRecord {
            package: package_id.to_owned(),
            variant: options.variant,
            slot_file: plan.slot_file.clone(),
            applied_at: chrono::Utc::now().to_rfc3339(),
        };
        self.platform.record_applied(&applied)?;

        Ok(InstallReport {
            package: package_id.to_owned(),
            package_name,
            slot_file: plan.slot_file,
            resolution: target,
            backed_up,
        })
    }

    fn install_into_slot(
        &self,
        state: &mut PipelineState,
        scaled_path: &Path,
        plan: &InstallPlan,
        variant: AnimationVariant,
    ) -> Result<bool, CoreError> {
        if !self.platform.exists(&plan.slot_dir) {
            self.platform.create_dir(&plan.slot_dir)?;
        }

        let mut backed_up = false;
        if plan.requires_backup && self.platform.exists(&plan.slot_file) {
            if self.platform.exists(&plan.backup_file) {
                debug!(
                    "backup already present at {}; leaving it untouched",
                    plan.backup_file.display()
                );
            } else {
                self.platform.move_file(&plan.slot_file, &plan.backup_file)?;
                info!(
                    "backed up previous animation to {}",
                    plan.backup_file.display()
                );
                backed_up = true;
            }
        }
        state.advance(Stage::BackedUp)?;

        self.platform.push_file(scaled_path, &plan.slot_file)?;
        self.platform.activate_animation(&plan.slot_file, variant)?;
        state.advance(Stage::Installed)?;

        Ok(backed_up)
    }
}

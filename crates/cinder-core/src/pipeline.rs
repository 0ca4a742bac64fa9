use crate::CoreError;
use tracing::{debug, warn};

/// Stages of one install run, in strict forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    StagingPrepared,
    SourceMaterialized,
    DescriptorEntryVerified,
    Transcoded,
    IntegrityVerified,
    SlotResolved,
    BackedUp,
    Installed,
    CleanedUp,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::StagingPrepared => "staging-prepared",
            Stage::SourceMaterialized => "source-materialized",
            Stage::DescriptorEntryVerified => "descriptor-entry-verified",
            Stage::Transcoded => "transcoded",
            Stage::IntegrityVerified => "integrity-verified",
            Stage::SlotResolved => "slot-resolved",
            Stage::BackedUp => "backed-up",
            Stage::Installed => "installed",
            Stage::CleanedUp => "cleaned-up",
        };
        f.write_str(name)
    }
}

/// Each stage is gated on the previous one succeeding; there are no skips
/// and no backward moves. Aborts are tracked on [`PipelineState`] instead of
/// as a stage, so a run can abort from anywhere without a transition.
pub fn validate_transition(from: Stage, to: Stage) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (Stage::Start, Stage::StagingPrepared)
            | (Stage::StagingPrepared, Stage::SourceMaterialized)
            | (Stage::SourceMaterialized, Stage::DescriptorEntryVerified)
            | (Stage::DescriptorEntryVerified, Stage::Transcoded)
            | (Stage::Transcoded, Stage::IntegrityVerified)
            | (Stage::IntegrityVerified, Stage::SlotResolved)
            | (Stage::SlotResolved, Stage::BackedUp)
            | (Stage::BackedUp, Stage::Installed)
            | (Stage::Installed, Stage::CleanedUp)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Mutable state of one run: owned by the installer, created at run start,
/// discarded at run end.
#[derive(Debug)]
pub struct PipelineState {
    stage: Stage,
    failed: bool,
    failure_reason: Option<String>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Start,
            failed: false,
            failure_reason: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn advance(&mut self, to: Stage) -> Result<(), CoreError> {
        validate_transition(self.stage, to)?;
        debug!("stage {} -> {to}", self.stage);
        self.stage = to;
        Ok(())
    }

    pub fn abort(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("install aborted at stage {}: {reason}", self.stage);
        self.failed = true;
        self.failure_reason = Some(reason);
    }
}

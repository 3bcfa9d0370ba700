//! Structured reporting for the bootstrap pipeline.

use std::fmt;
use std::sync::Arc;

use crate::errors::EntrypointError;
use crate::handoff::HandoffPlan;

const STAGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::stage");

/// Steps of the bootstrap pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Materialising the default configuration file.
    ConfigFile,
    /// Pointing the log file at standard output.
    LogRedirect,
    /// Resolving and executing the daemon.
    Handoff,
}

impl Stage {
    /// Stable identifier used in telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigFile => "config_file",
            Self::LogRedirect => "log_redirect",
            Self::Handoff => "handoff",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Observer notified as the pipeline advances.
pub trait StageReporter: Send + Sync {
    /// Invoked before a stage runs.
    fn stage_starting(&self, stage: Stage);

    /// Invoked after a stage finishes successfully.
    fn stage_completed(&self, stage: Stage);

    /// Invoked when a stage fails; the pipeline stops afterwards.
    fn stage_failed(&self, stage: Stage, error: &EntrypointError);

    /// Invoked immediately before the process image is replaced.
    fn handing_off(&self, plan: &HandoffPlan);
}

impl<T> StageReporter for Arc<T>
where
    T: StageReporter + ?Sized,
{
    fn stage_starting(&self, stage: Stage) {
        (**self).stage_starting(stage);
    }

    fn stage_completed(&self, stage: Stage) {
        (**self).stage_completed(stage);
    }

    fn stage_failed(&self, stage: Stage, error: &EntrypointError) {
        (**self).stage_failed(stage, error);
    }

    fn handing_off(&self, plan: &HandoffPlan) {
        (**self).handing_off(plan);
    }
}

/// Default reporter that records pipeline events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredStageReporter;

impl StructuredStageReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StageReporter for StructuredStageReporter {
    fn stage_starting(&self, stage: Stage) {
        tracing::debug!(
            target: STAGE_TARGET,
            event = "stage_starting",
            stage = %stage,
            "starting bootstrap stage"
        );
    }

    fn stage_completed(&self, stage: Stage) {
        tracing::debug!(
            target: STAGE_TARGET,
            event = "stage_completed",
            stage = %stage,
            "bootstrap stage completed"
        );
    }

    fn stage_failed(&self, stage: Stage, error: &EntrypointError) {
        tracing::error!(
            target: STAGE_TARGET,
            event = "stage_failed",
            stage = %stage,
            error = %error,
            "bootstrap stage failed"
        );
    }

    fn handing_off(&self, plan: &HandoffPlan) {
        tracing::info!(
            target: STAGE_TARGET,
            event = "handing_off",
            program = %plan.program().display(),
            forwarded_args = plan.argv().len().saturating_sub(1),
            "handing off to daemon"
        );
    }
}

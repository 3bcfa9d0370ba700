//! Sequences the bootstrap stages and the final handoff.

use std::convert::Infallible;
use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use tracing::info;

use qbt_config::{Config, DEFAULT_CONFIG_CONTENTS};

use crate::config_file::ensure_config_exists;
use crate::errors::EntrypointError;
use crate::handoff::{
    HandoffError, HandoffPlan, ProcessReplacer, SearchPath, SystemReplacer, exec_daemon_with,
};
use crate::log_redirect::ensure_log_redirect;
use crate::report::{Stage, StageReporter, StructuredStageReporter};
use crate::telemetry;

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// What this process was started with, forwarded to the daemon untouched.
pub(crate) struct Invocation {
    pub(crate) forwarded_args: Vec<OsString>,
    pub(crate) environment: Vec<(OsString, OsString)>,
    pub(crate) search: SearchPath,
}

impl Invocation {
    fn from_process() -> Self {
        Self {
            forwarded_args: env::args_os().skip(1).collect(),
            environment: env::vars_os().collect(),
            search: SearchPath::from_env(),
        }
    }
}

/// Collaborators required to run the entrypoint.
pub(crate) struct LaunchPlan<R> {
    pub(crate) config: Config,
    pub(crate) reporter: Arc<dyn StageReporter>,
    pub(crate) replacer: R,
    pub(crate) invocation: Invocation,
}

/// Runs the entrypoint using the production collaborators.
///
/// # Errors
///
/// Returns [`EntrypointError`] for the first stage that fails. On success
/// the process has become the daemon and this function never returns.
pub fn run_entrypoint() -> Result<Infallible, EntrypointError> {
    let config = Config::default();
    telemetry::initialise(&config)?;
    run_with(LaunchPlan {
        config,
        reporter: Arc::new(StructuredStageReporter::new()),
        replacer: SystemReplacer,
        invocation: Invocation::from_process(),
    })
}

/// Runs the entrypoint with injected collaborators.
pub(crate) fn run_with<R>(plan: LaunchPlan<R>) -> Result<Infallible, EntrypointError>
where
    R: ProcessReplacer,
{
    let LaunchPlan {
        config,
        reporter,
        replacer,
        invocation,
    } = plan;
    let Invocation {
        forwarded_args,
        environment,
        search,
    } = invocation;

    config.validate()?;
    info!(
        target: LAUNCH_TARGET,
        daemon = config.daemon_binary(),
        config_path = %config.config_path(),
        log_path = %config.log_path(),
        "starting entrypoint"
    );

    run_stage(reporter.as_ref(), Stage::ConfigFile, || {
        ensure_config_exists(config.config_path().as_std_path(), DEFAULT_CONFIG_CONTENTS)?;
        Ok(())
    })?;

    run_stage(reporter.as_ref(), Stage::LogRedirect, || {
        ensure_log_redirect(
            config.log_path().as_std_path(),
            config.stdout_target().as_std_path(),
        )?;
        Ok(())
    })?;

    reporter.stage_starting(Stage::Handoff);
    let binary = config.daemon_binary();
    let announcing = AnnouncingReplacer {
        inner: &replacer,
        reporter: reporter.as_ref(),
    };
    let outcome = exec_daemon_with(&announcing, &search, binary, forwarded_args, environment)
        .map_err(|source| EntrypointError::Handoff {
            binary: binary.to_owned(),
            source,
        });
    match outcome {
        Ok(never) => match never {},
        Err(error) => {
            reporter.stage_failed(Stage::Handoff, &error);
            Err(error)
        }
    }
}

/// Tells the reporter about the resolved plan before replacing the process.
struct AnnouncingReplacer<'a, R> {
    inner: &'a R,
    reporter: &'a dyn StageReporter,
}

impl<R> ProcessReplacer for AnnouncingReplacer<'_, R>
where
    R: ProcessReplacer,
{
    fn replace(&self, plan: &HandoffPlan) -> Result<Infallible, HandoffError> {
        self.reporter.handing_off(plan);
        self.inner.replace(plan)
    }
}

fn run_stage<F>(reporter: &dyn StageReporter, stage: Stage, action: F) -> Result<(), EntrypointError>
where
    F: FnOnce() -> Result<(), EntrypointError>,
{
    reporter.stage_starting(stage);
    match action() {
        Ok(()) => {
            reporter.stage_completed(stage);
            Ok(())
        }
        Err(error) => {
            reporter.stage_failed(stage, &error);
            Err(error)
        }
    }
}

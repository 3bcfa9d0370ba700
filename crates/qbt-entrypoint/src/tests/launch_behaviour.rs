//! Behavioural tests covering the full bootstrap pipeline.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use rstest::{fixture, rstest};

use qbt_config::{Config, DEFAULT_CONFIG_CONTENTS};

use crate::errors::EntrypointError;
use crate::handoff::{HandoffError, SearchPath};
use crate::launch::{Invocation, LaunchPlan, run_with};
use crate::report::Stage;

use super::support::{
    DAEMON, RecordingReplacer, RecordingStageReporter, StageEvent, TestVolume, os_args,
};

#[fixture]
fn volume() -> TestVolume {
    TestVolume::new()
}

struct Harness {
    reporter: Arc<RecordingStageReporter>,
    replacer: RecordingReplacer,
}

impl Harness {
    fn new() -> Self {
        Self {
            reporter: Arc::new(RecordingStageReporter::default()),
            replacer: RecordingReplacer::default(),
        }
    }

    fn run(
        &self,
        config: Config,
        args: &[&str],
        search: SearchPath,
        environment: Vec<(OsString, OsString)>,
    ) -> EntrypointError {
        let plan = LaunchPlan {
            config,
            reporter: self.reporter.clone(),
            replacer: &self.replacer,
            invocation: Invocation {
                forwarded_args: os_args(args),
                environment,
                search,
            },
        };
        match run_with(plan) {
            Ok(never) => match never {},
            Err(error) => error,
        }
    }
}

fn assert_redirected(path: &Path) {
    let metadata = fs::symlink_metadata(path).expect("log path should exist");
    assert!(metadata.file_type().is_symlink());
    assert_eq!(
        fs::read_link(path).expect("read link"),
        Path::new("/proc/self/fd/1")
    );
}

#[rstest]
fn pipeline_prepares_volume_then_hands_off(volume: TestVolume) {
    let daemon = volume.install_binary(DAEMON, b"#!/bin/sh\n");
    let harness = Harness::new();
    let environment = vec![(OsString::from("HOME"), OsString::from("/config"))];

    let error = harness.run(
        volume.config(),
        &["--webui-port=9000", "--profile=/data"],
        volume.search_path(),
        environment.clone(),
    );

    assert!(
        matches!(
            error,
            EntrypointError::Handoff {
                source: HandoffError::Exec { .. },
                ..
            }
        ),
        "unexpected error: {error:?}"
    );
    assert_eq!(
        fs::read(volume.config_path()).expect("config written"),
        DEFAULT_CONFIG_CONTENTS.as_bytes()
    );
    assert_redirected(&volume.log_path());

    let plans = harness.replacer.plans();
    assert_eq!(plans.len(), 1);
    let plan = plans.first().expect("one plan");
    assert!(plan.program().is_absolute());
    assert_eq!(
        fs::canonicalize(plan.program()).expect("resolved program"),
        fs::canonicalize(&daemon).expect("installed daemon")
    );
    assert_eq!(
        plan.argv(),
        [
            plan.program().as_os_str().to_os_string(),
            OsString::from("--webui-port=9000"),
            OsString::from("--profile=/data"),
        ]
    );
    assert_eq!(plan.env(), environment.as_slice());

    assert_eq!(
        harness.reporter.events(),
        vec![
            StageEvent::Starting(Stage::ConfigFile),
            StageEvent::Completed(Stage::ConfigFile),
            StageEvent::Starting(Stage::LogRedirect),
            StageEvent::Completed(Stage::LogRedirect),
            StageEvent::Starting(Stage::Handoff),
            StageEvent::HandingOff(plan.argv().to_vec()),
            StageEvent::Failed(Stage::Handoff),
        ]
    );
}

#[rstest]
fn existing_config_survives_the_pipeline(volume: TestVolume) {
    volume.install_binary(DAEMON, b"#!/bin/sh\n");
    let config_path = volume.config_path();
    fs::create_dir_all(config_path.parent().expect("parent")).expect("mkdir");
    fs::write(&config_path, b"custom=1").expect("seed config");
    let harness = Harness::new();

    harness.run(volume.config(), &[], volume.search_path(), Vec::new());

    assert_eq!(fs::read(&config_path).expect("read"), b"custom=1");
    assert_eq!(harness.replacer.plans().len(), 1);
}

#[rstest]
fn missing_daemon_never_attempts_replacement(volume: TestVolume) {
    let harness = Harness::new();

    let error = harness.run(volume.config(), &[], volume.search_path(), Vec::new());

    assert!(
        matches!(
            error,
            EntrypointError::Handoff {
                source: HandoffError::BinaryNotFound { .. },
                ..
            }
        ),
        "unexpected error: {error:?}"
    );
    assert!(harness.replacer.plans().is_empty());
    assert!(
        !harness
            .reporter
            .events()
            .iter()
            .any(|event| matches!(event, StageEvent::HandingOff(_)))
    );
    // Earlier stages are idempotent and stay in place.
    assert!(volume.config_path().exists());
    assert_redirected(&volume.log_path());
    let message = error.to_string();
    assert!(
        message.starts_with("error executing qbittorrent-nox: failed to locate qbittorrent-nox"),
        "unexpected message: {message}"
    );
}

#[rstest]
fn config_failure_stops_before_later_stages(volume: TestVolume) {
    volume.install_binary(DAEMON, b"#!/bin/sh\n");
    fs::write(volume.root().join("config"), b"not a directory").expect("seed blocker");
    let harness = Harness::new();

    let error = harness.run(volume.config(), &[], volume.search_path(), Vec::new());

    assert!(matches!(error, EntrypointError::ConfigFile { .. }));
    assert!(error.to_string().starts_with("error setting up config: "));
    assert_eq!(
        harness.reporter.events(),
        vec![
            StageEvent::Starting(Stage::ConfigFile),
            StageEvent::Failed(Stage::ConfigFile),
        ]
    );
    assert!(harness.replacer.plans().is_empty());
}

#[rstest]
fn log_failure_stops_before_handoff(volume: TestVolume) {
    volume.install_binary(DAEMON, b"#!/bin/sh\n");
    let log_path = volume.log_path();
    fs::create_dir_all(&log_path).expect("seed directory at log path");
    fs::write(log_path.join("old.log"), b"data").expect("seed contents");
    let harness = Harness::new();

    let error = harness.run(volume.config(), &[], volume.search_path(), Vec::new());

    assert!(matches!(error, EntrypointError::LogRedirect { .. }));
    assert!(error.to_string().starts_with("error setting up log symlink: "));
    assert_eq!(
        harness.reporter.events(),
        vec![
            StageEvent::Starting(Stage::ConfigFile),
            StageEvent::Completed(Stage::ConfigFile),
            StageEvent::Starting(Stage::LogRedirect),
            StageEvent::Failed(Stage::LogRedirect),
        ]
    );
    assert!(volume.config_path().exists(), "config is not rolled back");
    assert!(harness.replacer.plans().is_empty());
}

#[rstest]
fn invalid_settings_touch_nothing(volume: TestVolume) {
    let harness = Harness::new();
    let config = volume.config().with_daemon_binary("");

    let error = harness.run(config, &[], volume.search_path(), Vec::new());

    assert!(matches!(error, EntrypointError::Settings { .. }));
    assert!(harness.reporter.events().is_empty());
    assert!(!volume.config_path().exists());
}

#[rstest]
fn repeated_starts_leave_one_link_and_one_config(volume: TestVolume) {
    volume.install_binary(DAEMON, b"#!/bin/sh\n");
    let harness = Harness::new();

    harness.run(volume.config(), &[], volume.search_path(), Vec::new());
    harness.run(volume.config(), &[], volume.search_path(), Vec::new());

    assert_redirected(&volume.log_path());
    assert_eq!(
        fs::read(volume.config_path()).expect("config"),
        DEFAULT_CONFIG_CONTENTS.as_bytes()
    );
    assert_eq!(harness.replacer.plans().len(), 2);
}

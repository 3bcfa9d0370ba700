//! Shared fixtures and test doubles for entrypoint tests.

use std::convert::Infallible;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use camino::Utf8PathBuf;
use nix::errno::Errno;
use tempfile::TempDir;

use qbt_config::Config;

use crate::errors::EntrypointError;
use crate::handoff::{HandoffError, HandoffPlan, ProcessReplacer, SearchPath};
use crate::report::{Stage, StageReporter};

pub(crate) const DAEMON: &str = "qbittorrent-nox";

/// Disposable stand-in for the container's `/config` volume and `PATH`.
pub(crate) struct TestVolume {
    root: TempDir,
}

impl TestVolume {
    pub(crate) fn new() -> Self {
        let root = TempDir::new().expect("tempdir");
        fs::create_dir_all(root.path().join("bin")).expect("bin dir");
        Self { root }
    }

    pub(crate) fn root(&self) -> &Path {
        self.root.path()
    }

    pub(crate) fn bin_dir(&self) -> PathBuf {
        self.root().join("bin")
    }

    pub(crate) fn config_path(&self) -> PathBuf {
        self.root().join("config/qBittorrent/qBittorrent.conf")
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.root().join("config/qBittorrent/logs/qbittorrent.log")
    }

    pub(crate) fn config(&self) -> Config {
        Config::default()
            .with_config_path(utf8(self.config_path()))
            .with_log_path(utf8(self.log_path()))
    }

    pub(crate) fn search_path(&self) -> SearchPath {
        SearchPath::new(Some(self.bin_dir().into_os_string()), self.root())
    }

    /// Places an executable named `name` in the volume's `bin` directory.
    pub(crate) fn install_binary(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.bin_dir().join(name);
        fs::write(&path, contents).expect("write fake binary");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }
}

fn utf8(path: PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path).expect("tempdir paths should be UTF-8")
}

/// Events captured by [`RecordingStageReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StageEvent {
    Starting(Stage),
    Completed(Stage),
    Failed(Stage),
    HandingOff(Vec<OsString>),
}

/// Reporter that records events for later assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingStageReporter {
    events: Mutex<Vec<StageEvent>>,
}

impl RecordingStageReporter {
    pub(crate) fn events(&self) -> Vec<StageEvent> {
        self.events.lock().expect("events lock").clone()
    }

    fn record(&self, event: StageEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl StageReporter for RecordingStageReporter {
    fn stage_starting(&self, stage: Stage) {
        self.record(StageEvent::Starting(stage));
    }

    fn stage_completed(&self, stage: Stage) {
        self.record(StageEvent::Completed(stage));
    }

    fn stage_failed(&self, stage: Stage, _error: &EntrypointError) {
        self.record(StageEvent::Failed(stage));
    }

    fn handing_off(&self, plan: &HandoffPlan) {
        self.record(StageEvent::HandingOff(plan.argv().to_vec()));
    }
}

/// Replacer that captures the plan and reports a failed `execve`.
#[derive(Debug, Default)]
pub(crate) struct RecordingReplacer {
    plans: Mutex<Vec<HandoffPlan>>,
}

impl RecordingReplacer {
    pub(crate) fn plans(&self) -> Vec<HandoffPlan> {
        self.plans.lock().expect("plans lock").clone()
    }
}

impl ProcessReplacer for RecordingReplacer {
    fn replace(&self, plan: &HandoffPlan) -> Result<Infallible, HandoffError> {
        self.plans.lock().expect("plans lock").push(plan.clone());
        Err(HandoffError::Exec {
            program: plan.program().to_path_buf(),
            source: Errno::ENOEXEC,
        })
    }
}

impl ProcessReplacer for &RecordingReplacer {
    fn replace(&self, plan: &HandoffPlan) -> Result<Infallible, HandoffError> {
        (**self).replace(plan)
    }
}

pub(crate) fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

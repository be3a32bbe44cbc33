//! Regenerates artifacts whenever the env file is written.
//!
//! The notify backend delivers events on its own thread. The callback only
//! pushes a [`Signal`] into a bounded queue; the controller drains that queue
//! from the caller's thread, so pipeline runs never overlap.

use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, RunReport};
use notify::event::{ModifyKind, RenameMode};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;
use tracing::{debug, error, info};

/// Pending change notifications kept before the backend thread blocks.
pub const QUEUE_CAPACITY: usize = 64;

/// Lifecycle of a [`WatchController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching,
}

#[derive(Debug)]
enum Signal {
    Changed,
    Failed(String),
}

/// Result of handling one queued notification.
#[derive(Debug)]
pub enum Tick {
    /// The file changed and the artifacts were rewritten.
    Regenerated(RunReport),
    /// The file changed but the run failed. The watch stays active.
    Failed(Error),
    /// Nothing arrived before the timeout.
    Timeout,
}

/// Drives a [`Pipeline`] from filesystem events on its env file.
pub struct WatchController {
    pipeline: Pipeline,
    env_file: PathBuf,
    state: WatchState,
    queue: Option<Receiver<Signal>>,
    watcher: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for WatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchController")
            .field("env_file", &self.env_file)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl WatchController {
    /// Wraps a pipeline. Fails with [`Error::InvalidConfig`] when the pipeline
    /// has no env file to watch.
    pub fn new(pipeline: Pipeline) -> Result<Self> {
        pipeline.config().validate()?;
        let env_file = pipeline
            .config()
            .source
            .inline_file
            .clone()
            .ok_or_else(|| {
                Error::InvalidConfig("the watch flag can only be used with an env file".into())
            })?;
        Ok(Self {
            pipeline,
            env_file,
            state: WatchState::Idle,
            queue: None,
            watcher: None,
        })
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Performs the initial run, then registers the watch.
    ///
    /// An error from the initial run is returned as is and the controller
    /// stays idle.
    pub fn start(&mut self) -> Result<RunReport> {
        if self.state == WatchState::Watching {
            return Err(Error::WatchSubsystem("already watching".into()));
        }
        let report = self.pipeline.run()?;

        let (tx, rx) = mpsc::sync_channel(QUEUE_CAPACITY);
        let watcher = register(&self.env_file, tx)?;
        self.queue = Some(rx);
        self.watcher = Some(watcher);
        self.state = WatchState::Watching;
        info!("Watching {} for changes", self.env_file.display());
        Ok(report)
    }

    /// Waits for the next notification and handles it.
    ///
    /// `None` waits indefinitely. Regeneration failures come back as
    /// [`Tick::Failed`]; only a lost watch is returned as `Err`, after which
    /// the controller is idle again.
    pub fn tick(&mut self, timeout: Option<Duration>) -> Result<Tick> {
        let Some(queue) = &self.queue else {
            return Err(Error::WatchSubsystem("not watching".into()));
        };
        let received = match timeout {
            Some(t) => queue.recv_timeout(t),
            None => queue.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Signal::Changed) => Ok(self.regenerate()),
            Ok(Signal::Failed(reason)) => {
                self.stop();
                Err(Error::WatchSubsystem(reason))
            }
            Err(RecvTimeoutError::Timeout) => Ok(Tick::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                self.stop();
                Err(Error::WatchSubsystem("event channel closed".into()))
            }
        }
    }

    /// Starts watching and blocks until the watch is lost.
    pub fn run(mut self) -> Result<()> {
        self.start()?;
        loop {
            match self.tick(None)? {
                Tick::Regenerated(report) => {
                    debug!(keys = report.keys.len(), "regenerated after change")
                }
                Tick::Failed(_) | Tick::Timeout => {}
            }
        }
    }

    fn regenerate(&mut self) -> Tick {
        match self.pipeline.run() {
            Ok(report) => Tick::Regenerated(report),
            Err(e) => {
                error!(error = %e, "Regeneration failed, still watching");
                Tick::Failed(e)
            }
        }
    }

    fn stop(&mut self) {
        self.watcher = None;
        self.queue = None;
        self.state = WatchState::Idle;
    }
}

/// Watches the directory holding `env_file` so editors that replace the file
/// on save keep triggering events.
fn register(env_file: &Path, tx: SyncSender<Signal>) -> Result<RecommendedWatcher> {
    let target = fs::canonicalize(env_file).map_err(|e| {
        Error::WatchSubsystem(format!("cannot resolve {}: {e}", env_file.display()))
    })?;
    let (Some(dir), Some(name)) = (target.parent(), target.file_name()) else {
        return Err(Error::WatchSubsystem(format!(
            "{} has no parent directory",
            target.display()
        )));
    };
    let name: OsString = name.to_os_string();

    let mut watcher = RecommendedWatcher::new(
        move |event: notify::Result<Event>| {
            let signal = match event {
                Ok(event) if is_write(&event.kind) && touches(&event, &name) => Signal::Changed,
                Ok(_) => return,
                Err(e) => Signal::Failed(e.to_string()),
            };
            // The receiver is gone once the controller stops.
            let _ = tx.send(signal);
        },
        NotifyConfig::default(),
    )
    .map_err(|e| Error::WatchSubsystem(e.to_string()))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| Error::WatchSubsystem(e.to_string()))?;
    Ok(watcher)
}

fn touches(event: &Event, name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(name.as_os_str()))
}

/// Content writes, plus creations and renames onto the path (atomic saves).
fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{BaseEnvironment, CollectSource};
    use crate::pipeline::PipelineConfig;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    #[test]
    fn write_kinds() {
        assert!(is_write(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(is_write(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_write(&EventKind::Create(CreateKind::File)));
        assert!(is_write(&EventKind::Modify(ModifyKind::Name(
            RenameMode::To
        ))));
    }

    #[test]
    fn non_write_kinds() {
        assert!(!is_write(&EventKind::Access(AccessKind::Any)));
        assert!(!is_write(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_write(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::Permissions
        ))));
        assert!(!is_write(&EventKind::Modify(ModifyKind::Name(
            RenameMode::From
        ))));
    }

    #[test]
    fn events_for_sibling_files_are_ignored() {
        let name = OsString::from(".env");
        let sibling =
            Event::new(EventKind::Modify(ModifyKind::Any)).add_path("/tmp/x/.env.local".into());
        let target = Event::new(EventKind::Modify(ModifyKind::Any)).add_path("/tmp/x/.env".into());
        assert!(!touches(&sibling, &name));
        assert!(touches(&target, &name));
    }

    #[test]
    fn new_requires_env_file() {
        let pipeline = Pipeline::new(PipelineConfig::default(), BaseEnvironment::empty());
        let err = WatchController::new(pipeline).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn tick_before_start_is_an_error() {
        let config = PipelineConfig {
            source: CollectSource {
                inline_file: Some(PathBuf::from(".env")),
                ..Default::default()
            },
            watch: true,
            ..Default::default()
        };
        let mut controller =
            WatchController::new(Pipeline::new(config, BaseEnvironment::empty())).unwrap();
        assert_eq!(controller.state(), WatchState::Idle);
        assert!(matches!(
            controller.tick(Some(Duration::from_millis(1))),
            Err(Error::WatchSubsystem(_))
        ));
    }
}

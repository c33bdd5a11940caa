//! Hot-reload watch sessions
//!
//! A session watches the parent directory of one configuration file and,
//! for every create or modify event naming that file, reloads it from disk
//! and merges the reloadable entries into the live instance.
//!
//! ```text
//! notify callback ──┐
//!                   ├─► Signal channel ─► worker thread ─► load ─► merge_reloadable
//! stop() ───────────┘
//! ```
//!
//! Reload failures (a half-saved file, a transient read error) are logged and
//! counted; the session keeps watching. Losing the watch itself releases the
//! OS handle and moves the session to the terminal [`WatchStatus::Degraded`]
//! state.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::binder::{self, EntryChange};
use crate::error::{Error, Result};
use crate::instance::{ConfigInstance, Shared};
use crate::manager::ConfigManager;

/// Lifecycle state of a watch session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Stopped,
    /// Waiting for the next filesystem event
    Watching,
    /// Loading and merging after a change to the watched file
    Reloading,
    /// The watch could not be registered or was lost; no further reloads
    Degraded,
}

/// Notifications published by a session
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Started { path: PathBuf },
    /// A reload changed at least one reloadable entry
    Applied(Vec<EntryChange>),
    ReloadFailed(String),
    Degraded(String),
    Stopped,
}

/// Reload counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Successful reloads, including ones that changed nothing
    pub reloads: u64,
    pub failures: u64,
}

/// Per-session options
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    events: Option<Sender<WatchEvent>>,
}

impl WatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish [`WatchEvent`]s to this channel. Send failures are ignored.
    pub fn with_events(mut self, sink: Sender<WatchEvent>) -> Self {
        self.events = Some(sink);
        self
    }
}

enum Signal {
    Fs(notify::Result<notify::Event>),
    Stop,
}

struct SessionState {
    status: Mutex<WatchStatus>,
    /// OS watch handle; `None` once released
    watcher: Mutex<Option<RecommendedWatcher>>,
    stopped: AtomicBool,
    reloads: AtomicU64,
    failures: AtomicU64,
    events: Option<Sender<WatchEvent>>,
}

impl SessionState {
    fn new(
        status: WatchStatus,
        watcher: Option<RecommendedWatcher>,
        events: Option<Sender<WatchEvent>>,
    ) -> Self {
        Self {
            status: Mutex::new(status),
            watcher: Mutex::new(watcher),
            stopped: AtomicBool::new(false),
            reloads: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            events,
        }
    }

    fn status(&self) -> WatchStatus {
        *self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_status(&self, status: WatchStatus) {
        *self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }

    /// Move `from -> to`; any other current state is left alone.
    fn transition(&self, from: WatchStatus, to: WatchStatus) {
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *status == from {
            *status = to;
        }
    }

    fn emit(&self, event: WatchEvent) {
        if let Some(sink) = &self.events {
            let _ = sink.send(event);
        }
    }

    /// Unregister the OS watch. Its callback stops feeding the channel.
    fn release_watch(&self) {
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(watcher);
    }

    fn holds_watch(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    fn degrade(&self, path: &Path, message: String) {
        self.release_watch();
        tracing::error!(
            path = %path.display(),
            error = %message,
            "Config watch degraded; hot reload disabled"
        );
        self.set_status(WatchStatus::Degraded);
        self.emit(WatchEvent::Degraded(message));
    }
}

/// Handle to a running watch session.
///
/// Dropping the handle stops the session.
pub struct WatchSession {
    path: PathBuf,
    state: Arc<SessionState>,
    control: Option<Sender<Signal>>,
    worker: Option<JoinHandle<()>>,
}

impl WatchSession {
    /// Start watching `path` and merging reloads into `live`.
    ///
    /// The session holds only a weak reference to the instance and ends by
    /// itself once the instance is dropped. Fails if the parent directory
    /// cannot be watched.
    pub fn start(
        manager: ConfigManager,
        path: &Path,
        live: &ConfigInstance,
        options: WatchOptions,
    ) -> Result<Self> {
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Watch {
                path: path.to_path_buf(),
                message: "path has no file name".to_string(),
            })?
            .to_os_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (control, signals) = mpsc::channel();
        let fs_tx = control.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = fs_tx.send(Signal::Fs(res));
        })
        .map_err(|e| watch_error(&dir, e))?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(&dir, e))?;

        let state = Arc::new(SessionState::new(
            WatchStatus::Watching,
            Some(watcher),
            options.events,
        ));
        let worker = Worker {
            manager,
            path: path.to_path_buf(),
            dir,
            file_name,
            live: live.downgrade(),
            state: Arc::clone(&state),
        };
        let handle = thread::Builder::new()
            .name("hotconf-watch".to_string())
            .spawn(move || worker.run(signals))
            .map_err(|e| Error::io(path, e))?;

        tracing::info!(path = %path.display(), "Watching config for reloadable changes");
        state.emit(WatchEvent::Started {
            path: path.to_path_buf(),
        });

        Ok(Self {
            path: path.to_path_buf(),
            state,
            control: Some(control),
            worker: Some(handle),
        })
    }

    /// A session that never started. Reported once, never retried.
    pub(crate) fn degraded(path: &Path, message: String, options: WatchOptions) -> Self {
        let state = Arc::new(SessionState::new(WatchStatus::Stopped, None, options.events));
        state.degrade(path, message);
        Self {
            path: path.to_path_buf(),
            state,
            control: None,
            worker: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> WatchStatus {
        self.state.status()
    }

    /// Whether the OS watch is still registered. It is released on stop
    /// and as soon as the session degrades.
    pub fn holds_watch(&self) -> bool {
        self.state.holds_watch()
    }

    pub fn stats(&self) -> WatchStats {
        WatchStats {
            reloads: self.state.reloads.load(Ordering::Relaxed),
            failures: self.state.failures.load(Ordering::Relaxed),
        }
    }

    /// Stop the session and release the filesystem watch.
    ///
    /// A reload already in progress completes first; none starts afterwards.
    /// Calling this more than once has no further effect.
    pub fn stop(&mut self) {
        if self.state.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(control) = self.control.take() {
            let _ = control.send(Signal::Stop);
        }
        self.state.release_watch();

        if let Some(worker) = self.worker.take() {
            // The worker drops the last instance reference on its own thread
            // when the owner let go mid-reload; it exits on its own then.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }

        if self.state.status() != WatchStatus::Degraded {
            self.state.set_status(WatchStatus::Stopped);
            tracing::info!(path = %self.path.display(), "Stopped watching config");
            self.state.emit(WatchEvent::Stopped);
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSession")
            .field("path", &self.path)
            .field("status", &self.status())
            .field("stats", &self.stats())
            .finish()
    }
}

struct Worker {
    manager: ConfigManager,
    path: PathBuf,
    dir: PathBuf,
    file_name: OsString,
    live: Weak<Shared>,
    state: Arc<SessionState>,
}

enum Step {
    Reload,
    Skip,
    Exit,
}

impl Worker {
    fn run(self, signals: Receiver<Signal>) {
        while let Ok(signal) = signals.recv() {
            match self.classify(signal) {
                Step::Exit => break,
                Step::Skip => continue,
                Step::Reload => {}
            }

            // Signals already queued behind this one belong to the same save
            let mut exit = false;
            for queued in signals.try_iter() {
                if let Step::Exit = self.classify(queued) {
                    exit = true;
                    break;
                }
            }
            if exit || self.state.stopped.load(Ordering::SeqCst) {
                break;
            }

            let Some(shared) = self.live.upgrade() else {
                tracing::debug!(path = %self.path.display(), "Config instance dropped");
                break;
            };
            self.reload(&ConfigInstance::from_shared(shared));
        }
    }

    fn classify(&self, signal: Signal) -> Step {
        let event = match signal {
            Signal::Stop => return Step::Exit,
            Signal::Fs(Err(err)) => {
                self.state.degrade(&self.path, err.to_string());
                return Step::Exit;
            }
            Signal::Fs(Ok(event)) => event,
        };

        if removes_dir(&event, &self.dir) {
            self.state
                .degrade(&self.path, format!("{} was removed", self.dir.display()));
            Step::Exit
        } else if touches_file(&event, &self.file_name) {
            Step::Reload
        } else {
            tracing::debug!(
                path = %self.path.display(),
                event = ?event.kind,
                "Ignoring sibling event"
            );
            Step::Skip
        }
    }

    fn reload(&self, live: &ConfigInstance) {
        self.state
            .transition(WatchStatus::Watching, WatchStatus::Reloading);

        let outcome = self
            .manager
            .load(&self.path, live.schema())
            .and_then(|reloaded| binder::merge_reloadable(live, &reloaded));

        match outcome {
            Ok(changes) => {
                self.state.reloads.fetch_add(1, Ordering::Relaxed);
                for change in &changes {
                    tracing::info!(
                        path = %self.path.display(),
                        entry = %change.name,
                        old = %change.old,
                        new = %change.new,
                        "Reloaded config entry"
                    );
                }
                if !changes.is_empty() {
                    self.state.emit(WatchEvent::Applied(changes));
                }
            }
            Err(err) => {
                self.state.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Config reload failed; keeping current values"
                );
                self.state.emit(WatchEvent::ReloadFailed(err.to_string()));
            }
        }

        self.state
            .transition(WatchStatus::Reloading, WatchStatus::Watching);
    }
}

/// Create or modify event naming the watched file. Atomic saves show up as
/// a rename into place, which notify reports as a modify.
fn touches_file(event: &notify::Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn removes_dir(event: &notify::Event, dir: &Path) -> bool {
    matches!(event.kind, EventKind::Remove(_)) && event.paths.iter().any(|p| p == dir)
}

fn watch_error(dir: &Path, err: notify::Error) -> Error {
    match err.kind {
        notify::ErrorKind::Io(source) => Error::io(dir, source),
        notify::ErrorKind::PathNotFound => Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
        ),
        other => Error::Watch {
            path: dir.to_path_buf(),
            message: notify::Error::new(other).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    fn modify(path: &str) -> notify::Event {
        notify::Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from(path))
    }

    #[test]
    fn only_the_watched_file_is_relevant() {
        let name = OsString::from("cfg.json5");
        assert!(touches_file(&modify("/etc/svc/cfg.json5"), &name));
        assert!(!touches_file(&modify("/etc/svc/other.json5"), &name));
        assert!(!touches_file(&modify("/etc/svc/.cfg.json5.12.0.tmp"), &name));
    }

    #[test]
    fn creates_count_as_modifications() {
        let name = OsString::from("cfg.toml");
        let event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/etc/svc/cfg.toml"));
        assert!(touches_file(&event, &name));
    }

    #[test]
    fn removals_and_access_are_ignored() {
        let name = OsString::from("cfg.toml");
        let removed = notify::Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/etc/svc/cfg.toml"));
        let accessed = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/etc/svc/cfg.toml"));
        assert!(!touches_file(&removed, &name));
        assert!(!touches_file(&accessed, &name));
    }

    #[test]
    fn directory_removal_is_detected() {
        let event = notify::Event::new(EventKind::Remove(RemoveKind::Folder))
            .add_path(PathBuf::from("/etc/svc"));
        assert!(removes_dir(&event, Path::new("/etc/svc")));
        assert!(!removes_dir(&modify("/etc/svc"), Path::new("/etc/svc")));
    }

    #[test]
    fn degraded_session_reports_once() {
        let (tx, rx) = mpsc::channel();
        let mut session = WatchSession::degraded(
            Path::new("/etc/svc/cfg.json5"),
            "inotify watch limit reached".to_string(),
            WatchOptions::new().with_events(tx),
        );

        assert_eq!(session.status(), WatchStatus::Degraded);
        assert!(!session.holds_watch());
        session.stop();
        drop(session);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![WatchEvent::Degraded("inotify watch limit reached".to_string())]
        );
    }

    #[test]
    fn degrading_releases_the_watch() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher =
            notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap();
        watcher.watch(dir.path(), RecursiveMode::NonRecursive).unwrap();
        let (tx, rx) = mpsc::channel();
        let state = SessionState::new(WatchStatus::Watching, Some(watcher), Some(tx));

        state.degrade(&dir.path().join("cfg.json5"), "watch lost".to_string());

        assert!(!state.holds_watch());
        assert_eq!(state.status(), WatchStatus::Degraded);
        assert_eq!(rx.try_recv().unwrap(), WatchEvent::Degraded("watch lost".to_string()));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = watch_error(
            Path::new("/nowhere"),
            notify::Error::new(notify::ErrorKind::PathNotFound),
        );
        assert!(matches!(err, Error::Io { .. }));
    }
}

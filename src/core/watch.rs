//! Debounced reactivity to filesystem changes.
//!
//! Editors save in bursts; the [`Debouncer`] coalesces events per path
//! and commits one reparse per file after a quiet window (500 ms by
//! default, tunable). Queries made inside the window may observe stale
//! data; that trade-off is intentional. [`watch_project`] wires a
//! recursive `notify` watcher through the translation-file predicate into
//! the index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher};

use crate::core::cancel::CancelToken;
use crate::core::index::TranslationIndex;
use crate::core::scanner;

/// Default quiet window before a changed file is reparsed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A change to one translation file, post-coalescing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

impl FileEvent {
    fn path(&self) -> &Path {
        match self {
            FileEvent::Changed(path) | FileEvent::Removed(path) => path,
        }
    }
}

enum Msg {
    Event(FileEvent),
    Flush,
    Shutdown,
}

/// Per-path event coalescer with an explicit timer thread.
///
/// A burst of events for the same path collapses into the latest one,
/// delivered once the path has been quiet for the configured window.
/// Dropping the debouncer flushes whatever is still pending.
pub struct Debouncer {
    tx: mpsc::Sender<Msg>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(window: Duration, callback: F) -> Self
    where
        F: FnMut(FileEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || run_loop(rx, window, callback));
        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, event: FileEvent) {
        let _ = self.tx.send(Msg::Event(event));
    }

    /// Deliver everything pending immediately, without waiting for quiet
    /// windows to elapse.
    pub fn flush(&self) {
        let _ = self.tx.send(Msg::Flush);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop<F>(rx: mpsc::Receiver<Msg>, window: Duration, mut callback: F)
where
    F: FnMut(FileEvent),
{
    let mut pending: HashMap<PathBuf, (Instant, FileEvent)> = HashMap::new();
    loop {
        let next_deadline = pending.values().map(|(deadline, _)| *deadline).min();
        let message = match next_deadline {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(timeout) {
                    Ok(message) => Some(message),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            },
        };

        match message {
            Some(Msg::Event(event)) => {
                let deadline = Instant::now() + window;
                pending.insert(event.path().to_path_buf(), (deadline, event));
            }
            Some(Msg::Flush) => {
                for (_, (_, event)) in std::mem::take(&mut pending) {
                    callback(event);
                }
            }
            Some(Msg::Shutdown) => {
                for (_, (_, event)) in std::mem::take(&mut pending) {
                    callback(event);
                }
                break;
            }
            None => {
                // A quiet window elapsed for at least one path.
                let now = Instant::now();
                let due: Vec<PathBuf> = pending
                    .iter()
                    .filter(|(_, (deadline, _))| *deadline <= now)
                    .map(|(path, _)| path.clone())
                    .collect();
                for path in due {
                    if let Some((_, event)) = pending.remove(&path) {
                        callback(event);
                    }
                }
            }
        }
    }
}

/// Watch the project tree and keep the index current. Blocks until
/// `cancel` fires. Events for paths the scanner would not index are
/// dropped by the shared [`scanner::is_translation_file`] predicate.
pub fn watch_project(
    index: &Arc<TranslationIndex>,
    window: Duration,
    cancel: &CancelToken,
) -> Result<()> {
    index.initialize();
    let root = index.root().to_path_buf();

    let debounce_index = Arc::clone(index);
    let debouncer = Debouncer::new(window, move |event| match event {
        FileEvent::Changed(path) => debounce_index.invalidate_file(&path),
        FileEvent::Removed(path) => debounce_index.remove_file(&path),
    });

    let filter_root = root.clone();
    let mut watcher = notify::recommended_watcher(
        move |result: std::result::Result<notify::Event, notify::Error>| {
            let Ok(event) = result else {
                return;
            };
            let removed = matches!(event.kind, EventKind::Remove(_));
            for path in event.paths {
                if !scanner::is_translation_file(&path, &filter_root) {
                    continue;
                }
                let event = if removed {
                    FileEvent::Removed(path)
                } else {
                    // Creates, modifies, and rename targets all reduce to
                    // "reparse this path"; a rename source that no longer
                    // exists is removed by the invalidation itself.
                    FileEvent::Changed(path)
                };
                debouncer.submit(event);
            }
        },
    )
    .context("Failed to create filesystem watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    while !cancel.is_cancelled() {
        thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn collecting_debouncer(window: Duration) -> (Debouncer, Arc<Mutex<Vec<FileEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(window, move |event| {
            sink.lock().unwrap().push(event);
        });
        (debouncer, seen)
    }

    #[test]
    fn test_burst_coalesces_to_latest_event() {
        let (debouncer, seen) = collecting_debouncer(Duration::from_secs(60));
        let path = PathBuf::from("/p/locales/en.json");
        debouncer.submit(FileEvent::Changed(path.clone()));
        debouncer.submit(FileEvent::Changed(path.clone()));
        debouncer.submit(FileEvent::Removed(path.clone()));
        debouncer.flush();
        drop(debouncer);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[FileEvent::Removed(path)]);
    }

    #[test]
    fn test_distinct_paths_fire_separately() {
        let (debouncer, seen) = collecting_debouncer(Duration::from_secs(60));
        debouncer.submit(FileEvent::Changed(PathBuf::from("/a.json")));
        debouncer.submit(FileEvent::Changed(PathBuf::from("/b.json")));
        debouncer.flush();
        drop(debouncer);

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_quiet_window_elapses() {
        let (debouncer, seen) = collecting_debouncer(Duration::from_millis(20));
        debouncer.submit(FileEvent::Changed(PathBuf::from("/a.json")));
        thread::sleep(Duration::from_millis(200));
        assert_eq!(seen.lock().unwrap().len(), 1);
        drop(debouncer);
    }

    #[test]
    fn test_drop_flushes_pending() {
        let (debouncer, seen) = collecting_debouncer(Duration::from_secs(60));
        debouncer.submit(FileEvent::Changed(PathBuf::from("/a.json")));
        drop(debouncer);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_watch_project_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(TranslationIndex::new(dir.path()));
        let cancel = CancelToken::new();

        let thread_index = Arc::clone(&index);
        let thread_cancel = cancel.clone();
        let handle = thread::spawn(move || {
            watch_project(&thread_index, DEFAULT_DEBOUNCE, &thread_cancel)
        });

        thread::sleep(Duration::from_millis(100));
        cancel.cancel();
        let result = handle.join().expect("watcher thread panicked");
        assert!(result.is_ok());
    }
}

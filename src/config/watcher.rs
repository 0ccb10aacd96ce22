//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - Watches the directory holding the file, not the file itself: editors and
//!   deploy tools save by renaming a temp file over the config, which replaces
//!   the inode a file-level watch is attached to
//! - Events for sibling files in the directory are ignored
//! - Invalid updates are logged and dropped; the running pipeline stays

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::PrerenderConfig;

/// Sends a validated [`PrerenderConfig`] every time the watched file is saved.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<PrerenderConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for validated updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<PrerenderConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Directory to attach the OS watch to.
    fn watch_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Start watching. Drop the returned handle to stop.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = self.watch_dir().to_path_buf();
        let file_name = self.path.file_name().map(OsString::from);
        let path = self.path;
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !touches_config(&event, file_name.as_deref()) {
                    return;
                }

                tracing::info!(path = %path.display(), kind = ?event.kind, "Config file changed");
                match load_config(&path) {
                    Ok(config) => {
                        let _ = tx.send(config);
                    }
                    Err(e) => tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring config update"
                    ),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(dir = %dir.display(), "Watching config directory");
        Ok(watcher)
    }
}

/// Whether `event` writes or replaces the config file named `file_name`.
fn touches_config(event: &Event, file_name: Option<&OsStr>) -> bool {
    let Some(file_name) = file_name else {
        return false;
    };
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}

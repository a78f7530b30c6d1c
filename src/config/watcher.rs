//! Configuration file watcher for cookie rule hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError, LoadedConfig};
use crate::rewrite::RuleError;

/// Watches the configuration file and publishes every version that loads.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LoadedConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reloaded configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LoadedConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    reload(&path, &update_tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %watched.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and send it on success.
///
/// Returns whether an update was sent. A file that fails to load leaves the
/// active rules in place.
pub fn reload(path: &Path, tx: &mpsc::UnboundedSender<LoadedConfig>) -> bool {
    match load_config(path) {
        Ok(loaded) => {
            tracing::info!(
                path = %path.display(),
                rules = loaded.rules.len(),
                "Cookie path rules loaded from changed config"
            );
            tx.send(loaded).is_ok()
        }
        Err(ConfigError::Rules(RuleError::InvalidPattern {
            index,
            field,
            pattern,
            source,
        })) => {
            tracing::error!(
                path = %path.display(),
                rule = index,
                field = %field,
                pattern = %pattern,
                error = %source,
                "Rejected reload: invalid cookie path rule, keeping current rules"
            );
            false
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Rejected reload, keeping current rules"
            );
            false
        }
    }
}

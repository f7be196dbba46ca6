use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};

use crate::StorageError;

/// Polls the directory holding `path` and invokes the callback whenever
/// `path` itself is created, modified or removed. Dropping the watcher stops it.
pub struct FileWatcher {
    _watcher: PollWatcher,
    path: Utf8PathBuf,
}

impl FileWatcher {
    pub fn new<F>(path: &Utf8Path, poll_interval: Duration, on_change: F) -> Result<Self, StorageError>
    where
        F: Fn() + Send + 'static,
    {
        let dir = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let target = path.file_name().map(str::to_owned);
        // Modification times are compared at whole-second precision, so two
        // writes within one second are only told apart by their content.
        let config = notify::Config::default()
            .with_poll_interval(poll_interval)
            .with_compare_contents(true);
        let mut watcher = PollWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        return;
                    }
                    let touches_target = event.paths.iter().any(|p| {
                        p.file_name().and_then(|n| n.to_str()) == target.as_deref()
                    });
                    if touches_target {
                        on_change();
                    }
                }
                Err(e) => tracing::warn!("profiles watcher error: {}", e),
            },
            config,
        )?;

        watcher.watch(dir.as_std_path(), RecursiveMode::NonRecursive)?;
        tracing::debug!("watching {} for external changes", path);

        Ok(Self {
            _watcher: watcher,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

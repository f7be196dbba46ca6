use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use remap_core::{Profile, ProfileCollection};
use remap_persistence::{
    make_daily_backup, prune_backups, quarantine_corrupt_file, read_document, write_document,
    BackupPolicy, FileWatcher, ProfilesDocument, StorageError, StorageErrorKind,
};
use tracing::{debug, info, warn};

use crate::ports::{ExternalChangeHandler, ProfileGateway, WatchHandle};

const QUALIFIER: &str = "org";
const ORG: &str = "remap";
const APP: &str = "remap";

/// `<config dir>/profiles.json` for the current user.
pub fn default_profiles_path() -> Result<Utf8PathBuf> {
    let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    let config_dir = Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf())
        .map_err(|p| anyhow::anyhow!("Config directory is not valid UTF-8: {}", p.display()))?;
    Ok(config_dir.join(remap_config::PROFILES_FILENAME))
}

#[derive(Debug, Clone)]
pub struct FileGatewayOptions {
    pub path: Utf8PathBuf,
    /// `None` disables automatic backups.
    pub backups: Option<BackupPolicy>,
    pub poll_interval: Duration,
}

impl FileGatewayOptions {
    pub fn at(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        Self {
            backups: Some(BackupPolicy::beside(&path)),
            poll_interval: Duration::from_millis(remap_config::DEFAULT_WATCH_POLL_INTERVAL_MS),
            path,
        }
    }

    pub fn without_backups(mut self) -> Self {
        self.backups = None;
        self
    }

    pub fn with_backup_keep(mut self, keep: usize) -> Self {
        if let Some(policy) = self.backups.as_mut() {
            policy.keep = remap_config::clamp_backup_keep_count(keep);
        }
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[derive(Default)]
struct WriteState {
    /// Bytes of our own latest write; a watcher event whose file content
    /// equals them is not an external change.
    last_written: Option<Vec<u8>>,
    /// Top-level keys seen at load, used when the file cannot be re-read.
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Profiles stored as a JSON document on disk.
pub struct FileProfileGateway {
    options: FileGatewayOptions,
    state: Arc<Mutex<WriteState>>,
}

impl FileProfileGateway {
    pub fn new(options: FileGatewayOptions) -> Self {
        Self {
            options,
            state: Arc::default(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.options.path
    }

    fn backup(&self) {
        let Some(policy) = &self.options.backups else {
            return;
        };
        let today = chrono::Local::now().date_naive();
        if let Err(e) = make_daily_backup(&self.options.path, policy, today) {
            warn!("failed to back up {}: {}", self.options.path, e);
        }
        if let Err(e) = prune_backups(&self.options.path, policy) {
            warn!("failed to prune backups in {}: {}", policy.directory, e);
        }
    }
}

fn is_undecodable(e: &StorageError) -> bool {
    matches!(
        e.kind(),
        StorageErrorKind::Codec | StorageErrorKind::InvalidDocument
    )
}

impl ProfileGateway for FileProfileGateway {
    fn load(&self) -> Result<Vec<Profile>> {
        let path = &self.options.path;
        match read_document(path) {
            Ok(Some(doc)) => {
                info!("read {} profile(s) from {}", doc.profiles.len(), path);
                let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                state.extra = doc.extra;
                Ok(doc.profiles)
            }
            Ok(None) => {
                info!("profiles file {} not found, starting fresh", path);
                Ok(Vec::new())
            }
            Err(e) if is_undecodable(&e) => {
                if let Err(q) = quarantine_corrupt_file(path) {
                    warn!("failed to quarantine {}: {}", path, q);
                }
                Err(e).with_context(|| format!("Failed to parse profiles from {path}"))
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read profiles from {path}")),
        }
    }

    fn save(&self, collection: &ProfileCollection) -> Result<()> {
        let path = &self.options.path;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        self.backup();

        let extra = match read_document(path) {
            Ok(Some(existing)) => existing.extra,
            Ok(None) => state.extra.clone(),
            Err(e) => {
                warn!("existing {} unreadable, keeping last known settings: {}", path, e);
                state.extra.clone()
            }
        };

        let doc = ProfilesDocument {
            profiles: collection.profiles().to_vec(),
            extra,
        };
        let bytes = write_document(path, &doc)
            .with_context(|| format!("Failed to write profiles to {path}"))?;

        state.extra = doc.extra;
        state.last_written = Some(bytes);
        info!("saved revision {} to {}", collection.revision(), path);
        Ok(())
    }

    fn watch(&self, on_change: ExternalChangeHandler) -> Result<Option<WatchHandle>> {
        let path = self.options.path.clone();
        let state = self.state.clone();

        let watcher = FileWatcher::new(&self.options.path, self.options.poll_interval, move || {
            // Read under the write lock so a save cannot land between the read
            // and the comparison with our own last write.
            let read = {
                let state = state.lock().unwrap_or_else(PoisonError::into_inner);
                match std::fs::read(&path) {
                    Ok(bytes) if state.last_written.as_deref() == Some(bytes.as_slice()) => {
                        debug!("ignoring change to {} made by this process", path);
                        return;
                    }
                    other => other,
                }
            };

            let bytes = match read {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("{} removed externally, waiting for it to come back", path);
                    return;
                }
                Err(e) => {
                    on_change(Err(anyhow::Error::new(e).context(format!("Failed to read {path}"))));
                    return;
                }
            };

            let change = remap_persistence::decode_document(&bytes)
                .map(|doc| doc.profiles)
                .with_context(|| format!("Failed to parse externally changed {path}"));
            on_change(change);
        })
        .with_context(|| format!("Failed to watch {}", self.options.path))?;

        Ok(Some(WatchHandle::new(watcher)))
    }
}

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;

use crate::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPolicy {
    pub directory: Utf8PathBuf,
    pub keep: usize,
}

impl BackupPolicy {
    /// Backups next to `profiles_path`, keeping the default number of days.
    pub fn beside(profiles_path: &Utf8Path) -> Self {
        let parent = profiles_path.parent().unwrap_or(Utf8Path::new("."));
        Self {
            directory: parent.join(remap_config::BACKUPS_DIRNAME),
            keep: remap_config::DEFAULT_BACKUP_KEEP_COUNT,
        }
    }
}

fn file_stem(path: &Utf8Path) -> &str {
    path.file_stem().unwrap_or("profiles")
}

/// `profiles.json` on 2026-10-19 becomes `profiles_20261019.json`.
pub fn backup_file_name(profiles_path: &Utf8Path, date: NaiveDate) -> String {
    format!("{}_{}.json", file_stem(profiles_path), date.format("%Y%m%d"))
}

fn is_backup_name(stem: &str, name: &str) -> bool {
    let Some(rest) = name.strip_prefix(stem).and_then(|r| r.strip_prefix('_')) else {
        return false;
    };
    let Some(digits) = rest.strip_suffix(".json") else {
        return false;
    };
    digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Copies the current file into the backup directory, at most once per day.
/// Returns the backup path when one was written.
pub fn make_daily_backup(
    profiles_path: &Utf8Path,
    policy: &BackupPolicy,
    today: NaiveDate,
) -> Result<Option<Utf8PathBuf>, StorageError> {
    if !profiles_path.exists() {
        return Ok(None);
    }

    fs::create_dir_all(&policy.directory)?;

    let backup_path = policy
        .directory
        .join(backup_file_name(profiles_path, today));
    if backup_path.exists() {
        return Ok(None);
    }

    fs::copy(profiles_path, &backup_path)?;
    tracing::debug!("created backup {}", backup_path);
    Ok(Some(backup_path))
}

/// Deletes the oldest backups beyond `policy.keep`. Returns what was removed.
pub fn prune_backups(
    profiles_path: &Utf8Path,
    policy: &BackupPolicy,
) -> Result<Vec<Utf8PathBuf>, StorageError> {
    let entries = match fs::read_dir(&policy.directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let stem = file_stem(profiles_path);
    let mut backups: Vec<Utf8PathBuf> = entries
        .filter_map(|res| res.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_backup_name(stem, name))
        .map(|name| policy.directory.join(name))
        .collect();
    backups.sort();

    let excess = backups.len().saturating_sub(policy.keep);
    let mut removed = Vec::with_capacity(excess);
    for path in backups.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed.push(path),
            Err(e) => tracing::warn!("failed to remove old backup {}: {}", path, e),
        }
    }
    Ok(removed)
}

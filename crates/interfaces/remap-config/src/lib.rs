//! Central configuration constants for profile defaults, backups and watching.

/// Name given to the profile synthesized when nothing usable could be loaded.
pub const DEFAULT_PROFILE_NAME: &str = "Default profile";

/// Name given to profiles created by `append`.
pub const NEW_PROFILE_NAME: &str = "New profile";

/// Suffix appended to the source name when a profile is duplicated.
pub const COPY_SUFFIX: &str = " (copy)";

/// File name of the profiles document inside the config directory.
pub const PROFILES_FILENAME: &str = "profiles.json";

/// Directory (next to the profiles document) holding automatic backups.
pub const BACKUPS_DIRNAME: &str = "automatic_backups";

/// Number of daily backups kept before the oldest are removed.
pub const DEFAULT_BACKUP_KEEP_COUNT: usize = 20;

/// Minimum number of daily backups kept when a custom count is requested.
pub const MIN_BACKUP_KEEP_COUNT: usize = 1;

/// Maximum number of daily backups kept when a custom count is requested.
pub const MAX_BACKUP_KEEP_COUNT: usize = 365;

/// Poll interval for external change detection, in milliseconds.
pub const DEFAULT_WATCH_POLL_INTERVAL_MS: u64 = 500;

/// Environment variable overriding the profiles document location.
pub const PROFILES_FILE_ENV: &str = "REMAP_PROFILES_FILE";

/// Convenience function to clamp a backup count into the allowed range.
pub fn clamp_backup_keep_count(v: usize) -> usize {
    v.clamp(MIN_BACKUP_KEEP_COUNT, MAX_BACKUP_KEEP_COUNT)
}

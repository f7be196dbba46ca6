use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Moves an undecodable profiles file aside so the next save cannot destroy
/// it. Returns the new location, or `None` when there was nothing to move.
pub fn quarantine_corrupt_file(path: &Utf8Path) -> std::io::Result<Option<Utf8PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let ts = Utc::now().format("%Y%m%dT%H%M%S%.f").to_string();
    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let new_name = format!(
        "{}.corrupt.{ts}.{pid}.{n}",
        path.file_name().unwrap_or(remap_config::PROFILES_FILENAME)
    );
    let new_path = path.with_file_name(new_name);
    tracing::warn!("profiles file could not be decoded, quarantining to {}", new_path);
    std::fs::rename(path, &new_path)?;
    Ok(Some(new_path))
}

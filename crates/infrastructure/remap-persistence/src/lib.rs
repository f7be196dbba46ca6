mod api;
mod backup;
mod codec;
mod document;
mod error;
mod maintenance;
mod watcher;

pub use api::*;
pub use backup::{backup_file_name, make_daily_backup, prune_backups, BackupPolicy};
pub use codec::{decode_document, encode_document, strip_comments};
pub use document::{read_document, write_document};
pub use error::*;
pub use maintenance::quarantine_corrupt_file;
pub use watcher::FileWatcher;

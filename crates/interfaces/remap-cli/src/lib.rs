pub mod profiles;

use camino::Utf8PathBuf;
use remap_store::{default_profiles_path, FileGatewayOptions};

/// Where the profiles live and how they are backed up.
#[derive(Debug, Clone, Default)]
pub struct StoreArgs {
    pub profiles_file: Option<Utf8PathBuf>,
    pub no_backups: bool,
    pub keep_backups: Option<usize>,
}

impl StoreArgs {
    pub fn gateway_options(&self) -> anyhow::Result<FileGatewayOptions> {
        let path = match &self.profiles_file {
            Some(path) => path.clone(),
            None => default_profiles_path()?,
        };

        let mut options = FileGatewayOptions::at(path);
        if self.no_backups {
            options = options.without_backups();
        } else if let Some(keep) = self.keep_backups {
            options = options.with_backup_keep(keep);
        }
        Ok(options)
    }
}

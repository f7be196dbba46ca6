use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use camino::Utf8PathBuf;
use remap_core::{Profile, ProfileCollection, ProfileId};
use remap_store::{FileGatewayOptions, FileProfileGateway, LoadStatus, ProfileStore, StoreEvent};
use tracing::warn;

/// File-backed store plus lookups by identifier or name.
pub struct ProfileManager {
    store: ProfileStore,
    path: Utf8PathBuf,
}

impl ProfileManager {
    pub fn open(options: FileGatewayOptions) -> Result<Self> {
        let path = options.path.clone();
        let store = ProfileStore::open(FileProfileGateway::new(options))
            .with_context(|| format!("Failed to open profiles at {path}"))?;

        if let LoadStatus::Fallback { reason } = store.load_status() {
            warn!("{}", reason);
            eprintln!("warning: {path} could not be loaded, using a default profile");
        }
        Ok(Self { store, path })
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    pub fn list(&self) -> Arc<ProfileCollection> {
        self.store.snapshot()
    }

    /// Looks a profile up by identifier, then by case-insensitive name.
    /// A name shared by several profiles must be given as an identifier.
    pub fn find(&self, key: &str) -> Result<Profile> {
        let snapshot = self.store.snapshot();

        if let Ok(id) = key.parse::<ProfileId>() {
            if let Some(profile) = snapshot.get(id) {
                return Ok(profile.clone());
            }
        }

        let mut matches = snapshot
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(key.trim()));
        match (matches.next(), matches.next()) {
            (Some(profile), None) => Ok(profile.clone()),
            (Some(_), Some(_)) => bail!("Several profiles are named '{key}', use the id instead"),
            (None, _) => Err(anyhow!("Profile '{}' not found", key)),
        }
    }

    pub fn add(&self, name: Option<String>) -> Result<Profile> {
        let (snapshot, id) = match name {
            Some(name) => self.store.append_named(name),
            None => self.store.append(),
        };
        profile_in(&snapshot, id)
    }

    pub fn duplicate(&self, key: &str) -> Result<Profile> {
        let source = self.find(key)?;
        let (snapshot, id) = self.store.duplicate(source.id)?;
        profile_in(&snapshot, id)
    }

    pub fn rename(&self, key: &str, name: String) -> Result<Profile> {
        let target = self.find(key)?;
        let snapshot = self.store.rename(target.id, name)?;
        profile_in(&snapshot, target.id)
    }

    /// Returns the removed profile.
    pub fn remove(&self, key: &str) -> Result<Profile> {
        let target = self.find(key)?;
        self.store.remove(target.id)?;
        Ok(target)
    }

    pub fn select(&self, key: &str) -> Result<Profile> {
        let target = self.find(key)?;
        let snapshot = self.store.select(target.id)?;
        profile_in(&snapshot, target.id)
    }

    /// Positions are 1-based, as printed by `list`.
    pub fn move_to(&self, from: usize, to: usize) -> Result<Arc<ProfileCollection>> {
        let from = from.checked_sub(1).context("Positions start at 1")?;
        let to = to.checked_sub(1).context("Positions start at 1")?;
        Ok(self.store.move_profile(from, to)?)
    }

    /// Waits for pending saves.
    pub fn finish(self) {
        self.store.flush();
    }
}

fn profile_in(snapshot: &ProfileCollection, id: ProfileId) -> Result<Profile> {
    snapshot
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("Profile {} vanished", id))
}

pub fn describe_event(event: &StoreEvent) -> String {
    match event {
        StoreEvent::Published(snapshot) => format!(
            "revision {}: {} profile(s), selected '{}'",
            snapshot.revision(),
            snapshot.len(),
            snapshot.selected().name
        ),
        StoreEvent::PersistenceFailed { revision, message } => {
            format!("revision {revision} was not saved: {message}")
        }
        StoreEvent::ExternalChangeRejected { message } => {
            format!("ignored external change: {message}")
        }
    }
}

pub fn handle_list(mgr: &ProfileManager) -> Result<()> {
    let snapshot = mgr.list();

    println!("{:<4} {:<3} {:<36} {:<30}", "#", "", "ID", "NAME");
    println!("{:-<4} {:-<3} {:-<36} {:-<30}", "", "", "", "");
    for (i, p) in snapshot.iter().enumerate() {
        let marker = if p.selected { "*" } else { "" };
        println!("{:<4} {:<3} {:<36} {:<30}", i + 1, marker, p.id, p.name);
    }

    Ok(())
}

pub fn handle_show(mgr: &ProfileManager, key: &str) -> Result<()> {
    let p = mgr.find(key)?;
    println!("id:       {}", p.id);
    println!("name:     {}", p.name);
    println!("selected: {}", p.selected);
    if !p.configuration.is_empty() {
        println!("{}", serde_json::to_string_pretty(&p.configuration)?);
    }
    Ok(())
}

pub fn handle_add(mgr: &ProfileManager, name: Option<String>) -> Result<()> {
    let p = mgr.add(name)?;
    println!("Profile '{}' ({}) created.", p.name, p.id);
    Ok(())
}

pub fn handle_duplicate(mgr: &ProfileManager, key: &str) -> Result<()> {
    let p = mgr.duplicate(key)?;
    println!("Profile '{}' ({}) created.", p.name, p.id);
    Ok(())
}

pub fn handle_rename(mgr: &ProfileManager, key: &str, name: String) -> Result<()> {
    let p = mgr.rename(key, name)?;
    println!("Profile {} renamed to '{}'.", p.id, p.name);
    Ok(())
}

pub fn handle_remove(mgr: &ProfileManager, key: &str) -> Result<()> {
    let p = mgr.remove(key)?;
    println!("Profile '{}' removed.", p.name);
    Ok(())
}

pub fn handle_select(mgr: &ProfileManager, key: &str) -> Result<()> {
    let p = mgr.select(key)?;
    println!("Profile '{}' selected.", p.name);
    Ok(())
}

pub fn handle_move(mgr: &ProfileManager, from: usize, to: usize) -> Result<()> {
    mgr.move_to(from, to)?;
    handle_list(mgr)
}

/// Prints store events until Ctrl-C.
pub async fn handle_watch(mgr: &ProfileManager) -> Result<()> {
    let _watch = mgr
        .store()
        .watch_external_changes()?
        .ok_or_else(|| anyhow!("{} cannot be watched", mgr.path()))?;
    let mut events = mgr.store().subscribe();

    println!("Watching {} (Ctrl-C to stop)", mgr.path());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Some(event) => println!("{}", describe_event(&event)),
                None => break,
            },
        }
    }

    Ok(())
}

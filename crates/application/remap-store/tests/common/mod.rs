#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use remap_core::{Profile, ProfileCollection};
use remap_store::{ExternalChange, ExternalChangeHandler, ProfileGateway, WatchHandle};

/// In-memory gateway that records every save and lets tests push external changes.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    pub initial: Arc<Mutex<Option<anyhow::Result<Vec<Profile>>>>>,
    pub saved: Arc<Mutex<Vec<ProfileCollection>>>,
    pub fail_saves: Arc<AtomicBool>,
    pub handler: Arc<Mutex<Option<ExternalChangeHandler>>>,
}

impl MemoryGateway {
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let gw = Self::default();
        *gw.initial.lock().unwrap() = Some(Ok(profiles));
        gw
    }

    pub fn failing_load(message: &str) -> Self {
        let gw = Self::default();
        *gw.initial.lock().unwrap() = Some(Err(anyhow::anyhow!(message.to_string())));
        gw
    }

    pub fn saved_revisions(&self) -> Vec<u64> {
        self.saved.lock().unwrap().iter().map(|c| c.revision()).collect()
    }

    pub fn push_external(&self, change: ExternalChange) {
        let guard = self.handler.lock().unwrap();
        let handler = guard.as_ref().expect("store is not watching");
        handler(change);
    }
}

impl ProfileGateway for MemoryGateway {
    fn load(&self) -> anyhow::Result<Vec<Profile>> {
        self.initial.lock().unwrap().take().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn save(&self, collection: &ProfileCollection) -> anyhow::Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.saved.lock().unwrap().push(collection.clone());
        Ok(())
    }

    fn watch(&self, on_change: ExternalChangeHandler) -> anyhow::Result<Option<WatchHandle>> {
        *self.handler.lock().unwrap() = Some(on_change);
        Ok(Some(WatchHandle::new(())))
    }
}

pub fn profiles(names: &[&str], selected: usize) -> Vec<Profile> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Profile {
            selected: i == selected,
            ..Profile::new(*name)
        })
        .collect()
}

pub fn names(c: &ProfileCollection) -> Vec<String> {
    c.iter().map(|p| p.name.clone()).collect()
}

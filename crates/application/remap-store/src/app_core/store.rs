use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use remap_core::{Profile, ProfileCollection, ProfileError, ProfileId, Repair};
use tracing::{debug, info, warn};

use crate::ports::{ExternalChangeHandler, ProfileGateway, WatchHandle};
use crate::save_worker::SaveQueue;
use crate::subscription::{Broadcaster, Subscription};

use super::commands::ProfileCommand;
use super::events::StoreEvent;
use super::reducer::reduce;

/// How the initial collection was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    Repaired(Vec<Repair>),
    Fallback { reason: String },
}

/// Result of one serialized mutation.
struct Dispatched {
    snapshot: Arc<ProfileCollection>,
    created: Option<ProfileId>,
    changed: bool,
}

struct Shared {
    /// Serializes every mutation. Holds the current snapshot.
    writer: Mutex<Arc<ProfileCollection>>,
    /// Latest published snapshot, readable without touching the writer lock.
    published: RwLock<Arc<ProfileCollection>>,
    broadcaster: Broadcaster,
    saver: SaveQueue,
    gateway: Arc<dyn ProfileGateway>,
    load_status: LoadStatus,
}

/// Owner of the profile collection.
///
/// Cloning yields another handle to the same store. Mutations are applied one
/// at a time; each successful one queues the new snapshot for saving and then
/// publishes it to every subscriber.
#[derive(Clone)]
pub struct ProfileStore {
    shared: Arc<Shared>,
}

impl ProfileStore {
    /// Loads the collection through `gateway` and starts the save worker.
    ///
    /// A failing load never fails the store: it starts with a single default
    /// profile instead. The only error is a save worker that cannot start.
    pub fn open<G: ProfileGateway>(gateway: G) -> anyhow::Result<Self> {
        let gateway: Arc<dyn ProfileGateway> = Arc::new(gateway);

        let (collection, load_status) = match gateway.load() {
            Ok(profiles) => {
                let (collection, repairs) = ProfileCollection::normalize(profiles);
                if repairs.is_empty() {
                    info!("loaded {} profile(s)", collection.len());
                    (collection, LoadStatus::Loaded)
                } else {
                    for repair in &repairs {
                        warn!("repaired loaded profiles: {:?}", repair);
                    }
                    (collection, LoadStatus::Repaired(repairs))
                }
            }
            Err(e) => {
                warn!("failed to load profiles, starting with a default profile: {:#}", e);
                (
                    ProfileCollection::with_default(),
                    LoadStatus::Fallback {
                        reason: format!("{e:#}"),
                    },
                )
            }
        };

        let broadcaster = Broadcaster::default();
        let saver = SaveQueue::start(gateway.clone(), broadcaster.clone())?;
        let current = Arc::new(collection);

        // Store the repairs right away so assigned identifiers stay stable.
        if matches!(load_status, LoadStatus::Repaired(_)) {
            saver.enqueue(current.clone());
        }

        Ok(Self {
            shared: Arc::new(Shared {
                writer: Mutex::new(current.clone()),
                published: RwLock::new(current),
                broadcaster,
                saver,
                gateway,
                load_status,
            }),
        })
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.shared.load_status
    }

    /// Current snapshot. Never blocks on an in-flight mutation.
    pub fn snapshot(&self) -> Arc<ProfileCollection> {
        self.shared
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> Subscription {
        self.shared.broadcaster.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.shared.broadcaster.subscriber_count()
    }

    // --- Mutations ---

    pub fn append(&self) -> (Arc<ProfileCollection>, ProfileId) {
        let mut current = self.lock_writer();
        let (next, id) = current.append();
        let (snapshot, _) = self.commit(&mut current, "append", next);
        (snapshot, id)
    }

    /// Appends a profile that already carries `name`, as a single revision.
    pub fn append_named(&self, name: impl Into<String>) -> (Arc<ProfileCollection>, ProfileId) {
        let mut current = self.lock_writer();
        let (next, id) = current.append_named(name);
        let (snapshot, _) = self.commit(&mut current, "append", next);
        (snapshot, id)
    }

    pub fn duplicate(
        &self,
        source: ProfileId,
    ) -> Result<(Arc<ProfileCollection>, ProfileId), ProfileError> {
        let done = self.dispatch(ProfileCommand::Duplicate(source))?;
        let id = done.created.ok_or(ProfileError::NotFound(source))?;
        Ok((done.snapshot, id))
    }

    pub fn remove(&self, target: ProfileId) -> Result<Arc<ProfileCollection>, ProfileError> {
        self.dispatch(ProfileCommand::Remove(target))
            .map(|done| done.snapshot)
    }

    pub fn rename(
        &self,
        target: ProfileId,
        name: impl Into<String>,
    ) -> Result<Arc<ProfileCollection>, ProfileError> {
        self.dispatch(ProfileCommand::Rename {
            id: target,
            name: name.into(),
        })
        .map(|done| done.snapshot)
    }

    pub fn select(&self, target: ProfileId) -> Result<Arc<ProfileCollection>, ProfileError> {
        self.dispatch(ProfileCommand::Select(target))
            .map(|done| done.snapshot)
    }

    pub fn move_profile(
        &self,
        from: usize,
        to: usize,
    ) -> Result<Arc<ProfileCollection>, ProfileError> {
        self.dispatch(ProfileCommand::Move { from, to })
            .map(|done| done.snapshot)
    }

    /// Replaces the whole collection with profiles changed outside the store.
    ///
    /// An empty list is rejected and reported as `ExternalChangeRejected`.
    /// A list equal to the current profiles is ignored. Returns the new
    /// snapshot when one was published.
    pub fn apply_external(&self, profiles: Vec<Profile>) -> Option<Arc<ProfileCollection>> {
        if profiles.is_empty() {
            self.reject_external("external change contains no profiles".to_string());
            return None;
        }

        match self.dispatch(ProfileCommand::ReplaceAll(profiles)) {
            Ok(done) if done.changed => {
                info!("applied external change as revision {}", done.snapshot.revision());
                Some(done.snapshot)
            }
            Ok(_) => {
                debug!("external change matches current profiles, ignored");
                None
            }
            Err(e) => {
                self.reject_external(e.to_string());
                None
            }
        }
    }

    /// Forwards the gateway's change notifications into `apply_external`.
    /// Returns `None` when the gateway cannot notify.
    pub fn watch_external_changes(&self) -> anyhow::Result<Option<WatchHandle>> {
        let weak = Arc::downgrade(&self.shared);
        let handler: ExternalChangeHandler = Box::new(move |change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let store = ProfileStore { shared };
            match change {
                Ok(profiles) => {
                    store.apply_external(profiles);
                }
                Err(e) => store.reject_external(format!("{e:#}")),
            }
        });
        self.shared.gateway.watch(handler)
    }

    /// Blocks until every snapshot published so far has been handed to the gateway.
    pub fn flush(&self) {
        self.shared.saver.flush();
    }

    fn reject_external(&self, message: String) {
        warn!("external profile change rejected: {}", message);
        self.shared
            .broadcaster
            .send(StoreEvent::ExternalChangeRejected { message });
    }

    fn lock_writer(&self) -> MutexGuard<'_, Arc<ProfileCollection>> {
        self.shared
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, cmd: ProfileCommand) -> Result<Dispatched, ProfileError> {
        let mut current = self.lock_writer();

        let label = cmd.label();
        let reduced = reduce(&current, cmd).inspect_err(|e| {
            debug!("{} rejected: {}", label, e);
        })?;

        for repair in &reduced.repairs {
            warn!("repaired external profiles: {:?}", repair);
        }

        let (snapshot, changed) = self.commit(&mut current, label, reduced.next);
        Ok(Dispatched {
            snapshot,
            created: reduced.created,
            changed,
        })
    }

    /// Makes `next` current, queues it for saving and publishes it. Must be
    /// called with the writer lock held. Returns false when nothing changed.
    fn commit(
        &self,
        current: &mut Arc<ProfileCollection>,
        label: &str,
        next: ProfileCollection,
    ) -> (Arc<ProfileCollection>, bool) {
        if next.same_profiles(current) {
            debug!("{} left revision {} unchanged", label, current.revision());
            return (current.clone(), false);
        }

        debug_assert!(next.check().is_ok(), "{label} produced an invalid collection");

        let next = Arc::new(next);
        *current = next.clone();

        *self
            .shared
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next.clone();

        // A save failure for this revision must not reach observers before
        // the revision itself.
        self.shared
            .broadcaster
            .send_after(StoreEvent::Published(next.clone()), || {
                self.shared.saver.enqueue(next.clone())
            });

        debug!("{} published revision {}", label, next.revision());
        (next, true)
    }
}

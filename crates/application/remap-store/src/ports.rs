use remap_core::{Profile, ProfileCollection};

/// Profiles read back after something outside the store changed them, or the
/// reason they could not be read.
pub type ExternalChange = anyhow::Result<Vec<Profile>>;

pub type ExternalChangeHandler = Box<dyn Fn(ExternalChange) + Send + Sync + 'static>;

/// Keeps an external change registration alive. Dropping it stops delivery.
pub struct WatchHandle {
    _inner: Box<dyn Send + 'static>,
}

impl WatchHandle {
    pub fn new<T: Send + 'static>(inner: T) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

/// Durable storage of the profile collection.
pub trait ProfileGateway: Send + Sync + 'static {
    /// Called once when the store opens. May return an empty or otherwise
    /// unnormalized list; the store repairs it.
    fn load(&self) -> anyhow::Result<Vec<Profile>>;

    /// Called from the store's save worker, one snapshot at a time.
    fn save(&self, collection: &ProfileCollection) -> anyhow::Result<()>;

    /// Gateways without change notification keep the default.
    fn watch(&self, _on_change: ExternalChangeHandler) -> anyhow::Result<Option<WatchHandle>> {
        Ok(None)
    }
}

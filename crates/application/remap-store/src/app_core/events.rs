use std::sync::Arc;

use remap_core::ProfileCollection;

#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A new snapshot became current. Delivered for every revision, in order.
    Published(Arc<ProfileCollection>),

    /// The gateway failed to store this revision. The in-memory snapshot stays
    /// current; nothing is retried.
    PersistenceFailed { revision: u64, message: String },

    /// An external change was read but not applied.
    ExternalChangeRejected { message: String },
}

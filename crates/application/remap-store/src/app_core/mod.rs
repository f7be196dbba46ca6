pub mod commands;
pub mod events;
pub mod reducer;
pub mod store;

pub use commands::ProfileCommand;
pub use events::StoreEvent;
pub use reducer::{reduce, Reduced};
pub use store::{LoadStatus, ProfileStore};

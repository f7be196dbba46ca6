pub mod collection;
pub mod error;
pub mod profile;

pub use collection::{ProfileCollection, Repair};
pub use error::{InvariantViolation, ProfileError};
pub use profile::{Profile, ProfileConfiguration, ProfileId};

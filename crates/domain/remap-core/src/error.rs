use crate::profile::ProfileId;

/// Rejection of a profile operation. The collection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile {0} not found")]
    NotFound(ProfileId),
    #[error("the last remaining profile cannot be removed")]
    LastProfile,
    #[error("index {index} is out of range for {len} profile(s)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A broken collection invariant, reported by `ProfileCollection::check`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("collection is empty")]
    Empty,
    #[error("no profile is selected")]
    NoSelection,
    #[error("{count} profiles are selected")]
    MultipleSelections { count: usize },
    #[error("identifier {0} is used more than once")]
    DuplicateIdentifier(ProfileId),
    #[error("profile at index {index} has no identifier")]
    UnassignedIdentifier { index: usize },
}

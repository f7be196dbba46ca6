use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a profile. Survives renames and reorders; a fresh
/// random value is drawn for every created or duplicated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Placeholder for a profile read without an identifier. Replaced with a
    /// fresh identifier when the collection is normalized.
    pub fn unassigned() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_unassigned(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProfileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Remapping rules and device settings of a profile. Opaque to this crate:
/// every key besides `id`, `name` and `selected` lands here untouched.
pub type ProfileConfiguration = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "ProfileId::unassigned")]
    pub id: ProfileId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(flatten)]
    pub configuration: ProfileConfiguration,
}

impl Profile {
    /// Unselected profile with an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProfileId::new(),
            name: name.into(),
            selected: false,
            configuration: ProfileConfiguration::new(),
        }
    }

    /// The profile used when nothing usable was loaded.
    pub fn fallback() -> Self {
        Self {
            selected: true,
            ..Self::new(remap_config::DEFAULT_PROFILE_NAME)
        }
    }

    /// Copy with a fresh identity, a "(copy)" name and no selection.
    /// The configuration is cloned, never shared.
    pub fn forked(&self) -> Self {
        Self {
            id: ProfileId::new(),
            name: format!("{}{}", self.name, remap_config::COPY_SUFFIX),
            selected: false,
            configuration: self.configuration.clone(),
        }
    }
}

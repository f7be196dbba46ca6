use remap_core::Profile;
use serde::{Deserialize, Serialize};

/// On-disk shape of the profiles file.
///
/// Only `profiles` is owned by the store. Every other top-level key (global
/// settings, machine specific data) is carried through `extra` so that a save
/// never drops what other tools wrote next to the profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilesDocument {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProfilesDocument {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            profiles,
            extra: serde_json::Map::new(),
        }
    }
}

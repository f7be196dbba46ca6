use remap_core::{Profile, ProfileId};

#[derive(Debug, Clone)]
pub enum ProfileCommand {
    Append { name: Option<String> },
    Duplicate(ProfileId),
    Remove(ProfileId),
    Rename { id: ProfileId, name: String },
    Select(ProfileId),
    Move { from: usize, to: usize },

    // Persisted collection changed outside the store
    ReplaceAll(Vec<Profile>),
}

impl ProfileCommand {
    pub fn label(&self) -> &'static str {
        match self {
            ProfileCommand::Append { .. } => "append",
            ProfileCommand::Duplicate(_) => "duplicate",
            ProfileCommand::Remove(_) => "remove",
            ProfileCommand::Rename { .. } => "rename",
            ProfileCommand::Select(_) => "select",
            ProfileCommand::Move { .. } => "move",
            ProfileCommand::ReplaceAll(_) => "replace",
        }
    }
}

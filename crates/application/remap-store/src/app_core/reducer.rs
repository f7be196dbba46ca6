use remap_core::{ProfileCollection, ProfileError, ProfileId, Repair};

use super::commands::ProfileCommand;

#[derive(Debug, Clone)]
pub struct Reduced {
    pub next: ProfileCollection,
    /// Id of the profile created by `Append` or `Duplicate`.
    pub created: Option<ProfileId>,
    /// Adjustments made to a `ReplaceAll` payload.
    pub repairs: Vec<Repair>,
}

impl Reduced {
    fn plain(next: ProfileCollection) -> Self {
        Self {
            next,
            created: None,
            repairs: Vec::new(),
        }
    }

    fn created(next: ProfileCollection, id: ProfileId) -> Self {
        Self {
            next,
            created: Some(id),
            repairs: Vec::new(),
        }
    }
}

pub fn reduce(current: &ProfileCollection, cmd: ProfileCommand) -> Result<Reduced, ProfileError> {
    let reduced = match cmd {
        ProfileCommand::Append { name } => {
            let (next, id) = match name {
                Some(name) => current.append_named(name),
                None => current.append(),
            };
            Reduced::created(next, id)
        }
        ProfileCommand::Duplicate(source) => {
            let (next, id) = current.duplicate(source)?;
            Reduced::created(next, id)
        }
        ProfileCommand::Remove(id) => Reduced::plain(current.remove(id)?),
        ProfileCommand::Rename { id, name } => Reduced::plain(current.rename(id, name)?),
        ProfileCommand::Select(id) => Reduced::plain(current.select(id)?),
        ProfileCommand::Move { from, to } => Reduced::plain(current.move_profile(from, to)?),
        ProfileCommand::ReplaceAll(profiles) => {
            let (next, repairs) = current.replace(profiles);
            Reduced {
                next,
                created: None,
                repairs,
            }
        }
    };
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_append_is_one_revision() {
        let current = ProfileCollection::with_default();
        let reduced = reduce(
            &current,
            ProfileCommand::Append {
                name: Some("Travel".into()),
            },
        )
        .unwrap();

        let id = reduced.created.unwrap();
        assert_eq!(reduced.next.revision(), 1);
        assert_eq!(reduced.next.get(id).unwrap().name, "Travel");
    }

    #[test]
    fn rejected_command_reports_error() {
        let current = ProfileCollection::with_default();
        let only = current.selected().id;
        assert_eq!(
            reduce(&current, ProfileCommand::Remove(only)).unwrap_err(),
            ProfileError::LastProfile
        );
    }
}

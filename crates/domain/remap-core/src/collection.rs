//! Ordered profile collection and its validated transitions.
//!
//! A `ProfileCollection` is an immutable snapshot. Every transition borrows the
//! current snapshot and returns a new one with the revision bumped, or a
//! `ProfileError` with the input untouched. Outside of tests there is no way to
//! build a collection that breaks the invariants: non-empty, exactly one
//! selected profile, unique identifiers.

use std::collections::HashSet;

use crate::error::{InvariantViolation, ProfileError};
use crate::profile::{Profile, ProfileId};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCollection {
    profiles: Vec<Profile>,
    revision: u64,
}

/// Adjustment made while turning loaded profiles into a valid collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    SynthesizedDefault,
    SelectedFirst,
    ClearedExtraSelections { count: usize },
    /// The profile at `index` was stored without an identifier.
    AssignedIdentifier { index: usize, assigned: ProfileId },
    ReassignedIdentifier { previous: ProfileId, assigned: ProfileId },
}

impl ProfileCollection {
    /// Single selected default profile, revision 0.
    pub fn with_default() -> Self {
        Self {
            profiles: vec![Profile::fallback()],
            revision: 0,
        }
    }

    /// Strict constructor: the profiles must already satisfy every invariant.
    pub fn try_from_profiles(profiles: Vec<Profile>) -> Result<Self, InvariantViolation> {
        check_profiles(&profiles)?;
        Ok(Self {
            profiles,
            revision: 0,
        })
    }

    /// Lenient constructor for loaded or externally supplied data.
    pub fn normalize(mut profiles: Vec<Profile>) -> (Self, Vec<Repair>) {
        let mut repairs = Vec::new();

        if profiles.is_empty() {
            repairs.push(Repair::SynthesizedDefault);
            return (Self::with_default(), repairs);
        }

        let mut seen = HashSet::with_capacity(profiles.len());
        for (index, profile) in profiles.iter_mut().enumerate() {
            if profile.id.is_unassigned() {
                profile.id = ProfileId::new();
                repairs.push(Repair::AssignedIdentifier {
                    index,
                    assigned: profile.id,
                });
            } else if seen.contains(&profile.id) {
                let previous = profile.id;
                profile.id = ProfileId::new();
                repairs.push(Repair::ReassignedIdentifier {
                    previous,
                    assigned: profile.id,
                });
            }
            seen.insert(profile.id);
        }

        match profiles.iter().position(|p| p.selected) {
            None => {
                profiles[0].selected = true;
                repairs.push(Repair::SelectedFirst);
            }
            Some(first) => {
                let mut cleared = 0;
                for profile in profiles.iter_mut().skip(first + 1) {
                    if profile.selected {
                        profile.selected = false;
                        cleared += 1;
                    }
                }
                if cleared > 0 {
                    repairs.push(Repair::ClearedExtraSelections { count: cleared });
                }
            }
        }

        (
            Self {
                profiles,
                revision: 0,
            },
            repairs,
        )
    }

    /// Same profiles with a different revision. Used when a loaded or
    /// replacing collection continues an existing revision sequence.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false for a collection built through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn position(&self, id: ProfileId) -> Option<usize> {
        self.profiles.iter().position(|p| p.id == id)
    }

    pub fn selected(&self) -> &Profile {
        self.profiles
            .iter()
            .find(|p| p.selected)
            .unwrap_or(&self.profiles[0])
    }

    /// Value comparison of the profiles, ignoring the revision.
    pub fn same_profiles(&self, other: &ProfileCollection) -> bool {
        self.profiles == other.profiles
    }

    pub fn check(&self) -> Result<(), InvariantViolation> {
        check_profiles(&self.profiles)
    }

    pub fn into_profiles(self) -> Vec<Profile> {
        self.profiles
    }

    // --- Transitions ---

    /// New unselected "New profile" at the end. Returns the collection and the new id.
    pub fn append(&self) -> (Self, ProfileId) {
        self.append_named(remap_config::NEW_PROFILE_NAME)
    }

    pub fn append_named(&self, name: impl Into<String>) -> (Self, ProfileId) {
        let profile = Profile::new(name);
        let id = profile.id;
        let next = self.derive(|profiles| profiles.push(profile));
        (next, id)
    }

    /// Copy of `source` inserted right after it.
    pub fn duplicate(&self, source: ProfileId) -> Result<(Self, ProfileId), ProfileError> {
        let ix = self.require(source)?;
        let copy = self.profiles[ix].forked();
        let id = copy.id;
        let next = self.derive(|profiles| profiles.insert(ix + 1, copy));
        Ok((next, id))
    }

    /// Removes `target`. When it was selected, the preceding profile inherits
    /// the selection, or the new head when `target` was first.
    pub fn remove(&self, target: ProfileId) -> Result<Self, ProfileError> {
        let ix = self.require(target)?;
        if self.profiles.len() == 1 {
            return Err(ProfileError::LastProfile);
        }

        Ok(self.derive(|profiles| {
            let removed = profiles.remove(ix);
            if removed.selected {
                let heir = ix.saturating_sub(1);
                profiles[heir].selected = true;
            }
        }))
    }

    /// Names are free-form and may collide.
    pub fn rename(&self, target: ProfileId, name: impl Into<String>) -> Result<Self, ProfileError> {
        let ix = self.require(target)?;
        let name = name.into();
        Ok(self.derive(|profiles| profiles[ix].name = name))
    }

    pub fn select(&self, target: ProfileId) -> Result<Self, ProfileError> {
        let ix = self.require(target)?;
        Ok(self.derive(|profiles| {
            for (i, profile) in profiles.iter_mut().enumerate() {
                profile.selected = i == ix;
            }
        }))
    }

    /// Relocates the profile at `from` to `to`, shifting the ones in between.
    pub fn move_profile(&self, from: usize, to: usize) -> Result<Self, ProfileError> {
        let len = self.profiles.len();
        for index in [from, to] {
            if index >= len {
                return Err(ProfileError::IndexOutOfRange { index, len });
            }
        }

        Ok(self.derive(|profiles| {
            let profile = profiles.remove(from);
            profiles.insert(to, profile);
        }))
    }

    /// Full replace with externally supplied profiles, normalized.
    pub fn replace(&self, profiles: Vec<Profile>) -> (Self, Vec<Repair>) {
        let (next, repairs) = Self::normalize(profiles);
        (next.with_revision(self.revision + 1), repairs)
    }

    fn require(&self, id: ProfileId) -> Result<usize, ProfileError> {
        self.position(id).ok_or(ProfileError::NotFound(id))
    }

    fn derive(&self, f: impl FnOnce(&mut Vec<Profile>)) -> Self {
        let mut profiles = self.profiles.clone();
        f(&mut profiles);
        Self {
            profiles,
            revision: self.revision + 1,
        }
    }
}

fn check_profiles(profiles: &[Profile]) -> Result<(), InvariantViolation> {
    if profiles.is_empty() {
        return Err(InvariantViolation::Empty);
    }

    let mut seen = HashSet::with_capacity(profiles.len());
    for (index, profile) in profiles.iter().enumerate() {
        if profile.id.is_unassigned() {
            return Err(InvariantViolation::UnassignedIdentifier { index });
        }
        if !seen.insert(profile.id) {
            return Err(InvariantViolation::DuplicateIdentifier(profile.id));
        }
    }

    match profiles.iter().filter(|p| p.selected).count() {
        0 => Err(InvariantViolation::NoSelection),
        1 => Ok(()),
        count => Err(InvariantViolation::MultipleSelections { count }),
    }
}

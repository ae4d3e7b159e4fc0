use crate::models::{Person, PersonGroup};

/// Last-known person groups as observed from the server.
///
/// Holds the single group-id mapping; per-group people live on the group
/// entries themselves. Not internally synchronized - `FaceClient` owns the
/// lock around every read and mutation.
#[derive(Debug, Default)]
pub struct GroupCache {
    groups: Vec<PersonGroup>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the group scope can serve a list without a remote call.
    /// An empty list never short-circuits; only per-group people lists
    /// treat "loaded and empty" as populated.
    pub fn is_populated(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn groups(&self) -> &[PersonGroup] {
        &self.groups
    }

    /// Replace the full group list with a fresh server response.
    pub fn replace(&mut self, groups: Vec<PersonGroup>) {
        self.groups = groups;
    }

    pub fn insert(&mut self, group: PersonGroup) {
        self.groups.push(group);
    }

    /// Remove a group by id. Returns whether an entry was removed.
    pub fn remove(&mut self, group_id: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != group_id);
        self.groups.len() != before
    }

    pub fn get(&self, group_id: &str) -> Option<&PersonGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn get_mut(&mut self, group_id: &str) -> Option<&mut PersonGroup> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// People list for a group, if the group is cached and its people have
    /// been loaded.
    pub fn people(&self, group_id: &str) -> Option<&[Person]> {
        self.get(group_id).and_then(|g| g.people.as_deref())
    }

    /// Drop everything; the next list call refetches from the server.
    pub fn invalidate(&mut self) {
        self.groups.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Addon selections

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Set of selected addon ids.
///
/// Iteration follows insertion order; equality ignores it.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonSet {
    ids: SmallVec<[String; 4]>,
}

impl AddonSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an addon id, returning `false` if it was already selected.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();

        if self.contains(&id) {
            return false;
        }

        self.ids.push(id);

        true
    }

    /// Removes an addon id, returning `true` if it was selected.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|selected| selected == id) {
            Some(position) => {
                self.ids.remove(position);
                true
            }
            None => false,
        }
    }

    /// Keeps only the ids matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    /// Whether the addon is selected.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|selected| selected == id)
    }

    /// Iterate over the ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of selected addons.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no addon is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drops repeated ids, keeping the first occurrence.
    pub(crate) fn dedup(&mut self) {
        let mut seen: SmallVec<[String; 4]> = SmallVec::new();

        self.ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(id.clone());
                true
            }
        });
    }
}

impl PartialEq for AddonSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl<S: Into<String>> FromIterator<S> for AddonSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();

        for id in iter {
            set.insert(id);
        }

        set
    }
}

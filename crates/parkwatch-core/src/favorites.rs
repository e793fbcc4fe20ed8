//! Starred facility names.

use serde::{Deserialize, Serialize};

/// Ordered set of favorite facility names.
///
/// Identity is the facility name; insertion order is preserved so the
/// persisted list reads back the way the user built it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    names: Vec<String>,
}

impl FavoriteSet {
    #[must_use]
    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        let mut set = Self::default();
        for name in names {
            set.add(&name);
        }
        set
    }

    /// Returns `true` when the name was not already present.
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Returns `true` when the name was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        self.names.len() != before
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut set = FavoriteSet::default();
        assert!(set.add("City Lot 1"));
        assert!(!set.add("City Lot 1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut set = FavoriteSet::default();
        set.add("A");
        assert!(!set.remove("B"));
        assert!(set.remove("A"));
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_plain_name_list() {
        let set = FavoriteSet::from_names(["B".to_string(), "A".to_string(), "B".to_string()]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["B","A"]"#);
        let back: FavoriteSet = serde_json::from_str(r#"["B","A"]"#).unwrap();
        assert_eq!(back, set);
    }
}

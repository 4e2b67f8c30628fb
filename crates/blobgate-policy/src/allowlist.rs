//! The set of identities allowed to publish metadata, upload and delete.

use std::collections::HashSet;

use blobgate_core::PublicKey;

use crate::error::{PolicyError, Result};

/// Immutable set of privileged identities.
///
/// Built once from configuration and handed to the engine; there is no way
/// to change it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    keys: HashSet<PublicKey>,
}

impl AllowList {
    /// Build from identities.
    pub fn new(keys: impl IntoIterator<Item = PublicKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Parse the comma-separated `ALLOWED_USERS` form.
    ///
    /// Whitespace around entries is ignored, as are empty entries; any other
    /// malformed entry is an error.
    pub fn from_csv(csv: &str) -> Result<Self> {
        csv.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                PublicKey::from_hex(entry).map_err(|source| PolicyError::InvalidIdentity {
                    entry: entry.to_string(),
                    source,
                })
            })
            .collect::<Result<HashSet<_>>>()
            .map(|keys| Self { keys })
    }

    /// Check membership.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nobody is allowed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the identities, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PublicKey> {
        self.keys.iter()
    }
}

impl FromIterator<PublicKey> for AllowList {
    fn from_iter<T: IntoIterator<Item = PublicKey>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(n: u8) -> PublicKey {
        PublicKey::from_bytes([n; 32])
    }

    #[test]
    fn test_from_csv() {
        let csv = format!(" {} ,, {},", pk(1).to_hex(), pk(2).to_hex());
        let list = AllowList::from_csv(&csv).unwrap();

        assert_eq!(list.len(), 2);
        assert!(list.contains(&pk(1)));
        assert!(list.contains(&pk(2)));
        assert!(!list.contains(&pk(3)));
    }

    #[test]
    fn test_from_empty_csv() {
        assert!(AllowList::from_csv("").unwrap().is_empty());
        assert!(AllowList::from_csv(" , ").unwrap().is_empty());
    }

    #[test]
    fn test_from_csv_rejects_malformed_entry() {
        let csv = format!("{},pk1", pk(1).to_hex());
        let err = AllowList::from_csv(&csv).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidIdentity { ref entry, .. } if entry == "pk1"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let list: AllowList = [pk(1), pk(1), pk(2)].into_iter().collect();
        assert_eq!(list.len(), 2);
    }
}

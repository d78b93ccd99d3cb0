//! Final assignment maps returned by the correlation engines.
//!
//! Ordered maps so that serialized snapshots are byte-stable; the golden
//! determinism tests compare JSON renderings directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Portrait and icon assigned to one costume descriptor. Both fields unset
/// is a legitimate terminal outcome, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostumeMatch {
    /// Identity of the matched portrait image, if any.
    pub portrait: Option<String>,
    /// Identity of the matched icon image, if any.
    pub icon: Option<String>,
}

/// Assignment map for one archive: descriptor identity → match entry.
/// Exactly one entry per in-scope descriptor. Read-only after the engine
/// returns; constructed fresh per archive scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    entries: BTreeMap<String, CostumeMatch>,
}

impl MatchResult {
    pub(crate) fn insert(&mut self, identity: &str) {
        self.entries
            .insert(identity.to_string(), CostumeMatch::default());
    }

    pub(crate) fn entry_mut(&mut self, identity: &str) -> Option<&mut CostumeMatch> {
        self.entries.get_mut(identity)
    }

    /// Match entry for a descriptor identity.
    pub fn get(&self, identity: &str) -> Option<&CostumeMatch> {
        self.entries.get(identity)
    }

    /// Iterate entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CostumeMatch)> {
        self.entries.iter()
    }

    /// Number of descriptor entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive had no in-scope descriptors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assignment map for the stage engine: stage identity → screenshot identity.
pub type StageMatchResult = BTreeMap<String, Option<String>>;

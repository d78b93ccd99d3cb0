//! Descriptor record produced by the binary parser.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::text;

/// One parsed costume descriptor. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorRecord {
    /// Archive-unique path; doubles as the ownership key in results.
    pub identity: String,
    /// Character represented by the descriptor, when recognized.
    pub character: Option<String>,
    /// Color variant. `"Unknown Color"` is a valid explicit value and is
    /// distinct from `None`: Unknown still participates in matching by
    /// character-only constraints, unset excludes the descriptor entirely.
    pub color: Option<String>,
    /// Derived 2+2-letter short code, when both lookups succeed.
    pub canonical_code: Option<String>,
    /// Hex SHA-256 of the raw bytes. Descriptors with equal hashes are
    /// "hash siblings" and must end up with identical match results.
    pub content_hash: String,
    /// False marks an auxiliary data file, excluded from matching.
    pub is_playable_costume: bool,
    /// Secondary units are excluded here and inherit their linked primary
    /// descriptor's result through an external pairing step.
    pub is_secondary_unit: bool,
}

impl DescriptorRecord {
    /// Folder derived from the identity; empty string at the archive root.
    pub fn folder(&self) -> &str {
        text::folder_of(&self.identity)
    }

    /// Lowercase filename stem derived from the identity.
    pub fn stem(&self) -> String {
        text::stem(&self.identity)
    }

    /// Whether this descriptor takes part in costume correlation.
    pub fn in_scope(&self) -> bool {
        self.is_playable_costume && !self.is_secondary_unit && self.character.is_some()
    }
}

impl fmt::Display for DescriptorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} / {}]",
            self.identity,
            self.character.as_deref().unwrap_or("?"),
            self.color.as_deref().unwrap_or("?"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identity: &str) -> DescriptorRecord {
        DescriptorRecord {
            identity: identity.to_string(),
            character: Some("Fox".to_string()),
            color: Some("Red".to_string()),
            canonical_code: Some("FxRe".to_string()),
            content_hash: "00".to_string(),
            is_playable_costume: true,
            is_secondary_unit: false,
        }
    }

    #[test]
    fn test_derived_paths() {
        let d = record("Pack/Fox/FxRe.dat");
        assert_eq!(d.folder(), "Pack/Fox");
        assert_eq!(d.stem(), "fxre");
        assert!(d.in_scope());
    }

    #[test]
    fn test_scope_exclusions() {
        let mut d = record("a.dat");
        d.is_playable_costume = false;
        assert!(!d.in_scope());

        let mut d = record("a.dat");
        d.is_secondary_unit = true;
        assert!(!d.in_scope());

        let mut d = record("a.dat");
        d.character = None;
        assert!(!d.in_scope());
    }
}

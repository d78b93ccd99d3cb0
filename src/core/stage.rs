//! Stage descriptor record.

use serde::{Deserialize, Serialize};

use crate::text;

/// One parsed stage descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Archive-unique path.
    pub identity: String,
    /// Fixed short code (e.g. `GrNBa`), when recognized.
    pub code: Option<String>,
    /// Stage name resolved from the code table.
    pub stage_name: Option<String>,
}

impl StageRecord {
    /// Folder derived from the identity; empty string at the archive root.
    pub fn folder(&self) -> &str {
        text::folder_of(&self.identity)
    }

    /// Lowercase filename stem derived from the identity.
    pub fn stem(&self) -> String {
        text::stem(&self.identity)
    }
}

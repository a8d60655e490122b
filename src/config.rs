//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::storage::index::IndexKind;

/// Knobs for [`StorageEngine`](crate::storage::StorageEngine) behavior.
///
/// The defaults give every `PRIMARY KEY` column an ordered index at table
/// creation, so point and range lookups on keys work without any manual
/// index management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Build an index on each `PRIMARY KEY` column when the table is created.
    pub auto_primary_key_index: bool,

    /// Index variant used for automatic primary key indexes.
    pub primary_key_index_kind: IndexKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_primary_key_index: true,
            primary_key_index_kind: IndexKind::Ordered,
        }
    }
}

impl EngineConfig {
    /// No automatic indexes; every lookup is a scan unless indexes are
    /// created explicitly.
    pub fn bare() -> Self {
        Self {
            auto_primary_key_index: false,
            ..Default::default()
        }
    }

    pub fn with_primary_key_index_kind(mut self, kind: IndexKind) -> Self {
        self.primary_key_index_kind = kind;
        self
    }
}

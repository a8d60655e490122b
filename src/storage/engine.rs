//! Storage engine: owns the table namespace.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::{DbError, Result};
use crate::storage::table::Table;
use crate::types::{Column, TableSchema};

/// Named in-memory tables behind one engine-wide lock.
///
/// The engine lock covers only namespace operations (create, drop, lookup);
/// row access goes through each table's own lock, so statements on
/// different tables run concurrently. Tables are handed out as
/// `Arc<Table>`, which keeps a table alive for any statement still using
/// it after a concurrent `DROP TABLE`.
pub struct StorageEngine {
    tables: Mutex<AHashMap<String, Arc<Table>>>,
    config: EngineConfig,
}

impl StorageEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tables: Mutex::new(AHashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a table with the given columns. Fails when the name is taken.
    pub fn create_table(&self, name: &str, columns: Vec<Column>) -> Result<()> {
        let mut tables = self.tables.lock();

        if tables.contains_key(name) {
            return Err(DbError::TableExists(name.to_string()));
        }

        let table = Table::new(TableSchema::new(name, columns));
        if self.config.auto_primary_key_index {
            let key_columns: Vec<String> = table
                .schema()
                .primary_key_columns()
                .map(|c| c.name.clone())
                .collect();
            for column in key_columns {
                if !table.has_index(&column) {
                    table.create_index(&column, self.config.primary_key_index_kind)?;
                }
            }
        }

        tables.insert(name.to_string(), Arc::new(table));
        Ok(())
    }

    /// Drop a table with all of its rows and indexes. Fails when absent.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.lock();
        tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn get_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.lock().get(name).cloned()
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.lock().contains_key(name)
    }

    /// All table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Transaction hooks. Every statement already runs to completion on its
    /// own, so these acknowledge the call and do nothing.
    pub fn begin_transaction(&self) {}

    pub fn commit(&self) {}

    pub fn rollback(&self) {}
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

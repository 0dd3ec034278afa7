//! In-memory table registry
//!
//! Owns the `available` flag for every table. Writes only arrive through
//! `set_available`, which the coordinator drives over HTTP (or in-process when embedded).

use crate::common::Table;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

pub struct TableStore {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl TableStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    /// The house floor plan: T001 and T003 free, T002 and T004 taken.
    pub fn seeded() -> Self {
        Self::with_tables([
            Table::new("T001", 4, "Window"),
            Table::new("T002", 2, "Corner").occupied(),
            Table::new("T003", 6, "Center"),
            Table::new("T004", 8, "Balcony").occupied(),
        ])
    }

    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let store = Self::new();
        for table in tables {
            store.insert(table);
        }
        store
    }

    /// Insert or replace a table record
    pub fn insert(&self, table: Table) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table.table_id.clone(), table);
    }

    pub fn get(&self, table_id: &str) -> Option<Table> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table_id)
            .cloned()
    }

    /// Set the availability flag, returning the updated record.
    /// Idempotent: setting the current value again is a no-op that still succeeds.
    pub fn set_available(&self, table_id: &str, available: bool) -> Option<Table> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables.get_mut(table_id)?;
        if table.available != available {
            tracing::debug!(table_id, available, "Table availability changed");
        }
        table.available = available;
        Some(table.clone())
    }

    /// All tables ordered by id
    pub fn list(&self) -> Vec<Table> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

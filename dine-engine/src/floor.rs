//! Floor registry
//!
//! One [`TableEngine`] per table, partitioned by table id. Engines never share
//! mutable state, so operations on different tables run independently.

use crate::config::EngineConfig;
use crate::engine::TableEngine;
use dashmap::DashMap;
use dine_client::DineBackend;
use shared::TableId;
use std::sync::Arc;

pub struct FloorEngine {
    backend: Arc<dyn DineBackend>,
    config: EngineConfig,
    tables: DashMap<TableId, Arc<TableEngine>>,
}

impl FloorEngine {
    pub fn new(backend: Arc<dyn DineBackend>, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            tables: DashMap::new(),
        }
    }

    /// Engine for `table_id`, created on first use
    pub fn table(&self, table_id: &TableId) -> Arc<TableEngine> {
        if let Some(engine) = self.tables.get(table_id) {
            return engine.clone();
        }
        self.tables
            .entry(table_id.clone())
            .or_insert_with(|| {
                tracing::debug!(table_id = %table_id, "Table engine created");
                Arc::new(TableEngine::new(
                    table_id.clone(),
                    self.backend.clone(),
                    self.config.clone(),
                ))
            })
            .clone()
    }

    pub fn get(&self, table_id: &TableId) -> Option<Arc<TableEngine>> {
        self.tables.get(table_id).map(|e| e.clone())
    }

    /// Forget a table's engine; its delay watcher stops once the last handle drops
    pub fn release(&self, table_id: &TableId) -> Option<Arc<TableEngine>> {
        self.tables.remove(table_id).map(|(_, engine)| engine)
    }

    /// Tables whose local session is open
    pub fn open_tables(&self) -> Vec<TableId> {
        let mut open: Vec<TableId> = self
            .tables
            .iter()
            .filter(|e| e.value().store().status().is_open())
            .map(|e| e.key().clone())
            .collect();
        open.sort();
        open
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

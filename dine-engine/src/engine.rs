//! Per-table orchestration engine
//!
//! [`TableEngine`] owns one table's [`SessionStore`] and coordinates every
//! operation against the backend. Operations live in sibling modules:
//!
//! - `transitions`: submit, fire, advance, single-item serve/void, waves
//! - `seats`: add, remove, rename, guest names
//! - `session`: ensure, refresh, close, lazy id resolution
//!
//! Locks are never held across a network await: each operation snapshots or
//! applies under a short write lock, awaits the backend, then settles under a
//! fresh lock.

use crate::config::EngineConfig;
use crate::delay_watch::DelayWatcher;
use crate::order_cache::OrderIdCache;
use crate::progress::{self, MealProgress};
use crate::store::SessionStore;
use dine_client::DineBackend;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use shared::request::TelemetryEvent;
use shared::response::KitchenDelay;
use shared::util::now_millis;
use shared::{Bill, ItemId, SessionId, TableId, WaveNumber};
use std::sync::Arc;
use tokio::sync::watch;

pub struct TableEngine {
    pub(crate) table_id: TableId,
    pub(crate) backend: Arc<dyn DineBackend>,
    pub(crate) config: EngineConfig,
    pub(crate) store: Arc<RwLock<SessionStore>>,
    pub(crate) order_ids: OrderIdCache,
    pub(crate) delays_tx: watch::Sender<Vec<KitchenDelay>>,
    pub(crate) delay_watch: Mutex<Option<DelayWatcher>>,
}

impl std::fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEngine")
            .field("table_id", &self.table_id)
            .field("session_id", &self.session_id())
            .finish_non_exhaustive()
    }
}

impl TableEngine {
    pub fn new(table_id: TableId, backend: Arc<dyn DineBackend>, config: EngineConfig) -> Self {
        let (delays_tx, _) = watch::channel(Vec::new());
        Self {
            store: Arc::new(RwLock::new(SessionStore::new(table_id.clone()))),
            table_id,
            backend,
            config,
            order_ids: OrderIdCache::new(),
            delays_tx,
            delay_watch: Mutex::new(None),
        }
    }

    // ========== Read access ==========

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Read-only view of the local session state.
    ///
    /// Drop the guard before awaiting anything on this engine.
    pub fn store(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.store.read()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.store.read().session_id().cloned()
    }

    pub fn bill(&self) -> Bill {
        self.store.read().bill()
    }

    pub fn progress(&self) -> MealProgress {
        let store = self.store.read();
        progress::build_progress(&store, store.wave_count())
    }

    pub fn next_fireable_wave(&self) -> Option<WaveNumber> {
        progress::compute_next_fireable_wave(self.store.read().active_items())
    }

    /// Latest kitchen delays published by the watcher
    pub fn subscribe_delays(&self) -> watch::Receiver<Vec<KitchenDelay>> {
        self.delays_tx.subscribe()
    }

    pub fn is_watching_delays(&self) -> bool {
        self.delay_watch
            .lock()
            .as_ref()
            .is_some_and(DelayWatcher::is_running)
    }

    // ========== Session identity ==========

    /// Cached session id, or the table's open session on the backend.
    ///
    /// Lookup failures are logged and yield `None`; callers degrade.
    pub async fn resolve_session_id(&self) -> Option<SessionId> {
        if let Some(id) = self.session_id() {
            return Some(id);
        }

        match self.backend.open_session_for_table(&self.table_id).await {
            Ok(Some(session_id)) => {
                tracing::debug!(table_id = %self.table_id, session_id = %session_id, "Session id resolved");
                {
                    let mut store = self.store.write();
                    if store.session_id().is_none() {
                        store.set_session_id(session_id.clone());
                    }
                }
                self.order_ids.bind_session(&session_id);
                Some(session_id)
            }
            Ok(None) => {
                tracing::debug!(table_id = %self.table_id, "No open session for table");
                None
            }
            Err(e) => {
                tracing::warn!(table_id = %self.table_id, error = %e, "Session id lookup failed");
                None
            }
        }
    }

    // ========== Delay watcher ==========

    pub(crate) fn start_delay_watch(&self, session_id: &SessionId) {
        let Some(interval) = self.config.delay_poll_interval else {
            return;
        };
        let mut slot = self.delay_watch.lock();
        if let Some(current) = slot.as_ref()
            && current.session_id() == session_id
            && current.is_running()
        {
            return;
        }
        *slot = Some(DelayWatcher::spawn(
            self.backend.clone(),
            session_id.clone(),
            self.store.clone(),
            self.delays_tx.clone(),
            interval,
        ));
    }

    pub(crate) fn stop_delay_watch(&self) {
        if let Some(watcher) = self.delay_watch.lock().take() {
            watcher.stop();
        }
        self.delays_tx.send_replace(Vec::new());
    }

    // ========== Telemetry ==========

    pub(crate) fn event(&self, name: &str) -> TelemetryEvent {
        TelemetryEvent {
            name: name.to_string(),
            table_id: self.table_id.clone(),
            session_id: self.session_id(),
            wave_number: None,
            item_ids: Vec::new(),
            correlation_id: None,
            at: now_millis(),
        }
    }

    pub(crate) fn wave_event(&self, name: &str, wave: WaveNumber, item_ids: Vec<ItemId>) -> TelemetryEvent {
        TelemetryEvent {
            wave_number: Some(wave),
            item_ids,
            ..self.event(name)
        }
    }

    /// Fire-and-forget: never awaited, failures only logged
    pub(crate) fn emit(&self, event: TelemetryEvent) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.record_event(&event).await {
                tracing::warn!(event = %event.name, error = %e, "Telemetry event dropped");
            }
        });
    }
}

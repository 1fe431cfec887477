//! Session lifecycle: ensure, hydrate, close, order id resolution

use crate::engine::TableEngine;
use crate::error::{EngineError, EngineResult};
use serde::Serialize;
use shared::request::{CloseOptions, CloseSessionRequest, EnsureSessionRequest, Payment};
use shared::response::OutstandingItems;
use shared::{IdempotencyKey, ItemId, OrderId, SessionId};

/// Result of a successful close
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseOutcome {
    pub session_id: SessionId,
    pub correlation_id: Option<String>,
}

impl TableEngine {
    /// Get-or-create the table's session.
    ///
    /// The backend deduplicates by `key`: retries of the same seating must
    /// reuse it. Ensuring the session already held locally leaves local state
    /// untouched.
    pub async fn ensure_session(
        &self,
        guest_count: u32,
        key: &IdempotencyKey,
    ) -> EngineResult<SessionId> {
        let req = EnsureSessionRequest {
            table_id: self.table_id.clone(),
            location_id: self.backend.location_id(),
            guest_count,
            idempotency_key: key.clone(),
        };
        let resp = self.backend.ensure_session(&req).await?;
        let session_id = resp.session_id;

        let fresh = {
            let mut store = self.store.write();
            let known = store.session_id() == Some(&session_id) && store.status().is_open();
            if !known {
                store.begin_session(session_id.clone(), guest_count);
            }
            !known
        };
        self.order_ids.bind_session(&session_id);
        self.start_delay_watch(&session_id);

        if fresh {
            tracing::info!(table_id = %self.table_id, session_id = %session_id, guest_count, "Session started");
        } else {
            tracing::debug!(table_id = %self.table_id, session_id = %session_id, "Session already active");
        }
        Ok(session_id)
    }

    /// Reload local state from the backend.
    ///
    /// Returns `false` (and resets the table) when no open session exists.
    pub async fn refresh(&self) -> EngineResult<bool> {
        let Some(session_id) = self.resolve_session_id().await else {
            self.end_session();
            return Ok(false);
        };

        let view = self.backend.fetch_session(&session_id).await?;
        if !view.status.is_open() {
            tracing::info!(table_id = %self.table_id, session_id = %session_id, status = ?view.status, "Session no longer open");
            self.end_session();
            return Ok(false);
        }

        self.store.write().load(view);
        self.order_ids.bind_session(&session_id);
        self.start_delay_watch(&session_id);
        Ok(true)
    }

    /// Items the backend still considers unfinished
    pub async fn outstanding_items(&self) -> EngineResult<OutstandingItems> {
        let session_id = self
            .resolve_session_id()
            .await
            .ok_or_else(|| EngineError::NoSession(self.table_id.clone()))?;
        Ok(self.backend.outstanding_items(&session_id).await?)
    }

    /// Settle and close the session.
    ///
    /// A typed rejection (unpaid balance, unfinished items, ...) leaves the
    /// session and its items untouched.
    pub async fn close_session(
        &self,
        payment: Payment,
        options: CloseOptions,
        key: &IdempotencyKey,
    ) -> EngineResult<CloseOutcome> {
        let session_id = self
            .resolve_session_id()
            .await
            .ok_or_else(|| EngineError::NoSession(self.table_id.clone()))?;

        let req = CloseSessionRequest {
            payment,
            options,
            idempotency_key: key.clone(),
        };
        let resp = match self.backend.close_session(&session_id, &req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(table_id = %self.table_id, session_id = %session_id, error = %e, "Close refused");
                return Err(e.into());
            }
        };

        let mut event = self.event("session_completed");
        event.session_id = Some(session_id.clone());
        event.correlation_id = resp.correlation_id.clone();

        self.end_session();
        self.emit(event);
        tracing::info!(
            table_id = %self.table_id,
            session_id = %session_id,
            correlation_id = ?resp.correlation_id,
            "Session closed"
        );

        Ok(CloseOutcome {
            session_id,
            correlation_id: resp.correlation_id,
        })
    }

    /// Order record that owns `item_id`.
    ///
    /// Cache first, then (item wave, session) → backend lookup. `None` when
    /// anything along the way is missing or fails.
    pub async fn resolve_order_id_for_item(&self, item_id: &ItemId) -> Option<OrderId> {
        if let Some(order_id) = self.order_ids.get(item_id) {
            return Some(order_id);
        }

        let wave = self.store.read().item(item_id).map(|i| i.wave)?;
        let session_id = self.resolve_session_id().await?;

        match self.backend.order_for_wave(&session_id, wave).await {
            Ok(Some(order_id)) => {
                tracing::debug!(item_id = %item_id, order_id = %order_id, wave, "Order id resolved");
                self.order_ids.insert(item_id.clone(), order_id.clone());
                Some(order_id)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(item_id = %item_id, wave, error = %e, "Order id lookup failed");
                None
            }
        }
    }

    /// Reset the table to available and drop everything scoped to the session
    fn end_session(&self) {
        self.store.write().teardown();
        self.order_ids.clear();
        self.stop_delay_watch();
    }
}

//! Wave transitions and item submission
//!
//! Fire and advance share the optimistic primitive with opposite failure
//! policies: fire keeps its optimistic state (re-firing is a no-op on the
//! backend), advance rolls back so no item keeps a status the backend did not
//! confirm.

use crate::engine::TableEngine;
use crate::error::{EngineError, EngineResult};
use crate::optimistic::{OnFailure, OptimisticTransition, Outcome, Settled};
use crate::progress;
use crate::store::ItemPlace;
use crate::wave;
use serde::Serialize;
use shared::request::{SubmitItemLine, SubmitItemsRequest};
use shared::{
    AdvanceTarget, DraftItem, IdempotencyKey, ItemId, ItemStatus, OrderId, OrderItem,
    WaveNumber,
};

/// Result of firing a wave
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireOutcome {
    pub wave: WaveNumber,
    /// Items moved held → sent
    pub fired: Vec<ItemId>,
    /// Whether the backend acknowledged the fire
    pub acknowledged: bool,
}

/// Result of advancing a wave
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub wave: WaveNumber,
    pub target: AdvanceTarget,
    /// Items that now hold the target status
    pub applied: Vec<ItemId>,
    /// Items the backend refused, restored to their previous status
    pub reverted: Vec<ItemId>,
}

/// Result of a single-item serve/void
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChange {
    pub item_id: ItemId,
    pub from: ItemStatus,
    pub to: ItemStatus,
    /// False when no order id could be resolved and only local state changed
    pub synced: bool,
}

/// Result of submitting draft items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub order_id: OrderId,
    /// Server ids, in draft order
    pub item_ids: Vec<ItemId>,
}

enum ItemMutation<'a> {
    Serve,
    Void(&'a str),
}

impl ItemMutation<'_> {
    fn target(&self) -> ItemStatus {
        match self {
            ItemMutation::Serve => ItemStatus::Served,
            ItemMutation::Void(_) => ItemStatus::Void,
        }
    }
}

impl TableEngine {
    // ========== Submit ==========

    /// Add draft items to the open session.
    ///
    /// Drafts appear locally as held items right away. On success their ids are
    /// replaced by the server ids; on failure they are removed again. Reuse
    /// `key` when retrying the same submission.
    pub async fn submit_items(
        &self,
        drafts: Vec<DraftItem>,
        key: &IdempotencyKey,
    ) -> EngineResult<SubmitOutcome> {
        let session_id = self
            .resolve_session_id()
            .await
            .ok_or_else(|| EngineError::NoSession(self.table_id.clone()))?;

        {
            let store = self.store.read();
            if let Some(seat) = drafts
                .iter()
                .filter_map(|d| d.seat_number)
                .find(|n| store.seat(*n).is_none())
            {
                return Err(EngineError::SeatNotFound(seat));
            }
        }

        // Catalog lookups happen before anything touches local state
        let mut entries = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            entries.push(self.backend.menu_item(&draft.menu_item_id).await?);
        }

        let mut lines = Vec::with_capacity(drafts.len());
        let mut draft_ids = Vec::with_capacity(drafts.len());
        {
            let mut store = self.store.write();
            for (draft, entry) in drafts.into_iter().zip(entries) {
                let wave = wave::draft_wave_number(&draft, entry.category.as_deref());
                let id = ItemId::draft();
                let item = OrderItem {
                    id: id.clone(),
                    menu_item_id: draft.menu_item_id.clone(),
                    name: entry.name,
                    unit_price: entry.price,
                    quantity: draft.quantity.max(1),
                    wave,
                    status: ItemStatus::Held,
                    modifiers: Vec::new(),
                    notes: draft.notes.clone(),
                    eta_minutes: None,
                };
                let place = draft.seat_number.map_or(ItemPlace::Shared, ItemPlace::Seat);
                store.insert_items(place, vec![item]);
                draft_ids.push(id);
                lines.push(SubmitItemLine {
                    item_id: draft.menu_item_id,
                    quantity: draft.quantity.max(1),
                    seat_id: draft.seat_number,
                    notes: draft.notes,
                    wave_number: wave,
                });
            }
        }

        let req = SubmitItemsRequest {
            session_id: session_id.clone(),
            items: lines,
            idempotency_key: key.clone(),
        };
        match self.backend.submit_items(&req).await {
            Ok(resp) => {
                if resp.added_item_ids.len() != draft_ids.len() {
                    tracing::warn!(
                        table_id = %self.table_id,
                        submitted = draft_ids.len(),
                        added = resp.added_item_ids.len(),
                        "Backend returned a different number of item ids"
                    );
                }
                {
                    let mut store = self.store.write();
                    // Drafts without a server id never reached the backend
                    let mut stale: Vec<ItemId> =
                        draft_ids.iter().skip(resp.added_item_ids.len()).cloned().collect();
                    for (draft_id, server_id) in draft_ids.iter().zip(&resp.added_item_ids) {
                        // A retried submission answers with ids we already hold
                        if store.item(server_id).is_some() {
                            stale.push(draft_id.clone());
                        } else {
                            store.replace_item_id(draft_id, server_id.clone());
                        }
                    }
                    if !stale.is_empty() {
                        store.remove_items(&stale);
                    }
                }
                self.order_ids.bind_session(&session_id);
                self.order_ids
                    .insert_many(resp.added_item_ids.iter().cloned(), &resp.order_id);
                tracing::info!(
                    table_id = %self.table_id,
                    order_id = %resp.order_id,
                    items = resp.added_item_ids.len(),
                    "Items submitted"
                );
                Ok(SubmitOutcome {
                    order_id: resp.order_id,
                    item_ids: resp.added_item_ids,
                })
            }
            Err(e) => {
                let removed = self.store.write().remove_items(&draft_ids);
                tracing::error!(table_id = %self.table_id, removed, error = %e, "Item submission failed, drafts removed");
                Err(e.into())
            }
        }
    }

    // ========== Fire ==========

    /// Fire a specific wave: held → sent.
    ///
    /// Manual override: does not check that earlier waves were fired. The
    /// optimistic state is kept even if the backend call fails.
    pub async fn fire_wave(&self, wave: WaveNumber) -> EngineResult<FireOutcome> {
        if wave == 0 {
            return Err(EngineError::InvalidWave(wave));
        }

        let plan = {
            let mut store = self.store.write();
            let plan = OptimisticTransition::plan(
                store.items_in_wave(wave),
                ItemStatus::Sent,
                OnFailure::KeepOptimistic,
            );
            plan.apply(&mut store);
            plan
        };

        let acknowledged = match self.resolve_session_id().await {
            Some(session_id) => match self.backend.fire_wave(&session_id, wave).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(table_id = %self.table_id, wave, error = %e, "Fire not acknowledged, keeping local state");
                    false
                }
            },
            None => {
                tracing::warn!(table_id = %self.table_id, wave, "No session to fire against, keeping local state");
                false
            }
        };

        let outcome = if acknowledged {
            Outcome::Confirmed
        } else {
            Outcome::Failed
        };
        let settled = plan.settle(&mut self.store.write(), outcome);
        tracing::info!(table_id = %self.table_id, wave, items = settled.applied.len(), "Wave fired");

        Ok(FireOutcome {
            wave,
            fired: settled.applied,
            acknowledged,
        })
    }

    /// Fire the lowest wave that still has held items
    pub async fn fire_next_wave(&self) -> EngineResult<Option<FireOutcome>> {
        let next = progress::compute_next_fireable_wave(self.store.read().active_items());
        match next {
            Some(wave) => self.fire_wave(wave).await.map(Some),
            None => Ok(None),
        }
    }

    // ========== Advance ==========

    /// Advance a wave's items one stage (sent → cooking → ready → served).
    ///
    /// Network failure restores every planned item; a `failed` list in an
    /// otherwise successful response restores only those items.
    pub async fn advance_wave(
        &self,
        wave: WaveNumber,
        to: AdvanceTarget,
    ) -> EngineResult<AdvanceOutcome> {
        if wave == 0 {
            return Err(EngineError::InvalidWave(wave));
        }
        let session_id = self
            .resolve_session_id()
            .await
            .ok_or_else(|| EngineError::NoSession(self.table_id.clone()))?;

        let plan = {
            let mut store = self.store.write();
            let plan = OptimisticTransition::plan(
                store.items_in_wave(wave),
                to.status(),
                OnFailure::Rollback,
            );
            plan.apply(&mut store);
            plan
        };

        if plan.is_empty() {
            tracing::debug!(table_id = %self.table_id, wave, to = %to, "Nothing to advance");
            return Ok(AdvanceOutcome {
                wave,
                target: to,
                applied: Vec::new(),
                reverted: Vec::new(),
            });
        }

        let result = self.backend.advance_wave(&session_id, wave, to).await;

        let (settled, error) = match result {
            Ok(resp) => {
                let failed: Vec<ItemId> = resp.failed.into_iter().map(|f| f.item_id).collect();
                let outcome = if failed.is_empty() {
                    Outcome::Confirmed
                } else {
                    Outcome::Partial(failed)
                };
                (plan.settle(&mut self.store.write(), outcome), None)
            }
            Err(e) => (plan.settle(&mut self.store.write(), Outcome::Failed), Some(e)),
        };

        if let Some(e) = error {
            tracing::error!(
                table_id = %self.table_id,
                wave,
                to = %to,
                reverted = settled.reverted.len(),
                error = %e,
                "Advance failed, wave rolled back"
            );
            return Err(e.into());
        }

        if !settled.reverted.is_empty() {
            tracing::warn!(
                table_id = %self.table_id,
                wave,
                to = %to,
                reverted = ?settled.reverted,
                "Advance partially refused"
            );
        }
        tracing::info!(table_id = %self.table_id, wave, to = %to, items = settled.applied.len(), "Wave advanced");

        if matches!(to, AdvanceTarget::Ready | AdvanceTarget::Served) && !settled.applied.is_empty() {
            let name = match to {
                AdvanceTarget::Served => "wave_served",
                _ => "wave_ready",
            };
            self.emit(self.wave_event(name, wave, settled.applied.clone()));
        }

        let Settled { applied, reverted } = settled;
        Ok(AdvanceOutcome {
            wave,
            target: to,
            applied,
            reverted,
        })
    }

    // ========== Single items ==========

    pub async fn mark_item_served(&self, item_id: &ItemId) -> EngineResult<ItemChange> {
        self.transition_item(item_id, ItemMutation::Serve).await
    }

    pub async fn void_item(&self, item_id: &ItemId, reason: &str) -> EngineResult<ItemChange> {
        self.transition_item(item_id, ItemMutation::Void(reason)).await
    }

    /// Optimistic single-item change keyed by the item's order id.
    ///
    /// Without a resolvable order id the change stays local. A failed backend
    /// call restores the item.
    async fn transition_item(
        &self,
        item_id: &ItemId,
        mutation: ItemMutation<'_>,
    ) -> EngineResult<ItemChange> {
        let target = mutation.target();
        let (plan, from) = {
            let mut store = self.store.write();
            let item = store
                .item(item_id)
                .ok_or_else(|| EngineError::ItemNotFound(item_id.clone()))?;
            let from = item.status;
            if !from.can_transition_to(target) {
                return Err(EngineError::InvalidTransition {
                    item: item_id.clone(),
                    from,
                    to: target,
                });
            }
            let plan = OptimisticTransition::plan([item], target, OnFailure::Rollback);
            plan.apply(&mut store);
            (plan, from)
        };

        let order_id = if item_id.is_draft() {
            None
        } else {
            self.resolve_order_id_for_item(item_id).await
        };
        let Some(order_id) = order_id else {
            tracing::warn!(table_id = %self.table_id, item_id = %item_id, to = %target, "No order id for item, change kept local");
            return Ok(ItemChange {
                item_id: item_id.clone(),
                from,
                to: target,
                synced: false,
            });
        };

        let result = match mutation {
            ItemMutation::Serve => {
                self.backend
                    .update_item_status(&order_id, item_id, ItemStatus::Served)
                    .await
            }
            ItemMutation::Void(reason) => self.backend.void_item(&order_id, item_id, reason).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(table_id = %self.table_id, item_id = %item_id, from = %from, to = %target, "Item updated");
                Ok(ItemChange {
                    item_id: item_id.clone(),
                    from,
                    to: target,
                    synced: true,
                })
            }
            Err(e) => {
                plan.settle(&mut self.store.write(), Outcome::Failed);
                tracing::error!(table_id = %self.table_id, item_id = %item_id, to = %target, error = %e, "Item update failed, rolled back");
                Err(e.into())
            }
        }
    }

    // ========== Waves ==========

    /// Open the next wave on the backend
    pub async fn add_wave(&self) -> EngineResult<WaveNumber> {
        let Some(session_id) = self.resolve_session_id().await else {
            let mut store = self.store.write();
            let next = store.wave_count() + 1;
            store.set_wave_count(next);
            tracing::warn!(table_id = %self.table_id, wave = next, "No session, wave added locally");
            return Ok(next);
        };

        let wave = self.backend.create_next_wave(&session_id).await?;
        {
            let mut store = self.store.write();
            let count = wave.max(store.wave_count());
            store.set_wave_count(count);
        }
        tracing::info!(table_id = %self.table_id, wave, "Wave added");
        Ok(wave)
    }

    /// Drop the highest wave if it holds no active items. Local only.
    pub fn remove_last_wave(&self, wave: WaveNumber) -> EngineResult<WaveNumber> {
        let mut store = self.store.write();
        store.remove_last_wave(wave)?;
        tracing::info!(table_id = %self.table_id, wave, "Wave removed");
        Ok(store.wave_count())
    }
}

//! Optimistic status transitions
//!
//! Three phases, shared by every status-changing operation:
//!
//! ```text
//! plan(store, candidates, target)   snapshot {item -> previous status}
//!     ├─ apply(store)               optimistic update, visible immediately
//!     └─ settle(store, outcome)     after the backend answers
//!           ├─ Confirmed            keep everything
//!           ├─ Partial(failed)      revert only the listed items
//!           └─ Failed               revert all, or keep (OnFailure policy)
//! ```
//!
//! A revert only touches items still at the optimistic target, so a
//! concurrent local change (e.g. a void) is never overwritten.

use crate::store::SessionStore;
use shared::{ItemId, ItemStatus, OrderItem};

/// What to do with the optimistic state when the backend call fails outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Restore every planned item (advance, single-item mutations)
    Rollback,
    /// Keep the optimistic state (fire: idempotent on the backend)
    KeepOptimistic,
}

/// Backend verdict on a planned transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    /// Call succeeded but these items were refused
    Partial(Vec<ItemId>),
    /// No usable response
    Failed,
}

/// Result of settling a transition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settled {
    /// Items that keep the target status
    pub applied: Vec<ItemId>,
    /// Items restored to their previous status
    pub reverted: Vec<ItemId>,
}

#[derive(Debug, Clone)]
pub struct OptimisticTransition {
    target: ItemStatus,
    on_failure: OnFailure,
    previous: Vec<(ItemId, ItemStatus)>,
}

impl OptimisticTransition {
    /// Snapshot every candidate that can legally move to `target`
    pub fn plan<'a>(
        candidates: impl IntoIterator<Item = &'a OrderItem>,
        target: ItemStatus,
        on_failure: OnFailure,
    ) -> Self {
        let previous = candidates
            .into_iter()
            .filter(|i| i.status.can_transition_to(target))
            .map(|i| (i.id.clone(), i.status))
            .collect();
        Self {
            target,
            on_failure,
            previous,
        }
    }

    pub fn target(&self) -> ItemStatus {
        self.target
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.previous.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn previous_status(&self, id: &ItemId) -> Option<ItemStatus> {
        self.previous
            .iter()
            .find(|(i, _)| i == id)
            .map(|(_, status)| *status)
    }

    /// Move every planned item to the target status
    pub fn apply(&self, store: &mut SessionStore) {
        for (id, _) in &self.previous {
            store.set_item_status(id, self.target);
        }
    }

    fn revert(&self, store: &mut SessionStore, id: &ItemId, previous: ItemStatus) -> bool {
        let target = self.target;
        matches!(
            store.mutate_item(id, |current| if current == target { previous } else { current }),
            Some((before, _)) if before == target
        )
    }

    /// Restore every planned item
    pub fn rollback(&self, store: &mut SessionStore) -> Vec<ItemId> {
        self.previous
            .iter()
            .filter(|(id, previous)| self.revert(store, id, *previous))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Restore only `failed` (ids outside the plan are ignored)
    pub fn rollback_items(&self, store: &mut SessionStore, failed: &[ItemId]) -> Vec<ItemId> {
        self.previous
            .iter()
            .filter(|(id, _)| failed.contains(id))
            .filter(|(id, previous)| self.revert(store, id, *previous))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Reconcile local state with the backend verdict
    pub fn settle(&self, store: &mut SessionStore, outcome: Outcome) -> Settled {
        let reverted = match outcome {
            Outcome::Confirmed => Vec::new(),
            Outcome::Partial(failed) => self.rollback_items(store, &failed),
            Outcome::Failed => match self.on_failure {
                OnFailure::Rollback => self.rollback(store),
                OnFailure::KeepOptimistic => Vec::new(),
            },
        };
        let applied = self
            .previous
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !reverted.contains(id))
            .cloned()
            .collect();
        Settled { applied, reverted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemPlace;
    use rust_decimal::Decimal;
    use shared::{MenuItemId, SessionId, TableId};

    fn item(id: &str, status: ItemStatus) -> OrderItem {
        OrderItem {
            id: ItemId::new(id),
            menu_item_id: MenuItemId::new("m-1"),
            name: id.to_string(),
            unit_price: Decimal::ONE,
            quantity: 1,
            wave: 1,
            status,
            modifiers: vec![],
            notes: None,
            eta_minutes: None,
        }
    }

    fn store() -> SessionStore {
        let mut store = SessionStore::new(TableId::new("t-1"));
        store.begin_session(SessionId::new("s-1"), 1);
        store.insert_items(
            ItemPlace::Seat(1),
            vec![
                item("a", ItemStatus::Sent),
                item("b", ItemStatus::Sent),
                item("c", ItemStatus::Cooking),
                item("d", ItemStatus::Void),
            ],
        );
        store
    }

    fn status(store: &SessionStore, id: &str) -> ItemStatus {
        store.item(&ItemId::new(id)).unwrap().status
    }

    #[test]
    fn test_plan_only_takes_eligible_items() {
        let store = store();
        let plan = OptimisticTransition::plan(store.items(), ItemStatus::Cooking, OnFailure::Rollback);
        assert_eq!(plan.item_ids(), vec![ItemId::new("a"), ItemId::new("b")]);
        assert_eq!(plan.previous_status(&ItemId::new("a")), Some(ItemStatus::Sent));
        assert_eq!(plan.previous_status(&ItemId::new("c")), None);
    }

    #[test]
    fn test_failed_rolls_back_everything() {
        let mut store = store();
        let plan = OptimisticTransition::plan(store.items(), ItemStatus::Cooking, OnFailure::Rollback);
        plan.apply(&mut store);
        assert_eq!(status(&store, "a"), ItemStatus::Cooking);

        let settled = plan.settle(&mut store, Outcome::Failed);
        assert_eq!(settled.reverted.len(), 2);
        assert!(settled.applied.is_empty());
        assert_eq!(status(&store, "a"), ItemStatus::Sent);
        assert_eq!(status(&store, "b"), ItemStatus::Sent);
        assert_eq!(status(&store, "c"), ItemStatus::Cooking);
    }

    #[test]
    fn test_partial_reverts_only_listed() {
        let mut store = store();
        let plan = OptimisticTransition::plan(store.items(), ItemStatus::Cooking, OnFailure::Rollback);
        plan.apply(&mut store);

        let settled = plan.settle(
            &mut store,
            Outcome::Partial(vec![ItemId::new("b"), ItemId::new("c"), ItemId::new("zz")]),
        );
        assert_eq!(settled.reverted, vec![ItemId::new("b")]);
        assert_eq!(settled.applied, vec![ItemId::new("a")]);
        assert_eq!(status(&store, "a"), ItemStatus::Cooking);
        assert_eq!(status(&store, "b"), ItemStatus::Sent);
        // "c" was never planned and keeps its own status
        assert_eq!(status(&store, "c"), ItemStatus::Cooking);
    }

    #[test]
    fn test_keep_optimistic_policy() {
        let mut store = store();
        let plan = OptimisticTransition::plan(store.items(), ItemStatus::Cooking, OnFailure::KeepOptimistic);
        plan.apply(&mut store);
        let settled = plan.settle(&mut store, Outcome::Failed);
        assert!(settled.reverted.is_empty());
        assert_eq!(status(&store, "b"), ItemStatus::Cooking);
    }

    #[test]
    fn test_rollback_skips_items_changed_meanwhile() {
        let mut store = store();
        let plan = OptimisticTransition::plan(store.items(), ItemStatus::Cooking, OnFailure::Rollback);
        plan.apply(&mut store);
        store.set_item_status(&ItemId::new("a"), ItemStatus::Void);

        let settled = plan.settle(&mut store, Outcome::Failed);
        assert_eq!(settled.reverted, vec![ItemId::new("b")]);
        assert_eq!(status(&store, "a"), ItemStatus::Void);
    }
}

//! Item → order id cache
//!
//! Scoped to one session: binding a different session clears it, so ids
//! never leak between parties seated at the same table.

use parking_lot::RwLock;
use shared::{ItemId, OrderId, SessionId};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    session_id: Option<SessionId>,
    orders: HashMap<ItemId, OrderId>,
}

#[derive(Debug, Default)]
pub struct OrderIdCache {
    inner: RwLock<Inner>,
}

impl OrderIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope the cache to `session_id`, dropping entries of any other session
    pub fn bind_session(&self, session_id: &SessionId) {
        let mut inner = self.inner.write();
        if inner.session_id.as_ref() != Some(session_id) {
            inner.orders.clear();
            inner.session_id = Some(session_id.clone());
        }
    }

    pub fn get(&self, item_id: &ItemId) -> Option<OrderId> {
        self.inner.read().orders.get(item_id).cloned()
    }

    pub fn insert(&self, item_id: ItemId, order_id: OrderId) {
        self.inner.write().orders.insert(item_id, order_id);
    }

    pub fn insert_many(&self, item_ids: impl IntoIterator<Item = ItemId>, order_id: &OrderId) {
        let mut inner = self.inner.write();
        for item_id in item_ids {
            inner.orders.insert(item_id, order_id.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.orders.clear();
        inner.session_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebinding_clears_other_session() {
        let cache = OrderIdCache::new();
        cache.bind_session(&SessionId::new("s-1"));
        cache.insert(ItemId::new("i-1"), OrderId::new("o-1"));

        cache.bind_session(&SessionId::new("s-1"));
        assert_eq!(cache.get(&ItemId::new("i-1")), Some(OrderId::new("o-1")));

        cache.bind_session(&SessionId::new("s-2"));
        assert!(cache.get(&ItemId::new("i-1")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_many() {
        let cache = OrderIdCache::new();
        cache.insert_many([ItemId::new("a"), ItemId::new("b")], &OrderId::new("o-9"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&ItemId::new("b")), Some(OrderId::new("o-9")));
    }
}

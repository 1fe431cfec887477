//! Engine scenario tests
//!
//! `MockBackend` is an in-memory backend: sessions deduplicated by
//! idempotency key, a call log, and per-method scripted failures.

use crate::config::EngineConfig;
use crate::engine::TableEngine;
use async_trait::async_trait;
use dine_client::{ClientError, ClientResult, DineBackend};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::request::{
    CloseSessionRequest, EnsureSessionRequest, SubmitItemsRequest, TelemetryEvent,
};
use shared::response::{
    AdvanceWaveResponse, CloseSessionResponse, EnsureSessionResponse, FailedItem, KitchenDelay,
    OutstandingItems, SeatGuest, SubmitItemsResponse,
};
use shared::{
    AdvanceTarget, DraftItem, IdempotencyKey, ItemId, ItemRecord, ItemStatus, LocationId,
    MenuEntry, MenuItemId, OrderId, RejectReason, Rejection, SeatNumber, SessionId, SessionView,
    TableId, WaveNumber,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

mod test_seats;

// ========================================================================
// MockBackend
// ========================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    EnsureSession(IdempotencyKey),
    FetchSession(SessionId),
    OpenSessionForTable(TableId),
    CloseSession(SessionId, IdempotencyKey),
    SubmitItems(IdempotencyKey),
    OrderForWave(SessionId, WaveNumber),
    FireWave(SessionId, WaveNumber),
    AdvanceWave(SessionId, WaveNumber, AdvanceTarget),
    CreateNextWave(SessionId),
    UpdateItemStatus(OrderId, ItemId, ItemStatus),
    VoidItem(OrderId, ItemId, String),
    RemoveSeat(SessionId, SeatNumber),
    RenameSeat(SessionId, SeatNumber, SeatNumber),
    SeatGuests(SessionId),
    MenuItem(MenuItemId),
    Outstanding(SessionId),
    KitchenDelays(SessionId),
    RecordEvent(String),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    failures: HashMap<&'static str, VecDeque<ClientError>>,
    counter: u32,
    sessions_by_key: HashMap<IdempotencyKey, SessionId>,
    open_sessions: HashMap<TableId, SessionId>,
    views: HashMap<SessionId, SessionView>,
    submissions: HashMap<IdempotencyKey, SubmitItemsResponse>,
    orders: HashMap<(SessionId, WaveNumber), OrderId>,
    wave_counts: HashMap<SessionId, WaveNumber>,
    advance_failed: Vec<ItemId>,
    withheld_ids: usize,
    menu: HashMap<MenuItemId, MenuEntry>,
    seat_guests: Vec<SeatGuest>,
    outstanding: OutstandingItems,
    delays: Vec<KitchenDelay>,
    events: Vec<TelemetryEvent>,
}

impl MockState {
    fn next(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}-{}", self.counter)
    }
}

#[derive(Default)]
pub(crate) struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        {
            let mut state = backend.state.lock();
            for (id, name, price, category) in [
                ("m-wine", "House Red", Decimal::new(950, 2), "drinks"),
                ("m-soda", "Soda", Decimal::new(300, 2), "beverages"),
                ("m-steak", "Ribeye", Decimal::new(2400, 2), "mains"),
                ("m-pasta", "Carbonara", Decimal::new(1600, 2), "food"),
                ("m-cake", "Cheesecake", Decimal::new(700, 2), "desserts"),
                ("m-bread", "Bread Basket", Decimal::new(400, 2), "sides"),
            ] {
                state.menu.insert(
                    MenuItemId::new(id),
                    MenuEntry {
                        id: MenuItemId::new(id),
                        name: name.to_string(),
                        price,
                        category: Some(category.to_string()),
                    },
                );
            }
        }
        Arc::new(backend)
    }

    // ========== Scripting ==========

    /// Fail the next call to `method` with `error`
    pub fn fail_next(&self, method: &'static str, error: ClientError) {
        self.state
            .lock()
            .failures
            .entry(method)
            .or_default()
            .push_back(error);
    }

    pub fn reject_next(&self, method: &'static str, rejection: Rejection) {
        self.fail_next(method, ClientError::Rejected(rejection));
    }

    /// Items the next advance reports in its `failed` list
    pub fn refuse_on_advance(&self, ids: &[&str]) {
        self.state.lock().advance_failed = ids.iter().map(|id| ItemId::new(*id)).collect();
    }

    /// The next submit answers with `n` fewer item ids than lines
    pub fn withhold_ids_on_submit(&self, n: usize) {
        self.state.lock().withheld_ids = n;
    }

    /// Register an open session the backend knows about
    pub fn put_session(&self, view: SessionView) {
        let mut state = self.state.lock();
        if view.status.is_open() {
            state.open_sessions.insert(view.table_id.clone(), view.id.clone());
        }
        state.views.insert(view.id.clone(), view);
    }

    pub fn put_order(&self, session_id: &str, wave: WaveNumber, order_id: &str) {
        self.state
            .lock()
            .orders
            .insert((SessionId::new(session_id), wave), OrderId::new(order_id));
    }

    pub fn set_seat_guests(&self, guests: Vec<SeatGuest>) {
        self.state.lock().seat_guests = guests;
    }

    pub fn set_outstanding(&self, outstanding: OutstandingItems) {
        self.state.lock().outstanding = outstanding;
    }

    pub fn set_delays(&self, delays: Vec<KitchenDelay>) {
        self.state.lock().delays = delays;
    }

    // ========== Inspection ==========

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.state.lock().events.clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.name).collect()
    }

    /// Distinct sessions ever created
    pub fn sessions_created(&self) -> usize {
        let state = self.state.lock();
        let mut ids: Vec<&SessionId> = state.sessions_by_key.values().collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    fn enter(&self, method: &'static str, call: Call) -> ClientResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.failures.get_mut(method).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DineBackend for MockBackend {
    fn location_id(&self) -> LocationId {
        LocationId::new("loc-test")
    }

    async fn ensure_session(
        &self,
        req: &EnsureSessionRequest,
    ) -> ClientResult<EnsureSessionResponse> {
        self.enter("ensure_session", Call::EnsureSession(req.idempotency_key.clone()))?;
        let mut state = self.state.lock();
        if let Some(id) = state.sessions_by_key.get(&req.idempotency_key) {
            return Ok(EnsureSessionResponse { session_id: id.clone() });
        }
        let existing = state.open_sessions.get(&req.table_id).cloned();
        let id = match existing {
            Some(id) => id,
            None => SessionId::new(state.next("s")),
        };
        state.sessions_by_key.insert(req.idempotency_key.clone(), id.clone());
        state.open_sessions.insert(req.table_id.clone(), id.clone());
        Ok(EnsureSessionResponse { session_id: id })
    }

    async fn fetch_session(&self, session_id: &SessionId) -> ClientResult<SessionView> {
        self.enter("fetch_session", Call::FetchSession(session_id.clone()))?;
        self.state
            .lock()
            .views
            .get(session_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("session {session_id}")))
    }

    async fn open_session_for_table(&self, table_id: &TableId) -> ClientResult<Option<SessionId>> {
        self.enter("open_session_for_table", Call::OpenSessionForTable(table_id.clone()))?;
        Ok(self.state.lock().open_sessions.get(table_id).cloned())
    }

    async fn close_session(
        &self,
        session_id: &SessionId,
        req: &CloseSessionRequest,
    ) -> ClientResult<CloseSessionResponse> {
        self.enter(
            "close_session",
            Call::CloseSession(session_id.clone(), req.idempotency_key.clone()),
        )?;
        let mut state = self.state.lock();
        state.open_sessions.retain(|_, id| id != session_id);
        let correlation_id = format!("corr-{session_id}");
        Ok(CloseSessionResponse {
            ok: true,
            correlation_id: Some(correlation_id),
            reason: None,
            message: None,
            details: Default::default(),
        })
    }

    async fn submit_items(&self, req: &SubmitItemsRequest) -> ClientResult<SubmitItemsResponse> {
        self.enter("submit_items", Call::SubmitItems(req.idempotency_key.clone()))?;
        let mut state = self.state.lock();
        if let Some(resp) = state.submissions.get(&req.idempotency_key) {
            return Ok(resp.clone());
        }
        let order_id = OrderId::new(state.next("o"));
        let mut added_item_ids = Vec::with_capacity(req.items.len());
        for line in &req.items {
            added_item_ids.push(ItemId::new(state.next("i")));
            state
                .orders
                .entry((req.session_id.clone(), line.wave_number))
                .or_insert_with(|| order_id.clone());
        }
        let withheld = std::mem::take(&mut state.withheld_ids);
        added_item_ids.truncate(added_item_ids.len().saturating_sub(withheld));
        let resp = SubmitItemsResponse {
            order_id,
            session_id: req.session_id.clone(),
            added_item_ids,
        };
        state.submissions.insert(req.idempotency_key.clone(), resp.clone());
        Ok(resp)
    }

    async fn order_for_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
    ) -> ClientResult<Option<OrderId>> {
        self.enter("order_for_wave", Call::OrderForWave(session_id.clone(), wave))?;
        Ok(self.state.lock().orders.get(&(session_id.clone(), wave)).cloned())
    }

    async fn fire_wave(&self, session_id: &SessionId, wave: WaveNumber) -> ClientResult<()> {
        self.enter("fire_wave", Call::FireWave(session_id.clone(), wave))
    }

    async fn advance_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
        to: AdvanceTarget,
    ) -> ClientResult<AdvanceWaveResponse> {
        self.enter("advance_wave", Call::AdvanceWave(session_id.clone(), wave, to))?;
        let failed = std::mem::take(&mut self.state.lock().advance_failed)
            .into_iter()
            .map(|item_id| FailedItem {
                item_id,
                reason: Some("item_voided".into()),
            })
            .collect();
        Ok(AdvanceWaveResponse { failed })
    }

    async fn create_next_wave(&self, session_id: &SessionId) -> ClientResult<WaveNumber> {
        self.enter("create_next_wave", Call::CreateNextWave(session_id.clone()))?;
        let mut state = self.state.lock();
        let count = state.wave_counts.entry(session_id.clone()).or_insert(1);
        *count += 1;
        Ok(*count)
    }

    async fn update_item_status(
        &self,
        order_id: &OrderId,
        item_id: &ItemId,
        status: ItemStatus,
    ) -> ClientResult<()> {
        self.enter(
            "update_item_status",
            Call::UpdateItemStatus(order_id.clone(), item_id.clone(), status),
        )
    }

    async fn void_item(
        &self,
        order_id: &OrderId,
        item_id: &ItemId,
        reason: &str,
    ) -> ClientResult<()> {
        self.enter(
            "void_item",
            Call::VoidItem(order_id.clone(), item_id.clone(), reason.to_string()),
        )
    }

    async fn remove_seat(&self, session_id: &SessionId, seat: SeatNumber) -> ClientResult<()> {
        self.enter("remove_seat", Call::RemoveSeat(session_id.clone(), seat))
    }

    async fn rename_seat(
        &self,
        session_id: &SessionId,
        seat: SeatNumber,
        new_seat: SeatNumber,
    ) -> ClientResult<()> {
        self.enter("rename_seat", Call::RenameSeat(session_id.clone(), seat, new_seat))
    }

    async fn seat_guests(&self, session_id: &SessionId) -> ClientResult<Vec<SeatGuest>> {
        self.enter("seat_guests", Call::SeatGuests(session_id.clone()))?;
        Ok(self.state.lock().seat_guests.clone())
    }

    async fn menu_item(&self, menu_item_id: &MenuItemId) -> ClientResult<MenuEntry> {
        self.enter("menu_item", Call::MenuItem(menu_item_id.clone()))?;
        self.state
            .lock()
            .menu
            .get(menu_item_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("menu item {menu_item_id}")))
    }

    async fn outstanding_items(&self, session_id: &SessionId) -> ClientResult<OutstandingItems> {
        self.enter("outstanding_items", Call::Outstanding(session_id.clone()))?;
        Ok(self.state.lock().outstanding.clone())
    }

    async fn kitchen_delays(&self, session_id: &SessionId) -> ClientResult<Vec<KitchenDelay>> {
        self.enter("kitchen_delays", Call::KitchenDelays(session_id.clone()))?;
        Ok(self.state.lock().delays.clone())
    }

    async fn record_event(&self, event: &TelemetryEvent) -> ClientResult<()> {
        self.enter("record_event", Call::RecordEvent(event.name.clone()))?;
        self.state.lock().events.push(event.clone());
        Ok(())
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn create_test_engine(backend: &Arc<MockBackend>) -> TableEngine {
    TableEngine::new(
        TableId::new("T1"),
        backend.clone(),
        EngineConfig::default().without_delay_watch(),
    )
}

/// Seat a party of `guests` at T1
async fn seated(guests: u32) -> (Arc<MockBackend>, TableEngine) {
    let backend = MockBackend::new();
    let engine = create_test_engine(&backend);
    engine
        .ensure_session(guests, &IdempotencyKey::new())
        .await
        .expect("seat party");
    (backend, engine)
}

/// Submit drafts and return the server ids
async fn order(engine: &TableEngine, drafts: Vec<DraftItem>) -> Vec<ItemId> {
    engine
        .submit_items(drafts, &IdempotencyKey::new())
        .await
        .expect("submit items")
        .item_ids
}

fn status(engine: &TableEngine, id: &ItemId) -> ItemStatus {
    engine.store().item(id).expect("item exists").status
}

fn statuses(engine: &TableEngine, ids: &[ItemId]) -> Vec<ItemStatus> {
    ids.iter().map(|id| status(engine, id)).collect()
}

fn transport_error() -> ClientError {
    ClientError::Transport("connection reset".into())
}

fn rejection(reason: RejectReason) -> Rejection {
    Rejection::new(reason)
}

fn record(id: &str, seat: Option<SeatNumber>, wave: Option<WaveNumber>, status: ItemStatus) -> ItemRecord {
    ItemRecord {
        id: ItemId::new(id),
        menu_item_id: MenuItemId::new("m-steak"),
        name: "Ribeye".into(),
        unit_price: Decimal::new(2400, 2),
        quantity: 1,
        status,
        wave_number: wave,
        modifiers: vec![],
        notes: None,
        category: None,
        seat_number: seat,
        eta_minutes: None,
    }
}

/// Let fire-and-forget tasks run
async fn flush() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

//! Session state store
//!
//! Local mirror of one table's session: seats, shared items, wave count and
//! bill. Every mutation keeps two invariants:
//!
//! - seat numbers are unique and positive (seats stay sorted by number)
//! - the bill reflects the current non-void items
//!
//! Guest count and seat count may differ.

use crate::wave;
use rust_decimal::Decimal;
use shared::response::KitchenDelay;
use shared::{
    Bill, ItemId, ItemStatus, OrderItem, RejectReason, Rejection, RejectionDetail, Seat,
    SeatNumber, SessionId, SessionStatus, SessionView, TableId, WaveNumber,
};

/// Where an item lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPlace {
    Seat(SeatNumber),
    Shared,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    table_id: TableId,
    session_id: Option<SessionId>,
    status: SessionStatus,
    guest_count: u32,
    seats: Vec<Seat>,
    shared_items: Vec<OrderItem>,
    wave_count: WaveNumber,
    bill: Bill,
}

impl SessionStore {
    pub fn new(table_id: TableId) -> Self {
        Self {
            table_id,
            session_id: None,
            status: SessionStatus::Available,
            guest_count: 0,
            seats: Vec::new(),
            shared_items: Vec::new(),
            wave_count: 1,
            bill: Bill::default(),
        }
    }

    // ========== Accessors ==========

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn guest_count(&self) -> u32 {
        self.guest_count
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, number: SeatNumber) -> Option<&Seat> {
        self.seats.iter().find(|s| s.number == number)
    }

    pub fn seat_numbers(&self) -> Vec<SeatNumber> {
        self.seats.iter().map(|s| s.number).collect()
    }

    pub fn shared_items(&self) -> &[OrderItem] {
        &self.shared_items
    }

    pub fn wave_count(&self) -> WaveNumber {
        self.wave_count
    }

    pub fn bill(&self) -> Bill {
        self.bill
    }

    /// All items: seats first (by seat number), then shared items
    pub fn items(&self) -> impl Iterator<Item = &OrderItem> {
        self.seats
            .iter()
            .flat_map(|s| s.items.iter())
            .chain(self.shared_items.iter())
    }

    /// Non-void items
    pub fn active_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items().filter(|i| i.is_active())
    }

    pub fn items_in_wave(&self, wave: WaveNumber) -> impl Iterator<Item = &OrderItem> {
        self.items().filter(move |i| i.wave == wave)
    }

    pub fn item(&self, id: &ItemId) -> Option<&OrderItem> {
        self.items().find(|i| &i.id == id)
    }

    pub fn item_place(&self, id: &ItemId) -> Option<ItemPlace> {
        if let Some(seat) = self.seats.iter().find(|s| s.items.iter().any(|i| &i.id == id)) {
            return Some(ItemPlace::Seat(seat.number));
        }
        self.shared_items
            .iter()
            .any(|i| &i.id == id)
            .then_some(ItemPlace::Shared)
    }

    /// Highest wave number referenced by any non-void item
    pub fn highest_wave_in_use(&self) -> Option<WaveNumber> {
        self.active_items().map(|i| i.wave).max()
    }

    // ========== Hydration ==========

    /// Replace local state with a backend session
    pub fn load(&mut self, view: SessionView) {
        let mut seats: Vec<Seat> = view
            .seats
            .into_iter()
            .filter(|s| s.number >= 1)
            .map(|s| Seat {
                number: s.number,
                guest_name: s.guest_name,
                dietary: s.dietary,
                notes: s.notes,
                items: Vec::new(),
            })
            .collect();
        seats.sort_by_key(|s| s.number);
        seats.dedup_by_key(|s| s.number);

        let mut shared_items = Vec::new();
        for record in view.items {
            let seat_number = record.seat_number.filter(|n| *n >= 1);
            let item = wave::import_record(record);
            match seat_number {
                Some(number) => Self::seat_entry(&mut seats, number).items.push(item),
                None => shared_items.push(item),
            }
        }

        self.session_id = Some(view.id);
        self.table_id = view.table_id;
        self.status = view.status;
        self.guest_count = view.guest_count;
        self.seats = seats;
        self.shared_items = shared_items;
        self.wave_count = view.wave_count.max(1);
        self.after_mutation();
        tracing::debug!(
            table_id = %self.table_id,
            seats = self.seats.len(),
            wave_count = self.wave_count,
            "Session state loaded"
        );
    }

    /// Start a fresh session with seats `1..=guest_count` (at least one)
    pub fn begin_session(&mut self, session_id: SessionId, guest_count: u32) {
        self.session_id = Some(session_id);
        self.status = SessionStatus::Seated;
        self.guest_count = guest_count;
        self.seats = (1..=guest_count.max(1)).map(Seat::new).collect();
        self.shared_items.clear();
        self.wave_count = 1;
        self.after_mutation();
    }

    /// Remember the session id without touching anything else
    pub fn set_session_id(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }

    /// Reset to an available table
    pub fn teardown(&mut self) {
        self.session_id = None;
        self.status = SessionStatus::Available;
        self.guest_count = 0;
        self.seats.clear();
        self.shared_items.clear();
        self.wave_count = 1;
        self.bill = Bill::default();
    }

    // ========== Items ==========

    /// Apply a pure status transform to exactly one item.
    ///
    /// Searches seats, then shared items. Returns `(before, after)`, or `None`
    /// if the item is unknown.
    pub fn mutate_item(
        &mut self,
        id: &ItemId,
        transform: impl FnOnce(ItemStatus) -> ItemStatus,
    ) -> Option<(ItemStatus, ItemStatus)> {
        let item = self.item_mut(id)?;
        let before = item.status;
        item.status = transform(before);
        let after = item.status;
        if before != after {
            self.after_mutation();
        }
        Some((before, after))
    }

    pub fn set_item_status(&mut self, id: &ItemId, status: ItemStatus) -> bool {
        self.mutate_item(id, |_| status).is_some()
    }

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut OrderItem> {
        self.seats
            .iter_mut()
            .flat_map(|s| s.items.iter_mut())
            .chain(self.shared_items.iter_mut())
            .find(|i| &i.id == id)
    }

    /// Add items to a seat (or the shared list). Unknown seats are created.
    pub fn insert_items(&mut self, place: ItemPlace, items: Vec<OrderItem>) {
        for item in &items {
            if item.wave > self.wave_count {
                self.wave_count = item.wave;
            }
        }
        match place {
            ItemPlace::Seat(number) => Self::seat_entry(&mut self.seats, number)
                .items
                .extend(items),
            ItemPlace::Shared => self.shared_items.extend(items),
        }
        self.after_mutation();
    }

    /// Drop items entirely (used to undo unconfirmed drafts)
    pub fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        let mut removed = 0;
        for seat in &mut self.seats {
            let before = seat.items.len();
            seat.items.retain(|i| !ids.contains(&i.id));
            removed += before - seat.items.len();
        }
        let before = self.shared_items.len();
        self.shared_items.retain(|i| !ids.contains(&i.id));
        removed += before - self.shared_items.len();
        if removed > 0 {
            self.after_mutation();
        }
        removed
    }

    /// Swap a draft id for the server-assigned id
    pub fn replace_item_id(&mut self, old: &ItemId, new: ItemId) -> bool {
        match self.item_mut(old) {
            Some(item) => {
                item.id = new;
                true
            }
            None => false,
        }
    }

    /// Copy kitchen ETA hints onto items
    pub fn apply_delays(&mut self, delays: &[KitchenDelay]) {
        for delay in delays {
            if let Some(item) = self.item_mut(&delay.item_id)
                && delay.eta_minutes.is_some()
            {
                item.eta_minutes = delay.eta_minutes;
            }
        }
    }

    // ========== Seats ==========

    fn seat_entry(seats: &mut Vec<Seat>, number: SeatNumber) -> &mut Seat {
        let idx = match seats.binary_search_by_key(&number, |s| s.number) {
            Ok(idx) => idx,
            Err(idx) => {
                seats.insert(idx, Seat::new(number));
                idx
            }
        };
        &mut seats[idx]
    }

    /// Append a seat numbered `max + 1` (or 1); guest count grows by one
    pub fn add_seat(&mut self) -> Result<SeatNumber, Rejection> {
        let number = match self.seats.last() {
            Some(last) => last.number.checked_add(1).ok_or_else(|| {
                Rejection::new(RejectReason::Other("seat_number_exhausted".into()))
                    .with_message(format!("No seat number is left after {}", last.number))
            })?,
            None => 1,
        };
        self.seats.push(Seat::new(number));
        self.guest_count += 1;
        Ok(number)
    }

    /// Local preconditions for removing a seat
    pub fn check_seat_removable(&self, number: SeatNumber) -> Result<(), Rejection> {
        let seat = self.seat(number).ok_or_else(|| {
            Rejection::new(RejectReason::Other("seat_not_found".into()))
                .with_message(format!("Seat {number} does not exist"))
        })?;
        if seat.has_active_items() {
            return Err(Rejection::new(RejectReason::SeatHasItems).with_details(RejectionDetail {
                seat_number: Some(number),
                item_count: Some(seat.items.iter().filter(|i| i.is_active()).count() as u32),
                ..Default::default()
            }));
        }
        if self.seats.len() <= 1 {
            return Err(Rejection::new(RejectReason::LastSeat));
        }
        Ok(())
    }

    /// Remove an empty seat; its void items go with it
    pub fn remove_seat(&mut self, number: SeatNumber) -> Result<Seat, Rejection> {
        self.check_seat_removable(number)?;
        let idx = self
            .seats
            .iter()
            .position(|s| s.number == number)
            .ok_or_else(|| Rejection::new(RejectReason::Other("seat_not_found".into())))?;
        let seat = self.seats.remove(idx);
        self.guest_count = self.guest_count.saturating_sub(1);
        self.after_mutation();
        Ok(seat)
    }

    /// Local preconditions for renumbering a seat
    pub fn check_seat_renamable(&self, number: SeatNumber, new_number: SeatNumber) -> Result<(), Rejection> {
        if new_number == 0 {
            return Err(Rejection::new(RejectReason::Other("invalid_seat_number".into()))
                .with_message("Seat numbers start at 1"));
        }
        if number == new_number {
            return Ok(());
        }
        if self.seat(number).is_none() {
            return Err(Rejection::new(RejectReason::Other("seat_not_found".into()))
                .with_message(format!("Seat {number} does not exist")));
        }
        if self.seat(new_number).is_some() {
            return Err(Rejection::new(RejectReason::SeatNumberTaken).with_details(RejectionDetail {
                seat_number: Some(new_number),
                ..Default::default()
            }));
        }
        Ok(())
    }

    /// Renumber a seat, keeping numbers unique
    pub fn rename_seat(&mut self, number: SeatNumber, new_number: SeatNumber) -> Result<(), Rejection> {
        self.check_seat_renamable(number, new_number)?;
        if number == new_number {
            return Ok(());
        }
        let seat = self
            .seats
            .iter_mut()
            .find(|s| s.number == number)
            .ok_or_else(|| Rejection::new(RejectReason::Other("seat_not_found".into())))?;
        seat.number = new_number;
        self.seats.sort_by_key(|s| s.number);
        Ok(())
    }

    pub fn set_guest_name(&mut self, number: SeatNumber, name: Option<String>) -> bool {
        match self.seats.iter_mut().find(|s| s.number == number) {
            Some(seat) => {
                seat.guest_name = name;
                true
            }
            None => false,
        }
    }

    // ========== Waves ==========

    pub fn set_wave_count(&mut self, count: WaveNumber) {
        self.wave_count = count.max(1);
    }

    /// Local preconditions for removing wave `wave`
    pub fn check_wave_removable(&self, wave: WaveNumber) -> Result<(), Rejection> {
        if wave != self.wave_count || self.wave_count <= 1 {
            return Err(Rejection::new(RejectReason::NotLastWave).with_details(RejectionDetail {
                wave_number: Some(wave),
                ..Default::default()
            }));
        }
        let count = self.items_in_wave(wave).filter(|i| i.is_active()).count();
        if count > 0 {
            return Err(Rejection::new(RejectReason::WaveHasItems).with_details(RejectionDetail {
                wave_number: Some(wave),
                item_count: Some(count as u32),
                ..Default::default()
            }));
        }
        Ok(())
    }

    pub fn remove_last_wave(&mut self, wave: WaveNumber) -> Result<(), Rejection> {
        self.check_wave_removable(wave)?;
        self.wave_count -= 1;
        Ok(())
    }

    // ========== Derived state ==========

    fn after_mutation(&mut self) {
        self.recompute_bill();
        self.refresh_status();
        debug_assert!(self.seats_are_valid(), "seat numbers must be unique and positive");
    }

    fn recompute_bill(&mut self) {
        let mut subtotal = Decimal::ZERO;
        let mut item_count = 0;
        for item in self.active_items() {
            subtotal += item.line_total();
            item_count += item.quantity;
        }
        self.bill = Bill {
            subtotal,
            item_count,
        };
    }

    /// Open sessions move Seated → Ordering → Dining with their items
    fn refresh_status(&mut self) {
        if !self.status.is_open() {
            return;
        }
        let mut any = false;
        let mut fired = false;
        for item in self.active_items() {
            any = true;
            if item.status != ItemStatus::Held {
                fired = true;
                break;
            }
        }
        self.status = match (any, fired) {
            (_, true) => SessionStatus::Dining,
            (true, false) => SessionStatus::Ordering,
            (false, false) => SessionStatus::Seated,
        };
    }

    /// Seat numbers unique, positive and sorted
    pub fn seats_are_valid(&self) -> bool {
        self.seats.first().is_none_or(|s| s.number >= 1)
            && self.seats.windows(2).all(|w| w[0].number < w[1].number)
    }
}

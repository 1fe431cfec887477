//! Seat lifecycle
//!
//! Adding is local (seats materialize on the backend when items are ordered
//! against them). Removal and renaming are checked locally first, then
//! confirmed by the backend, which knows about items and seats this client may
//! not have seen. If local state moved while the backend call was in flight,
//! the session is reloaded instead of surfacing a refusal for a change the
//! backend already made.

use crate::engine::TableEngine;
use crate::error::EngineResult;
use shared::{Seat, SeatNumber};

impl TableEngine {
    /// Append seat `max + 1`; guest count grows by one
    pub fn add_seat(&self) -> EngineResult<SeatNumber> {
        let number = self.store.write().add_seat()?;
        tracing::info!(table_id = %self.table_id, seat = number, "Seat added");
        Ok(number)
    }

    /// Remove an empty seat.
    ///
    /// Seats with active items (or the only remaining seat) are refused
    /// without a backend call. A backend refusal aborts the removal and its
    /// message is surfaced as-is.
    pub async fn remove_seat(&self, number: SeatNumber) -> EngineResult<Seat> {
        let check = {
            let store = self.store.read();
            store
                .check_seat_removable(number)
                .map(|()| store.seat(number).cloned().unwrap_or_else(|| Seat::new(number)))
        };
        let before = match check {
            Ok(seat) => seat,
            Err(rejection) => {
                tracing::debug!(table_id = %self.table_id, seat = number, reason = %rejection.reason, "Seat removal refused locally");
                return Err(rejection.into());
            }
        };

        let Some(session_id) = self.resolve_session_id().await else {
            tracing::warn!(table_id = %self.table_id, seat = number, "No session, seat removed locally");
            let seat = self.store.write().remove_seat(number)?;
            return Ok(seat);
        };

        if let Err(e) = self.backend.remove_seat(&session_id, number).await {
            tracing::warn!(table_id = %self.table_id, seat = number, error = %e, "Seat removal refused by backend");
            return Err(e.into());
        }

        let removed = self.store.write().remove_seat(number);
        match removed {
            Ok(seat) => {
                tracing::info!(table_id = %self.table_id, seat = number, "Seat removed");
                Ok(seat)
            }
            Err(rejection) => {
                // Backend already removed it; local state moved while the call was in flight
                tracing::warn!(table_id = %self.table_id, seat = number, reason = %rejection.reason, "Seat removed on backend only, reloading");
                self.refresh().await?;
                Ok(before)
            }
        }
    }

    /// Renumber a seat.
    ///
    /// Collisions with seats known locally (including seats added locally and
    /// not yet on the backend) are refused before the backend is asked. The
    /// backend then decides uniqueness against its own seats; local state
    /// changes only after it agrees.
    pub async fn rename_seat(&self, number: SeatNumber, new_number: SeatNumber) -> EngineResult<()> {
        if number == new_number {
            return Ok(());
        }
        let check = self.store.read().check_seat_renamable(number, new_number);
        if let Err(rejection) = check {
            tracing::debug!(table_id = %self.table_id, seat = number, new_seat = new_number, reason = %rejection.reason, "Seat rename refused locally");
            return Err(rejection.into());
        }

        let Some(session_id) = self.resolve_session_id().await else {
            tracing::warn!(table_id = %self.table_id, seat = number, new_seat = new_number, "No session, seat renamed locally");
            self.store.write().rename_seat(number, new_number)?;
            return Ok(());
        };

        if let Err(e) = self.backend.rename_seat(&session_id, number, new_number).await {
            tracing::warn!(table_id = %self.table_id, seat = number, new_seat = new_number, error = %e, "Seat rename refused");
            return Err(e.into());
        }

        let renamed = self.store.write().rename_seat(number, new_number);
        match renamed {
            Ok(()) => {
                tracing::info!(table_id = %self.table_id, seat = number, new_seat = new_number, "Seat renamed");
            }
            Err(rejection) => {
                tracing::warn!(table_id = %self.table_id, seat = number, new_seat = new_number, reason = %rejection.reason, "Seat renamed on backend only, reloading");
                self.refresh().await?;
            }
        }
        Ok(())
    }

    /// Copy guest names from the backend seat list onto local seats.
    ///
    /// Returns how many local seats were updated.
    pub async fn refresh_seat_guests(&self) -> EngineResult<usize> {
        let Some(session_id) = self.resolve_session_id().await else {
            return Ok(0);
        };
        let guests = self.backend.seat_guests(&session_id).await?;

        let mut store = self.store.write();
        let updated = guests
            .into_iter()
            .filter(|g| store.set_guest_name(g.seat_number, g.guest_name.clone()))
            .count();
        tracing::debug!(table_id = %self.table_id, updated, "Seat guests refreshed");
        Ok(updated)
    }
}

//! Dine-in backend contract
//!
//! [`DineBackend`] is the seam between the orchestration engine and the
//! authoritative backend: one method per endpoint plus the consumed
//! collaborators (menu catalog, seat list, outstanding items, kitchen delays,
//! event sink). [`HttpBackend`] is the JSON-over-HTTP implementation.

use crate::http::NetworkHttpClient;
use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use shared::request::{
    AdvanceWaveRequest, CloseSessionRequest, EnsureSessionRequest, RemoveSeatRequest,
    RenameSeatRequest, SubmitItemsRequest, TelemetryEvent, UpdateItemStatusRequest,
    VoidItemRequest,
};
use shared::response::{
    Ack, AdvanceWaveResponse, CloseSessionResponse, EnsureSessionResponse, KitchenDelay,
    NextWaveResponse, OpenSessionResponse, OrderForWaveResponse, OutstandingItems, SeatGuest,
    SubmitItemsResponse,
};
use shared::{
    AdvanceTarget, ItemId, ItemStatus, LocationId, MenuEntry, MenuItemId, OrderId, SeatNumber,
    SessionId, SessionView, TableId, WaveNumber,
};

/// Backend operations consumed by the engine
#[async_trait]
pub trait DineBackend: Send + Sync {
    /// Location sent with ensure-session
    fn location_id(&self) -> LocationId;

    // ========== Sessions ==========

    /// Get-or-create the open session for a table, deduplicated by idempotency key
    async fn ensure_session(&self, req: &EnsureSessionRequest)
    -> ClientResult<EnsureSessionResponse>;

    async fn fetch_session(&self, session_id: &SessionId) -> ClientResult<SessionView>;

    /// The currently open session for a table, if any
    async fn open_session_for_table(&self, table_id: &TableId) -> ClientResult<Option<SessionId>>;

    async fn close_session(
        &self,
        session_id: &SessionId,
        req: &CloseSessionRequest,
    ) -> ClientResult<CloseSessionResponse>;

    // ========== Orders & waves ==========

    async fn submit_items(&self, req: &SubmitItemsRequest) -> ClientResult<SubmitItemsResponse>;

    /// Which order record covers `(session, wave)`
    async fn order_for_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
    ) -> ClientResult<Option<OrderId>>;

    async fn fire_wave(&self, session_id: &SessionId, wave: WaveNumber) -> ClientResult<()>;

    async fn advance_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
        to: AdvanceTarget,
    ) -> ClientResult<AdvanceWaveResponse>;

    /// Returns the number of the created wave
    async fn create_next_wave(&self, session_id: &SessionId) -> ClientResult<WaveNumber>;

    async fn update_item_status(
        &self,
        order_id: &OrderId,
        item_id: &ItemId,
        status: ItemStatus,
    ) -> ClientResult<()>;

    async fn void_item(&self, order_id: &OrderId, item_id: &ItemId, reason: &str)
    -> ClientResult<()>;

    // ========== Seats ==========

    async fn remove_seat(&self, session_id: &SessionId, seat: SeatNumber) -> ClientResult<()>;

    async fn rename_seat(
        &self,
        session_id: &SessionId,
        seat: SeatNumber,
        new_seat: SeatNumber,
    ) -> ClientResult<()>;

    async fn seat_guests(&self, session_id: &SessionId) -> ClientResult<Vec<SeatGuest>>;

    // ========== Collaborators ==========

    async fn menu_item(&self, menu_item_id: &MenuItemId) -> ClientResult<MenuEntry>;

    async fn outstanding_items(&self, session_id: &SessionId) -> ClientResult<OutstandingItems>;

    async fn kitchen_delays(&self, session_id: &SessionId) -> ClientResult<Vec<KitchenDelay>>;

    /// Telemetry sink, best effort
    async fn record_event(&self, event: &TelemetryEvent) -> ClientResult<()>;
}

/// HTTP implementation of [`DineBackend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: NetworkHttpClient,
    location_id: LocationId,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: NetworkHttpClient::new(config)?,
            location_id: config.location_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

fn expect_ack(ack: Ack, what: &str) -> ClientResult<()> {
    if ack.ok {
        Ok(())
    } else {
        Err(ClientError::InvalidResponse(format!("{what} not acknowledged")))
    }
}

/// Treat 404 on a lookup as "nothing there"
fn not_found_as_none<T>(result: ClientResult<Option<T>>) -> ClientResult<Option<T>> {
    match result {
        Err(ClientError::NotFound(_)) => Ok(None),
        other => other,
    }
}

#[async_trait]
impl DineBackend for HttpBackend {
    fn location_id(&self) -> LocationId {
        self.location_id.clone()
    }

    async fn ensure_session(
        &self,
        req: &EnsureSessionRequest,
    ) -> ClientResult<EnsureSessionResponse> {
        self.http.post("sessions/ensure", req).await
    }

    async fn fetch_session(&self, session_id: &SessionId) -> ClientResult<SessionView> {
        self.http.get(&format!("sessions/{session_id}")).await
    }

    async fn open_session_for_table(&self, table_id: &TableId) -> ClientResult<Option<SessionId>> {
        let resp = self
            .http
            .get::<OpenSessionResponse>(&format!("tables/{table_id}/open-session"))
            .await
            .map(|r| r.session_id);
        not_found_as_none(resp)
    }

    async fn close_session(
        &self,
        session_id: &SessionId,
        req: &CloseSessionRequest,
    ) -> ClientResult<CloseSessionResponse> {
        let resp: CloseSessionResponse = self
            .http
            .post(&format!("sessions/{session_id}/close"), req)
            .await?;
        match resp.rejection() {
            Some(rejection) => Err(ClientError::Rejected(rejection)),
            None => Ok(resp),
        }
    }

    async fn submit_items(&self, req: &SubmitItemsRequest) -> ClientResult<SubmitItemsResponse> {
        self.http.post("orders", req).await
    }

    async fn order_for_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
    ) -> ClientResult<Option<OrderId>> {
        let resp = self
            .http
            .get::<OrderForWaveResponse>(&format!("sessions/{session_id}/orders?wave={wave}"))
            .await
            .map(|r| r.order_id);
        not_found_as_none(resp)
    }

    async fn fire_wave(&self, session_id: &SessionId, wave: WaveNumber) -> ClientResult<()> {
        let ack: Ack = self
            .http
            .post_empty(&format!("sessions/{session_id}/waves/{wave}/fire"))
            .await?;
        expect_ack(ack, "fire")
    }

    async fn advance_wave(
        &self,
        session_id: &SessionId,
        wave: WaveNumber,
        to: AdvanceTarget,
    ) -> ClientResult<AdvanceWaveResponse> {
        self.http
            .post(
                &format!("sessions/{session_id}/waves/{wave}/advance"),
                &AdvanceWaveRequest { to_status: to },
            )
            .await
    }

    async fn create_next_wave(&self, session_id: &SessionId) -> ClientResult<WaveNumber> {
        let resp: NextWaveResponse = self
            .http
            .post_empty(&format!("sessions/{session_id}/waves/next"))
            .await?;
        Ok(resp.wave_number)
    }

    async fn update_item_status(
        &self,
        order_id: &OrderId,
        item_id: &ItemId,
        status: ItemStatus,
    ) -> ClientResult<()> {
        let ack: Ack = self
            .http
            .put(
                &format!("orders/{order_id}/items/{item_id}"),
                &UpdateItemStatusRequest { status },
            )
            .await?;
        expect_ack(ack, "item status update")
    }

    async fn void_item(
        &self,
        order_id: &OrderId,
        item_id: &ItemId,
        reason: &str,
    ) -> ClientResult<()> {
        let ack: Ack = self
            .http
            .delete_with_body(
                &format!("orders/{order_id}/items/{item_id}"),
                &VoidItemRequest {
                    reason: reason.to_string(),
                },
            )
            .await?;
        expect_ack(ack, "item void")
    }

    async fn remove_seat(&self, session_id: &SessionId, seat: SeatNumber) -> ClientResult<()> {
        let ack: Ack = self
            .http
            .delete_with_body(
                &format!("sessions/{session_id}/seats"),
                &RemoveSeatRequest { seat_number: seat },
            )
            .await?;
        expect_ack(ack, "seat removal")
    }

    async fn rename_seat(
        &self,
        session_id: &SessionId,
        seat: SeatNumber,
        new_seat: SeatNumber,
    ) -> ClientResult<()> {
        let ack: Ack = self
            .http
            .put(
                &format!("sessions/{session_id}/seats"),
                &RenameSeatRequest {
                    seat_number: seat,
                    new_seat_number: new_seat,
                },
            )
            .await?;
        expect_ack(ack, "seat rename")
    }

    async fn seat_guests(&self, session_id: &SessionId) -> ClientResult<Vec<SeatGuest>> {
        self.http.get(&format!("sessions/{session_id}/seats")).await
    }

    async fn menu_item(&self, menu_item_id: &MenuItemId) -> ClientResult<MenuEntry> {
        self.http.get(&format!("menu/items/{menu_item_id}")).await
    }

    async fn outstanding_items(&self, session_id: &SessionId) -> ClientResult<OutstandingItems> {
        self.http
            .get(&format!("sessions/{session_id}/outstanding"))
            .await
    }

    async fn kitchen_delays(&self, session_id: &SessionId) -> ClientResult<Vec<KitchenDelay>> {
        self.http.get(&format!("sessions/{session_id}/delays")).await
    }

    async fn record_event(&self, event: &TelemetryEvent) -> ClientResult<()> {
        let _: Ack = self.http.post("events", event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lookup_is_none() {
        let resp: ClientResult<Option<SessionId>> = Err(ClientError::NotFound("gone".into()));
        assert!(matches!(not_found_as_none(resp), Ok(None)));

        let resp: ClientResult<Option<SessionId>> = Err(ClientError::Internal("boom".into()));
        assert!(not_found_as_none(resp).is_err());
    }

    #[test]
    fn test_nack_is_error() {
        assert!(expect_ack(Ack { ok: true }, "fire").is_ok());
        assert!(matches!(
            expect_ack(Ack { ok: false }, "fire"),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_http_backend_keeps_location() {
        let backend =
            HttpBackend::new(&ClientConfig::new("http://localhost:8080").with_location("loc-2"))
                .unwrap();
        assert_eq!(backend.location_id().as_str(), "loc-2");
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }
}

//! Response payloads from the dine-in backend

use crate::error::{RejectReason, Rejection, RejectionDetail};
use crate::types::{ItemId, OrderId, SeatNumber, SessionId, WaveNumber};
use serde::{Deserialize, Serialize};

/// Plain acknowledgement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub ok: bool,
}

fn default_true() -> bool {
    true
}

/// `POST /sessions/ensure`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnsureSessionResponse {
    pub session_id: SessionId,
}

/// `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitItemsResponse {
    pub order_id: OrderId,
    pub session_id: SessionId,
    /// Server ids of the created items, in request line order
    #[serde(default)]
    pub added_item_ids: Vec<ItemId>,
}

/// Item the server refused to transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST /sessions/{id}/waves/{n}/advance`
///
/// An empty `failed` list means every item was applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceWaveResponse {
    #[serde(default)]
    pub failed: Vec<FailedItem>,
}

/// `POST /sessions/{id}/waves/next`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NextWaveResponse {
    pub wave_number: WaveNumber,
}

/// Open-session query by table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// Order-for-wave query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderForWaveResponse {
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// `POST /sessions/{id}/close`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub details: RejectionDetail,
}

impl CloseSessionResponse {
    /// The typed rejection carried by a `ok: false` response
    pub fn rejection(&self) -> Option<Rejection> {
        if self.ok {
            return None;
        }
        let reason = self
            .reason
            .clone()
            .unwrap_or_else(|| RejectReason::Other("unknown".into()));
        Some(Rejection {
            reason,
            message: self.message.clone(),
            details: self.details.clone(),
        })
    }
}

/// Seat-list query entry (seat number ↔ guest name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatGuest {
    pub seat_number: SeatNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
}

/// Outstanding-items validation query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingItems {
    pub count: u32,
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
}

impl OutstandingItems {
    pub fn is_clear(&self) -> bool {
        self.count == 0
    }
}

/// Kitchen-delay check entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitchenDelay {
    pub item_id: ItemId,
    pub wave_number: WaveNumber,
    /// Minutes past the expected ready time
    pub delayed_minutes: u32,
    /// Updated ETA hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
}

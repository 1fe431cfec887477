//! Request bodies for the dine-in backend

use crate::order::{AdvanceTarget, ItemStatus};
use crate::types::{
    IdempotencyKey, ItemId, LocationId, MenuItemId, SeatNumber, SessionId, TableId, Timestamp,
    WaveNumber,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `POST /sessions/ensure`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsureSessionRequest {
    pub table_id: TableId,
    pub location_id: LocationId,
    pub guest_count: u32,
    pub idempotency_key: IdempotencyKey,
}

/// One line of `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitItemLine {
    /// Menu item id
    pub item_id: MenuItemId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<SeatNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub wave_number: WaveNumber,
}

/// `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitItemsRequest {
    pub session_id: SessionId,
    pub items: Vec<SubmitItemLine>,
    pub idempotency_key: IdempotencyKey,
}

/// `POST /sessions/{id}/waves/{n}/advance`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceWaveRequest {
    pub to_status: AdvanceTarget,
}

/// `PUT /orders/{orderId}/items/{itemId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemStatusRequest {
    pub status: ItemStatus,
}

/// `DELETE /orders/{orderId}/items/{itemId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidItemRequest {
    pub reason: String,
}

/// `DELETE /sessions/{id}/seats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSeatRequest {
    pub seat_number: SeatNumber,
}

/// `PUT /sessions/{id}/seats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSeatRequest {
    pub seat_number: SeatNumber,
    pub new_seat_number: SeatNumber,
}

/// Payment collected at close
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: Decimal,
    #[serde(default)]
    pub tip_amount: Decimal,
    /// cash / card / ...
    pub method: String,
}

/// Close options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloseOptions {
    /// Close even with unfinished items (manager override)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

/// `POST /sessions/{id}/close`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionRequest {
    pub payment: Payment,
    pub options: CloseOptions,
    pub idempotency_key: IdempotencyKey,
}

/// Generic "record event" sink payload (fire-and-forget telemetry)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub name: String,
    pub table_id: TableId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_number: Option<WaveNumber>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_ids: Vec<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub at: Timestamp,
}

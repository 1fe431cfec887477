//! Dine-in session types

use crate::order::{ItemRecord, OrderItem};
use crate::types::{SeatNumber, SessionId, TableId, WaveNumber};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Table/session status as seen by the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 空桌
    #[default]
    Available,
    /// 已入座，未点单
    Seated,
    /// 点单中（有 held 菜品，未送厨）
    Ordering,
    /// 用餐中（至少一波已送厨）
    Dining,
    /// 已结账关闭
    Closed,
}

impl SessionStatus {
    pub fn is_open(self) -> bool {
        matches!(
            self,
            SessionStatus::Seated | SessionStatus::Ordering | SessionStatus::Dining
        )
    }
}

/// One seat of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub number: SeatNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    /// Dietary restriction tags (e.g. "vegan", "nut_allergy")
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Seat {
    pub fn new(number: SeatNumber) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Whether the seat still holds any non-void item
    pub fn has_active_items(&self) -> bool {
        self.items.iter().any(OrderItem::is_active)
    }
}

/// Running bill totals over non-void items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub subtotal: Decimal,
    pub item_count: u32,
}

/// Seat as returned by the backend session view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    pub number: SeatNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Full session as returned by the backend (hydration source)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub table_id: TableId,
    pub status: SessionStatus,
    pub guest_count: u32,
    #[serde(default = "default_wave_count")]
    pub wave_count: WaveNumber,
    #[serde(default)]
    pub seats: Vec<SeatRecord>,
    /// All items of the session; `seat_number = None` marks shared items
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

fn default_wave_count() -> WaveNumber {
    1
}

//! Order item types
//!
//! - [`ItemRecord`]: item as the backend returns it (wave may be missing or
//!   encoded in a legacy modifier tag)
//! - [`OrderItem`]: local item with a resolved, typed wave number
//! - [`DraftItem`]: item being composed before submission

use crate::order::status::ItemStatus;
use crate::types::{ItemId, MenuItemId, SeatNumber, WaveNumber};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order item as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub status: ItemStatus,
    /// Explicit wave number (newer records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_number: Option<WaveNumber>,
    /// Free-form modifiers; legacy records carry a "Wave N" tag here
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Menu category name snapshot (drinks / food / dessert ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Seat the item belongs to; `None` for shared items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<SeatNumber>,
    /// Kitchen ETA hint in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
}

fn default_quantity() -> u32 {
    1
}

/// Local order item
///
/// `wave` is resolved once when the item enters local state and never
/// changes after the item is fired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: ItemId,
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub wave: WaveNumber,
    pub status: ItemStatus,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
}

impl OrderItem {
    /// Line total (unit price × quantity)
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Item being composed on the client, not yet submitted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftItem {
    pub menu_item_id: MenuItemId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<SeatNumber>,
    /// Explicit wave choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_number: Option<WaveNumber>,
    /// Kitchen notes; older clients put the "Wave N" tag here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DraftItem {
    pub fn new(menu_item_id: impl Into<MenuItemId>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            quantity: 1,
            seat_number: None,
            wave_number: None,
            notes: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn for_seat(mut self, seat: SeatNumber) -> Self {
        self.seat_number = Some(seat);
        self
    }

    pub fn in_wave(mut self, wave: WaveNumber) -> Self {
        self.wave_number = Some(wave);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Menu catalog entry (catalog lookup result)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

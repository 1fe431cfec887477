//! Item and wave status types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order item status
///
/// ```text
/// held -> sent -> cooking -> ready -> served
/// held|sent|cooking|ready -> void
/// ```
///
/// `served` and `void` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// 已点单，未送厨
    #[default]
    Held,
    /// 已送厨
    Sent,
    /// 制作中
    Cooking,
    /// 出餐完成，待上桌
    Ready,
    /// 已上桌
    Served,
    /// 已作废
    Void,
}

impl ItemStatus {
    /// Kitchen-lifecycle order, `void` excluded
    pub const SEQUENCE: [ItemStatus; 5] = [
        ItemStatus::Held,
        ItemStatus::Sent,
        ItemStatus::Cooking,
        ItemStatus::Ready,
        ItemStatus::Served,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Served | ItemStatus::Void)
    }

    /// Counts toward seats, waves and the bill
    pub fn is_active(self) -> bool {
        self != ItemStatus::Void
    }

    /// The status immediately before this one in the kitchen lifecycle
    pub fn predecessor(self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Sent => Some(ItemStatus::Held),
            ItemStatus::Cooking => Some(ItemStatus::Sent),
            ItemStatus::Ready => Some(ItemStatus::Cooking),
            ItemStatus::Served => Some(ItemStatus::Ready),
            ItemStatus::Held | ItemStatus::Void => None,
        }
    }

    /// The status immediately after this one in the kitchen lifecycle
    pub fn successor(self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Held => Some(ItemStatus::Sent),
            ItemStatus::Sent => Some(ItemStatus::Cooking),
            ItemStatus::Cooking => Some(ItemStatus::Ready),
            ItemStatus::Ready => Some(ItemStatus::Served),
            ItemStatus::Served | ItemStatus::Void => None,
        }
    }

    /// Whether `self -> next` is a legal single step
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        if next == ItemStatus::Void {
            return !self.is_terminal();
        }
        self.successor() == Some(next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Held => "held",
            ItemStatus::Sent => "sent",
            ItemStatus::Cooking => "cooking",
            ItemStatus::Ready => "ready",
            ItemStatus::Served => "served",
            ItemStatus::Void => "void",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a wave advance. Only the kitchen stages after firing are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceTarget {
    Cooking,
    Ready,
    Served,
}

impl AdvanceTarget {
    pub fn status(self) -> ItemStatus {
        match self {
            AdvanceTarget::Cooking => ItemStatus::Cooking,
            AdvanceTarget::Ready => ItemStatus::Ready,
            AdvanceTarget::Served => ItemStatus::Served,
        }
    }

    /// Items must currently hold this status to be advanced
    pub fn required_status(self) -> ItemStatus {
        match self {
            AdvanceTarget::Cooking => ItemStatus::Sent,
            AdvanceTarget::Ready => ItemStatus::Cooking,
            AdvanceTarget::Served => ItemStatus::Ready,
        }
    }
}

impl TryFrom<ItemStatus> for AdvanceTarget {
    type Error = ItemStatus;

    fn try_from(status: ItemStatus) -> Result<Self, Self::Error> {
        match status {
            ItemStatus::Cooking => Ok(AdvanceTarget::Cooking),
            ItemStatus::Ready => Ok(AdvanceTarget::Ready),
            ItemStatus::Served => Ok(AdvanceTarget::Served),
            other => Err(other),
        }
    }
}

impl fmt::Display for AdvanceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status().fmt(f)
    }
}

/// Aggregate status of one wave, as shown to staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Held,
    Fired,
    Preparing,
    Ready,
    Served,
}

impl fmt::Display for WaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WaveStatus::Held => "held",
            WaveStatus::Fired => "fired",
            WaveStatus::Preparing => "preparing",
            WaveStatus::Ready => "ready",
            WaveStatus::Served => "served",
        };
        f.write_str(s)
    }
}

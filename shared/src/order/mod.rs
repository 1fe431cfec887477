//! Order item module
//!
//! - Status: item lifecycle and wave aggregate status
//! - Items: backend records, local items, drafts, catalog entries

pub mod item;
pub mod status;

// Re-exports
pub use item::{DraftItem, ItemRecord, MenuEntry, OrderItem};
pub use status::{AdvanceTarget, ItemStatus, WaveStatus};

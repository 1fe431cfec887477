//! Shared types for the dine-in order engine
//!
//! Domain types, identifiers, typed rejection reasons and the request/response
//! contracts of the dine-in backend. No I/O lives here.

pub mod error;
pub mod order;
pub mod request;
pub mod response;
pub mod session;
pub mod types;
pub mod util;

// Re-exports
pub use error::{RejectReason, Rejection, RejectionDetail};
pub use order::{AdvanceTarget, DraftItem, ItemRecord, ItemStatus, MenuEntry, OrderItem, WaveStatus};
pub use session::{Bill, Seat, SeatRecord, SessionStatus, SessionView};
pub use types::{
    IdempotencyKey, ItemId, LocationId, MenuItemId, OrderId, SeatNumber, SessionId, TableId,
    Timestamp, WaveNumber,
};

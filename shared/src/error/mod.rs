//! Typed rejection reasons
//!
//! Business rejections are never generic errors: every refusal carries a
//! [`RejectReason`] code plus optional structured detail, and renders a
//! human-readable message via [`Rejection::user_message`].
//!
//! # Sources
//!
//! - Backend validation: `unfinished_items`, `unpaid_balance`, `invalid_tip`,
//!   `payment_in_progress`, `kitchen_mid_fire`, `session_not_open`,
//!   `seat_has_items`, `seat_number_taken`
//! - Local preconditions: `last_seat`, `wave_has_items`, `not_last_wave`,
//!   `seat_has_items`

mod reason;

pub use reason::{RejectReason, Rejection, RejectionDetail};

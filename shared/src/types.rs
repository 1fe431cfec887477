//! Common identifier types
//!
//! Newtype wrappers so table, session, item and order ids cannot be mixed up
//! at call sites. All of them serialize as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Seat number, unique and positive within a session
pub type SeatNumber = u32;

/// Wave number, starts at 1
pub type WaveNumber = u32;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Physical table id (assigned by floor-plan configuration)
    TableId
);
string_id!(
    /// Backend session id
    SessionId
);
string_id!(
    /// Order item id: a server UUID once persisted, a `draft-` id before
    ItemId
);
string_id!(
    /// Backend order record id
    OrderId
);
string_id!(
    /// Menu catalog item id
    MenuItemId
);
string_id!(
    /// Restaurant location id
    LocationId
);

impl ItemId {
    const DRAFT_PREFIX: &'static str = "draft-";

    /// Generate a local id for an item that has not been persisted yet
    pub fn draft() -> Self {
        Self(format!("{}{}", Self::DRAFT_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Whether this id was generated locally and never confirmed by the backend
    pub fn is_draft(&self) -> bool {
        self.0.starts_with(Self::DRAFT_PREFIX)
    }
}

/// Caller-generated token that makes a resource-creating request safe to retry.
///
/// Generate one per logical operation and reuse it for every retry of that
/// same operation. Never share a key between two distinct operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdempotencyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_ids_are_unique_and_marked() {
        let a = ItemId::draft();
        let b = ItemId::draft();
        assert_ne!(a, b);
        assert!(a.is_draft());
        assert!(!ItemId::new("5f0c2d9e-0000-4000-8000-000000000001").is_draft());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = SessionId::new("sess-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sess-1\"");
        let key = IdempotencyKey::from("k-1");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"k-1\"");
    }
}

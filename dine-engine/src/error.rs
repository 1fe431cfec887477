//! Engine errors and user-facing notices

use dine_client::ClientError;
use serde::Serialize;
use shared::{ItemId, ItemStatus, Rejection, SeatNumber, TableId, WaveNumber};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Typed refusal, from a local precondition or the backend
    #[error("{}", .0.user_message())]
    Rejected(Rejection),

    #[error("No open session for table {0}")]
    NoSession(TableId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Seat {0} not found")]
    SeatNotFound(SeatNumber),

    #[error("Wave {0} is not a valid wave number")]
    InvalidWave(WaveNumber),

    #[error("Item {item} cannot go from {from} to {to}")]
    InvalidTransition {
        item: ItemId,
        from: ItemStatus,
        to: ItemStatus,
    },

    #[error(transparent)]
    Client(ClientError),
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(rejection) => EngineError::Rejected(rejection),
            other => EngineError::Client(other),
        }
    }
}

impl From<Rejection> for EngineError {
    fn from(rejection: Rejection) -> Self {
        EngineError::Rejected(rejection)
    }
}

impl EngineError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(r) => Some(r),
            _ => None,
        }
    }

    /// Dismissible notice scoped to the attempted action
    pub fn notice(&self, action: Action) -> Notice {
        let message = match self {
            EngineError::Client(err) if err.is_transport() => {
                "Could not reach the server, please try again".to_string()
            }
            other => other.to_string(),
        };
        Notice { action, message }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// User-triggered action a notice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SeatParty,
    SubmitItems,
    FireWave,
    AdvanceWave,
    AddWave,
    RemoveWave,
    ServeItem,
    VoidItem,
    AddSeat,
    RemoveSeat,
    RenameSeat,
    CloseSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub action: Action,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RejectReason;

    #[test]
    fn test_backend_rejection_is_lifted() {
        let err: EngineError =
            ClientError::Rejected(Rejection::new(RejectReason::KitchenMidFire)).into();
        assert_eq!(err.rejection().unwrap().reason, RejectReason::KitchenMidFire);

        let err: EngineError = ClientError::NotFound("x".into()).into();
        assert!(matches!(err, EngineError::Client(ClientError::NotFound(_))));
    }

    #[test]
    fn test_notice_messages() {
        let err = EngineError::Rejected(
            Rejection::new(RejectReason::SeatHasItems).with_message("Seat 2 has 1 item on the server"),
        );
        let notice = err.notice(Action::RemoveSeat);
        assert_eq!(notice.action, Action::RemoveSeat);
        assert_eq!(notice.message, "Seat 2 has 1 item on the server");

        let err = EngineError::Client(ClientError::Transport("reset".into()));
        assert_eq!(
            err.notice(Action::AdvanceWave).message,
            "Could not reach the server, please try again"
        );
    }
}

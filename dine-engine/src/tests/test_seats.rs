use super::*;
use crate::error::{Action, EngineError};

#[tokio::test]
async fn test_add_seat_is_local_and_uses_max_plus_one() {
    let (backend, engine) = seated(2).await;
    let calls_before = backend.calls().len();

    assert_eq!(engine.add_seat().unwrap(), 3);
    engine.rename_seat(3, 7).await.unwrap();
    assert_eq!(engine.add_seat().unwrap(), 8);

    let store = engine.store();
    assert_eq!(store.seat_numbers(), vec![1, 2, 7, 8]);
    assert_eq!(store.guest_count(), 4);
    // only the rename reached the backend
    assert_eq!(backend.calls().len(), calls_before + 1);
}

#[tokio::test]
async fn test_remove_seat_with_held_item_is_refused_locally() {
    let (backend, engine) = seated(2).await;
    order(&engine, vec![DraftItem::new("m-wine").for_seat(2)]).await;

    let err = engine.remove_seat(2).await.unwrap_err();

    assert_eq!(err.rejection().unwrap().reason, RejectReason::SeatHasItems);
    assert_eq!(
        err.notice(Action::RemoveSeat).message,
        "Seat 2 still has items and cannot be removed"
    );
    assert_eq!(backend.count(|c| matches!(c, Call::RemoveSeat(..))), 0);
    assert_eq!(engine.store().seats().len(), 2);
}

#[tokio::test]
async fn test_remove_empty_seat_confirms_with_backend() {
    let (backend, engine) = seated(3).await;
    let voided = order(&engine, vec![DraftItem::new("m-wine").for_seat(2)]).await;
    engine.void_item(&voided[0], "wrong seat").await.unwrap();

    let removed = engine.remove_seat(2).await.unwrap();

    assert_eq!(removed.number, 2);
    assert_eq!(engine.store().seat_numbers(), vec![1, 3]);
    assert_eq!(engine.store().guest_count(), 2);
    assert_eq!(
        backend.count(|c| *c == Call::RemoveSeat(SessionId::new("s-1"), 2)),
        1
    );
}

#[tokio::test]
async fn test_backend_refusal_aborts_removal_with_verbatim_message() {
    let (backend, engine) = seated(2).await;
    backend.reject_next(
        "remove_seat",
        rejection(RejectReason::SeatHasItems)
            .with_message("Seat 2 has 1 item ordered from another terminal"),
    );

    let err = engine.remove_seat(2).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Seat 2 has 1 item ordered from another terminal"
    );
    assert_eq!(engine.store().seat_numbers(), vec![1, 2]);
}

#[tokio::test]
async fn test_last_seat_cannot_be_removed() {
    let (backend, engine) = seated(1).await;
    let err = engine.remove_seat(1).await.unwrap_err();
    assert_eq!(err.rejection().unwrap().reason, RejectReason::LastSeat);
    assert_eq!(backend.count(|c| matches!(c, Call::RemoveSeat(..))), 0);

    let err = engine.remove_seat(4).await.unwrap_err();
    assert_eq!(
        err.rejection().unwrap().reason,
        RejectReason::Other("seat_not_found".into())
    );
}

#[tokio::test]
async fn test_rename_to_number_taken_on_backend_is_refused() {
    let (backend, engine) = seated(5).await;
    backend.reject_next(
        "rename_seat",
        rejection(RejectReason::SeatNumberTaken).with_details(shared::RejectionDetail {
            seat_number: Some(6),
            ..Default::default()
        }),
    );

    let err = engine.rename_seat(2, 6).await.unwrap_err();

    assert!(matches!(&err, EngineError::Rejected(r) if r.reason == RejectReason::SeatNumberTaken));
    assert_eq!(err.to_string(), "Seat number 6 is already in use");
    assert_eq!(
        backend.count(|c| *c == Call::RenameSeat(SessionId::new("s-1"), 2, 6)),
        1
    );
    assert_eq!(engine.store().seat_numbers(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_rename_onto_locally_added_seat_is_refused_before_backend() {
    let (backend, engine) = seated(2).await;
    assert_eq!(engine.add_seat().unwrap(), 3);

    let err = engine.rename_seat(2, 3).await.unwrap_err();

    assert_eq!(err.rejection().unwrap().reason, RejectReason::SeatNumberTaken);
    assert_eq!(err.to_string(), "Seat number 3 is already in use");
    assert_eq!(backend.count(|c| matches!(c, Call::RenameSeat(..))), 0);
    assert_eq!(engine.store().seat_numbers(), vec![1, 2, 3]);

    // renaming the new seat itself still goes through
    engine.rename_seat(3, 4).await.unwrap();
    assert_eq!(engine.store().seat_numbers(), vec![1, 2, 4]);
}

#[tokio::test]
async fn test_rename_unknown_seat_is_refused_before_backend() {
    let (backend, engine) = seated(2).await;

    let err = engine.rename_seat(7, 8).await.unwrap_err();

    assert_eq!(
        err.rejection().unwrap().reason,
        RejectReason::Other("seat_not_found".into())
    );
    assert_eq!(backend.count(|c| matches!(c, Call::RenameSeat(..))), 0);
}

#[tokio::test]
async fn test_add_seat_after_highest_number_is_refused() {
    let (_backend, engine) = seated(1).await;
    engine.rename_seat(1, SeatNumber::MAX).await.unwrap();

    let err = engine.add_seat().unwrap_err();

    assert_eq!(
        err.rejection().unwrap().reason,
        RejectReason::Other("seat_number_exhausted".into())
    );
    assert_eq!(engine.store().seat_numbers(), vec![SeatNumber::MAX]);
    assert!(engine.store().seats_are_valid());
}

#[tokio::test]
async fn test_rename_moves_items_with_the_seat() {
    let (_backend, engine) = seated(2).await;
    let ids = order(&engine, vec![DraftItem::new("m-steak").for_seat(1)]).await;

    engine.rename_seat(1, 4).await.unwrap();

    let store = engine.store();
    assert_eq!(store.seat_numbers(), vec![2, 4]);
    assert_eq!(store.seat(4).unwrap().items[0].id, ids[0]);
}

#[tokio::test]
async fn test_seat_operations_without_session_stay_local() {
    let backend = MockBackend::new();
    let engine = create_test_engine(&backend);
    engine.add_seat().unwrap();
    engine.add_seat().unwrap();

    engine.rename_seat(2, 6).await.unwrap();
    engine.remove_seat(1).await.unwrap();

    assert_eq!(engine.store().seat_numbers(), vec![6]);
    assert_eq!(
        backend.count(|c| matches!(c, Call::RemoveSeat(..) | Call::RenameSeat(..))),
        0
    );
}

#[tokio::test]
async fn test_refresh_seat_guests() {
    let (backend, engine) = seated(2).await;
    backend.set_seat_guests(vec![
        SeatGuest {
            seat_number: 1,
            guest_name: Some("Ana".into()),
        },
        SeatGuest {
            seat_number: 9,
            guest_name: Some("Nobody".into()),
        },
    ]);

    assert_eq!(engine.refresh_seat_guests().await.unwrap(), 1);
    assert_eq!(engine.store().seat(1).unwrap().guest_name.as_deref(), Some("Ana"));
    assert!(engine.store().seat(9).is_none());
}

#[tokio::test]
async fn test_seat_numbers_stay_unique_and_positive() {
    let (backend, engine) = seated(3).await;
    order(&engine, vec![DraftItem::new("m-wine").for_seat(3)]).await;
    backend.reject_next("rename_seat", rejection(RejectReason::SeatNumberTaken));

    let _ = engine.rename_seat(1, 3).await;
    assert!(engine.store().seats_are_valid());
    let _ = engine.rename_seat(1, 7).await;
    assert!(engine.store().seats_are_valid());
    let _ = engine.remove_seat(3).await;
    assert!(engine.store().seats_are_valid());
    engine.add_seat().unwrap();
    assert!(engine.store().seats_are_valid());
    let _ = engine.rename_seat(2, 0).await;
    assert!(engine.store().seats_are_valid());
    engine.remove_seat(2).await.unwrap_or_default();
    assert!(engine.store().seats_are_valid());
    engine.rename_seat(4, 2).await.unwrap();
    assert!(engine.store().seats_are_valid());

    let numbers = engine.store().seat_numbers();
    assert!(numbers.iter().all(|n| *n >= 1));
    assert_eq!(numbers, vec![1, 2, 3]);
}

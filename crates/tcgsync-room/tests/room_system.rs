//! Integration tests for room actors and the registry.

use std::sync::Arc;
use std::time::Duration;

use tcgsync_protocol::ServerEvent;
use tcgsync_room::{
    MemberSender, Mutation, RoomConfig, RoomError, RoomHandle, RoomRegistry,
};
use tcgsync_state::{PlayerKey, RoomCode, Slot, Unit, UnitPatch};
use tcgsync_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Inbox = mpsc::UnboundedReceiver<Arc<ServerEvent>>;

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

fn member() -> (MemberSender, Inbox) {
    mpsc::unbounded_channel()
}

/// Waits for the next event, failing the test after a second.
async fn next(inbox: &mut Inbox) -> ServerEvent {
    let event = tokio::time::timeout(Duration::from_secs(1), inbox.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("room dropped the sender");
    (*event).clone()
}

/// Waits until the room has processed everything queued so far, then
/// returns whatever is sitting in `inbox`.
async fn settle(room: &RoomHandle, inbox: &mut Inbox) -> Vec<ServerEvent> {
    room.snapshot().await.unwrap();
    let mut out = Vec::new();
    while let Ok(event) = inbox.try_recv() {
        out.push((*event).clone());
    }
    out
}

fn room(code: &str) -> (RoomRegistry, RoomHandle) {
    let mut registry = RoomRegistry::default();
    let handle = registry.get_or_create(RoomCode::normalize(code)).unwrap();
    (registry, handle)
}

fn place(name: &str, hp: u32) -> UnitPatch {
    UnitPatch {
        name: Some(name.into()),
        max_hp: Some(hp),
        current_hp: Some(i64::from(hp)),
        ..UnitPatch::default()
    }
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_first_two_joiners_take_seats_in_order() {
    let (_registry, room) = room("abc");
    let (tx1, mut rx1) = member();
    let (tx2, mut rx2) = member();

    let seat1 = room.join(cid(1), "Ash".into(), tx1).await.unwrap();
    let seat2 = room.join(cid(2), "Misty".into(), tx2).await.unwrap();

    assert_eq!(seat1, Some(PlayerKey::Player1));
    assert_eq!(seat2, Some(PlayerKey::Player2));

    let game = room.snapshot().await.unwrap();
    assert!(game.player1.connected);
    assert_eq!(game.player1.connection_id, Some(cid(1)));
    assert_eq!(game.player1.display_name, "Ash");
    assert_eq!(game.player2.display_name, "Misty");

    // The joiner hears about its seat before the room-wide update.
    match next(&mut rx1).await {
        ServerEvent::PlayerAssigned {
            player, room_id, ..
        } => {
            assert_eq!(player, Some(PlayerKey::Player1));
            assert_eq!(room_id.as_str(), "ABC");
        }
        other => panic!("expected PlayerAssigned, got {other:?}"),
    }
    assert!(matches!(next(&mut rx1).await, ServerEvent::GameStateUpdate(_)));
    // ...and the second join's update reaches the first member too.
    assert!(matches!(next(&mut rx1).await, ServerEvent::GameStateUpdate(_)));

    assert!(matches!(
        next(&mut rx2).await,
        ServerEvent::PlayerAssigned { player: Some(PlayerKey::Player2), .. }
    ));
}

#[tokio::test]
async fn test_third_joiner_spectates_and_still_hears_broadcasts() {
    let (_registry, room) = room("full");
    room.join(cid(1), "A".into(), member().0).await.unwrap();
    room.join(cid(2), "B".into(), member().0).await.unwrap();

    let (tx3, mut rx3) = member();
    let seat = room.join(cid(3), "C".into(), tx3).await.unwrap();
    assert_eq!(seat, None);

    assert!(matches!(
        next(&mut rx3).await,
        ServerEvent::PlayerAssigned { player: None, .. }
    ));
    assert!(matches!(next(&mut rx3).await, ServerEvent::GameStateUpdate(_)));

    room.mutate(cid(1), Mutation::Reset, member().0).await.unwrap();
    assert!(matches!(next(&mut rx3).await, ServerEvent::GameStateUpdate(_)));

    let game = room.snapshot().await.unwrap();
    assert_eq!(game.player1.display_name, "A");
    assert_eq!(game.player2.display_name, "B");
}

#[tokio::test]
async fn test_rejoining_connection_keeps_its_seat() {
    let (_registry, room) = room("again");
    room.join(cid(1), "Ash".into(), member().0).await.unwrap();

    let seat = room.join(cid(1), "Ash Ketchum".into(), member().0).await.unwrap();

    assert_eq!(seat, Some(PlayerKey::Player1));
    let game = room.snapshot().await.unwrap();
    assert!(!game.player2.connected);
    assert_eq!(game.player1.display_name, "Ash Ketchum");
}

#[tokio::test]
async fn test_vacated_seat_is_reclaimed_with_its_board() {
    let (_registry, room) = room("reclaim");
    room.join(cid(1), "Ash".into(), member().0).await.unwrap();
    room.join(cid(2), "Gary".into(), member().0).await.unwrap();
    room.mutate(
        cid(1),
        Mutation::ReplaceUnit {
            player: PlayerKey::Player1,
            slot: Slot::Active,
            patch: place("Pikachu", 60),
        },
        member().0,
    )
    .await
    .unwrap();

    room.leave(cid(1)).await.unwrap();
    let seat = room.join(cid(7), "Brock".into(), member().0).await.unwrap();

    assert_eq!(seat, Some(PlayerKey::Player1));
    let game = room.snapshot().await.unwrap();
    assert_eq!(game.player1.connection_id, Some(cid(7)));
    assert_eq!(game.player1.active, Unit::new("Pikachu", 60));
}

// =========================================================================
// Mutations and broadcast
// =========================================================================

#[tokio::test]
async fn test_knockout_broadcast_sequence() {
    let (_registry, room) = room("ko");
    let (tx1, mut rx1) = member();
    let (tx2, mut rx2) = member();
    room.join(cid(1), "Ash".into(), tx1.clone()).await.unwrap();
    room.join(cid(2), "Gary".into(), tx2).await.unwrap();
    room.mutate(
        cid(1),
        Mutation::ReplaceUnit {
            player: PlayerKey::Player1,
            slot: Slot::Active,
            patch: place("Pikachu", 60),
        },
        tx1.clone(),
    )
    .await
    .unwrap();
    settle(&room, &mut rx1).await;
    settle(&room, &mut rx2).await;

    room.mutate(
        cid(2),
        Mutation::ApplyDamage {
            player: PlayerKey::Player1,
            slot: Slot::Active,
            damage: 70,
            attacker: Some(PlayerKey::Player2),
        },
        tx1,
    )
    .await
    .unwrap();

    for inbox in [&mut rx1, &mut rx2] {
        let events = settle(&room, inbox).await;
        assert_eq!(events.len(), 2, "{events:?}");
        let ServerEvent::GameStateUpdate(game) = &events[0] else {
            panic!("expected GameStateUpdate, got {:?}", events[0]);
        };
        assert!(!game.player1.active.is_occupied());
        assert_eq!(game.player2.prize_cards, 5);

        let ServerEvent::KnockoutsOccurred { knockouts } = &events[1] else {
            panic!("expected KnockoutsOccurred, got {:?}", events[1]);
        };
        assert_eq!(knockouts.len(), 1);
        assert_eq!(knockouts[0].unit_name, "Pikachu");
        assert_eq!(knockouts[0].credited_player, PlayerKey::Player2);
    }
}

#[tokio::test]
async fn test_prize_cards_to_zero_broadcasts_game_ended() {
    let (_registry, room) = room("end");
    let (tx, mut rx) = member();
    room.join(cid(1), "Ash".into(), tx.clone()).await.unwrap();
    settle(&room, &mut rx).await;

    room.mutate(
        cid(1),
        Mutation::SetPrizeCards {
            player: PlayerKey::Player2,
            prize_cards: 0,
        },
        tx,
    )
    .await
    .unwrap();

    let events = settle(&room, &mut rx).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[1], ServerEvent::GameEnded {
        winner: Some(PlayerKey::Player1),
    });
}

#[tokio::test]
async fn test_rejected_mutation_only_answers_the_sender() {
    let (_registry, room) = room("bad");
    let (tx1, mut rx1) = member();
    let (tx2, mut rx2) = member();
    room.join(cid(1), "Ash".into(), tx1.clone()).await.unwrap();
    room.join(cid(2), "Gary".into(), tx2).await.unwrap();
    settle(&room, &mut rx1).await;
    settle(&room, &mut rx2).await;
    let before = room.snapshot().await.unwrap();

    room.mutate(
        cid(1),
        Mutation::SwapActiveBench {
            player: PlayerKey::Player1,
            bench_index: 9,
        },
        tx1,
    )
    .await
    .unwrap();

    let events = settle(&room, &mut rx1).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ServerEvent::Error { code: 400, .. }));
    assert!(settle(&room, &mut rx2).await.is_empty());
    assert_eq!(room.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn test_mutations_apply_in_arrival_order() {
    let (_registry, room) = room("order");
    let (tx, _rx) = member();
    room.mutate(
        cid(1),
        Mutation::ReplaceUnit {
            player: PlayerKey::Player2,
            slot: Slot::Active,
            patch: place("Snorlax", 150),
        },
        tx.clone(),
    )
    .await
    .unwrap();

    for _ in 0..14 {
        room.mutate(
            cid(1),
            Mutation::ApplyDamage {
                player: PlayerKey::Player2,
                slot: Slot::Active,
                damage: 10,
                attacker: Some(PlayerKey::Player1),
            },
            tx.clone(),
        )
        .await
        .unwrap();
    }
    let game = room.snapshot().await.unwrap();
    assert_eq!(game.player2.active.current_hp, 10);
    assert!(game.knockout_log.is_empty());

    room.mutate(
        cid(1),
        Mutation::ApplyDamage {
            player: PlayerKey::Player2,
            slot: Slot::Active,
            damage: 10,
            attacker: Some(PlayerKey::Player1),
        },
        tx,
    )
    .await
    .unwrap();
    let game = room.snapshot().await.unwrap();
    assert_eq!(game.knockout_log.len(), 1);
    assert_eq!(game.player1.prize_cards, 5);
}

// =========================================================================
// Leaving
// =========================================================================

#[tokio::test]
async fn test_leave_vacates_seat_and_notifies_the_rest() {
    let (_registry, room) = room("bye");
    let (tx1, _rx1) = member();
    let (tx2, mut rx2) = member();
    room.join(cid(1), "Ash".into(), tx1).await.unwrap();
    room.join(cid(2), "Gary".into(), tx2).await.unwrap();
    settle(&room, &mut rx2).await;

    room.leave(cid(1)).await.unwrap();

    let events = settle(&room, &mut rx2).await;
    assert_eq!(events.len(), 1);
    let ServerEvent::GameStateUpdate(game) = &events[0] else {
        panic!("expected GameStateUpdate, got {:?}", events[0]);
    };
    assert!(!game.player1.connected);
    assert_eq!(game.player1.connection_id, None);
    assert_eq!(game.player1.display_name, "Ash");
    assert!(game.player2.connected);
}

#[tokio::test]
async fn test_spectator_leaving_is_silent() {
    let (_registry, room) = room("quiet");
    let (tx1, mut rx1) = member();
    room.join(cid(1), "A".into(), tx1).await.unwrap();
    room.join(cid(2), "B".into(), member().0).await.unwrap();
    room.join(cid(3), "C".into(), member().0).await.unwrap();
    settle(&room, &mut rx1).await;

    room.leave(cid(3)).await.unwrap();

    assert!(settle(&room, &mut rx1).await.is_empty());
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_case_insensitive_ids_reach_the_same_match() {
    let mut registry = RoomRegistry::default();
    let lower = registry.normalize(Some("abc"));
    let room = registry.get_or_create(lower).unwrap();
    room.join(cid(1), "Ash".into(), member().0).await.unwrap();

    let upper = registry.normalize(Some("ABC"));
    let same = registry.resolve(&upper).expect("room should exist");
    same.mutate(
        cid(1),
        Mutation::Heal {
            player: PlayerKey::Player1,
            slot: Slot::Active,
            amount: 1,
        },
        member().0,
    )
    .await
    .unwrap();

    let game = room.snapshot().await.unwrap();
    assert_eq!(game.player1.display_name, "Ash");
    assert_eq!(registry.room_count(), 1);
}

#[tokio::test]
async fn test_generated_codes_are_fresh_rooms() {
    let mut registry = RoomRegistry::default();
    let code = registry.normalize(None);
    assert!(registry.resolve(&code).is_none());

    let room = registry.get_or_create(code.clone()).unwrap();
    assert_eq!(room.room_id(), &code);
    assert_eq!(room.snapshot().await.unwrap().room_id, code);
}

#[tokio::test]
async fn test_closing_the_registry_stops_every_room() {
    let mut registry = RoomRegistry::default();
    let code = RoomCode::normalize("gone");
    let room = registry.get_or_create(code.clone()).unwrap();
    let (tx, _rx) = member();
    room.join(cid(1), "Ash".into(), tx.clone()).await.unwrap();

    for handle in registry.close() {
        handle.shutdown().await.unwrap();
    }

    let err = room.snapshot().await.unwrap_err();
    assert!(matches!(err, RoomError::Unavailable(ref c) if *c == code));

    // Known rooms still resolve, but only to the stopped actor.
    let stale = registry.resolve(&code).unwrap();
    let err = stale
        .mutate(cid(1), Mutation::Reset, tx)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Unavailable(_)));
    assert!(registry.get_or_create(code).is_ok_and(|h| h.is_closed()));
    assert!(registry.get_or_create(RoomCode::normalize("later")).is_err());
}

#[tokio::test]
async fn test_configured_prize_count_applies_to_new_rooms() {
    let mut registry = RoomRegistry::new(RoomConfig {
        starting_prize_cards: 3,
        ..RoomConfig::default()
    });
    let room = registry.get_or_create(RoomCode::normalize("short")).unwrap();

    let game = room.snapshot().await.unwrap();
    assert_eq!(game.player1.prize_cards, 3);
    assert_eq!(game.player2.prize_cards, 3);
}

//! Integration tests for `RoomStore` against the in-memory store.

use std::sync::Arc;

use parlor_protocol::GameMode;
use parlor_room::{Departure, RoomError, RoomStore, RoomUpdate};
use parlor_store::{MemoryStore, StateStore, keys};

fn setup() -> (RoomStore, Arc<MemoryStore>) {
    let mem = Arc::new(MemoryStore::new());
    let store: Arc<dyn StateStore> = mem.clone();
    (RoomStore::new(store), mem)
}

// =========================================================================
// create / get
// =========================================================================

#[tokio::test]
async fn test_create_persists_host_as_only_member() {
    let (rooms, _) = setup();
    let room = rooms
        .create("r1", "host", "lobby", None, 4, GameMode::Hanabi)
        .await
        .unwrap();

    assert_eq!(room.players, vec!["host"]);
    assert_eq!(room.host_id, "host");
    assert!(!room.has_password());

    let loaded = rooms.get("r1").await.unwrap().unwrap();
    assert_eq!(loaded, room, "stored room matches field for field");
}

#[tokio::test]
async fn test_create_clamps_max_players_to_two() {
    let (rooms, _) = setup();
    let room = rooms
        .create("r1", "host", "tiny", None, 0, GameMode::Hanabi)
        .await
        .unwrap();
    assert_eq!(room.max_players, 2);
}

#[tokio::test]
async fn test_create_clamps_max_players_to_mode_limit() {
    let (rooms, _) = setup();
    let room = rooms
        .create("r1", "host", "crowd", None, 12, GameMode::Hanabi)
        .await
        .unwrap();
    assert_eq!(room.max_players, GameMode::Hanabi.max_players());
}

#[tokio::test]
async fn test_create_treats_empty_password_as_none() {
    let (rooms, _) = setup();
    let room = rooms
        .create("r1", "host", "open", Some(""), 4, GameMode::Hanabi)
        .await
        .unwrap();
    assert!(!room.has_password());
}

#[tokio::test]
async fn test_require_missing_room_is_not_found() {
    let (rooms, _) = setup();
    let err = rooms.require("nope").await.unwrap_err();
    assert!(matches!(err, RoomError::NotFound(id) if id == "nope"));
}

// =========================================================================
// join
// =========================================================================

#[tokio::test]
async fn test_join_second_player_fills_two_seat_room() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "duo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();

    assert!(rooms.join(&mut room, "b", None).await.unwrap());

    let loaded = rooms.require("r1").await.unwrap();
    assert_eq!(loaded.players, vec!["a", "b"]);
}

#[tokio::test]
async fn test_join_full_room_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "duo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();

    let err = rooms.join(&mut room, "c", None).await.unwrap_err();
    assert!(matches!(err, RoomError::RoomFull(_)));
    assert_eq!(room.players.len(), 2);
}

#[tokio::test]
async fn test_join_never_exceeds_capacity() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "p0", "busy", None, 3, GameMode::Hanabi)
        .await
        .unwrap();

    for i in 1..10 {
        let _ = rooms.join(&mut room, &format!("p{i}"), None).await;
        assert!(room.players.len() <= room.max_players);
    }
    assert_eq!(room.players.len(), 3);
}

#[tokio::test]
async fn test_join_existing_member_is_idempotent() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "duo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();

    // Full, but b is already in: still success, no duplicate.
    assert!(rooms.join(&mut room, "b", None).await.unwrap());
    assert_eq!(room.players, vec!["a", "b"]);
}

#[tokio::test]
async fn test_join_wrong_password_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "locked", Some("pw"), 4, GameMode::Hanabi)
        .await
        .unwrap();

    let err = rooms.join(&mut room, "b", Some("guess")).await.unwrap_err();
    assert!(matches!(err, RoomError::WrongPassword(_)));
    let err = rooms.join(&mut room, "b", None).await.unwrap_err();
    assert!(matches!(err, RoomError::WrongPassword(_)));

    assert!(rooms.join(&mut room, "b", Some("pw")).await.unwrap());
}

#[tokio::test]
async fn test_join_started_room_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "busy", None, 4, GameMode::Hanabi)
        .await
        .unwrap();
    room.set_started(true);

    let err = rooms.join(&mut room, "b", None).await.unwrap_err();
    assert!(matches!(err, RoomError::GameInProgress(_)));
}

// =========================================================================
// leave / kick
// =========================================================================

#[tokio::test]
async fn test_leave_as_host_promotes_first_remaining() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "trio", None, 3, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();
    rooms.join(&mut room, "c", None).await.unwrap();

    let out = rooms.leave(&mut room, "a").await.unwrap();
    assert_eq!(out, Departure::Remaining { new_host: Some("b".into()) });

    let loaded = rooms.require("r1").await.unwrap();
    assert_eq!(loaded.host_id, "b");
    assert_eq!(loaded.players, vec!["b", "c"]);
}

#[tokio::test]
async fn test_leave_last_member_deletes_room_and_dependents() {
    let (rooms, mem) = setup();
    let mut room = rooms
        .create("r1", "a", "solo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();
    mem.set_add(&keys::room_sessions("r1"), "a").await.unwrap();
    mem.set(&keys::game_state("hanabi", "r1"), "{}", None).await.unwrap();
    mem.list_push_capped(&keys::chat("r1"), "hi", 10).await.unwrap();

    let out = rooms.leave(&mut room, "a").await.unwrap();
    assert_eq!(out, Departure::Deleted);

    assert!(rooms.get("r1").await.unwrap().is_none());
    assert!(mem.set_members(&keys::room_sessions("r1")).await.unwrap().is_empty());
    assert!(mem.get(&keys::game_state("hanabi", "r1")).await.unwrap().is_none());
    assert!(mem.list_range(&keys::chat("r1"), 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leave_non_member_is_not_in_room() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "solo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();
    let err = rooms.leave(&mut room, "zed").await.unwrap_err();
    assert!(matches!(err, RoomError::NotInRoom(..)));
}

#[tokio::test]
async fn test_kick_member_keeps_room_and_host() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "trio", None, 3, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();
    rooms.join(&mut room, "c", None).await.unwrap();

    let out = rooms.kick(&mut room, "a", "b").await.unwrap();
    assert_eq!(out, Departure::Remaining { new_host: None });

    let loaded = rooms.require("r1").await.unwrap();
    assert_eq!(loaded.host_id, "a");
    assert_eq!(loaded.players, vec!["a", "c"]);
}

#[tokio::test]
async fn test_kick_last_remaining_member_deletes_room() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "solo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();

    let out = rooms.kick(&mut room, "a", "a").await.unwrap();
    assert_eq!(out, Departure::Deleted);
    assert!(rooms.get("r1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_kick_by_non_host_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "duo", None, 2, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();

    let err = rooms.kick(&mut room, "b", "a").await.unwrap_err();
    assert!(matches!(err, RoomError::NotHost(_)));
    assert_eq!(room.players.len(), 2);
}

// =========================================================================
// update / ready / list
// =========================================================================

#[tokio::test]
async fn test_update_reports_change_and_persists() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "old", None, 4, GameMode::Hanabi)
        .await
        .unwrap();

    let changed = rooms
        .update(
            &mut room,
            RoomUpdate {
                name: Some("new".into()),
                password: Some("pw".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(changed);

    let loaded = rooms.require("r1").await.unwrap();
    assert_eq!(loaded.name, "new");
    assert!(loaded.accepts_password(Some("pw")));
}

#[tokio::test]
async fn test_update_with_same_values_is_no_op() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "same", None, 4, GameMode::Hanabi)
        .await
        .unwrap();

    let changed = rooms
        .update(
            &mut room,
            RoomUpdate {
                name: Some("same".into()),
                mode: Some(GameMode::Hanabi),
                password: Some(String::new()),
                max_players: Some(4),
            },
        )
        .await
        .unwrap();
    assert!(!changed);
}

#[tokio::test]
async fn test_update_empty_password_clears_it() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "locked", Some("pw"), 4, GameMode::Hanabi)
        .await
        .unwrap();

    let update = RoomUpdate { password: Some(String::new()), ..Default::default() };
    assert!(rooms.update(&mut room, update).await.unwrap());
    assert!(!room.has_password());
}

#[tokio::test]
async fn test_update_max_players_below_members_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "trio", None, 3, GameMode::Hanabi)
        .await
        .unwrap();
    rooms.join(&mut room, "b", None).await.unwrap();
    rooms.join(&mut room, "c", None).await.unwrap();

    let update = RoomUpdate { max_players: Some(2), ..Default::default() };
    let err = rooms.update(&mut room, update).await.unwrap_err();
    assert!(matches!(err, RoomError::InvalidMaxPlayers { requested: 2, members: 3 }));
    assert_eq!(room.max_players, 3);
}

#[tokio::test]
async fn test_update_max_players_above_mode_limit_is_rejected() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "table", None, 4, GameMode::Hanabi)
        .await
        .unwrap();

    let update = RoomUpdate { max_players: Some(6), ..Default::default() };
    let err = rooms.update(&mut room, update).await.unwrap_err();
    assert!(matches!(err, RoomError::InvalidMaxPlayers { requested: 6, members: 1 }));
    assert_eq!(rooms.require("r1").await.unwrap().max_players, 4);
}

#[tokio::test]
async fn test_set_ready_toggles_flag() {
    let (rooms, _) = setup();
    let mut room = rooms
        .create("r1", "a", "r", None, 2, GameMode::Hanabi)
        .await
        .unwrap();

    assert!(rooms.set_ready(&mut room, "a", true).await.unwrap());
    assert!(!rooms.set_ready(&mut room, "a", true).await.unwrap());
    assert_eq!(rooms.require("r1").await.unwrap().ready.get("a"), Some(&true));

    let err = rooms.set_ready(&mut room, "zed", true).await.unwrap_err();
    assert!(matches!(err, RoomError::NotInRoom(..)));
}

#[tokio::test]
async fn test_list_returns_every_room_and_skips_indexes() {
    let (rooms, mem) = setup();
    rooms.create("r1", "a", "one", None, 2, GameMode::Hanabi).await.unwrap();
    rooms.create("r2", "b", "two", None, 2, GameMode::Hanabi).await.unwrap();
    mem.set_add(&keys::room_sessions("r1"), "a").await.unwrap();
    mem.set("room:broken", "not json", None).await.unwrap();

    let mut ids: Vec<String> = rooms.list().await.unwrap().into_iter().map(|r| r.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["r1", "r2"]);
}

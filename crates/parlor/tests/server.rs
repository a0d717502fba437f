//! End-to-end tests: a real server on a random port, driven over
//! WebSocket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parlor::prelude::*;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with an in-process store.
async fn start_server() -> ParlorServer {
    ParlorServer::builder()
        .bind("127.0.0.1:0")
        .health_bind("127.0.0.1:0")
        .store(std::sync::Arc::new(MemoryStore::new()))
        .build()
        .await
        .expect("server should build")
}

/// Runs the server in the background and returns its WebSocket address.
async fn spawn_server() -> String {
    let server = start_server().await;
    let addr = server.local_addr().expect("should have local addr").to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: Value) {
    ws.send(Message::text(event.to_string()))
        .await
        .expect("send");
}

/// The next message of type `event_type`. Replies and pushes arrive in
/// no fixed order, so anything else is skipped.
async fn expect(ws: &mut ClientWs, event_type: &str) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {event_type}"))
            .expect("stream ended")
            .expect("recv");
        if !msg.is_text() {
            continue;
        }
        let value: Value = serde_json::from_str(msg.to_text().unwrap()).expect("json");
        if value["type"] == event_type {
            return value;
        }
    }
}

/// Sends `event` and waits for its direct reply.
async fn request(ws: &mut ClientWs, event: Value) -> Value {
    let event_type = event["type"].as_str().expect("type").to_owned();
    send(ws, event).await;
    expect(ws, &event_type).await
}

/// Connects and names the client; returns the socket and session id.
async fn identified(addr: &str, name: &str) -> (ClientWs, String) {
    let mut ws = connect(addr).await;
    let reply = request(
        &mut ws,
        json!({ "type": events::USER_IDENTIFY, "data": { "name": name } }),
    )
    .await;
    assert!(reply["success"].as_bool().unwrap(), "identify failed: {reply}");
    let id = reply["data"]["sessionId"].as_str().unwrap().to_owned();
    (ws, id)
}

/// Two identified clients sharing a room hosted by the first.
async fn two_in_room(addr: &str) -> (ClientWs, String, ClientWs, String, String) {
    let (mut host, host_id) = identified(addr, "Ada").await;
    let (mut guest, guest_id) = identified(addr, "Bo").await;
    let created = request(
        &mut host,
        json!({ "type": events::ROOM_CREATE, "data": { "name": "table", "maxPlayers": 2 } }),
    )
    .await;
    let room_id = created["data"]["id"].as_str().unwrap().to_owned();
    let joined = request(
        &mut guest,
        json!({ "type": events::ROOM_JOIN, "roomId": room_id }),
    )
    .await;
    assert!(joined["success"].as_bool().unwrap(), "join failed: {joined}");
    (host, host_id, guest, guest_id, room_id)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_ping_answers_pong() {
    let addr = spawn_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({ "type": events::SYSTEM_PING })).await;
    let pong = expect(&mut ws, events::PONG).await;
    assert_eq!(pong["success"], true);
    assert_eq!(pong["code"], 200);
    assert!(pong["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_invalid_json_keeps_connection_open() {
    let addr = spawn_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("{not json")).await.unwrap();
    let err = expect(&mut ws, events::ERROR).await;
    assert_eq!(err["success"], false);
    assert_eq!(err["errorCode"], "INVALID_MESSAGE");
    assert_eq!(err["code"], 400);

    send(&mut ws, json!({ "type": events::SYSTEM_PING })).await;
    expect(&mut ws, events::PONG).await;
}

#[tokio::test]
async fn test_unknown_event_is_rejected() {
    let addr = spawn_server().await;
    let mut ws = connect(&addr).await;

    let reply = request(&mut ws, json!({ "type": "room.teleport" })).await;
    assert_eq!(reply["errorCode"], "UNKNOWN_EVENT");
    assert_eq!(reply["code"], 404);
}

#[tokio::test]
async fn test_identify_names_the_session() {
    let addr = spawn_server().await;
    let (_ws, id) = identified(&addr, "Ada").await;
    assert_eq!(id.len(), 32);
}

#[tokio::test]
async fn test_resume_requires_the_token_from_identify() {
    let addr = spawn_server().await;
    let mut owner = connect(&addr).await;
    let reply = request(
        &mut owner,
        json!({ "type": events::USER_IDENTIFY, "data": { "name": "Ada" } }),
    )
    .await;
    let id = reply["data"]["sessionId"].as_str().unwrap().to_owned();
    let token = reply["data"]["resumeToken"].as_str().unwrap().to_owned();
    assert_ne!(token, id);

    // Knowing the id is not enough.
    let mut other = connect(&addr).await;
    let refused = request(
        &mut other,
        json!({ "type": events::USER_IDENTIFY, "data": { "sessionId": id } }),
    )
    .await;
    assert!(refused["success"].as_bool().unwrap());
    assert_ne!(refused["data"]["sessionId"], id.as_str());

    let mut later = connect(&addr).await;
    let resumed = request(
        &mut later,
        json!({ "type": events::USER_IDENTIFY, "data": { "sessionId": id, "resumeToken": token } }),
    )
    .await;
    assert_eq!(resumed["data"]["sessionId"], id.as_str());
    assert_eq!(resumed["data"]["name"], "Ada");
    assert_ne!(resumed["data"]["resumeToken"], token.as_str());
}

#[tokio::test]
async fn test_create_and_join_room() {
    let addr = spawn_server().await;
    let (mut host, host_id, _guest, guest_id, room_id) = two_in_room(&addr).await;

    // The host sees the join as a room snapshot.
    loop {
        let update = expect(&mut host, events::ROOM_UPDATED).await;
        if update["data"]["players"].as_array().unwrap().len() == 2 {
            assert_eq!(update["roomId"], room_id.as_str());
            assert_eq!(update["data"]["hostId"], host_id.as_str());
            assert_eq!(update["data"]["players"][1], guest_id.as_str());
            assert_eq!(update["data"]["hasPassword"], false);
            break;
        }
    }

    let listed = request(&mut host, json!({ "type": events::ROOM_LIST })).await;
    let rooms = listed["data"]["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["maxPlayers"], 2);
}

#[tokio::test]
async fn test_full_room_rejects_third_player() {
    let addr = spawn_server().await;
    let (_host, _, _guest, _, room_id) = two_in_room(&addr).await;
    let (mut third, _) = identified(&addr, "Cy").await;

    let reply = request(
        &mut third,
        json!({ "type": events::ROOM_JOIN, "roomId": room_id }),
    )
    .await;
    assert_eq!(reply["errorCode"], "ROOM_FULL");
    assert_eq!(reply["roomId"], room_id.as_str());
}

#[tokio::test]
async fn test_game_start_pushes_private_views() {
    let addr = spawn_server().await;
    let (mut host, host_id, mut guest, guest_id, room_id) = two_in_room(&addr).await;

    let started = request(
        &mut host,
        json!({ "type": events::GAME_START, "roomId": room_id }),
    )
    .await;
    assert!(started["success"].as_bool().unwrap(), "start failed: {started}");
    assert_eq!(started["data"]["started"], true);

    let view = expect(&mut guest, events::GAME_STATE).await;
    assert_eq!(view["roomId"], room_id.as_str());
    assert_eq!(view["data"]["viewer"], guest_id.as_str());
    assert_eq!(view["data"]["hintTokens"], 8);
    assert_eq!(view["data"]["missTokens"], 3);
    for hand in view["data"]["hands"].as_array().unwrap() {
        let cards = hand["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 5);
        if hand["playerId"] == guest_id.as_str() {
            assert!(cards.iter().all(|c| c["color"].is_null()));
        } else {
            assert!(cards.iter().all(|c| !c["color"].is_null()));
        }
    }

    let host_view = expect(&mut host, events::GAME_STATE).await;
    assert_eq!(host_view["data"]["viewer"], host_id.as_str());
    assert_eq!(host_view["data"]["currentPlayer"], host_id.as_str());
}

#[tokio::test]
async fn test_game_action_out_of_turn() {
    let addr = spawn_server().await;
    let (mut host, _, mut guest, _, room_id) = two_in_room(&addr).await;
    request(&mut host, json!({ "type": events::GAME_START, "roomId": room_id })).await;

    let reply = request(
        &mut guest,
        json!({ "type": events::GAME_ACTION, "data": { "action": "discard", "cardIndex": 0 } }),
    )
    .await;
    assert_eq!(reply["errorCode"], "NOT_YOUR_TURN");
}

#[tokio::test]
async fn test_chat_reaches_room() {
    let addr = spawn_server().await;
    let (mut host, _, mut guest, _, room_id) = two_in_room(&addr).await;

    let reply = request(
        &mut host,
        json!({ "type": events::CHAT_SEND, "data": { "message": "good luck" } }),
    )
    .await;
    assert!(reply["success"].as_bool().unwrap());

    let pushed = expect(&mut guest, events::CHAT_MESSAGE).await;
    assert_eq!(pushed["roomId"], room_id.as_str());
    assert_eq!(pushed["data"]["name"], "Ada");
    assert_eq!(pushed["data"]["message"], "good luck");

    let history = request(&mut guest, json!({ "type": events::CHAT_HISTORY })).await;
    assert_eq!(history["data"]["messages"][0]["message"], "good luck");
}

#[tokio::test]
async fn test_closing_socket_leaves_room() {
    let addr = spawn_server().await;
    let (host, _, mut guest, guest_id, _) = two_in_room(&addr).await;

    drop(host);

    // The guest is promoted once the host's cleanup runs.
    loop {
        let update = expect(&mut guest, events::ROOM_UPDATED).await;
        if update["data"]["hostId"] == guest_id.as_str() {
            assert_eq!(update["data"]["players"], json!([guest_id]));
            break;
        }
    }
}

#[tokio::test]
async fn test_disconnect_event_closes_connection() {
    let addr = spawn_server().await;
    let mut ws = connect(&addr).await;

    let reply = request(&mut ws, json!({ "type": events::USER_DISCONNECT })).await;
    assert_eq!(reply["success"], true);

    let end = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
        }
    })
    .await;
    assert!(end.is_ok(), "server kept the connection open");
}

#[tokio::test]
async fn test_health_echoes_request() {
    let server = start_server().await;
    let addr = server.health_addr().expect("health enabled");

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let body = "hello";
    let request = format!(
        "POST /health HTTP/1.1\r\nHost: localhost\r\nX-Check: yes\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");
    let json_start = raw.find("\r\n\r\n").unwrap() + 4;
    let value: Value = serde_json::from_str(&raw[json_start..]).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["headers"]["x-check"], "yes");
    assert_eq!(value["data"]["body"], "hello");
}

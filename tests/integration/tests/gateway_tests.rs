//! Gateway Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Fan-out tests spawn both the REST API and the gateway against the same
//! backing stores, so events published by HTTP handlers reach the sockets.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use futures_util::SinkExt;
use integration_tests::{
    assert_json, check_test_env, expect_close, fixtures::*, next_json, send_op, wait_for_event,
    GatewayServer, TestServer, WsStream,
};
use reqwest::StatusCode;
use serde_json::json;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message as WsMessage;

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_anonymous_upgrade_rejected() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let err = gateway
        .connect_anonymous()
        .await
        .expect_err("Upgrade without identity headers should be refused");

    match err {
        WsError::Http(response) => assert_eq!(response.status(), 401),
        other => panic!("Expected HTTP rejection, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_then_ready() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();

    let mut ws = gateway.connect(&user).await.expect("Failed to connect");

    let hello = next_json(&mut ws, 5_000).await.expect("No Hello frame");
    assert_eq!(hello["op"], 10);
    assert_eq!(hello["d"]["heartbeat_interval"], 45_000);
    assert!(hello["t"].is_null());
    assert!(hello["s"].is_null());

    let ready = next_json(&mut ws, 5_000).await.expect("No READY frame");
    assert_eq!(ready["op"], 0);
    assert_eq!(ready["t"], "READY");
    assert_eq!(ready["s"], 1);
    assert_eq!(ready["d"]["v"], 1);
    assert_eq!(ready["d"]["user"]["id"], user.id.as_str());
    assert_eq!(ready["d"]["user"]["display_name"], user.display_name.as_str());
    assert!(ready["d"]["rooms"].is_array());

    let session_id = ready["d"]["session_id"].as_str().expect("No session_id");
    assert!(!session_id.is_empty());
}

#[tokio::test]
async fn test_ready_lists_membership_rooms() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut ws = gateway.connect(&alice).await.expect("Failed to connect");
    next_json(&mut ws, 5_000).await.expect("No Hello frame");

    let ready = wait_for_event(&mut ws, "READY", 5_000)
        .await
        .expect("No READY frame");
    let rooms = ready["d"]["rooms"].as_array().expect("No rooms array");
    assert!(rooms.iter().any(|r| r["id"] == room.id.as_str()));
}

// ============================================================================
// Heartbeat Tests
// ============================================================================

#[tokio::test]
async fn test_heartbeat_ack() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    // A client that has not received any dispatch yet sends a null sequence
    send_op(&mut ws, json!({"op": 1, "d": null}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);

    send_op(&mut ws, json!({"op": 1, "d": 1}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_invalid_heartbeat_payload_closes() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    send_op(&mut ws, json!({"op": 1, "d": "soon"}))
        .await
        .expect("Failed to send heartbeat");

    let (code, _reason) = expect_close(&mut ws, 5_000).await.expect("No close frame");
    assert_eq!(code, 4002);
}

// ============================================================================
// Subscription Tests
// ============================================================================

#[tokio::test]
async fn test_subscribe_delivers_typing_snapshot() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut ws = ready_socket(&gateway, &alice).await;

    send_op(&mut ws, json!({"op": 2, "d": {"room_id": room.id}}))
        .await
        .expect("Failed to send Subscribe");

    let snapshot = wait_for_event(&mut ws, "TYPING_SNAPSHOT", 5_000)
        .await
        .expect("No TYPING_SNAPSHOT frame");
    assert_eq!(snapshot["d"]["room_id"], room.id.as_str());
    assert_eq!(snapshot["d"]["typing"], json!([]));
}

#[tokio::test]
async fn test_subscribe_unknown_room_denied() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    send_op(&mut ws, json!({"op": 2, "d": {"room_id": "999999999999999"}}))
        .await
        .expect("Failed to send Subscribe");

    let denied = wait_for_event(&mut ws, "SUBSCRIPTION_DENIED", 5_000)
        .await
        .expect("No SUBSCRIPTION_DENIED frame");
    assert_eq!(denied["d"]["room_id"], "999999999999999");

    // A denial leaves the socket open
    send_op(&mut ws, json!({"op": 1, "d": null}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_subscribe_foreign_room_denied() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let eve = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut ws = ready_socket(&gateway, &eve).await;

    send_op(&mut ws, json!({"op": 2, "d": {"room_id": room.id}}))
        .await
        .expect("Failed to send Subscribe");

    let denied = wait_for_event(&mut ws, "SUBSCRIPTION_DENIED", 5_000)
        .await
        .expect("No SUBSCRIPTION_DENIED frame");
    assert_eq!(denied["d"]["room_id"], room.id.as_str());
}

// ============================================================================
// Fan-out Tests
// ============================================================================

#[tokio::test]
async fn test_message_fanout() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut alice_ws = ready_socket(&gateway, &alice).await;
    let mut bob_ws = ready_socket(&gateway, &bob).await;
    subscribe(&mut alice_ws, &room.id).await;
    subscribe(&mut bob_ws, &room.id).await;

    let message = send_message(&api, &room.id, &alice, "hello over the wire").await;

    let event = wait_for_event(&mut bob_ws, "MESSAGE_CREATE", 5_000)
        .await
        .expect("No MESSAGE_CREATE for recipient");
    assert_eq!(event["d"]["id"], message.id.as_str());
    assert_eq!(event["d"]["room_id"], room.id.as_str());
    assert_eq!(event["d"]["content"], "hello over the wire");
    assert_eq!(event["d"]["sender"]["id"], alice.id.as_str());
    assert!(event["d"]["attachment"].is_null());

    // The sender's own sockets hear the message as well
    let echo = wait_for_event(&mut alice_ws, "MESSAGE_CREATE", 5_000)
        .await
        .expect("No MESSAGE_CREATE for sender");
    assert_eq!(echo["d"]["id"], message.id.as_str());
}

#[tokio::test]
async fn test_receipt_fanout() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut alice_ws = ready_socket(&gateway, &alice).await;
    subscribe(&mut alice_ws, &room.id).await;

    let message = send_message(&api, &room.id, &alice, "read me").await;
    wait_for_event(&mut alice_ws, "MESSAGE_CREATE", 5_000)
        .await
        .expect("No MESSAGE_CREATE for sender");

    let response = api
        .post_empty_as(
            &format!("/api/v1/rooms/{}/messages/{}/read", room.id, message.id),
            &bob,
        )
        .await
        .unwrap();
    let marked: MarkReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(marked.marked);

    let event = wait_for_event(&mut alice_ws, "RECEIPT_CREATE", 5_000)
        .await
        .expect("No RECEIPT_CREATE frame");
    assert_eq!(event["d"]["message_id"], message.id.as_str());
    assert_eq!(event["d"]["room_id"], room.id.as_str());
    assert_eq!(event["d"]["user_id"], bob.id.as_str());
}

#[tokio::test]
async fn test_typing_fanout() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut alice_ws = ready_socket(&gateway, &alice).await;
    let mut bob_ws = ready_socket(&gateway, &bob).await;
    subscribe(&mut alice_ws, &room.id).await;
    subscribe(&mut bob_ws, &room.id).await;

    send_op(&mut alice_ws, json!({"op": 4, "d": {"room_id": room.id}}))
        .await
        .expect("Failed to send Typing Start");

    let start = wait_for_event(&mut bob_ws, "TYPING_START", 5_000)
        .await
        .expect("No TYPING_START frame");
    assert_eq!(start["d"]["room_id"], room.id.as_str());
    assert_eq!(start["d"]["user_id"], alice.id.as_str());
    assert_eq!(start["d"]["display_name"], alice.display_name.as_str());

    // Bob has the signal, so dispatch is done. If the typist had been
    // echoed, that frame would already sit ahead of this heartbeat's ack.
    send_op(&mut alice_ws, json!({"op": 1, "d": null}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut alice_ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);

    send_op(&mut alice_ws, json!({"op": 5, "d": {"room_id": room.id}}))
        .await
        .expect("Failed to send Typing Stop");

    let stop = wait_for_event(&mut bob_ws, "TYPING_STOP", 5_000)
        .await
        .expect("No TYPING_STOP frame");
    assert_eq!(stop["d"]["room_id"], room.id.as_str());
    assert_eq!(stop["d"]["user_id"], alice.id.as_str());
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&api, &alice, &bob).await;

    let mut alice_ws = ready_socket(&gateway, &alice).await;
    let mut bob_ws = ready_socket(&gateway, &bob).await;
    subscribe(&mut alice_ws, &room.id).await;
    subscribe(&mut bob_ws, &room.id).await;

    send_op(&mut bob_ws, json!({"op": 3, "d": {"room_id": room.id}}))
        .await
        .expect("Failed to send Unsubscribe");

    // Ops are handled in order per socket, so the ack proves the
    // unsubscribe was processed before the message below is sent
    send_op(&mut bob_ws, json!({"op": 1, "d": null}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut bob_ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);

    let message = send_message(&api, &room.id, &alice, "after unsubscribe").await;

    let event = wait_for_event(&mut alice_ws, "MESSAGE_CREATE", 5_000)
        .await
        .expect("No MESSAGE_CREATE for remaining subscriber");
    assert_eq!(event["d"]["id"], message.id.as_str());

    // Alice's delivery proves the dispatcher ran; bob's next frame after
    // a heartbeat must be its ack, not the message
    send_op(&mut bob_ws, json!({"op": 1, "d": null}))
        .await
        .expect("Failed to send heartbeat");
    let ack = next_json(&mut bob_ws, 5_000).await.expect("No ack frame");
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_room_create_event_for_invitee() {
    if !check_test_env().await {
        return;
    }

    let api = TestServer::start().await.expect("Failed to start server");
    let gateway = GatewayServer::start().await.expect("Failed to start gateway");

    let alice = TestUser::unique();
    let bob = TestUser::unique();

    // Connecting provisions alice's profile, so bob can invite her
    let mut alice_ws = ready_socket(&gateway, &alice).await;

    let response = api
        .post_as("/api/v1/rooms/open", &bob, &CreateOpenRoomRequest::unique(&alice))
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    // ROOM_CREATE arrives on the user channel without any subscribe
    let event = wait_for_event(&mut alice_ws, "ROOM_CREATE", 5_000)
        .await
        .expect("No ROOM_CREATE frame");
    assert_eq!(event["d"]["id"], room.id.as_str());
    assert_eq!(event["d"]["room_type"], "open");

    let participants = event["d"]["participant_ids"]
        .as_array()
        .expect("No participant_ids array");
    assert!(participants
        .iter()
        .any(|p| p.as_str() == Some(alice.id.as_str())));
}

// ============================================================================
// Protocol Error Tests
// ============================================================================

#[tokio::test]
async fn test_server_op_from_client_closes() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    // Hello is server-to-client only
    send_op(&mut ws, json!({"op": 10, "d": {"heartbeat_interval": 1000}}))
        .await
        .expect("Failed to send frame");

    let (code, _reason) = expect_close(&mut ws, 5_000).await.expect("No close frame");
    assert_eq!(code, 4001);
}

#[tokio::test]
async fn test_undefined_opcode_closes() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    send_op(&mut ws, json!({"op": 9, "d": null}))
        .await
        .expect("Failed to send frame");

    let (code, _reason) = expect_close(&mut ws, 5_000).await.expect("No close frame");
    assert_eq!(code, 4002);
}

#[tokio::test]
async fn test_malformed_json_closes() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    ws.send(WsMessage::Text("{\"op\": oops".to_string()))
        .await
        .expect("Failed to send frame");

    let (code, _reason) = expect_close(&mut ws, 5_000).await.expect("No close frame");
    assert_eq!(code, 4002);
}

#[tokio::test]
async fn test_binary_frame_closes() {
    if !check_test_env().await {
        return;
    }

    let gateway = GatewayServer::start().await.expect("Failed to start gateway");
    let user = TestUser::unique();
    let mut ws = ready_socket(&gateway, &user).await;

    ws.send(WsMessage::Binary(vec![0x01, 0x02, 0x03]))
        .await
        .expect("Failed to send frame");

    let (code, _reason) = expect_close(&mut ws, 5_000).await.expect("No close frame");
    assert_eq!(code, 4002);
}

// ============================================================================
// Helpers
// ============================================================================

/// Open a direct room between two fresh users and return it
async fn direct_room(api: &TestServer, a: &TestUser, b: &TestUser) -> RoomResponse {
    api.get_as("/api/v1/users/@me", b).await.unwrap();
    let response = api
        .post_as("/api/v1/rooms/direct", a, &OpenDirectRoomRequest::with(b))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

/// Send a plain message over HTTP and return the created response
async fn send_message(
    api: &TestServer,
    room_id: &str,
    sender: &TestUser,
    content: &str,
) -> MessageResponse {
    let response = api
        .post_as(
            &format!("/api/v1/rooms/{room_id}/messages"),
            sender,
            &SendMessageRequest::simple(content),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

/// Connect a socket and consume the Hello and READY frames
async fn ready_socket(gateway: &GatewayServer, user: &TestUser) -> WsStream {
    let mut ws = gateway.connect(user).await.expect("Failed to connect");

    let hello = next_json(&mut ws, 5_000).await.expect("No Hello frame");
    assert_eq!(hello["op"], 10);

    wait_for_event(&mut ws, "READY", 5_000)
        .await
        .expect("No READY frame");

    ws
}

/// Subscribe to a room and consume the typing snapshot
async fn subscribe(ws: &mut WsStream, room_id: &str) {
    send_op(ws, json!({"op": 2, "d": {"room_id": room_id}}))
        .await
        .expect("Failed to send Subscribe");

    let snapshot = wait_for_event(ws, "TYPING_SNAPSHOT", 5_000)
        .await
        .expect("No TYPING_SNAPSHOT frame");
    assert_eq!(snapshot["d"]["room_id"], room_id);
}

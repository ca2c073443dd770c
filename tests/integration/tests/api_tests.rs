//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, test_config, TestServer,
};
use reqwest::StatusCode;

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Identity Tests
// ============================================================================

#[tokio::test]
async fn test_missing_identity_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/api/v1/users/@me").await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(error.error.code, "MISSING_AUTHORIZATION");

    let response = server
        .post("/api/v1/rooms/campus", &serde_json::json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_malformed_identity_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");

    let url = format!("{}/api/v1/users/@me", server.base_url());
    let response = server
        .client
        .get(&url)
        .header("x-user-id", "not-a-snowflake")
        .header("x-user-name", "Broken")
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_profile_provisioned_on_first_request() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();

    let response = server.get_as("/api/v1/users/@me", &user).await.unwrap();
    let profile: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(profile.id, user.id);
    assert_eq!(profile.display_name, user.display_name);
    assert!(profile.skills.is_empty());
}

#[tokio::test]
async fn test_update_profile() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();

    let update = UpdateProfileRequest {
        department: Some("Computer Science".to_string()),
        bio: Some("Learning Rust".to_string()),
        skills: Some(vec!["Rust".to_string(), "SQL".to_string()]),
        ..Default::default()
    };
    let response = server
        .patch_as("/api/v1/users/@me", &user, &update)
        .await
        .unwrap();
    let profile: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(profile.department.as_deref(), Some("Computer Science"));
    assert_eq!(profile.bio.as_deref(), Some("Learning Rust"));
    assert_eq!(profile.skills, vec!["Rust", "SQL"]);

    // The update survives a fresh read
    let response = server.get_as("/api/v1/users/@me", &user).await.unwrap();
    let profile: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile.department.as_deref(), Some("Computer Science"));
}

#[tokio::test]
async fn test_profile_validation_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();

    let update = UpdateProfileRequest {
        display_name: Some(String::new()),
        ..Default::default()
    };
    let response = server
        .patch_as("/api/v1/users/@me", &user, &update)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_other_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();

    // Bob's profile comes into existence on his first request
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .get_as(&format!("/api/v1/users/{}", bob.id), &alice)
        .await
        .unwrap();
    let profile: ProfileResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile.id, bob.id);
    assert_eq!(profile.display_name, bob.display_name);
}

#[tokio::test]
async fn test_get_unknown_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();
    let stranger = TestUser::unique();

    // The stranger never made a request, so no profile row exists
    let response = server
        .get_as(&format!("/api/v1/users/{}", stranger.id), &user)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Room Tests
// ============================================================================

#[tokio::test]
async fn test_campus_room_is_singleton() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();

    let response = server
        .post_empty_as("/api/v1/rooms/campus", &alice)
        .await
        .unwrap();
    let first: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.room_type, "campus");

    let response = server
        .post_empty_as("/api/v1/rooms/campus", &bob)
        .await
        .unwrap();
    let second: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_create_open_room() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let request = CreateOpenRoomRequest::unique(&bob);
    let response = server
        .post_as("/api/v1/rooms/open", &alice, &request)
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(room.room_type, "open");
    assert_eq!(room.name, request.name);
    assert_eq!(room.created_by, alice.id);

    // Both the creator and the invitee are members from the start
    let response = server
        .get_as(&format!("/api/v1/rooms/{}/participants", room.id), &alice)
        .await
        .unwrap();
    let participants: Vec<ParticipantResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    let ids: Vec<&str> = participants.iter().map(|p| p.user_id.as_str()).collect();
    assert!(ids.contains(&alice.id.as_str()));
    assert!(ids.contains(&bob.id.as_str()));
}

#[tokio::test]
async fn test_open_room_with_self_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    server.get_as("/api/v1/users/@me", &alice).await.unwrap();

    let request = CreateOpenRoomRequest::unique(&alice);
    let response = server
        .post_as("/api/v1/rooms/open", &alice, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_open_room_with_unknown_invitee_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let ghost = TestUser::unique();

    let request = CreateOpenRoomRequest::unique(&ghost);
    let response = server
        .post_as("/api/v1/rooms/open", &alice, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_direct_room_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &alice).await.unwrap();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&bob),
        )
        .await
        .unwrap();
    let first: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(first.room_type, "direct");

    // Opening from the other side lands in the same room
    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &bob,
            &OpenDirectRoomRequest::with(&alice),
        )
        .await
        .unwrap();
    let second: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_direct_room_with_self_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();

    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&alice),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_direct_room_hidden_from_outsiders() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let eve = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&bob),
        )
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_as(&format!("/api/v1/rooms/{}", room.id), &eve)
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(error.error.code, "ACCESS_DENIED");

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/participants", room.id), &eve)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_list_rooms() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_empty_as("/api/v1/rooms/campus", &alice)
        .await
        .unwrap();
    let campus: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/open",
            &alice,
            &CreateOpenRoomRequest::unique(&bob),
        )
        .await
        .unwrap();
    let open: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&bob),
        )
        .await
        .unwrap();
    let direct: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.get_as("/api/v1/rooms", &alice).await.unwrap();
    let rooms: Vec<RoomResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();

    assert!(ids.contains(&campus.id.as_str()));
    assert!(ids.contains(&open.id.as_str()));
    assert!(ids.contains(&direct.id.as_str()));
}

#[tokio::test]
async fn test_get_room_not_found() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();

    let response = server
        .get_as("/api/v1/rooms/999999999999999", &user)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_invalid_room_id_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = TestUser::unique();

    let response = server
        .get_as("/api/v1/rooms/not-a-number", &user)
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_add_participant_to_open_room() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let carol = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();
    server.get_as("/api/v1/users/@me", &carol).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/open",
            &alice,
            &CreateOpenRoomRequest::unique(&bob),
        )
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_as(
            &format!("/api/v1/rooms/{}/participants", room.id),
            &alice,
            &AddParticipantRequest {
                user_id: carol.id.clone(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // The new member can read the room now
    let response = server
        .get_as(&format!("/api/v1/rooms/{}", room.id), &carol)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/participants", room.id), &carol)
        .await
        .unwrap();
    let participants: Vec<ParticipantResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(participants.len(), 3);
}

#[tokio::test]
async fn test_direct_room_rejects_new_members() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let carol = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();
    server.get_as("/api/v1/users/@me", &carol).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&bob),
        )
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_as(
            &format!("/api/v1/rooms/{}/participants", room.id),
            &alice,
            &AddParticipantRequest {
                user_id: carol.id.clone(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

/// Open a fresh direct room between two new users
async fn direct_room(server: &TestServer, a: &TestUser, b: &TestUser) -> RoomResponse {
    server.get_as("/api/v1/users/@me", b).await.unwrap();
    let response = server
        .post_as("/api/v1/rooms/direct", a, &OpenDirectRoomRequest::with(b))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

/// Send a plain message and return the created response
async fn send_message(
    server: &TestServer,
    room_id: &str,
    sender: &TestUser,
    content: &str,
) -> MessageResponse {
    let response = server
        .post_as(
            &format!("/api/v1/rooms/{room_id}/messages"),
            sender,
            &SendMessageRequest::simple(content),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

#[tokio::test]
async fn test_send_and_list_messages() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let first = send_message(&server, &room.id, &alice, "first").await;
    let second = send_message(&server, &room.id, &alice, "second").await;

    assert_eq!(first.content, "first");
    assert_eq!(first.sender.id, alice.id);
    assert_eq!(first.room_id, room.id);
    assert!(first.read_by.is_empty());
    assert!(!first.read_by_other);

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &bob)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    // Oldest first
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, first.id);
    assert_eq!(messages[1].id, second.id);
    assert_eq!(messages[0].sender.display_name, alice.display_name);
}

#[tokio::test]
async fn test_listing_marks_messages_read() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "unread until viewed").await;

    // Bob's first view snapshots the annotations before marking, so his
    // own receipt is not in this page yet
    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &bob)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(messages[0].read_by.is_empty());

    // Alice now sees that Bob has read it
    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &alice)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    let seen = messages.iter().find(|m| m.id == message.id).unwrap();
    assert_eq!(seen.read_by, vec![bob.id.clone()]);
    assert!(seen.read_by_other);
}

#[tokio::test]
async fn test_explicit_mark_read() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "mark me").await;

    let path = format!("/api/v1/rooms/{}/messages/{}/read", room.id, message.id);
    let response = server.post_empty_as(&path, &bob).await.unwrap();
    let marked: MarkReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(marked.marked);

    // Marking again succeeds but creates nothing
    let response = server.post_empty_as(&path, &bob).await.unwrap();
    let marked: MarkReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!marked.marked);
}

#[tokio::test]
async fn test_mark_own_message_read_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "mine").await;

    let path = format!("/api/v1/rooms/{}/messages/{}/read", room.id, message.id);
    let response = server.post_empty_as(&path, &alice).await.unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "OWN_MESSAGE_RECEIPT");
}

#[tokio::test]
async fn test_room_catch_up_read() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    send_message(&server, &room.id, &alice, "one").await;
    send_message(&server, &room.id, &alice, "two").await;
    send_message(&server, &room.id, &alice, "three").await;

    let path = format!("/api/v1/rooms/{}/read", room.id);
    let response = server.post_empty_as(&path, &bob).await.unwrap();
    let result: RoomReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.marked_count, 3);

    // Everything is already read on the second pass
    let response = server.post_empty_as(&path, &bob).await.unwrap();
    let result: RoomReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(result.marked_count, 0);
}

#[tokio::test]
async fn test_get_single_message() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "single").await;

    let response = server
        .get_as(
            &format!("/api/v1/rooms/{}/messages/{}", room.id, message.id),
            &bob,
        )
        .await
        .unwrap();
    let fetched: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched.id, message.id);
    assert_eq!(fetched.content, "single");
}

#[tokio::test]
async fn test_delete_own_message() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "disappearing").await;

    let path = format!("/api/v1/rooms/{}/messages/{}", room.id, message.id);
    let response = server.delete_as(&path, &alice).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // Deleted messages leave every read path
    let response = server.get_as(&path, &bob).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &bob)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(messages.iter().all(|m| m.id != message.id));
}

#[tokio::test]
async fn test_delete_other_message_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let message = send_message(&server, &room.id, &alice, "not yours").await;

    let path = format!("/api/v1/rooms/{}/messages/{}", room.id, message.id);
    let response = server.delete_as(&path, &bob).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_empty_message_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let response = server
        .post_as(
            &format!("/api/v1/rooms/{}/messages", room.id),
            &alice,
            &SendMessageRequest::simple("   "),
        )
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "EMPTY_MESSAGE");
}

#[tokio::test]
async fn test_oversize_message_rejected() {
    if !check_test_env().await {
        return;
    }

    let mut config = test_config().expect("Failed to load test config");
    config.chat.max_content_length = 100;
    let server = TestServer::start_with_config(config)
        .await
        .expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    // One character over the configured limit
    let response = server
        .post_as(
            &format!("/api/v1/rooms/{}/messages", room.id),
            &alice,
            &SendMessageRequest::simple(&"a".repeat(101)),
        )
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "CONTENT_TOO_LONG");

    // Nothing was persisted
    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &alice)
        .await
        .unwrap();
    let messages: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_outsider_cannot_send() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let eve = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let response = server
        .post_as(
            &format!("/api/v1/rooms/{}/messages", room.id),
            &eve,
            &SendMessageRequest::simple("let me in"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", room.id), &eve)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_campus_room_open_to_everyone() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let newcomer = TestUser::unique();

    let response = server
        .post_empty_as("/api/v1/rooms/campus", &alice)
        .await
        .unwrap();
    let campus: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();

    // The newcomer never joined anything, campus access is unconditional
    let message = send_message(&server, &campus.id, &newcomer, "hello campus").await;
    assert_eq!(message.sender.id, newcomer.id);

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages", campus.id), &newcomer)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_message_pagination() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let m1 = send_message(&server, &room.id, &alice, "page one a").await;
    let m2 = send_message(&server, &room.id, &alice, "page one b").await;
    let m3 = send_message(&server, &room.id, &alice, "page two").await;

    let response = server
        .get_as(&format!("/api/v1/rooms/{}/messages?limit=2", room.id), &bob)
        .await
        .unwrap();
    let page: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, m1.id);
    assert_eq!(page[1].id, m2.id);

    let response = server
        .get_as(
            &format!("/api/v1/rooms/{}/messages?after={}&limit=2", room.id, m2.id),
            &bob,
        )
        .await
        .unwrap();
    let page: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, m3.id);
}

// ============================================================================
// Attachment Tests
// ============================================================================

#[tokio::test]
async fn test_upload_and_attach_file() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let content = b"campus notes".to_vec();
    let response = server
        .upload_as("/api/v1/files", &alice, "notes.txt", "text/plain", content.clone())
        .await
        .unwrap();
    let stored: StoredFileResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(stored.filename, "notes.txt");
    assert_eq!(stored.size, content.len() as i64);
    assert!(stored.path.starts_with("attachments/"));

    let request = SendMessageRequest::with_attachment(
        "see attached",
        AttachmentMeta {
            filename: stored.filename.clone(),
            content_type: stored.content_type.clone(),
            size: stored.size,
            path: stored.path.clone(),
        },
    );
    let response = server
        .post_as(&format!("/api/v1/rooms/{}/messages", room.id), &alice, &request)
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let attachment = message.attachment.expect("message should carry the attachment");
    assert_eq!(attachment.filename, "notes.txt");
    assert_eq!(attachment.size, content.len() as i64);
    assert!(!attachment.url.is_empty());

    // A participant can mint a download link and fetch the bytes back
    let response = server
        .post_empty_as(&format!("/api/v1/attachments/{}/temp-url", attachment.id), &bob)
        .await
        .unwrap();
    let temp: TempUrlResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(temp.url.starts_with("/downloads/"));
    assert!(temp.expires_in > 0);

    let response = server.get(&temp.url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[..], &content[..]);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();

    let response = server
        .upload_as(
            "/api/v1/files",
            &alice,
            "tool.zip",
            "application/zip",
            vec![0u8; 16],
        )
        .await
        .unwrap();
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(error.error.code, "ATTACHMENT_TYPE_NOT_ALLOWED");
}

#[tokio::test]
async fn test_temp_url_denied_for_outsiders() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let eve = TestUser::unique();
    let room = direct_room(&server, &alice, &bob).await;

    let response = server
        .upload_as("/api/v1/files", &alice, "secret.txt", "text/plain", b"ours".to_vec())
        .await
        .unwrap();
    let stored: StoredFileResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let request = SendMessageRequest::with_attachment(
        "",
        AttachmentMeta {
            filename: stored.filename.clone(),
            content_type: stored.content_type.clone(),
            size: stored.size,
            path: stored.path.clone(),
        },
    );
    let response = server
        .post_as(&format!("/api/v1/rooms/{}/messages", room.id), &alice, &request)
        .await
        .unwrap();
    let message: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let attachment = message.attachment.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/attachments/{}/temp-url", attachment.id), &eve)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
async fn test_send_connection_request() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    let request: ConnectionResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    assert_eq!(request.status, "pending");
    assert_eq!(request.requester.id, alice.id);
    assert_eq!(request.addressee.id, bob.id);
    assert!(request.room_id.is_none());
}

#[tokio::test]
async fn test_duplicate_connection_request_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let request = SendConnectionRequest::to(&bob);
    server
        .post_as("/api/v1/connections", &alice, &request)
        .await
        .unwrap();

    let response = server
        .post_as("/api/v1/connections", &alice, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_self_connection_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    server.get_as("/api/v1/users/@me", &alice).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&alice),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_accept_connection_opens_direct_room() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    let request: ConnectionResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/connections/{}/accept", request.id), &bob)
        .await
        .unwrap();
    let accepted: ConnectionResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(accepted.status, "accepted");
    let room_id = accepted.room_id.expect("acceptance should open the direct room");

    // Both sides can use the room immediately
    let response = server
        .get_as(&format!("/api/v1/rooms/{room_id}"), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Opening the pair's direct room lands in the same one
    let response = server
        .post_as(
            "/api/v1/rooms/direct",
            &alice,
            &OpenDirectRoomRequest::with(&bob),
        )
        .await
        .unwrap();
    let room: RoomResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(room.id, room_id);
}

#[tokio::test]
async fn test_decline_connection() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    let request: ConnectionResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/connections/{}/decline", request.id), &bob)
        .await
        .unwrap();
    let declined: ConnectionResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(declined.status, "declined");
    assert!(declined.room_id.is_none());
}

#[tokio::test]
async fn test_only_addressee_can_accept() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    let request: ConnectionResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty_as(&format!("/api/v1/connections/{}/accept", request.id), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_accept_twice_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();

    let response = server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    let request: ConnectionResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let path = format!("/api/v1/connections/{}/accept", request.id);
    server.post_empty_as(&path, &bob).await.unwrap();

    let response = server.post_empty_as(&path, &bob).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_list_connections() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = TestUser::unique();
    let bob = TestUser::unique();
    let carol = TestUser::unique();
    server.get_as("/api/v1/users/@me", &bob).await.unwrap();
    server.get_as("/api/v1/users/@me", &carol).await.unwrap();

    server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&bob),
        )
        .await
        .unwrap();
    server
        .post_as(
            "/api/v1/connections",
            &alice,
            &SendConnectionRequest::to(&carol),
        )
        .await
        .unwrap();

    let response = server.get_as("/api/v1/connections", &alice).await.unwrap();
    let connections: Vec<ConnectionResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(connections.len(), 2);

    // The addressee sees the request from their side too
    let response = server.get_as("/api/v1/connections", &bob).await.unwrap();
    let connections: Vec<ConnectionResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].requester.id, alice.id);
}

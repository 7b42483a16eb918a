use agency_core::{AgencyError, ChatTransport, ConversationId, HttpTransport};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(server.uri()).expect("client builds")
}

#[tokio::test]
async fn test_start_chat_sends_start_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({"start": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reply": "Welcome! I'm the Orchestrator.",
            "agent": "OrchestratorAgent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport_for(&server).await.start_chat(None).await.unwrap();

    assert_eq!(reply.reply, "Welcome! I'm the Orchestrator.");
    assert_eq!(reply.agent.as_deref(), Some("OrchestratorAgent"));
    assert_eq!(reply.remaining(), None);
}

#[tokio::test]
async fn test_send_chat_includes_address() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(
            serde_json::json!({"user_message": "Hello", "address": "0xabc"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reply": "Hi",
            "agent": "StrategyAgent",
            "free_messages_remaining": null
        })))
        .mount(&server)
        .await;

    let reply = transport_for(&server)
        .await
        .send_chat("Hello", Some("0xabc"))
        .await
        .unwrap();

    assert_eq!(reply.reply, "Hi");
    assert_eq!(reply.remaining(), None);
}

#[tokio::test]
async fn test_limit_response_is_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": "Free message limit reached. Please connect with MetaMask to continue.",
            "require_metamask": true
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .await
        .send_chat("Hi", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgencyError::AuthRequired(_)));
    assert!(err.detail().contains("MetaMask"));
}

#[tokio::test]
async fn test_server_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Failed to get AI response. Error: upstream timeout"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .await
        .send_chat("Hi", None)
        .await
        .unwrap_err();

    match err {
        AgencyError::HttpError { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("upstream timeout"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .await
        .send_chat("Hi", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgencyError::ResponseDecode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let transport = HttpTransport::new("http://127.0.0.1:1").unwrap();
    let err = transport.start_chat(None).await.unwrap_err();
    assert!(matches!(err, AgencyError::NetworkError(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_conversation_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 12,
            "title": "New Conversation",
            "created_at": "2024-05-01T10:00:00.000001",
            "updated_at": "2024-05-01T10:00:00.000001"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 12, "title": "New Conversation", "created_at": "", "updated_at": ""},
            {"id": 11, "title": "Launch plan", "created_at": "", "updated_at": ""}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/conversations/12/messages"))
        .and(body_json(serde_json::json!({"content": "What next?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 31,
            "content": "Ship the landing page.",
            "is_user": false,
            "created_at": "2024-05-01T10:01:00"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/conversations/12/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 30, "content": "What next?", "is_user": true, "created_at": "2024-05-01T10:00:30"},
            {"id": 31, "content": "Ship the landing page.", "is_user": false, "created_at": "2024-05-01T10:01:00"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/conversations/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;

    let created = transport.create_conversation().await.unwrap();
    assert_eq!(created.id, ConversationId::from(12));

    let listed = transport.list_conversations().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].title, "Launch plan");

    let reply = transport
        .post_message(&created.id, "What next?")
        .await
        .unwrap();
    assert_eq!(reply.content, "Ship the landing page.");
    assert!(!reply.is_user);

    let history = transport.list_messages(&created.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].is_user);

    transport.delete_conversation(&created.id).await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string(""))
        .mount(&server)
        .await;

    let err = transport_for(&server)
        .await
        .delete_conversation(&ConversationId::from(99))
        .await
        .unwrap_err();

    assert!(matches!(err, AgencyError::HttpError { status: 404, .. }));
}

#[tokio::test]
async fn test_crafted_ids_never_reach_another_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/conversations/2/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": "wrong conversation",
            "is_user": false
        })))
        .expect(0)
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;

    for id in ["9/../2", "2?x=9", "2#x", "2%2F"] {
        let err = transport
            .delete_conversation(&ConversationId::new(id))
            .await
            .unwrap_err();
        assert!(matches!(err, AgencyError::HttpError { status: 404, .. }), "{id}: {err}");

        assert!(transport
            .post_message(&ConversationId::new(id), "Hi")
            .await
            .is_err());
    }

    let err = transport
        .delete_conversation(&ConversationId::new(".."))
        .await
        .unwrap_err();
    assert!(matches!(err, AgencyError::InvalidConversationId(_)));
}

use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs the binary off the async runtime so the mock backend keeps serving.
async fn agency(server: &MockServer, args: &[&str]) -> Output {
    let home = TempDir::new().unwrap();
    let dir: PathBuf = home.path().to_path_buf();
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();

    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_agency"))
            .arg("--server")
            .arg(uri)
            .args(&args)
            .current_dir(&dir)
            .env("HOME", &dir)
            .env("XDG_CONFIG_HOME", dir.join(".config"))
            .env("NO_COLOR", "1")
            .env("AGENCY_WALLET__OPEN_BROWSER", "false")
            .env_remove("AGENCY_SERVER_URL")
            .env_remove("AGENCY_CONFIG")
            .env_remove("AGENCY_WALLET_RPC_URL")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute agency command")
    })
    .await
    .unwrap();

    drop(home);
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod one_shot_chat_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_message_prints_reply_with_badge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"user_message": "How do I price my course?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reply": "Start with **three tiers**:\n• Starter\n• Pro",
                "agent": "StrategyAgent",
                "free_messages_remaining": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = agency(
            &server,
            &["chat", "--message", "How do I price my course?"],
        )
        .await;
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("You"));
        assert!(out.contains("How do I price my course?"));
        assert!(out.contains("📊 Strategy"));
        assert!(out.contains("Start with three tiers:"));
        assert!(out.contains("  • Starter"));
        assert!(out.contains("You have 2 free messages remaining."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_limit_reached_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": "Free message limit reached. Please connect with MetaMask to continue.",
                "require_metamask": true
            })))
            .mount(&server)
            .await;

        let output = agency(&server, &["chat", "--message", "One more?"]).await;

        assert!(!output.status.success());
        assert!(stdout(&output).contains("connect with MetaMask"));
        assert!(stderr(&output).contains("free message limit reached"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_shows_apology() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "boom"
            })))
            .mount(&server)
            .await;

        let output = agency(&server, &["chat", "--message", "Hello"]).await;

        assert!(!output.status.success());
        assert!(stdout(&output).contains("I apologize, but I encountered an error."));
        assert!(stderr(&output).contains("no reply from the agency"));
    }
}

mod conversation_command_tests {
    use super::*;

    async fn mount_conversations(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 12, "title": "Launch plan", "created_at": "2024-05-01T10:00:00", "updated_at": "2024-05-02T09:30:00"},
                {"id": 11, "title": "Pricing", "created_at": "2024-04-28T08:00:00", "updated_at": "2024-04-28T08:15:00"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_table() {
        let server = MockServer::start().await;
        mount_conversations(&server).await;

        let output = agency(&server, &["conversations", "list"]).await;
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("Launch plan"));
        assert!(out.contains("2024-05-02 09:30"));
        assert!(out.contains("Total: 2 conversation(s)"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_json() {
        let server = MockServer::start().await;
        mount_conversations(&server).await;

        let output = agency(&server, &["conversations", "list", "--format", "json"]).await;
        assert!(output.status.success());

        let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(listed.as_array().map(Vec::len), Some(2));
        assert_eq!(listed[1]["title"], "Pricing");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_new_prints_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversations"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 13,
                "title": "New Conversation",
                "created_at": "2024-05-03T10:00:00",
                "updated_at": "2024-05-03T10:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = agency(&server, &["conversations", "new"]).await;
        let out = stdout(&output);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(out.contains("Created conversation 13"));
        assert!(out.contains("/chat?id=13"));
        assert!(out.contains("agency chat --conversation 13"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_send_and_show() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversations/12/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 31,
                "content": "Ship the landing page.",
                "is_user": false,
                "created_at": "2024-05-01T10:01:00"
            })))
            .expect(1)
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

        let sent = agency(&server, &["conversations", "send", "12", "What next?"]).await;
        assert!(sent.status.success(), "stderr: {}", stderr(&sent));
        assert!(stdout(&sent).contains("Ship the landing page."));

        let shown = agency(&server, &["conversations", "show", "12"]).await;
        let out = stdout(&shown);
        assert!(shown.status.success());
        assert!(out.contains("Conversation 12"));
        assert!(out.contains("What next?"));
        assert!(out.contains("Ship the landing page."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_send_failure_reports_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/conversations/12/messages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let output = agency(&server, &["conversations", "send", "12", "Hello?"]).await;

        assert!(!output.status.success());
        assert!(stderr(&output).contains("Failed to get a response."));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/conversations/12"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let output = agency(&server, &["conversations", "delete", "12"]).await;

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Deleted conversation 12"));
    }
}

use std::process::{Command, Output};

use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

async fn agency(args: &[&str], env_vars: &[(&str, &str)]) -> Output {
    let home = TempDir::new().unwrap();
    let dir = home.path().to_path_buf();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let env_vars: Vec<(String, String)> = env_vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let output = tokio::task::spawn_blocking(move || {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_agency"));
        cmd.args(&args)
            .current_dir(&dir)
            .env("HOME", &dir)
            .env("XDG_CONFIG_HOME", dir.join(".config"))
            .env("NO_COLOR", "1")
            .env("AGENCY_WALLET__OPEN_BROWSER", "false")
            .env_remove("AGENCY_SERVER_URL")
            .env_remove("AGENCY_CONFIG")
            .env_remove("AGENCY_WALLET_RPC_URL")
            .env_remove("RUST_LOG");
        for (key, value) in &env_vars {
            cmd.env(key, value);
        }
        cmd.output().expect("Failed to execute agency command")
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

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

async fn mount_accounts(wallet: &MockServer, exposed: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "eth_accounts"})))
        .respond_with(rpc_result(exposed))
        .mount(wallet)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_requests_accounts() {
    let wallet = MockServer::start().await;
    mount_accounts(&wallet, serde_json::json!([])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "eth_requestAccounts"})))
        .respond_with(rpc_result(serde_json::json!([ADDRESS])))
        .expect(1)
        .mount(&wallet)
        .await;

    let output = agency(&["connect"], &[("AGENCY_WALLET_RPC_URL", &wallet.uri())]).await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Connected as 0x1234...5678"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_reports_existing_session() {
    let wallet = MockServer::start().await;
    mount_accounts(&wallet, serde_json::json!([ADDRESS])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "eth_requestAccounts"})))
        .respond_with(rpc_result(serde_json::json!([ADDRESS])))
        .expect(0)
        .mount(&wallet)
        .await;

    let output = agency(&["connect"], &[("AGENCY_WALLET_RPC_URL", &wallet.uri())]).await;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Already connected as 0x1234...5678"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_fails_with_alert() {
    let wallet = MockServer::start().await;
    mount_accounts(&wallet, serde_json::json!([])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "eth_requestAccounts"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 4001, "message": "User rejected the request."}
        })))
        .mount(&wallet)
        .await;

    let output = agency(&["connect"], &[("AGENCY_WALLET_RPC_URL", &wallet.uri())]).await;

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Wallet not connected"));
    let err = stderr(&output);
    assert!(err.contains("Could not connect to MetaMask."));
    assert!(err.contains("wallet connection failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_locked_wallet_fails_with_alert() {
    let wallet = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(serde_json::json!([])))
        .mount(&wallet)
        .await;

    let output = agency(&["connect"], &[("AGENCY_WALLET_RPC_URL", &wallet.uri())]).await;

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("No account found. Please unlock your MetaMask wallet."));
    assert!(err.contains("wallet connection failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_without_endpoint_points_to_download() {
    let output = agency(&["connect"], &[]).await;
    let out = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.contains("Install a wallet: https://metamask.io/download/"));
    assert!(out.contains("AGENCY_WALLET_RPC_URL"));
    assert!(out.contains("Install MetaMask or set wallet.rpc_url to a local wallet endpoint"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mobile_agent_gets_app_link() {
    let output = agency(
        &["connect"],
        &[(
            "AGENCY_WALLET__USER_AGENT",
            "Mozilla/5.0 (Linux; Android 14) Mobile",
        )],
    )
    .await;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Open the wallet app: https://metamask.app.link/dapp/"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_chat_uses_restored_wallet() {
    let wallet = MockServer::start().await;
    mount_accounts(&wallet, serde_json::json!([ADDRESS])).await;

    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({"address": ADDRESS})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reply": "Welcome back.",
            "agent": "OrchestratorAgent",
            "free_messages_remaining": null
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let output = agency(
        &["--server", &backend.uri(), "chat", "--message", "Hi again"],
        &[("AGENCY_WALLET_RPC_URL", &wallet.uri())],
    )
    .await;
    let out = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.contains("Welcome back."));
    assert!(!out.contains("free message"));
}

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const AGENCY_VARS: &[&str] = &[
    "AGENCY_SERVER_URL",
    "AGENCY_CONFIG",
    "AGENCY_LOG_LEVEL",
    "AGENCY_WALLET_RPC_URL",
    "RUST_LOG",
];

fn agency(dir: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_agency"));
    cmd.args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("XDG_DATA_HOME", dir.join(".local/share"))
        .env("NO_COLOR", "1");
    for key in AGENCY_VARS {
        cmd.env_remove(key);
    }
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute agency command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn config_json(dir: &Path, env_vars: &[(&str, &str)]) -> serde_json::Value {
    let output = agency(dir, &["config", "show", "--format", "json"], env_vars);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    serde_json::from_slice(&output.stdout).expect("config show should print JSON")
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let dir = TempDir::new().unwrap();
        let output = agency(dir.path(), &["version"], &[]);

        assert!(output.status.success());
        assert!(stdout(&output).contains(concat!("agency ", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_version_command_detailed() {
        let dir = TempDir::new().unwrap();
        let output = agency(dir.path(), &["version", "--detailed"], &[]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("Orchestrator"), "should list the agents: {out}");
        assert!(out.contains("Strategy"));
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let dir = TempDir::new().unwrap();
        let output = agency(dir.path(), &["--help"], &[]);
        let out = stdout(&output);

        assert!(output.status.success());
        for command in ["chat", "conversations", "connect", "config", "version"] {
            assert!(out.contains(command), "help should mention {command}");
        }
    }

    #[test]
    fn test_chat_help_mentions_flags() {
        let dir = TempDir::new().unwrap();
        let output = agency(dir.path(), &["chat", "--help"], &[]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("--conversation"));
        assert!(out.contains("--message"));
        assert!(out.contains("--no-greeting"));
    }

    #[test]
    fn test_unknown_command_fails() {
        let dir = TempDir::new().unwrap();
        let output = agency(dir.path(), &["summon"], &[]);
        assert!(!output.status.success());
    }
}

mod config_command_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = config_json(dir.path(), &[]);

        assert_eq!(config["server"]["base_url"], "http://127.0.0.1:5000");
        assert_eq!(config["chat"]["gating"], "server_driven");
        assert_eq!(config["wallet"]["download_url"], "https://metamask.io/download/");
        assert!(config["wallet"]["rpc_url"].is_null());
    }

    #[test]
    fn test_environment_overrides() {
        let dir = TempDir::new().unwrap();
        let config = config_json(
            dir.path(),
            &[
                ("AGENCY_SERVER_URL", "http://agency.test:8080"),
                ("AGENCY_CHAT__GREET_ON_START", "false"),
                ("AGENCY_WALLET__OPEN_BROWSER", "false"),
            ],
        );

        assert_eq!(config["server"]["base_url"], "http://agency.test:8080");
        assert_eq!(config["chat"]["greet_on_start"], false);
        assert_eq!(config["wallet"]["open_browser"], false);
    }

    #[test]
    fn test_config_file_in_working_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("agency.toml"),
            "[server]\nbase_url = \"http://from-file:9000\"\n\n[chat]\ngating = \"client_cap\"\nfree_message_limit = 5\n",
        )
        .unwrap();

        let config = config_json(dir.path(), &[]);

        assert_eq!(config["server"]["base_url"], "http://from-file:9000");
        assert_eq!(config["chat"]["gating"], "client_cap");
        assert_eq!(config["chat"]["free_message_limit"], 5);
    }

    #[test]
    fn test_server_flag_wins() {
        let dir = TempDir::new().unwrap();
        let output = agency(
            dir.path(),
            &["--server", "http://flag.test", "config", "show"],
            &[("AGENCY_SERVER_URL", "http://env.test")],
        );

        assert!(output.status.success());
        assert!(stdout(&output).contains("http://flag.test"));
    }

    #[test]
    fn test_validate_rejects_bad_server() {
        let dir = TempDir::new().unwrap();

        let valid = agency(dir.path(), &["config", "validate"], &[]);
        assert!(valid.status.success());
        assert!(stdout(&valid).contains("Configuration is valid"));

        let invalid = agency(
            dir.path(),
            &["--server", "ftp://nowhere", "config", "validate"],
            &[],
        );
        assert!(!invalid.status.success());
        assert!(stdout(&invalid).contains("Configuration is invalid"));
        assert!(stderr(&invalid).contains("server.base_url"));
    }

    #[test]
    fn test_config_flag_layers_named_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("staging.toml");
        fs::write(&file, "[server]\nbase_url = \"http://staging.test\"\n").unwrap();

        let output = agency(
            dir.path(),
            &["--config", file.to_str().unwrap(), "config", "show", "--format", "json"],
            &[],
        );
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(config["server"]["base_url"], "http://staging.test");
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let output = agency(
            dir.path(),
            &["config", "show"],
            &[("AGENCY_CONFIG", "nowhere.toml")],
        );

        assert!(!output.status.success());
        let err = stderr(&output);
        assert!(err.contains("[E2001] Configuration file not found"), "stderr: {err}");
        assert!(err.contains("nowhere.toml"));
    }

    #[test]
    fn test_rust_log_target_directive_is_not_a_config_level() {
        let dir = TempDir::new().unwrap();
        let output = agency(
            dir.path(),
            &["config", "validate"],
            &[("RUST_LOG", "agency_core")],
        );

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert!(stdout(&output).contains("Configuration is valid"));

        let config = config_json(dir.path(), &[("RUST_LOG", "warn,reqwest")]);
        assert_eq!(config["logging"]["level"], "info");
    }

    #[test]
    fn test_paths_lists_working_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("agency.toml"), "").unwrap();

        let output = agency(dir.path(), &["config", "paths"], &[]);
        let out = stdout(&output);

        assert!(output.status.success());
        assert!(out.contains("agency.toml"));
        assert!(out.contains("✓"));
    }
}

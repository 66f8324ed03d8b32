//! Integration tests for the `mdsc` binary.
//!
//! Every command runs with an isolated home directory and no `MDSC_*`
//! variables, so the developer's own configuration never leaks in.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REMOTE_ID: &str = "7f5c1a9e-3b2d-4c6f-9a8e-1d2c3b4a5f60";

const OVERRIDES: [&str; 10] = [
    "MDSC_CONFIG",
    "MDSC_LOG",
    "MDSC_BASE_URL",
    "MDSC_AUTH_CLIENT",
    "MDSC_AUTH_URL",
    "MDSC_AUTH_USER",
    "MDSC_AUTH_SECRET",
    "MDSC_AUTH_TOKEN",
    "MDSC_AUTH_TOKEN_SECRET",
    "MDSC_PREFIX",
];

/// Get a command for running mdsc with an isolated environment.
fn mdsc(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mdsc").unwrap();
    for var in OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("mdsc.toml");
    fs::write(&path, contents).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

// =============================================================================
// Offline commands
// =============================================================================

mod offline {
    use super::*;

    #[test]
    fn help_describes_tool() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("metadata service"));
    }

    #[test]
    fn meta_types_lists_table() {
        let home = TempDir::new().unwrap();
        let output = mdsc(home.path())
            .arg("meta-types")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let table = stdout_json(&output);
        assert_eq!(table.as_object().unwrap().len(), 13);
        assert_eq!(table["keywords"], "keyword");
        assert_eq!(table["public"], "is_public");
    }

    #[test]
    fn completion_generates_script() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mdsc"));
    }

    #[test]
    fn entity_commands_need_entity_id() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .args(["get", "keywords"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--entity-id"));
    }

    #[test]
    fn unknown_meta_type_is_rejected() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .args(["--entity-id", "42", "get", "colour"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("colour").and(predicate::str::contains("meta-types")));
    }

    #[test]
    fn missing_base_url_is_reported() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .args(["--entity-id", "42", "uuid"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("base_url"));
    }

    #[test]
    fn config_show_redacts_secrets() {
        let home = TempDir::new().unwrap();
        let config = write_config(
            &home,
            r#"
            [adapters.prod]
            base_url = "https://metadata.example.com"
            auth_client = "oauth2"
            auth_url = "https://auth.example.com"
            auth_user = "client"
            auth_secret = "hunter2"
            "#,
        );

        mdsc(home.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("client"))
            .stdout(predicate::str::contains("hunter2").not());
    }

    #[test]
    fn config_path_prints_explicit_file() {
        let home = TempDir::new().unwrap();
        let config = write_config(&home, "");

        mdsc(home.path())
            .arg("--config")
            .arg(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mdsc.toml"));
    }

    #[test]
    fn adapter_from_environment() {
        let home = TempDir::new().unwrap();
        mdsc(home.path())
            .env("MDSC_BASE_URL", "http://localhost:1")
            .env("MDSC_PREFIX", "env-")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("env-"));
    }
}

// =============================================================================
// Commands against a running service
// =============================================================================

mod online {
    use super::*;

    async fn service() -> (MockServer, TempDir, PathBuf) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/learningobject/entity_guid/h5p-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": REMOTE_ID })))
            .mount(&server)
            .await;

        let home = TempDir::new().unwrap();
        let config = write_config(
            &home,
            &format!(
                r#"
                default = "local"

                [adapters.local]
                base_url = "{}"
                prefix = "h5p-"
                "#,
                server.uri()
            ),
        );
        (server, home, config)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn uuid_prints_remote_id() {
        let (_server, home, config) = service().await;

        let output = mdsc(home.path())
            .arg("--config")
            .arg(&config)
            .args(["--entity-id", "42", "uuid"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let printed = stdout_json(&output);
        assert_eq!(printed["id"], REMOTE_ID);
        assert_eq!(printed["entityGuid"], "h5p-42");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn keywords_prints_projected_values() {
        let (server, home, config) = service().await;
        Mock::given(method("GET"))
            .and(path(format!("/v1/learningobject/{}/keywords", REMOTE_ID)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "id": "1", "keyword": "algebra" }])),
            )
            .mount(&server)
            .await;

        let output = mdsc(home.path())
            .arg("--config")
            .arg(&config)
            .args(["--entity-id", "42", "keywords"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(stdout_json(&output), json!(["algebra"]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unregistered_entity_fails_without_create() {
        let server = MockServer::start().await;
        let home = TempDir::new().unwrap();

        mdsc(home.path())
            .env("MDSC_BASE_URL", server.uri())
            .args(["--entity-id", "42", "uuid"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--create"));
    }
}

use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn base_cmd() -> Command {
    let mut cmd = Command::cargo_bin("websession").expect("binary");
    for var in [
        "WEBSESSION_ADDR",
        "WEBSESSION_CONFIG",
        "WEBSESSION_USERNAME",
        "WEBSESSION_PASSWORD",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn mock_session(server: &mut ServerGuard, prefix: &str) {
    server
        .mock("POST", format!("{prefix}/login").as_str())
        .with_status(200)
        .create();
    mock_profile_and_csrf(server, prefix);
}

fn mock_profile_and_csrf(server: &mut ServerGuard, prefix: &str) {
    server
        .mock("GET", format!("{prefix}/security/v1/currentuser/").as_str())
        .with_status(200)
        .with_body(json!({"id": 3, "name": "chief", "firstName": "Charly"}).to_string())
        .create();
    server
        .mock("GET", format!("{prefix}/security/v1/csrftoken/").as_str())
        .with_status(200)
        .with_body(json!({"headerName": "X-CSRF-TOKEN", "token": "tok-9"}).to_string())
        .create();
}

#[test]
fn login_prints_profile_and_csrf_header() {
    let mut server = Server::new();
    mock_session(&mut server, "/services/rest");
    let logout = server
        .mock("POST", "/services/rest/logout")
        .match_header("x-csrf-token", "tok-9")
        .with_status(200)
        .create();

    base_cmd()
        .args([
            "--addr",
            &server.url(),
            "login",
            "--username",
            "chief",
            "--password",
            "chief",
            "--logout",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"chief\""))
        .stdout(predicate::str::contains("CSRF header: X-CSRF-TOKEN"))
        .stdout(predicate::str::contains("Logged off"));
    logout.assert();
}

#[test]
fn login_reads_credentials_from_env() {
    let mut server = Server::new();
    mock_profile_and_csrf(&mut server, "/services/rest");
    let login = server
        .mock("POST", "/services/rest/login")
        .match_body(Matcher::Json(json!({
            "j_username": "waiter",
            "j_password": "from-env"
        })))
        .with_status(200)
        .create();

    base_cmd()
        .env("WEBSESSION_ADDR", server.url())
        .env("WEBSESSION_USERNAME", "waiter")
        .env("WEBSESSION_PASSWORD", "from-env")
        .arg("login")
        .assert()
        .success();
    login.assert();
}

#[test]
fn rejected_login_fails() {
    let mut server = Server::new();
    server
        .mock("POST", "/services/rest/login")
        .with_status(401)
        .create();

    base_cmd()
        .args([
            "--addr",
            &server.url(),
            "login",
            "--username",
            "chief",
            "--password",
            "wrong",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn check_without_session_reports_logged_out() {
    let mut server = Server::new();
    server
        .mock("GET", "/services/rest/security/v1/currentuser/")
        .with_status(401)
        .create();

    base_cmd()
        .args(["--addr", &server.url(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: LoggedOut"))
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn check_with_session_prints_profile() {
    let mut server = Server::new();
    mock_session(&mut server, "/services/rest");

    base_cmd()
        .args(["--addr", &server.url(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: LoggedIn"))
        .stdout(predicate::str::contains("\"firstName\": \"Charly\""));
}

#[test]
fn check_help_mentions_cookie_jar() {
    base_cmd()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty cookie jar"));
}

#[test]
fn call_sends_csrf_header_on_mutating_request() {
    let mut server = Server::new();
    mock_session(&mut server, "/services/rest");
    let order = server
        .mock("POST", "/services/rest/ordermanagement/v1/order")
        .match_header("x-csrf-token", "tok-9")
        .match_body(Matcher::Json(json!({"tableId": 102})))
        .with_status(200)
        .with_body(json!({"id": 55}).to_string())
        .create();
    server
        .mock("POST", "/services/rest/logout")
        .with_status(200)
        .create();

    base_cmd()
        .args([
            "--addr",
            &server.url(),
            "call",
            "--username",
            "waiter",
            "--password",
            "waiter",
            "--body",
            r#"{"tableId": 102}"#,
            "post",
            "/services/rest/ordermanagement/v1/order",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("200 OK"))
        .stdout(predicate::str::contains("\"id\":55"));
    order.assert();
}

#[test]
fn call_reports_failing_status() {
    let mut server = Server::new();
    mock_session(&mut server, "/services/rest");
    server
        .mock("DELETE", "/services/rest/ordermanagement/v1/order/1")
        .with_status(403)
        .create();
    server
        .mock("POST", "/services/rest/logout")
        .with_status(200)
        .create();

    base_cmd()
        .args([
            "--addr",
            &server.url(),
            "call",
            "--username",
            "waiter",
            "--password",
            "waiter",
            "delete",
            "/services/rest/ordermanagement/v1/order/1",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("403 Forbidden"));
}

#[test]
fn config_file_overrides_endpoint_paths() {
    let mut server = Server::new();
    mock_session(&mut server, "/api");
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("websession.yaml");
    let contents = format!(
        "base_url: {}\nlogin_path: /api/login\nlogout_path: /api/logout\ncurrent_user_path: /api/security/v1/currentuser/\ncsrf_token_path: /api/security/v1/csrftoken/\n",
        server.url()
    );
    fs::write(&config_path, contents).expect("write config");

    base_cmd()
        .args([
            "--config",
            config_path.to_str().expect("utf8 path"),
            "login",
            "--username",
            "chief",
            "--password",
            "chief",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CSRF header: X-CSRF-TOKEN"));
}

#[test]
fn malformed_config_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("websession.yaml");
    fs::write(&config_path, "timeout_secs: nope\n").expect("write config");

    base_cmd()
        .args([
            "--config",
            config_path.to_str().expect("utf8 path"),
            "check",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

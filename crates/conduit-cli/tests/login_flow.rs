//! End-to-end login/whoami/logout flow against a mock backend.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn user_body(token: &str) -> serde_json::Value {
    json!({
        "user": {
            "username": "ada",
            "email": "ada@example.com",
            "bio": null,
            "image": null,
            "token": token,
        }
    })
}

#[tokio::test]
async fn test_login_whoami_logout_flow() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("jwt.from-login")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Token jwt.from-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("jwt.from-login")))
        .mount(&server)
        .await;

    cargo_bin_cmd!("conduit")
        .env("CONDUIT_HOME", home.path())
        .env("CONDUIT_API_URL", server.uri())
        .args(["login", "--email", "ada@example.com", "--password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as ada"));

    assert!(home.path().join("token.json").exists());

    cargo_bin_cmd!("conduit")
        .env("CONDUIT_HOME", home.path())
        .env("CONDUIT_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("ada <ada@example.com>"));

    cargo_bin_cmd!("conduit")
        .env("CONDUIT_HOME", home.path())
        .env("CONDUIT_API_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    assert!(!home.path().join("token.json").exists());
}

#[tokio::test]
async fn test_login_failure_prints_validation_errors() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"errors": {"email or password": ["is invalid"]}})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("conduit")
        .env("CONDUIT_HOME", home.path())
        .env("CONDUIT_API_URL", server.uri())
        .args(["login", "--email", "ada@example.com", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email or password is invalid"));

    assert!(!home.path().join("token.json").exists());
}

#[tokio::test]
async fn test_whoami_without_credential_makes_no_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("conduit")
        .env("CONDUIT_HOME", home.path())
        .env("CONDUIT_API_URL", server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));

    server.verify().await;
}

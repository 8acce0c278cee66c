//! Shared test harness: a session wired to a mock server and a temp store.

#![allow(dead_code)]

use conduit_core::api::ApiClient;
use conduit_core::auth::{Session, SessionState, TokenStore};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::watch;

pub struct Harness {
    pub session: Session,
    pub client: ApiClient,
    pub tokens: TokenStore,
    _home: TempDir,
}

/// Builds a fresh session against `base_url` with an empty credential store.
pub fn harness(base_url: &str) -> Harness {
    let home = TempDir::new().expect("create temp home");
    let tokens = TokenStore::new(home.path().join("token.json"));
    let client = ApiClient::new(base_url, tokens.clone());
    let session = Session::new(client.clone(), tokens.clone());
    Harness {
        session,
        client,
        tokens,
        _home: home,
    }
}

/// Success body for the user envelope endpoints, with null bio/image.
pub fn user_body(username: &str, token: &str) -> serde_json::Value {
    json!({
        "user": {
            "username": username,
            "email": format!("{username}@example.com"),
            "bio": null,
            "image": null,
            "token": token,
        }
    })
}

/// Awaits the session reaching `wanted`, consuming intermediate states.
pub async fn wait_for_state(
    states: &mut watch::Receiver<SessionState>,
    wanted: SessionState,
) {
    loop {
        if *states.borrow_and_update() == wanted {
            return;
        }
        states
            .changed()
            .await
            .expect("session dropped while waiting for state");
    }
}

//! The authentication session state machine.
//!
//! Tracks whether a user is signed in, validates the stored credential at
//! startup, and recovers from transient backend outages on its own.
//!
//! ## States
//!
//! - `loading`: initial value while the stored credential is being checked
//! - `authenticated`: credential accepted, user data loaded
//! - `unauthenticated`: no credential, or the credential was rejected
//! - `unavailable`: backend unreachable (5xx / no response), credential kept
//!
//! ## Identity-check classification
//!
//! A 4xx from `GET /user` means the credential itself is bad: sign out and
//! clear it. A 5xx or a connection failure means the server is down: keep
//! the credential, publish `unavailable`, and retry with capped exponential
//! backoff (2s, 4s, 8s, then 16s forever) until the server answers or the
//! user signs out. Collapsing the two would turn every outage into a
//! forced logout.
//!
//! 401 responses from every *other* endpoint are handled by the client's
//! global interception rule, which terminates the session through the hook
//! registered in [`Session::new`].

use std::fmt;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::client::{ApiClient, Intercept};
use crate::api::error::{ApiError, ApiResult};
use crate::auth::credentials::TokenStore;
use crate::auth::retry::{self, RetryContext};
use crate::models::{User, UserUpdate};

/// Authentication status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Checking whether the stored credential is still valid.
    Loading,
    /// Credential accepted; a user is signed in.
    Authenticated,
    /// No credential, or the credential was rejected.
    Unauthenticated,
    /// Backend unreachable; credential retained for automatic retry.
    Unavailable,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Loading => write!(f, "loading"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Unavailable => write!(f, "unavailable"),
        }
    }
}

type IdentityFuture = Shared<BoxFuture<'static, ApiResult<User>>>;

struct SessionInner {
    client: ApiClient,
    tokens: TokenStore,
    state_tx: watch::Sender<SessionState>,
    user_tx: watch::Sender<Option<User>>,
    authed_tx: watch::Sender<bool>,
    retry: Mutex<RetryContext>,
    identity_flight: Mutex<Option<IdentityFuture>>,
}

/// Handle to the authentication session.
///
/// Cheap to clone; every clone shares the same state machine. Constructed
/// once at application startup and passed to whatever needs it; there is
/// no global instance.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Serialize)]
struct UserBody<T: Serialize> {
    user: T,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

impl Session {
    /// Creates the session and registers its termination hook on `client`,
    /// so that a 401 from any non-identity endpoint signs the user out.
    pub fn new(client: ApiClient, tokens: TokenStore) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Loading);
        let (user_tx, _) = watch::channel(None);
        let (authed_tx, _) = watch::channel(false);

        let inner = Arc::new(SessionInner {
            client,
            tokens,
            state_tx,
            user_tx,
            authed_tx,
            retry: Mutex::new(RetryContext::default()),
            identity_flight: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        inner.client.on_unauthorized(move || {
            if let Some(inner) = weak.upgrade() {
                Session { inner }.purge();
            }
        });

        Session { inner }
    }

    /// Resolves the stored credential once at startup.
    ///
    /// With no stored credential the session terminates immediately, without
    /// a network call. Otherwise the identity check runs and its
    /// classification decides the first stable state.
    pub async fn init(&self) {
        if self.inner.tokens.get().is_some() {
            let _ = self.current_user().await;
        } else {
            debug!("no stored credential at startup");
            self.purge();
        }
    }

    // ------------------------------------------------------------------
    // Observable streams
    // ------------------------------------------------------------------

    /// Session state; replays the current value, suppresses duplicates.
    pub fn state_stream(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Signed-in user; replays the current value, suppresses duplicates.
    pub fn user_stream(&self) -> watch::Receiver<Option<User>> {
        self.inner.user_tx.subscribe()
    }

    /// Derived boolean stream: whether a user is signed in.
    pub fn is_authenticated_stream(&self) -> watch::Receiver<bool> {
        self.inner.authed_tx.subscribe()
    }

    /// Current state tag (read-only snapshot).
    pub fn state(&self) -> SessionState {
        *self.inner.state_tx.borrow()
    }

    /// Last known user value, for non-reactive call sites.
    pub fn current_user_snapshot(&self) -> Option<User> {
        self.inner.user_tx.borrow().clone()
    }

    /// Stored credential (read-only snapshot).
    pub fn token(&self) -> Option<String> {
        self.inner.tokens.get()
    }

    // ------------------------------------------------------------------
    // Facade operations
    // ------------------------------------------------------------------

    /// Signs in. On success the session becomes `authenticated` and the
    /// returned credential is persisted; on failure the normalized error is
    /// surfaced and the state is left alone.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let body = UserBody {
            user: LoginRequest { email, password },
        };
        let response: UserResponse = self.inner.client.post("/users/login", &body).await?;
        self.set_authenticated(response.user.clone());
        Ok(response.user)
    }

    /// Creates an account and signs in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<User> {
        let body = UserBody {
            user: RegisterRequest {
                username,
                email,
                password,
            },
        };
        let response: UserResponse = self.inner.client.post("/users", &body).await?;
        self.set_authenticated(response.user.clone());
        Ok(response.user)
    }

    /// Unconditionally terminates the session.
    pub fn logout(&self) {
        debug!("logging out");
        self.purge();
    }

    /// Applies a partial settings update.
    ///
    /// On success only the cached user is replaced: no state transition,
    /// and the stored credential is not rewritten.
    pub async fn update(&self, changes: &UserUpdate) -> ApiResult<User> {
        let body = UserBody { user: changes };
        let response: UserResponse = self.inner.client.put("/user", &body).await?;
        self.publish_user(Some(response.user.clone()));
        Ok(response.user)
    }

    /// Runs the identity check (`GET /user`) and lets its classification
    /// drive the state machine.
    ///
    /// Calls issued while one is already in flight await the same
    /// outstanding result instead of issuing a duplicate request.
    pub async fn current_user(&self) -> ApiResult<User> {
        let future = {
            let mut flight = self
                .inner
                .identity_flight
                .lock()
                .expect("identity flight lock poisoned");
            if let Some(shared) = flight.as_ref() {
                shared.clone()
            } else {
                let session = self.clone();
                let fresh: IdentityFuture =
                    async move { session.run_identity_check().await }.boxed().shared();
                *flight = Some(fresh.clone());
                fresh
            }
        };
        future.await
    }

    async fn run_identity_check(&self) -> ApiResult<User> {
        let result = self
            .inner
            .client
            .request::<(), UserResponse>(Method::GET, "/user", None, &[], Intercept::IdentityCheck)
            .await;

        *self
            .inner
            .identity_flight
            .lock()
            .expect("identity flight lock poisoned") = None;

        match result {
            Ok(response) => {
                self.set_authenticated(response.user.clone());
                Ok(response.user)
            }
            Err(err) => {
                self.classify_identity_failure(&err);
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // State transitions
    // ------------------------------------------------------------------

    fn classify_identity_failure(&self, err: &ApiError) {
        if err.is_invalid_credential() {
            debug!(status = err.status, "identity check rejected the credential");
            self.purge();
        } else if self.inner.tokens.get().is_none() {
            // Signed out while the check was in flight; nothing to retry.
            self.purge();
        } else {
            warn!(status = err.status, "identity check failed transiently");
            self.set_unavailable();
        }
    }

    /// Enters `authenticated`: persists the credential, cancels any pending
    /// retry, resets the attempt counter.
    fn set_authenticated(&self, user: User) {
        self.inner.retry.lock().expect("retry lock poisoned").reset();
        self.inner.tokens.save(&user.token);
        debug!(username = %user.username, "session authenticated");
        self.publish_user(Some(user));
        self.publish_state(SessionState::Authenticated);
    }

    /// Enters `unauthenticated`: clears the credential, cancels any pending
    /// retry, resets the attempt counter.
    fn purge(&self) {
        self.inner.retry.lock().expect("retry lock poisoned").reset();
        self.inner.tokens.clear();
        self.publish_user(None);
        self.publish_state(SessionState::Unauthenticated);
    }

    /// Enters `unavailable`: the credential is left in place, the user is
    /// considered unknown, and a retry is scheduled.
    fn set_unavailable(&self) {
        self.publish_user(None);
        self.publish_state(SessionState::Unavailable);
        self.schedule_retry();
    }

    fn schedule_retry(&self) {
        let mut retry = self.inner.retry.lock().expect("retry lock poisoned");
        retry.cancel();

        if self.inner.tokens.get().is_none() {
            return;
        }

        let delay = retry::backoff_delay(retry.attempt);
        retry.attempt += 1;
        debug!(
            attempt = retry.attempt,
            delay_secs = delay.as_secs(),
            "scheduling identity check retry"
        );

        let session = self.clone();
        retry.arm(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // This timer has fired; forget its handle so a later cancel
            // cannot abort the check mid-flight.
            session
                .inner
                .retry
                .lock()
                .expect("retry lock poisoned")
                .take_pending();

            // A logout while the timer was pending cleared the credential.
            if session.inner.tokens.get().is_none() {
                return;
            }

            send_distinct(&session.inner.state_tx, SessionState::Loading);
            let _ = session.current_user().await;
        }));
    }

    fn publish_user(&self, user: Option<User>) {
        let authed = user.is_some();
        send_distinct(&self.inner.user_tx, user);
        send_distinct(&self.inner.authed_tx, authed);
    }

    fn publish_state(&self, next: SessionState) {
        send_distinct(&self.inner.state_tx, next);
    }
}

/// Publishes `next` only when it differs from the current value, so
/// observers never see duplicate consecutive notifications.
fn send_distinct<T: PartialEq>(tx: &watch::Sender<T>, next: T) {
    tx.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

//! Shared HTTP client: credential attachment and failure interception.
//!
//! Every outbound request goes through [`ApiClient::request`], which
//! attaches the stored bearer credential, normalizes failures into
//! [`ApiError`], and (for all endpoints except the identity check) reacts
//! to a 401 by invoking the session-termination hook. The stages run in a
//! fixed order: credential attachment happens before the response is ever
//! classified.

use std::sync::{Arc, OnceLock};

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::auth::credentials::TokenStore;

/// Standard User-Agent header for Conduit API requests.
pub const USER_AGENT: &str = concat!("conduit/", env!("CARGO_PKG_VERSION"));

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Which interception rules apply to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    /// Default policy: a 401 response forces session termination.
    Global,
    /// The identity-check request. It performs its own 4xx/5xx
    /// classification, so the blanket 401 rule is skipped: a transient
    /// outage must not be collapsed into a hard logout.
    IdentityCheck,
}

/// HTTP client shared by the session and the resource wrappers.
///
/// Cheap to clone; clones share the connection pool, the credential store
/// handle, and the termination hook.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    on_unauthorized: Arc<OnceLock<UnauthorizedHook>>,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`, reading credentials from
    /// `tokens` on every request.
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            tokens,
            on_unauthorized: Arc::new(OnceLock::new()),
        }
    }

    /// Registers the hook invoked when a non-exempt request returns 401.
    ///
    /// Only the first registration takes effect; later calls are ignored.
    pub fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        let _ = self.on_unauthorized.set(Box::new(hook));
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<(), T>(Method::GET, path, None, &[], Intercept::Global)
            .await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        self.request::<(), T>(Method::GET, path, None, query, Intercept::Global)
            .await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body), &[], Intercept::Global)
            .await
    }

    /// POST with an empty JSON object body (favorite, follow).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(
            Method::POST,
            path,
            Some(&serde_json::json!({})),
            &[],
            Intercept::Global,
        )
        .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PUT, path, Some(body), &[], Intercept::Global)
            .await
    }

    /// DELETE discarding whatever body the server returns.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute::<()>(Method::DELETE, path, None, &[], Intercept::Global)
            .await
            .map(|_| ())
    }

    /// DELETE for endpoints that answer with a JSON body (unfollow).
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<(), T>(Method::DELETE, path, None, &[], Intercept::Global)
            .await
    }

    /// Sends a request under the given interception policy and decodes the
    /// success body.
    pub async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, String)],
        intercept: Intercept,
    ) -> ApiResult<T> {
        let response = self.execute(method, path, body, query, intercept).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|err| {
            warn!(path, error = %err, "failed to decode response body");
            ApiError::invalid_body(status)
        })
    }

    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: &[(&str, String)],
        intercept: Intercept,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::USER_AGENT, USER_AGENT);

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = self.tokens.get() {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path, error = %err, "request failed without a response");
                return Err(ApiError::network());
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();
        let error = ApiError::from_body(code, &body_text);

        if error.is_unauthorized() && intercept == Intercept::Global {
            debug!(path, "unauthorized outside the identity check, terminating session");
            if let Some(hook) = self.on_unauthorized.get() {
                hook();
            }
        }

        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("token.json"));
        let client = ApiClient::new("http://localhost:3000/api/", tokens);
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_unauthorized_hook_first_registration_wins() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("token.json"));
        let client = ApiClient::new("http://localhost:3000/api", tokens);

        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let first = Arc::clone(&hits);
        client.on_unauthorized(move || {
            first.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        client.on_unauthorized(|| panic!("second registration must be ignored"));

        client.on_unauthorized.get().unwrap()();
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}

//! Uniform failure shape for API calls.
//!
//! Every failed request, whatever the endpoint, surfaces as an [`ApiError`]:
//! a map of category → human-readable messages plus the HTTP status code.
//! Failures that never produced a response carry status 0.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Message substituted when the server supplied no structured error body.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to connect. Please check your internet connection.";

/// Message used when a success response could not be decoded.
pub const BODY_ERROR_MESSAGE: &str = "Received an unreadable response from the server.";

/// Sentinel status for failures with no HTTP response at all.
pub const STATUS_NO_RESPONSE: u16 = 0;

/// Normalized API failure: validation categories with their messages, and
/// the numeric status that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub errors: BTreeMap<String, Vec<String>>,
    pub status: u16,
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    /// Creates an error with a single category.
    pub fn new(status: u16, category: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(category.into(), vec![message.into()]);
        Self { errors, status }
    }

    /// A request that produced no response (connection refused, DNS, ...).
    pub fn network() -> Self {
        Self::new(STATUS_NO_RESPONSE, "network", NETWORK_ERROR_MESSAGE)
    }

    /// Normalizes a failure response body.
    ///
    /// Bodies matching `{ "errors": { category: [messages] } }` pass through
    /// verbatim; anything else gets the generic connectivity message under
    /// the `network` category, keeping the real status.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.errors.is_empty() => Self {
                errors: parsed.errors,
                status,
            },
            _ => Self::new(status, "network", NETWORK_ERROR_MESSAGE),
        }
    }

    /// A 2xx response whose body did not decode as expected.
    pub fn invalid_body(status: u16) -> Self {
        Self::new(status, "body", BODY_ERROR_MESSAGE)
    }

    /// True when the status is exactly 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// True for any 4xx: the credential (or request) was rejected outright.
    pub fn is_invalid_credential(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// True for 5xx or no-response failures, assumed recoverable by waiting.
    pub fn is_transient(&self) -> bool {
        self.status == STATUS_NO_RESPONSE || self.status >= 500
    }

    /// Flattens the categories into display lines, e.g. `email is invalid`.
    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.errors.iter().flat_map(|(category, messages)| {
            messages
                .iter()
                .map(move |message| format!("{category} {message}"))
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == STATUS_NO_RESPONSE {
            write!(f, "no response")?;
        } else {
            write!(f, "HTTP {}", self.status)?;
        }
        if let Some(line) = self.messages().next() {
            write!(f, ": {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

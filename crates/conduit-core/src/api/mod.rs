//! HTTP plumbing and resource wrappers for the Conduit REST API.
//!
//! [`client::ApiClient`] owns the cross-cutting behavior (credential
//! attachment, failure normalization, the global 401 rule); the resource
//! modules are stateless request/response wrappers over it.

pub mod articles;
pub mod client;
pub mod comments;
pub mod error;
pub mod profiles;
pub mod tags;

pub use client::{ApiClient, Intercept, USER_AGENT};
pub use error::{ApiError, ApiResult};

//! Command handlers.

pub mod articles;
pub mod auth;
pub mod config;
pub mod profiles;

use conduit_core::api::ApiError;

/// Converts a normalized API failure into an anyhow error carrying every
/// category message on its own line.
pub(crate) fn api_failure(context: &str, err: &ApiError) -> anyhow::Error {
    let mut lines = vec![context.to_string()];
    lines.extend(err.messages());
    anyhow::anyhow!("{}", lines.join("\n  "))
}

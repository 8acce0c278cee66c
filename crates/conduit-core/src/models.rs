//! Wire types for the Conduit API.
//!
//! `bio` and `image` fields arrive as `null` from some backends; they
//! deserialize to the empty string so consumers never see a sentinel value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback avatar for profiles without an image.
pub const DEFAULT_AVATAR_URL: &str = "https://static.productionready.io/images/smiley-cyrus.jpg";

/// Returns `image` unless it is empty, then the default avatar.
pub fn avatar_or_default(image: &str) -> &str {
    if image.is_empty() { DEFAULT_AVATAR_URL } else { image }
}

/// Maps a JSON `null` (or absent field) to the empty string.
fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The account owner, as returned by the authentication endpoints.
///
/// `token` is the bearer credential granted for this session; the session
/// manager persists it, nothing else should.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    /// Empty when the user has not written one.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub bio: String,
    /// Empty when the user has not set one; see [`avatar_or_default`].
    #[serde(default, deserialize_with = "null_to_empty")]
    pub image: String,
    pub token: String,
}

/// Partial settings update for `PUT /user`. Unset fields are omitted from
/// the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Another user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub image: String,
    pub following: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: u64,
    pub author: Profile,
}

/// New or changed article fields for create/update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: Profile,
}

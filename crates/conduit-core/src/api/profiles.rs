//! Public profiles and the follow relationship.

use serde::Deserialize;

use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::models::Profile;

#[derive(Deserialize)]
struct ProfileResponse {
    profile: Profile,
}

pub async fn get(client: &ApiClient, username: &str) -> ApiResult<Profile> {
    let response: ProfileResponse = client.get(&format!("/profiles/{username}")).await?;
    Ok(response.profile)
}

pub async fn follow(client: &ApiClient, username: &str) -> ApiResult<Profile> {
    let response: ProfileResponse = client
        .post_empty(&format!("/profiles/{username}/follow"))
        .await?;
    Ok(response.profile)
}

pub async fn unfollow(client: &ApiClient, username: &str) -> ApiResult<Profile> {
    let response: ProfileResponse = client
        .delete_json(&format!("/profiles/{username}/follow"))
        .await?;
    Ok(response.profile)
}

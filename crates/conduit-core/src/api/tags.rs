//! The global tag list.

use serde::Deserialize;

use crate::api::client::ApiClient;
use crate::api::error::ApiResult;

#[derive(Deserialize)]
struct TagsResponse {
    tags: Vec<String>,
}

pub async fn list(client: &ApiClient) -> ApiResult<Vec<String>> {
    let response: TagsResponse = client.get("/tags").await?;
    Ok(response.tags)
}

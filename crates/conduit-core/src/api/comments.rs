//! Comments on an article.

use serde::{Deserialize, Serialize};

use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::models::Comment;

#[derive(Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct CommentResponse {
    comment: Comment,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    comment: CommentDraft<'a>,
}

#[derive(Serialize)]
struct CommentDraft<'a> {
    body: &'a str,
}

pub async fn list(client: &ApiClient, slug: &str) -> ApiResult<Vec<Comment>> {
    let response: CommentsResponse = client.get(&format!("/articles/{slug}/comments")).await?;
    Ok(response.comments)
}

pub async fn add(client: &ApiClient, slug: &str, body: &str) -> ApiResult<Comment> {
    let response: CommentResponse = client
        .post(
            &format!("/articles/{slug}/comments"),
            &CommentBody {
                comment: CommentDraft { body },
            },
        )
        .await?;
    Ok(response.comment)
}

pub async fn delete(client: &ApiClient, slug: &str, id: u64) -> ApiResult<()> {
    client.delete(&format!("/articles/{slug}/comments/{id}")).await
}

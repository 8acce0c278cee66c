//! Article listing and CRUD over `/articles`.

use serde::{Deserialize, Serialize};

use crate::api::client::ApiClient;
use crate::api::error::ApiResult;
use crate::models::{Article, ArticleDraft};

#[derive(Deserialize)]
struct ArticleResponse {
    article: Article,
}

#[derive(Serialize)]
struct ArticleBody<'a> {
    article: &'a ArticleDraft,
}

/// One page of articles plus the total count reported by the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub articles_count: u64,
}

/// Filters for the global article list.
#[derive(Debug, Clone, Default)]
pub struct ArticleListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ArticleListQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(tag) = &self.tag {
            params.push(("tag", tag.clone()));
        }
        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        if let Some(favorited) = &self.favorited {
            params.push(("favorited", favorited.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

pub async fn list(client: &ApiClient, query: &ArticleListQuery) -> ApiResult<ArticleList> {
    client.get_with_query("/articles", &query.to_params()).await
}

/// Articles by followed authors; requires a signed-in session.
pub async fn feed(
    client: &ApiClient,
    limit: Option<u32>,
    offset: Option<u32>,
) -> ApiResult<ArticleList> {
    let mut params = Vec::new();
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(offset) = offset {
        params.push(("offset", offset.to_string()));
    }
    client.get_with_query("/articles/feed", &params).await
}

pub async fn get(client: &ApiClient, slug: &str) -> ApiResult<Article> {
    let response: ArticleResponse = client.get(&format!("/articles/{slug}")).await?;
    Ok(response.article)
}

pub async fn create(client: &ApiClient, draft: &ArticleDraft) -> ApiResult<Article> {
    let response: ArticleResponse = client.post("/articles", &ArticleBody { article: draft }).await?;
    Ok(response.article)
}

pub async fn update(client: &ApiClient, slug: &str, draft: &ArticleDraft) -> ApiResult<Article> {
    let response: ArticleResponse = client
        .put(&format!("/articles/{slug}"), &ArticleBody { article: draft })
        .await?;
    Ok(response.article)
}

pub async fn delete(client: &ApiClient, slug: &str) -> ApiResult<()> {
    client.delete(&format!("/articles/{slug}")).await
}

pub async fn favorite(client: &ApiClient, slug: &str) -> ApiResult<Article> {
    let response: ArticleResponse = client
        .post_empty(&format!("/articles/{slug}/favorite"))
        .await?;
    Ok(response.article)
}

pub async fn unfavorite(client: &ApiClient, slug: &str) -> ApiResult<()> {
    client.delete(&format!("/articles/{slug}/favorite")).await
}

//! Article and tag listing handlers.

use anyhow::Result;
use conduit_core::api::articles::{self, ArticleListQuery};
use conduit_core::api::{ApiClient, tags};

use super::api_failure;

pub async fn list(client: &ApiClient, query: &ArticleListQuery) -> Result<()> {
    let page = articles::list(client, query)
        .await
        .map_err(|err| api_failure("could not list articles", &err))?;

    println!("{} article(s)", page.articles_count);
    for article in page.articles {
        println!(
            "{}  {}  (by {}, {})",
            article.created_at.format("%Y-%m-%d"),
            article.title,
            article.author.username,
            article.slug
        );
    }
    Ok(())
}

pub async fn tags(client: &ApiClient) -> Result<()> {
    let tags = tags::list(client)
        .await
        .map_err(|err| api_failure("could not list tags", &err))?;
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}

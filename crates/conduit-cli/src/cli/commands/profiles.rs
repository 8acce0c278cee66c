//! Profile display handler.

use anyhow::Result;
use conduit_core::api::{ApiClient, profiles};
use conduit_core::models::avatar_or_default;

use super::api_failure;

pub async fn show(client: &ApiClient, username: &str) -> Result<()> {
    let profile = profiles::get(client, username)
        .await
        .map_err(|err| api_failure("could not load profile", &err))?;

    println!("{}", profile.username);
    if !profile.bio.is_empty() {
        println!("{}", profile.bio);
    }
    println!("avatar: {}", avatar_or_default(&profile.image));
    if profile.following {
        println!("(following)");
    }
    Ok(())
}

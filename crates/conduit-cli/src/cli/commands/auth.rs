//! Session command handlers (login, register, logout, whoami, settings).

use anyhow::{Context, Result};
use conduit_core::auth::credentials::mask_token;
use conduit_core::auth::{Session, SessionState};
use conduit_core::models::UserUpdate;

use super::api_failure;

pub async fn login(session: &Session, email: &str, password: &str) -> Result<()> {
    let user = session
        .login(email, password)
        .await
        .map_err(|err| api_failure("login failed", &err))?;
    println!("Logged in as {}", user.username);
    Ok(())
}

pub async fn register(
    session: &Session,
    username: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let user = session
        .register(username, email, password)
        .await
        .map_err(|err| api_failure("registration failed", &err))?;
    println!("Registered and logged in as {}", user.username);
    Ok(())
}

pub fn logout(session: &Session) -> Result<()> {
    session.logout();
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(session: &Session) -> Result<()> {
    session.init().await;

    match session.state() {
        SessionState::Authenticated => {
            let user = session
                .current_user_snapshot()
                .context("no user cached for an authenticated session")?;
            println!("{} <{}>", user.username, user.email);
            if !user.bio.is_empty() {
                println!("{}", user.bio);
            }
        }
        SessionState::Unauthenticated => {
            println!("Not logged in.");
        }
        SessionState::Unavailable => {
            let token = session.token().unwrap_or_default();
            println!(
                "Server unavailable; keeping stored credential {}",
                mask_token(&token)
            );
        }
        SessionState::Loading => {
            println!("Still checking the stored credential.");
        }
    }
    Ok(())
}

pub async fn settings(session: &Session, changes: &UserUpdate) -> Result<()> {
    let user = session
        .update(changes)
        .await
        .map_err(|err| api_failure("settings update failed", &err))?;
    println!("Updated settings for {}", user.username);
    Ok(())
}

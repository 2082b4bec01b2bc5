//! Token commands.

use anyhow::Result;
use dotci_db::{DbError, TokenStore};
use serde_json::json;

pub async fn get(store: &dyn TokenStore, url: &str, show_token: bool) -> Result<String> {
    let record = store.get(url).await?;
    let token = if show_token {
        record.token.clone()
    } else {
        mask(&record.token)
    };
    let output = json!({
        "repo_url": record.repository_url,
        "user": record.owner,
        "access_token": token,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

pub async fn put(store: &dyn TokenStore, url: &str, token: &str, user: &str) -> Result<String> {
    store.put(url, token, user).await?;
    Ok(format!("Stored token for {} (user {})", url, user))
}

pub async fn update(store: &dyn TokenStore, user: &str, token: &str) -> Result<String> {
    let updated = store.update_token(user, token).await?;
    Ok(format!("Updated {} token(s) for user {}", updated, user))
}

/// Returns the message and whether the repository is configured.
///
/// A single lookup, so a record removed concurrently reads as not configured.
pub async fn check(store: &dyn TokenStore, url: &str) -> Result<(String, bool)> {
    match store.associated_login(url).await {
        Ok(user) => Ok((format!("{} is configured (user {})", url, user), true)),
        Err(DbError::NotFound(_)) => Ok((format!("{} is not configured", url), false)),
        Err(e) => Err(e.into()),
    }
}

/// Keep the last four characters of a token.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

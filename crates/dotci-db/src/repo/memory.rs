//! In-memory token store.

use async_trait::async_trait;
use dotci_core::TokenCipher;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::token::{TokenRecord, TokenRow, TokenStore};
use crate::{DbError, DbResult};

/// Token store held in process memory, keyed by repository URL.
///
/// Tokens are still encrypted at rest in the map.
pub struct MemoryTokenStore {
    rows: RwLock<HashMap<String, TokenRow>>,
    cipher: TokenCipher,
}

impl MemoryTokenStore {
    pub fn new(cipher: TokenCipher) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            cipher,
        }
    }

    /// Snapshot of the stored rows, sorted by repository URL.
    pub async fn rows(&self) -> Vec<TokenRow> {
        let mut rows: Vec<TokenRow> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.repo_url.cmp(&b.repo_url));
        rows
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, repo_url: &str) -> DbResult<TokenRecord> {
        let row = self
            .rows
            .read()
            .await
            .get(repo_url)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("token for {}", repo_url)))?;
        row.decrypt(&self.cipher)
    }

    async fn put(&self, repo_url: &str, access_token: &str, user: &str) -> DbResult<()> {
        let row = TokenRow {
            repo_url: repo_url.to_string(),
            user: user.to_string(),
            access_token: self.cipher.encrypt(access_token)?,
        };
        self.rows.write().await.insert(repo_url.to_string(), row);
        info!(repo_url = %repo_url, user = %user, "Stored access token");
        Ok(())
    }

    async fn update_token(&self, user: &str, access_token: &str) -> DbResult<u64> {
        let encrypted = self.cipher.encrypt(access_token)?;
        let mut rows = self.rows.write().await;
        let mut updated = 0;
        for row in rows.values_mut().filter(|r| r.user == user) {
            row.access_token = encrypted.clone();
            updated += 1;
        }
        debug!(user = %user, updated, "Updated access tokens");
        Ok(updated)
    }

    async fn is_configured(&self, repo_url: &str) -> DbResult<bool> {
        Ok(self.rows.read().await.contains_key(repo_url))
    }

    async fn associated_login(&self, repo_url: &str) -> DbResult<String> {
        self.rows
            .read()
            .await
            .get(repo_url)
            .map(|row| row.user.clone())
            .ok_or_else(|| DbError::NotFound(format!("token for {}", repo_url)))
    }
}

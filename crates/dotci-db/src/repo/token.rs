//! Access token repository (one encrypted token per repository URL).

use async_trait::async_trait;
use dotci_core::TokenCipher;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::{DbError, DbResult};

/// Database row for stored tokens. `access_token` is the encrypted blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenRow {
    pub repo_url: String,
    pub user: String,
    pub access_token: String,
}

impl TokenRow {
    /// Decrypt the row into a record.
    pub fn decrypt(self, cipher: &TokenCipher) -> DbResult<TokenRecord> {
        let token = cipher.decrypt(&self.access_token)?;
        Ok(TokenRecord {
            repository_url: self.repo_url,
            owner: self.user,
            token,
        })
    }
}

/// A decrypted access token and the login it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub repository_url: String,
    pub owner: String,
    pub token: String,
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("repository_url", &self.repository_url)
            .field("owner", &self.owner)
            .field("token", &"***")
            .finish()
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Get the decrypted token for a repository.
    async fn get(&self, repo_url: &str) -> DbResult<TokenRecord>;

    /// Store a token, replacing any existing record for the repository in one step.
    async fn put(&self, repo_url: &str, access_token: &str, user: &str) -> DbResult<()>;

    /// Replace the token on every record owned by `user`.
    ///
    /// Returns the number of records updated; zero is not an error.
    async fn update_token(&self, user: &str, access_token: &str) -> DbResult<u64>;

    /// Whether a token is stored for the repository. Never decrypts.
    async fn is_configured(&self, repo_url: &str) -> DbResult<bool>;

    /// The login the repository's token belongs to. Never decrypts.
    async fn associated_login(&self, repo_url: &str) -> DbResult<String>;

    /// The decrypted token for a repository.
    async fn access_token(&self, repo_url: &str) -> DbResult<String> {
        Ok(self.get(repo_url).await?.token)
    }
}

/// PostgreSQL implementation.
pub struct PgTokenStore {
    pool: PgPool,
    cipher: TokenCipher,
}

impl PgTokenStore {
    pub fn new(pool: PgPool, cipher: TokenCipher) -> Self {
        Self { pool, cipher }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn get(&self, repo_url: &str) -> DbResult<TokenRecord> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"SELECT repo_url, "user", access_token FROM github_tokens WHERE repo_url = $1"#,
        )
        .bind(repo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("token for {}", repo_url)))?;
        row.decrypt(&self.cipher)
    }

    async fn put(&self, repo_url: &str, access_token: &str, user: &str) -> DbResult<()> {
        let encrypted = self.cipher.encrypt(access_token)?;
        sqlx::query(
            r#"
            INSERT INTO github_tokens (repo_url, "user", access_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (repo_url)
            DO UPDATE SET "user" = EXCLUDED."user", access_token = EXCLUDED.access_token
            "#,
        )
        .bind(repo_url)
        .bind(user)
        .bind(encrypted)
        .execute(&self.pool)
        .await?;
        info!(repo_url = %repo_url, user = %user, "Stored access token");
        Ok(())
    }

    async fn update_token(&self, user: &str, access_token: &str) -> DbResult<u64> {
        let encrypted = self.cipher.encrypt(access_token)?;
        let result = sqlx::query(r#"UPDATE github_tokens SET access_token = $2 WHERE "user" = $1"#)
            .bind(user)
            .bind(encrypted)
            .execute(&self.pool)
            .await?;
        let updated = result.rows_affected();
        debug!(user = %user, updated, "Updated access tokens");
        Ok(updated)
    }

    async fn is_configured(&self, repo_url: &str) -> DbResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM github_tokens WHERE repo_url = $1)",
        )
        .bind(repo_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn associated_login(&self, repo_url: &str) -> DbResult<String> {
        sqlx::query_scalar::<_, String>(r#"SELECT "user" FROM github_tokens WHERE repo_url = $1"#)
            .bind(repo_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("token for {}", repo_url)))
    }
}

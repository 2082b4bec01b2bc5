//! CLI command implementations.

pub mod tokens;

use anyhow::{Context, Result};
use dotci_config::SystemConfig;
use dotci_core::TokenCipher;
use dotci_db::{PgTokenStore, TokenStore, create_pool, run_migrations};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Load the configuration file (if present) and apply environment overrides.
pub fn load_config(path: &Path) -> Result<SystemConfig> {
    let config = if path.exists() {
        debug!(path = %path.display(), "Loading configuration");
        SystemConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?
    } else {
        debug!(path = %path.display(), "No configuration file, using defaults");
        SystemConfig::default()
    };
    Ok(config.with_env_overrides())
}

fn database_url(config: &SystemConfig) -> Result<&str> {
    config
        .database
        .url
        .as_deref()
        .context("no database configured (set DATABASE_URL or `database url=...`)")
}

/// Open the configured token store.
pub async fn connect(config: &SystemConfig) -> Result<Arc<dyn TokenStore>> {
    let cipher = config.credentials.cipher()?;
    let pool = create_pool(database_url(config)?, config.database.max_connections).await?;
    Ok(Arc::new(PgTokenStore::new(pool, cipher)))
}

pub async fn migrate(config: &SystemConfig) -> Result<()> {
    let pool = create_pool(database_url(config)?, config.database.max_connections).await?;
    run_migrations(&pool).await?;
    info!("Migrations applied");
    Ok(())
}

pub fn keygen() -> String {
    TokenCipher::generate_key()
}

//! System configuration parsing.
//!
//! ```kdl
//! database url="postgres://dotci@localhost/dotci" max-connections=10
//! credentials key-env="DOTCI_TOKEN_KEY"
//! ```
//!
//! `credentials` takes exactly one of `key` (base64, 32 bytes),
//! `passphrase` or `key-env` (name of a variable holding a base64 key).
//! A `passphrase` also needs a `salt` of at least eight bytes.

use crate::{ConfigError, ConfigResult};
use dotci_core::TokenCipher;
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Variable consulted for the token key when nothing else is configured.
pub const DEFAULT_KEY_ENV: &str = "DOTCI_TOKEN_KEY";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// System-wide configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    pub database: DatabaseConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub key: KeySource,
}

/// Where the token encryption key comes from.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// A base64-encoded 32-byte key.
    Base64(String),
    /// A passphrase stretched into a key with Argon2id.
    Passphrase { passphrase: String, salt: String },
    /// Name of an environment variable holding a base64 key.
    Env(String),
}

impl Default for KeySource {
    fn default() -> Self {
        KeySource::Env(DEFAULT_KEY_ENV.to_string())
    }
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Base64(_) => write!(f, "Base64(***)"),
            KeySource::Passphrase { .. } => write!(f, "Passphrase(***)"),
            KeySource::Env(var) => write!(f, "Env({})", var),
        }
    }
}

impl CredentialsConfig {
    /// Build the token cipher, reading the environment through `lookup`.
    pub fn cipher_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<TokenCipher> {
        let invalid = |e: dotci_core::Error| ConfigError::InvalidValue {
            field: "credentials".to_string(),
            message: e.to_string(),
        };
        match &self.key {
            KeySource::Base64(key) => TokenCipher::from_base64(key).map_err(invalid),
            KeySource::Passphrase { passphrase, salt } => {
                TokenCipher::from_passphrase(passphrase, salt).map_err(invalid)
            }
            KeySource::Env(var) => {
                let key = lookup(var).ok_or_else(|| {
                    ConfigError::MissingField(format!("environment variable {}", var))
                })?;
                TokenCipher::from_base64(&key).map_err(invalid)
            }
        }
    }

    /// Build the token cipher from the process environment.
    pub fn cipher(&self) -> ConfigResult<TokenCipher> {
        self.cipher_with(|var| std::env::var(var).ok())
    }
}

impl SystemConfig {
    /// Load and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        parse_system_config(&content)
    }

    /// Apply `DATABASE_URL` and `DOTCI_TOKEN_KEY` overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(key) = lookup(DEFAULT_KEY_ENV) {
            self.credentials.key = KeySource::Base64(key);
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|var| std::env::var(var).ok())
    }
}

/// Parse system configuration from KDL text.
pub fn parse_system_config(kdl: &str) -> ConfigResult<SystemConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut database: Option<DatabaseConfig> = None;
    let mut credentials: Option<CredentialsConfig> = None;

    for node in doc.nodes() {
        match node.name().value() {
            "database" => {
                if database.is_some() {
                    return Err(ConfigError::Duplicate("database".to_string()));
                }
                database = Some(parse_database(node)?);
            }
            "credentials" => {
                if credentials.is_some() {
                    return Err(ConfigError::Duplicate("credentials".to_string()));
                }
                credentials = Some(parse_credentials(node)?);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(SystemConfig {
        database: database.unwrap_or_default(),
        credentials: credentials.unwrap_or_default(),
    })
}

fn parse_database(node: &KdlNode) -> ConfigResult<DatabaseConfig> {
    let url = get_string_prop(node, "url");
    let max_connections = match node.get("max-connections") {
        None => DEFAULT_MAX_CONNECTIONS,
        Some(value) => value
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "database max-connections".to_string(),
                message: format!("expected a positive integer, got {}", value),
            })?,
    };
    Ok(DatabaseConfig {
        url,
        max_connections,
    })
}

fn parse_credentials(node: &KdlNode) -> ConfigResult<CredentialsConfig> {
    let mut sources = Vec::new();
    if let Some(key) = get_string_prop(node, "key") {
        sources.push(KeySource::Base64(key));
    }
    if let Some(passphrase) = get_string_prop(node, "passphrase") {
        let salt = get_string_prop(node, "salt")
            .ok_or_else(|| ConfigError::MissingField("credentials salt".to_string()))?;
        sources.push(KeySource::Passphrase { passphrase, salt });
    }
    if let Some(var) = get_string_prop(node, "key-env") {
        sources.push(KeySource::Env(var));
    }

    match sources.len() {
        0 => Err(ConfigError::MissingField(
            "credentials key, passphrase or key-env".to_string(),
        )),
        1 => Ok(CredentialsConfig {
            key: sources.remove(0),
        }),
        _ => Err(ConfigError::InvalidValue {
            field: "credentials".to_string(),
            message: "only one of key, passphrase or key-env may be set".to_string(),
        }),
    }
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let kdl = r#"
            database url="postgres://dotci@localhost/dotci" max-connections=4
            credentials passphrase="hunter2" salt="dotci-salt"
        "#;

        let config = parse_system_config(kdl).unwrap();
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://dotci@localhost/dotci")
        );
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(
            config.credentials.key,
            KeySource::Passphrase {
                passphrase: "hunter2".to_string(),
                salt: "dotci-salt".to_string(),
            }
        );
    }

    #[test]
    fn test_passphrase_requires_salt() {
        let result = parse_system_config(r#"credentials passphrase="hunter2""#);
        assert!(matches!(result, Err(ConfigError::MissingField(_))));

        let credentials = CredentialsConfig {
            key: KeySource::Passphrase {
                passphrase: "hunter2".to_string(),
                salt: "short".to_string(),
            },
        };
        assert!(matches!(
            credentials.cipher_with(|_| None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_cipher_from_passphrase_source() {
        let config =
            parse_system_config(r#"credentials passphrase="hunter2" salt="dotci-salt""#).unwrap();
        let cipher = config.credentials.cipher_with(|_| None).unwrap();
        let blob = cipher.encrypt("token").unwrap();

        let again = config.credentials.cipher_with(|_| None).unwrap();
        assert_eq!(again.decrypt(&blob).unwrap(), "token");
    }

    #[test]
    fn test_defaults() {
        let config = parse_system_config("").unwrap();
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(
            config.credentials.key,
            KeySource::Env("DOTCI_TOKEN_KEY".to_string())
        );
    }

    #[test]
    fn test_credentials_need_exactly_one_source() {
        let result = parse_system_config("credentials");
        assert!(matches!(result, Err(ConfigError::MissingField(_))));

        let result = parse_system_config(r#"credentials key="abc" passphrase="x" salt="dotci-salt""#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_duplicate_nodes() {
        let kdl = r#"
            database url="postgres://a"
            database url="postgres://b"
        "#;
        assert!(matches!(
            parse_system_config(kdl),
            Err(ConfigError::Duplicate(_))
        ));
    }

    #[test]
    fn test_invalid_max_connections() {
        let result = parse_system_config("database max-connections=0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let key = TokenCipher::generate_key();
        let config = parse_system_config(r#"database url="postgres://file""#)
            .unwrap()
            .with_overrides(|var| match var {
                "DATABASE_URL" => Some("postgres://env".to_string()),
                "DOTCI_TOKEN_KEY" => Some(key.clone()),
                _ => None,
            });

        assert_eq!(config.database.url.as_deref(), Some("postgres://env"));
        assert_eq!(config.credentials.key, KeySource::Base64(key));
    }

    #[test]
    fn test_cipher_from_env_source() {
        let key = TokenCipher::generate_key();
        let credentials = CredentialsConfig {
            key: KeySource::Env("MY_KEY".to_string()),
        };

        let cipher = credentials
            .cipher_with(|var| (var == "MY_KEY").then(|| key.clone()))
            .unwrap();
        let blob = cipher.encrypt("token").unwrap();
        assert_eq!(cipher.decrypt(&blob).unwrap(), "token");

        let missing = credentials.cipher_with(|_| None);
        assert!(matches!(missing, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_bad_key_is_invalid_value() {
        let credentials = CredentialsConfig {
            key: KeySource::Base64("too-short".to_string()),
        };
        assert!(matches!(
            credentials.cipher_with(|_| None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let source = KeySource::Passphrase {
            passphrase: "hunter2".to_string(),
            salt: "dotci-salt".to_string(),
        };
        let shown = format!("{:?}", source);
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("dotci-salt"));
    }
}

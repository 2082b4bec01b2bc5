//! KDL configuration parsing for DotCi.
//!
//! This crate handles parsing of the system configuration file
//! (`dotci.kdl`) and its environment overrides.

pub mod error;
pub mod system;

pub use error::{ConfigError, ConfigResult};
pub use system::{CredentialsConfig, DatabaseConfig, KeySource, SystemConfig, parse_system_config};

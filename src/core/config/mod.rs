//! core::config
//!
//! Client configuration.
//!
//! # Overview
//!
//! A [`ClientConfig`] carries everything the HTTP transport needs:
//! credentials, the API base URL and the User-Agent value. It is an
//! explicit value handed to the client; there is no global or ambient
//! configuration and nothing is read from disk by this crate.
//!
//! # Sources
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. TOML text supplied by the caller ([`ClientConfig::from_toml_str`])
//! 3. Builder overrides (`with_api_base`, `with_user_agent`)
//!
//! # Example
//!
//! ```
//! use ghrepo::core::config::ClientConfig;
//!
//! let config = ClientConfig::from_toml_str(
//!     r#"
//!     [credentials]
//!     username = "octocat"
//!     password = "ghp_xxx"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.api_base, "https://api.github.com");
//! ```

pub mod schema;

pub use schema::{ClientConfig, DEFAULT_API_BASE, DEFAULT_USER_AGENT};

use thiserror::Error;

/// Errors from configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

impl ClientConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Parse` if the text is not valid TOML or has unknown keys
    /// - `ConfigError::InvalidValue` if a value fails validation
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

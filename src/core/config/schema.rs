//! core::config::schema
//!
//! Client configuration schema.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad API base or
//! user agent is reported before any request is attempted.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Credentials;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default User-Agent header value for API requests.
pub const DEFAULT_USER_AGENT: &str = "ghrepo";

/// Client configuration.
///
/// Held by the client and its transport; sessions and repository handles
/// receive what they need from it explicitly.
///
/// # Example
///
/// ```toml
/// api_base = "https://github.example.com/api/v3"
/// user_agent = "my-tool"
///
/// [credentials]
/// username = "octocat"
/// password = "ghp_xxx"
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API base URL (configurable for GitHub Enterprise)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Basic auth credentials
    pub credentials: Credentials,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    /// Create a configuration with default API base and user agent.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            credentials,
        }
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            return Err(ConfigError::InvalidValue(format!(
                "api_base '{}' must be an http(s) URL",
                self.api_base
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "user_agent cannot be empty".into(),
            ));
        }
        if self.user_agent.chars().any(|c| c.is_control()) {
            return Err(ConfigError::InvalidValue(
                "user_agent cannot contain control characters".into(),
            ));
        }

        Ok(())
    }
}

// Custom Debug so the password never lands in logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("credentials", &self.credentials)
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Credentials::new("user", "pass"))
    }

    #[test]
    fn defaults() {
        let config = config();
        assert_eq!(config.api_base, "https://api.github.com");
        assert_eq!(config.user_agent, "ghrepo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enterprise_api_base() {
        let config = config().with_api_base("https://github.example.com/api/v3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn plain_http_allowed() {
        let config = config().with_api_base("http://127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_api_base() {
        let config = config().with_api_base("api.github.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn empty_user_agent() {
        let config = config().with_user_agent("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn user_agent_with_newline() {
        let config = config().with_user_agent("agent\nX-Injected: 1");
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let config = ClientConfig::new(Credentials::new("user", "super_secret_pw"));
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super_secret_pw"));
        assert!(debug_output.contains("api_base"));
    }
}

//! client
//!
//! Entry point that turns credentials into sessions and repository handles.
//!
//! # Design
//!
//! The client owns the transport and hands an `Arc` of it to everything
//! it creates. Construction does no I/O; the first network call happens
//! when an operation on a session or handle is awaited.
//!
//! # Example
//!
//! ```
//! use ghrepo::Client;
//! use ghrepo::core::types::Credentials;
//!
//! let client = Client::new(Credentials::new("octocat", "ghp_xxx"));
//!
//! let repo = client.repo("octocat", "hello-world", None);
//! assert_eq!(repo.branch(), "master");
//!
//! let repo = client.repo_from_url("git@github.com:octocat/hello-world.git", Some("main"));
//! assert_eq!(repo.unwrap().name(), "hello-world");
//! ```

use std::sync::Arc;

use crate::api::{HttpTransport, Transport};
use crate::core::config::{ClientConfig, ConfigError};
use crate::core::types::{Credentials, RepoCoordinates};
use crate::repo::RepositoryHandle;
use crate::user::UserSession;

/// Client facade.
#[derive(Clone)]
pub struct Client {
    /// Transport shared by all sessions and handles
    transport: Arc<dyn Transport>,
    /// Authenticated user name, used as commit author
    username: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the public GitHub API.
    pub fn new(credentials: Credentials) -> Self {
        let username = credentials.username.clone();
        Self {
            transport: Arc::new(HttpTransport::new(ClientConfig::new(credentials))),
            username,
        }
    }

    /// Create a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the configuration fails validation.
    pub fn with_config(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let username = config.credentials.username.clone();
        Ok(Self {
            transport: Arc::new(HttpTransport::new(config)),
            username,
        })
    }

    /// Create a client over an arbitrary transport.
    ///
    /// Only the username is kept from `credentials`; authenticating is the
    /// transport's job.
    pub fn with_transport(credentials: &Credentials, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            username: credentials.username.clone(),
        }
    }

    /// Get the authenticated user name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Session for the authenticated user.
    pub fn user(&self) -> UserSession {
        UserSession::new(Arc::clone(&self.transport))
    }

    /// Handle on `owner/name`, on `branch` or `master` when `None`.
    pub fn repo(&self, owner: &str, name: &str, branch: Option<&str>) -> RepositoryHandle {
        RepositoryHandle::new(
            Arc::clone(&self.transport),
            self.username.clone(),
            RepoCoordinates::new(owner, name, branch),
        )
    }

    /// Handle on the repository a GitHub remote URL points at.
    ///
    /// Returns `None` if the URL is not a GitHub URL.
    pub fn repo_from_url(&self, url: &str, branch: Option<&str>) -> Option<RepositoryHandle> {
        let (owner, name) = parse_github_url(url)?;
        Some(self.repo(&owner, &name, branch))
    }
}

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use ghrepo::client::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:octocat/hello-world.git").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("git@github.com:").or_else(|| {
        url.strip_prefix("https://github.com/")
            .or_else(|| url.strip_prefix("http://github.com/"))
    })?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

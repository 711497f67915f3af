//! core::types
//!
//! Strong types for the client's domain concepts.
//!
//! # Types
//!
//! - [`Credentials`] - Username/password pair sent as Basic auth
//! - [`RepoCoordinates`] - Owner, repository name and default branch
//! - [`Sha`] - Object identifier issued by the remote store
//!
//! # Validation
//!
//! Unlike local git tooling, this crate never validates object ids or
//! credentials itself. The remote service owns those rules and reports
//! violations as API errors.
//!
//! # Examples
//!
//! ```
//! use ghrepo::core::types::{Credentials, RepoCoordinates, Sha, DEFAULT_BRANCH};
//!
//! let creds = Credentials::new("octocat", "hunter2");
//! assert!(!format!("{:?}", creds).contains("hunter2"));
//!
//! let coords = RepoCoordinates::new("octocat", "hello-world", None);
//! assert_eq!(coords.branch, DEFAULT_BRANCH);
//!
//! let sha = Sha::new("3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15");
//! assert_eq!(sha.short(7), "3a0f86f");
//! ```

use serde::{Deserialize, Serialize};

/// Branch used when a repository handle is created without one.
pub const DEFAULT_BRANCH: &str = "master";

/// Credentials for Basic authentication.
///
/// Passed through to the transport as-is; nothing is checked locally.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Account name, also used as the commit author name
    pub username: String,
    /// Password or personal access token
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Location of a repository on the remote service.
///
/// Immutable for the lifetime of a repository handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinates {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch the handle was opened on
    pub branch: String,
}

impl RepoCoordinates {
    /// Create coordinates, falling back to [`DEFAULT_BRANCH`] when no branch is given.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, branch: Option<&str>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: branch.unwrap_or(DEFAULT_BRANCH).to_string(),
        }
    }

    /// API path prefix for this repository, e.g. `/repos/octocat/hello-world`.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)
    }
}

/// Identifier of a blob, tree or commit in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    /// Wrap an id returned by the remote service.
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get an abbreviated form for display.
    pub fn short(&self, len: usize) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(len)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<Sha> for String {
    fn from(sha: Sha) -> Self {
        sha.0
    }
}

impl AsRef<str> for Sha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

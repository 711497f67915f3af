//! api::traits
//!
//! Transport trait definition for talking to the remote hosting service.
//!
//! # Design
//!
//! The `Transport` trait is async because every call is network I/O.
//! A transport issues exactly one request per call: no retries, no
//! timeouts, no rate-limit handling. Responses come back as JSON values;
//! the typed decoding happens one layer up, per endpoint.
//!
//! # Example
//!
//! ```ignore
//! use ghrepo::api::{HttpMethod, Transport, ApiError};
//!
//! async fn whoami(transport: &dyn Transport) -> Result<(), ApiError> {
//!     let repos = transport.request(HttpMethod::Get, "/user/repos?type=all", None).await?;
//!     println!("{}", repos);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from API operations.
///
/// Remote failures are kept opaque: the status and the service's message
/// are carried as-is and never decoded into structured codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// A requested path does not exist in the listing (raised locally).
    #[error("not found: {0}")]
    NotFound(String),

    /// The response did not match the expected schema.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// Whether this error means the target does not exist, locally or remotely.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_) | ApiError::Status { status: 404, .. }
        )
    }

    /// HTTP status code, if the error came from a remote response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP methods used by the API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// The Transport trait for issuing authenticated API calls.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one transport can back many
/// sessions and repository handles across tasks.
///
/// # Error Handling
///
/// - `Network`: the request never produced a response
/// - `Status`: the service answered with a non-2xx status
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single request.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path below the API base, including any query string
    /// * `body` - JSON body; `None` sends no payload
    ///
    /// # Returns
    ///
    /// The decoded JSON response, or `Value::Null` for an empty body.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError>;
}

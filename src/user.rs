//! user
//!
//! Operations scoped to the authenticated identity.

use std::sync::Arc;

use crate::api::schema::RepositorySummary;
use crate::api::{ApiError, HttpMethod, Transport};

/// Session for the authenticated user.
#[derive(Clone)]
pub struct UserSession {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession").finish_non_exhaustive()
    }
}

impl UserSession {
    /// Create a session over a transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List every repository visible to the authenticated user.
    ///
    /// Issues `GET /user/repos?type=all`. Transport errors are returned unchanged.
    pub async fn repos(&self) -> Result<Vec<RepositorySummary>, ApiError> {
        let value = self
            .transport
            .request(HttpMethod::Get, "/user/repos?type=all", None)
            .await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("/user/repos: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockCall, MockTransport};

    #[tokio::test]
    async fn lists_all_repos() {
        let mock = MockTransport::new();
        mock.create_repo("octocat", "hello-world");
        mock.create_repo("octo-org", "tools");

        let session = UserSession::new(Arc::new(mock.clone()));
        let repos = session.repos().await.unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["octo-org/tools", "octocat/hello-world"]);
        assert_eq!(mock.requests()[0].path, "/user/repos?type=all");
    }

    #[tokio::test]
    async fn surfaces_transport_error() {
        let error = ApiError::Status {
            status: 401,
            message: "Bad credentials".into(),
        };
        let mock = MockTransport::new().fail_on(MockCall::ListRepos, error.clone());

        let session = UserSession::new(Arc::new(mock));
        assert_eq!(session.repos().await.unwrap_err(), error);
    }
}

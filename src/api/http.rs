//! api::http
//!
//! HTTP transport for the GitHub REST API.
//!
//! # Design
//!
//! One shared `reqwest::Client` issues every call. Each request carries
//! Basic auth derived from the configured username and password, the
//! GitHub JSON media type, a User-Agent and the pinned API version.
//!
//! A call is a single attempt. Network failures become
//! `ApiError::Network`; non-2xx statuses become `ApiError::Status` with
//! the service's `message` when it sent one.
//!
//! # Example
//!
//! ```ignore
//! use ghrepo::api::{HttpMethod, HttpTransport, Transport};
//! use ghrepo::core::config::ClientConfig;
//! use ghrepo::core::types::Credentials;
//!
//! let transport = HttpTransport::new(ClientConfig::new(Credentials::new("octocat", "ghp_xxx")));
//! let repos = transport.request(HttpMethod::Get, "/user/repos?type=all", None).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use super::schema::ErrorResponse;
use super::traits::{ApiError, HttpMethod, Transport};
use crate::core::config::ClientConfig;

/// GitHub REST API version sent with every request.
const API_VERSION: &str = "2022-11-28";

/// Transport backed by `reqwest`.
pub struct HttpTransport {
    /// HTTP client for making requests
    client: Client,
    /// Credentials, API base and user agent
    config: ClientConfig,
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("username", &self.config.credentials.username)
            .field("api_base", &self.config.api_base)
            .field("user_agent", &self.config.user_agent)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from a configuration.
    ///
    /// The configuration is used as given; call [`ClientConfig::validate`]
    /// first when it comes from user input.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    /// Build the full URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Build common headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response(&self, response: Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            if bytes.iter().all(|b| b.is_ascii_whitespace()) {
                return Ok(serde_json::Value::Null);
            }
            serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Decode(format!("invalid JSON response: {}", e)))
        } else {
            Err(Self::handle_error_response(response, status).await)
        }
    }

    /// Turn a non-success response into an opaque status error.
    async fn handle_error_response(response: Response, status: StatusCode) -> ApiError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.url(path);
        debug!(%method, path, "sending request");

        let mut builder = self
            .client
            .request(method.into(), &url)
            .headers(self.headers())
            .header(reqwest::header::USER_AGENT, self.config.user_agent.as_str())
            .basic_auth(
                &self.config.credentials.username,
                Some(&self.config.credentials.password),
            );
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!(%method, path, status = response.status().as_u16(), "received response");
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Credentials;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::new(
            ClientConfig::new(Credentials::new("user", "pass")).with_api_base(server.uri()),
        )
    }

    mod construction {
        use super::*;

        #[test]
        fn url_joins_base_and_path() {
            let transport = HttpTransport::new(
                ClientConfig::new(Credentials::new("u", "p"))
                    .with_api_base("https://github.example.com/api/v3/"),
            );
            assert_eq!(
                transport.url("/repos/o/r/git/blobs"),
                "https://github.example.com/api/v3/repos/o/r/git/blobs"
            );
        }

        #[test]
        fn default_api_base() {
            let transport = HttpTransport::new(ClientConfig::new(Credentials::new("u", "p")));
            assert_eq!(transport.api_base(), "https://api.github.com");
        }

        #[test]
        fn debug_redacts_password() {
            let transport =
                HttpTransport::new(ClientConfig::new(Credentials::new("u", "secret_pw_987")));
            let debug_output = format!("{:?}", transport);
            assert!(!debug_output.contains("secret_pw_987"));
            assert!(debug_output.contains("api_base"));
        }
    }

    mod requests {
        use super::*;

        #[tokio::test]
        async fn sends_basic_auth_and_headers() {
            let server = MockServer::start().await;
            // base64("user:pass")
            Mock::given(method("GET"))
                .and(path("/user/repos"))
                .and(query_param("type", "all"))
                .and(header("authorization", "Basic dXNlcjpwYXNz"))
                .and(header("accept", "application/vnd.github+json"))
                .and(header("user-agent", "ghrepo"))
                .and(header("x-github-api-version", "2022-11-28"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
                .expect(1)
                .mount(&server)
                .await;

            let result = transport_for(&server)
                .request(HttpMethod::Get, "/user/repos?type=all", None)
                .await
                .unwrap();
            assert_eq!(result, serde_json::json!([]));
        }

        #[tokio::test]
        async fn sends_json_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/repos/o/r/git/blobs"))
                .and(body_json(
                    serde_json::json!({ "content": "hello", "encoding": "utf-8" }),
                ))
                .respond_with(
                    ResponseTemplate::new(201).set_body_json(serde_json::json!({ "sha": "b1" })),
                )
                .expect(1)
                .mount(&server)
                .await;

            let result = transport_for(&server)
                .request(
                    HttpMethod::Post,
                    "/repos/o/r/git/blobs",
                    Some(serde_json::json!({ "content": "hello", "encoding": "utf-8" })),
                )
                .await
                .unwrap();
            assert_eq!(result["sha"], "b1");
        }

        #[tokio::test]
        async fn empty_success_body_is_null() {
            let server = MockServer::start().await;
            Mock::given(method("PATCH"))
                .and(path("/repos/o/r/git/refs/heads/main"))
                .respond_with(ResponseTemplate::new(204))
                .mount(&server)
                .await;

            let result = transport_for(&server)
                .request(
                    HttpMethod::Patch,
                    "/repos/o/r/git/refs/heads/main",
                    Some(serde_json::json!({ "sha": "c2" })),
                )
                .await
                .unwrap();
            assert!(result.is_null());
        }
    }

    mod errors {
        use super::*;

        #[tokio::test]
        async fn not_found_carries_message() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/repos/o/r/git/refs/heads/missing"))
                .respond_with(
                    ResponseTemplate::new(404)
                        .set_body_json(serde_json::json!({ "message": "Not Found" })),
                )
                .mount(&server)
                .await;

            let err = transport_for(&server)
                .request(HttpMethod::Get, "/repos/o/r/git/refs/heads/missing", None)
                .await
                .unwrap_err();
            assert_eq!(
                err,
                ApiError::Status {
                    status: 404,
                    message: "Not Found".into(),
                }
            );
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn error_without_json_body() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
                .mount(&server)
                .await;

            let err = transport_for(&server)
                .request(HttpMethod::Get, "/repos/o/r", None)
                .await
                .unwrap_err();
            assert_eq!(
                err,
                ApiError::Status {
                    status: 502,
                    message: "Unknown error".into(),
                }
            );
        }

        #[tokio::test]
        async fn invalid_json_is_decode_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
                .mount(&server)
                .await;

            let err = transport_for(&server)
                .request(HttpMethod::Get, "/repos/o/r", None)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Decode(_)));
        }

        #[tokio::test]
        async fn unreachable_host_is_network_error() {
            // Reserve a port, then release it so nothing is listening there
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);

            let transport = HttpTransport::new(
                ClientConfig::new(Credentials::new("u", "p"))
                    .with_api_base(format!("http://127.0.0.1:{}", port)),
            );
            let err = transport
                .request(HttpMethod::Get, "/repos/o/r", None)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::Network(_)));
        }
    }
}

//! api
//!
//! Transport layer for the remote hosting service.
//!
//! # Architecture
//!
//! The `Transport` trait issues one authenticated request and hands back
//! the decoded JSON. Sessions and repository handles hold an
//! `Arc<dyn Transport>` rather than a concrete client, so the same code
//! runs against the real service or the in-memory mock.
//!
//! # Modules
//!
//! - `traits`: Core `Transport` trait, `HttpMethod` and `ApiError`
//! - [`schema`]: Typed request/response bodies per endpoint
//! - [`http`]: `reqwest`-backed implementation with Basic auth
//! - [`mock`]: In-memory git data store for deterministic testing

pub mod http;
pub mod mock;
pub mod schema;
mod traits;

pub use http::HttpTransport;
pub use traits::*;

//! ghrepo - A client for the GitHub git data API
//!
//! ghrepo reads and commits single files in a remote repository by
//! driving the low-level git data endpoints (refs, trees, blobs,
//! commits) over REST. Nothing is cloned or cached locally: every
//! operation is one or more calls against the hosting service.
//!
//! # Architecture
//!
//! The codebase is layered leaf-first:
//!
//! - [`api`] - `Transport` trait, HTTP implementation, wire schemas, mock
//! - [`user`] - Operations for the authenticated identity
//! - [`repo`] - Repository handle: primitives plus read/write workflows
//! - [`client`] - Facade building sessions and handles from credentials
//! - [`core`] - Shared types and configuration
//!
//! # Correctness Invariants
//!
//! 1. The write workflow never moves a branch before its commit exists
//! 2. Every multi-step workflow stops at the first error
//! 3. Responses are decoded into explicit schemas, never trusted blindly
//!
//! # Example
//!
//! ```ignore
//! use ghrepo::Client;
//! use ghrepo::core::types::Credentials;
//!
//! let client = Client::new(Credentials::new("octocat", "ghp_xxx"));
//! let repo = client.repo("octocat", "hello-world", None);
//!
//! repo.write("master", "hello.txt", "hello", "Add greeting").await?;
//! assert_eq!(repo.read("master", "hello.txt").await?, "hello");
//! ```

pub mod api;
pub mod client;
pub mod core;
pub mod repo;
pub mod user;

pub use api::{ApiError, Transport};
pub use client::Client;
pub use repo::{RepositoryHandle, WriteReceipt};
pub use user::UserSession;

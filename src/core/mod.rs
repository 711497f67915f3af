//! core
//!
//! Domain types and configuration shared by every layer.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Credentials, RepoCoordinates, Sha
//! - [`config`] - Client configuration schema and parsing
//!
//! # Design Principles
//!
//! - Configuration is an explicit value, never ambient state
//! - Remote objects are never cached or mutated locally

pub mod config;
pub mod types;

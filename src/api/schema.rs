//! api::schema
//!
//! Request and response shapes for the git data endpoints.
//!
//! Every endpoint is decoded into one of these types on receipt; a
//! response with an unexpected shape fails with `ApiError::Decode`
//! instead of being trusted blindly.

use serde::{Deserialize, Serialize};

use crate::core::types::Sha;

/// File mode for a regular, non-executable blob.
pub const MODE_FILE: &str = "100644";

/// Encoding tag used when posting blob content as text.
pub const ENCODING_UTF8: &str = "utf-8";

/// Encoding tag the service uses for base64 blob content.
pub const ENCODING_BASE64: &str = "base64";

// --------------------------------------------------------------------------
// Request bodies
// --------------------------------------------------------------------------

/// Request body for `POST /repos/{owner}/{repo}/git/blobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBlobBody {
    pub content: String,
    pub encoding: String,
}

/// One entry of a tree creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntryBody {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: Sha,
}

/// Request body for `POST /repos/{owner}/{repo}/git/trees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTreeBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<Sha>,
    pub tree: Vec<TreeEntryBody>,
}

/// Commit author as accepted by the commit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
}

/// Request body for `POST /repos/{owner}/{repo}/git/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommitBody {
    pub message: String,
    pub author: CommitAuthor,
    pub parents: Vec<Sha>,
    pub tree: Sha,
}

/// Request body for `PATCH /repos/{owner}/{repo}/git/refs/heads/{ref}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRefBody {
    pub sha: Sha,
}

// --------------------------------------------------------------------------
// Responses
// --------------------------------------------------------------------------

/// Any creation response; only the new object's id is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShaResponse {
    pub sha: Sha,
}

/// Object a reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefObject {
    pub sha: Sha,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A git reference as returned by the refs endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefResponse {
    /// Full reference name, e.g. `refs/heads/main`
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: RefObject,
}

/// One entry of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative path
    pub path: String,
    pub mode: String,
    /// `blob`, `tree` or `commit`
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: Sha,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl TreeEntry {
    /// Whether this entry is a file.
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// A tree as returned by `GET /repos/{owner}/{repo}/git/trees/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResponse {
    pub sha: Sha,
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// A blob as returned by `GET /repos/{owner}/{repo}/git/blobs/{sha}`.
///
/// `content` is absent for some responses; decoding treats that as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Blob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<Sha>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Minimal owner info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub login: String,
}

/// A repository descriptor from `GET /user/repos`.
///
/// Known fields are typed; everything else the service sends is kept in
/// `extra` so the descriptor is not lossy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub owner: OwnerInfo,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error body the service sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}

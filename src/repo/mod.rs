//! repo
//!
//! Repository handle: primitive git data operations and the read/write
//! workflows composed from them.
//!
//! # Design
//!
//! A [`RepositoryHandle`] is bound to one `owner/name` pair for its whole
//! life; every path it requests starts with `/repos/{owner}/{name}`.
//! Each primitive maps to exactly one API call and decodes the response
//! into the schema for that endpoint.
//!
//! The composite operations never cache anything between calls:
//!
//! - `read` lists the branch recursively, picks the entry whose path
//!   matches exactly, then fetches and decodes that blob.
//! - `write` chains six dependent calls (see [`write`]) and stops at the
//!   first error. Objects created before the failure stay behind in the
//!   remote store, but the branch ref is left untouched.
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
//! repo.write("master", "notes/todo.md", "- ship it\n", "Update todo").await?;
//! let text = repo.read("master", "notes/todo.md").await?;
//! assert_eq!(text, "- ship it\n");
//! ```

pub mod write;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::schema::{
    Blob, CommitAuthor, CreateBlobBody, CreateCommitBody, CreateTreeBody, RefResponse,
    ShaResponse, TreeEntry, TreeEntryBody, TreeResponse, UpdateRefBody, ENCODING_BASE64,
    ENCODING_UTF8, MODE_FILE,
};
use crate::api::{ApiError, HttpMethod, Transport};
use crate::core::types::{RepoCoordinates, Sha};

pub use write::{WriteReceipt, WriteStep};

/// Handle on a single remote repository.
#[derive(Clone)]
pub struct RepositoryHandle {
    /// Transport shared with the client
    transport: Arc<dyn Transport>,
    /// Name recorded as commit author
    author: String,
    /// Owner, name and branch this handle was opened on
    coordinates: RepoCoordinates,
    /// `/repos/{owner}/{name}`
    repo_path: String,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("author", &self.author)
            .field("coordinates", &self.coordinates)
            .finish_non_exhaustive()
    }
}

impl RepositoryHandle {
    /// Create a handle over a transport.
    ///
    /// `author` is the name written into commits created by [`commit`](Self::commit).
    pub fn new(
        transport: Arc<dyn Transport>,
        author: impl Into<String>,
        coordinates: RepoCoordinates,
    ) -> Self {
        let repo_path = coordinates.api_path();
        Self {
            transport,
            author: author.into(),
            coordinates,
            repo_path,
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.coordinates.owner
    }

    /// Get the repository name.
    pub fn name(&self) -> &str {
        &self.coordinates.name
    }

    /// Get the branch this handle was opened on.
    pub fn branch(&self) -> &str {
        &self.coordinates.branch
    }

    /// Get the full coordinates.
    pub fn coordinates(&self) -> &RepoCoordinates {
        &self.coordinates
    }

    /// Build a path for a repository endpoint.
    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.repo_path, suffix)
    }

    /// GET a path and decode the response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.transport.request(HttpMethod::Get, path, None).await?;
        decode(path, value)
    }

    /// Send a JSON body and decode the response.
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        let value = self.transport.request(method, path, Some(body)).await?;
        decode(path, value)
    }

    /// Get the commit a branch points at.
    ///
    /// Issues `GET .../git/refs/heads/{ref_name}`. A missing branch surfaces
    /// as the service's 404.
    pub async fn get_ref(&self, ref_name: &str) -> Result<Sha, ApiError> {
        let head: RefResponse = self
            .get(&self.path(&format!("/git/refs/heads/{}", ref_name)))
            .await?;
        Ok(head.object.sha)
    }

    /// List branch names.
    ///
    /// Each name is the last `/`-separated segment of the returned ref.
    pub async fn list_branches(&self) -> Result<Vec<String>, ApiError> {
        let heads: Vec<RefResponse> = self.get(&self.path("/git/refs/heads")).await?;
        Ok(heads
            .iter()
            .map(|head| branch_name_from_ref(&head.ref_name).to_string())
            .collect())
    }

    /// Fetch a blob as the service returns it.
    pub async fn get_blob(&self, sha: &Sha) -> Result<Blob, ApiError> {
        self.get(&self.path(&format!("/git/blobs/{}", sha))).await
    }

    /// Resolve a commit (or tree-ish) to its tree's sha.
    ///
    /// Only the tree's own sha is returned, not its entries.
    pub async fn get_tree(&self, commit: &Sha) -> Result<Sha, ApiError> {
        let tree: TreeResponse = self.get(&self.path(&format!("/git/trees/{}", commit))).await?;
        Ok(tree.sha)
    }

    /// Store text content as a new blob.
    pub async fn post_blob(&self, content: &str) -> Result<Sha, ApiError> {
        let body = CreateBlobBody {
            content: content.to_string(),
            encoding: ENCODING_UTF8.to_string(),
        };
        let created: ShaResponse = self
            .send(HttpMethod::Post, &self.path("/git/blobs"), &body)
            .await?;
        Ok(created.sha)
    }

    /// Create a tree equal to `base_tree` with `path` pointing at `blob`.
    ///
    /// Exactly one file entry is added or replaced per call.
    pub async fn post_tree(&self, base_tree: &Sha, path: &str, blob: &Sha) -> Result<Sha, ApiError> {
        let body = tree_body(base_tree, path, blob);
        let created: ShaResponse = self
            .send(HttpMethod::Post, &self.path("/git/trees"), &body)
            .await?;
        Ok(created.sha)
    }

    /// Create a single-parent commit of `tree` on top of `parent`.
    pub async fn commit(&self, parent: &Sha, tree: &Sha, message: &str) -> Result<Sha, ApiError> {
        let body = commit_body(&self.author, parent, tree, message);
        let created: ShaResponse = self
            .send(HttpMethod::Post, &self.path("/git/commits"), &body)
            .await?;
        Ok(created.sha)
    }

    /// Move a branch to `commit`.
    ///
    /// Sends no force flag, so the service decides whether a
    /// non-fast-forward update is accepted.
    pub async fn update_head(&self, ref_name: &str, commit: &Sha) -> Result<(), ApiError> {
        let body = UpdateRefBody {
            sha: commit.clone(),
        };
        let body = serde_json::to_value(&body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.transport
            .request(
                HttpMethod::Patch,
                &self.path(&format!("/git/refs/heads/{}", ref_name)),
                Some(body),
            )
            .await?;
        Ok(())
    }

    /// Fetch repository metadata.
    ///
    /// The payload is discarded; only the success or failure of the call
    /// is reported.
    pub async fn show(&self) -> Result<(), ApiError> {
        self.transport
            .request(HttpMethod::Get, &self.repo_path, None)
            .await?;
        Ok(())
    }

    /// Recursive file listing of a branch or commit.
    pub async fn list(&self, branch_or_commit: &str) -> Result<Vec<TreeEntry>, ApiError> {
        Ok(self.listing(branch_or_commit).await?.tree)
    }

    /// Recursive listing with the service's truncation flag.
    async fn listing(&self, branch_or_commit: &str) -> Result<TreeResponse, ApiError> {
        self.get(&self.path(&format!("/git/trees/{}?recursive=1", branch_or_commit)))
            .await
    }

    /// Read a file as raw bytes.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotFound` if no entry has exactly this path; the blob
    ///   is not fetched in that case. A listing the service truncated may
    ///   omit existing paths; that case is logged at warn level.
    /// - any error from the listing or blob fetch, unchanged
    pub async fn read_bytes(&self, branch: &str, path: &str) -> Result<Vec<u8>, ApiError> {
        let listing = self.listing(branch).await?;
        let entry = listing.tree.iter().find(|entry| entry.path == path);
        if listing.truncated {
            warn!(
                repo = %self.coordinates,
                branch,
                path,
                found = entry.is_some(),
                "tree listing truncated by the service"
            );
        }
        let entry = entry.ok_or_else(|| ApiError::NotFound(path.to_string()))?;

        debug!(branch, path, sha = %entry.sha, "reading blob");
        let blob = self.get_blob(&entry.sha).await?;
        decode_blob(&blob)
    }

    /// Read a file as text.
    ///
    /// Same as [`read_bytes`](Self::read_bytes), and additionally fails with
    /// `ApiError::Decode` when the content is not valid UTF-8.
    pub async fn read(&self, branch: &str, path: &str) -> Result<String, ApiError> {
        let bytes = self.read_bytes(branch, path).await?;
        String::from_utf8(bytes).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    /// Commit `content` at `path` on `branch`.
    ///
    /// Runs getRef → getTree → postBlob → postTree → commit → updateHead,
    /// each step consuming the previous step's output. The first error is
    /// returned unchanged and no later step runs.
    ///
    /// There is no check that the branch still points at the parent when
    /// the ref is moved: two concurrent writers on one branch can lose an
    /// update unless the service rejects the non-fast-forward.
    pub async fn write(
        &self,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<WriteReceipt, ApiError> {
        write::run(
            self,
            &write::WriteRequest {
                branch,
                path,
                content,
                message,
            },
        )
        .await
    }
}

/// Decode a response into an endpoint schema.
fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
}

/// Last `/`-separated segment of a ref, e.g. `refs/heads/main` → `main`.
pub fn branch_name_from_ref(ref_name: &str) -> &str {
    ref_name.rsplit('/').next().unwrap_or(ref_name)
}

/// Decode blob content.
///
/// Base64 content is decoded after stripping all whitespace; any other
/// encoding is taken verbatim. A blob without content decodes to empty.
pub fn decode_blob(blob: &Blob) -> Result<Vec<u8>, ApiError> {
    let Some(content) = &blob.content else {
        return Ok(Vec::new());
    };

    if blob.encoding.as_deref() == Some(ENCODING_BASE64) {
        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64
            .decode(compact.as_bytes())
            .map_err(|e| ApiError::Decode(format!("invalid base64 blob content: {}", e)))
    } else {
        Ok(content.as_bytes().to_vec())
    }
}

fn tree_body(base_tree: &Sha, path: &str, blob: &Sha) -> CreateTreeBody {
    CreateTreeBody {
        base_tree: Some(base_tree.clone()),
        tree: vec![TreeEntryBody {
            path: path.to_string(),
            mode: MODE_FILE.to_string(),
            kind: "blob".to_string(),
            sha: blob.clone(),
        }],
    }
}

fn commit_body(author: &str, parent: &Sha, tree: &Sha, message: &str) -> CreateCommitBody {
    CreateCommitBody {
        message: message.to_string(),
        author: CommitAuthor {
            name: author.to_string(),
        },
        parents: vec![parent.clone()],
        tree: tree.clone(),
    }
}

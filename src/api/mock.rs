//! api::mock
//!
//! In-memory transport for deterministic testing.
//!
//! # Design
//!
//! The mock transport answers the same REST paths as the real service
//! from an in-memory, content-addressed store: blobs, flat trees, commits
//! and branch refs per repository. Every request is recorded, a given
//! call kind can be configured to fail, and a concurrent writer can be
//! injected right before the next ref update to reproduce lost updates.
//!
//! Object ids are derived from object contents with SHA-256, rendered as
//! 40 hex characters so they look like the ids the service hands out.
//!
//! # Example
//!
//! ```
//! use ghrepo::api::mock::{MockCall, MockTransport};
//! use ghrepo::api::{HttpMethod, Transport};
//!
//! # tokio_test::block_on(async {
//! let mock = MockTransport::new();
//! mock.seed_file("octocat", "hello", "master", "README.md", "hi");
//!
//! let head = mock
//!     .request(HttpMethod::Get, "/repos/octocat/hello/git/refs/heads/master", None)
//!     .await
//!     .unwrap();
//! assert_eq!(head["ref"], "refs/heads/master");
//! assert_eq!(mock.calls(), vec![MockCall::GetRef]);
//! # });
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use super::schema::{
    CreateBlobBody, CreateCommitBody, CreateTreeBody, UpdateRefBody, ENCODING_BASE64, MODE_FILE,
};
use super::traits::{ApiError, HttpMethod, Transport};

/// Line width the service uses when wrapping base64 blob content.
const BASE64_LINE_WIDTH: usize = 60;

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockTransport {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockTransportInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockTransportInner {
    /// Repositories keyed by (owner, name).
    repos: BTreeMap<(String, String), MockRepo>,
    /// Call kind to fail, with the error to return.
    fail_on: Option<(MockCall, ApiError)>,
    /// Reject ref updates that are not fast-forwards.
    enforce_fast_forward: bool,
    /// Writes applied right before the next matching ref update.
    pending_writes: Vec<ConcurrentWrite>,
    /// Recorded requests for verification.
    requests: Vec<RecordedRequest>,
    /// Makes otherwise identical commits distinct.
    commit_counter: u64,
}

/// One repository's object store.
#[derive(Debug, Default)]
struct MockRepo {
    blobs: HashMap<String, Vec<u8>>,
    /// Flat trees: full path -> blob sha.
    trees: HashMap<String, BTreeMap<String, String>>,
    commits: HashMap<String, MockCommit>,
    refs: BTreeMap<String, String>,
}

/// A commit stored by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommit {
    pub tree: String,
    pub parents: Vec<String>,
    pub message: String,
    pub author: String,
}

/// A write performed by another client while a workflow is in flight.
#[derive(Debug, Clone)]
struct ConcurrentWrite {
    owner: String,
    name: String,
    branch: String,
    path: String,
    content: String,
}

/// Kind of API call, derived from method and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    ListRepos,
    ShowRepo,
    ListRefs,
    GetRef,
    UpdateRef,
    GetBlob,
    CreateBlob,
    GetTree,
    CreateTree,
    CreateCommit,
}

/// Recorded request for test verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub call: Option<MockCall>,
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// A parsed request target.
struct Route {
    call: MockCall,
    repo: Option<(String, String)>,
    /// Trailing path component(s): ref name or object id.
    target: String,
    recursive: bool,
}

impl MockTransport {
    /// Create a new empty mock transport.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner::default())),
        }
    }

    /// Configure the mock to fail every call of the given kind.
    pub fn fail_on(self, call: MockCall, error: ApiError) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some((call, error));
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Reject ref updates whose new commit does not descend from the current head.
    pub fn enforce_fast_forward(self, enforce: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.enforce_fast_forward = enforce;
        }
        self
    }

    /// Create an empty repository (no branches).
    pub fn create_repo(&self, owner: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .repos
            .entry((owner.to_string(), name.to_string()))
            .or_default();
    }

    /// Commit a file directly into the store, creating repo and branch as needed.
    ///
    /// Returns the new commit sha the branch now points at.
    pub fn seed_file(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &str,
    ) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.commit_file(owner, name, branch, path, content.as_bytes(), "seed")
    }

    /// Point a branch at an existing commit, creating the branch if needed.
    pub fn set_ref(&self, owner: &str, name: &str, branch: &str, commit: &str) {
        let mut inner = self.inner.lock().unwrap();
        let repo = inner
            .repos
            .entry((owner.to_string(), name.to_string()))
            .or_default();
        repo.refs.insert(branch.to_string(), commit.to_string());
    }

    /// Have another writer commit `path` on `branch` right before the next
    /// update of that branch's ref.
    pub fn inject_concurrent_write(
        &self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &str,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending_writes.push(ConcurrentWrite {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
            content: content.to_string(),
        });
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the kinds of all recorded requests, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        let inner = self.inner.lock().unwrap();
        inner.requests.iter().filter_map(|r| r.call).collect()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.clear();
    }

    /// Commit sha a branch points at.
    pub fn ref_sha(&self, owner: &str, name: &str, branch: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.repo(owner, name)?.refs.get(branch).cloned()
    }

    /// A stored commit.
    pub fn commit(&self, owner: &str, name: &str, sha: &str) -> Option<MockCommit> {
        let inner = self.inner.lock().unwrap();
        inner.repo(owner, name)?.commits.get(sha).cloned()
    }

    /// Files of a stored tree as path -> blob sha.
    pub fn tree_files(&self, owner: &str, name: &str, sha: &str) -> Option<BTreeMap<String, String>> {
        let inner = self.inner.lock().unwrap();
        inner.repo(owner, name)?.trees.get(sha).cloned()
    }

    /// Content of a file at the head of a branch.
    pub fn file_at(&self, owner: &str, name: &str, branch: &str, path: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        let repo = inner.repo(owner, name)?;
        let commit = repo.commits.get(repo.refs.get(branch)?)?;
        let blob = repo.trees.get(&commit.tree)?.get(path)?;
        repo.blobs.get(blob).cloned()
    }

    /// Number of blobs, trees and commits stored for a repository.
    pub fn object_count(&self, owner: &str, name: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .repo(owner, name)
            .map(|r| r.blobs.len() + r.trees.len() + r.commits.len())
            .unwrap_or(0)
    }

    /// Sha the store assigns to a blob with this content.
    pub fn blob_sha(content: &[u8]) -> String {
        object_id("blob", content)
    }

    /// Record a request.
    fn record(&self, request: RecordedRequest) {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, call: MockCall) -> Option<ApiError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some((fail_call, error)) if *fail_call == call => Some(error.clone()),
            _ => None,
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let route = parse_route(method, path);

        self.record(RecordedRequest {
            call: route.as_ref().map(|r| r.call),
            method,
            path: path.to_string(),
            body: body.clone(),
        });

        let route = route.ok_or_else(not_found)?;

        if let Some(error) = self.check_fail(route.call) {
            return Err(error);
        }

        let mut inner = self.inner.lock().unwrap();
        inner.handle(route, body)
    }
}

impl MockTransportInner {
    fn repo(&self, owner: &str, name: &str) -> Option<&MockRepo> {
        self.repos.get(&(owner.to_string(), name.to_string()))
    }

    fn handle(&mut self, route: Route, body: Option<Value>) -> Result<Value, ApiError> {
        if route.call == MockCall::ListRepos {
            return Ok(self.list_repos());
        }

        let (owner, name) = route.repo.clone().ok_or_else(not_found)?;
        if self.repo(&owner, &name).is_none() {
            return Err(not_found());
        }

        match route.call {
            MockCall::ListRepos => Ok(self.list_repos()),
            MockCall::ShowRepo => Ok(repo_json(&owner, &name)),
            MockCall::UpdateRef => {
                let body: UpdateRefBody = parse_body(body)?;
                self.apply_pending_writes(&owner, &name, &route.target);
                self.update_ref(&owner, &name, &route.target, body.sha.as_str())
            }
            MockCall::CreateCommit => {
                let body: CreateCommitBody = parse_body(body)?;
                self.commit_counter += 1;
                let counter = self.commit_counter;
                let repo = self.repo_mut(&owner, &name)?;
                create_commit(repo, body, counter)
            }
            _ => {
                let repo = self.repo_mut(&owner, &name)?;
                match route.call {
                    MockCall::ListRefs => Ok(Value::Array(
                        repo.refs
                            .iter()
                            .map(|(branch, sha)| ref_json(branch, sha))
                            .collect(),
                    )),
                    MockCall::GetRef => repo
                        .refs
                        .get(&route.target)
                        .map(|sha| ref_json(&route.target, sha))
                        .ok_or_else(not_found),
                    MockCall::GetBlob => {
                        let content = repo.blobs.get(&route.target).ok_or_else(not_found)?;
                        Ok(blob_json(&route.target, content))
                    }
                    MockCall::CreateBlob => create_blob(repo, parse_body(body)?),
                    MockCall::GetTree => get_tree(repo, &route.target, route.recursive),
                    MockCall::CreateTree => create_tree(repo, parse_body(body)?),
                    _ => Err(not_found()),
                }
            }
        }
    }

    fn repo_mut(&mut self, owner: &str, name: &str) -> Result<&mut MockRepo, ApiError> {
        self.repos
            .get_mut(&(owner.to_string(), name.to_string()))
            .ok_or_else(not_found)
    }

    fn list_repos(&self) -> Value {
        Value::Array(
            self.repos
                .keys()
                .map(|(owner, name)| repo_json(owner, name))
                .collect(),
        )
    }

    fn update_ref(
        &mut self,
        owner: &str,
        name: &str,
        branch: &str,
        sha: &str,
    ) -> Result<Value, ApiError> {
        let enforce_fast_forward = self.enforce_fast_forward;
        let repo = self.repo_mut(owner, name)?;

        let current = repo
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| unprocessable("Reference does not exist"))?;
        if !repo.commits.contains_key(sha) {
            return Err(unprocessable("Object does not exist"));
        }
        if enforce_fast_forward && !is_ancestor(repo, &current, sha) {
            return Err(unprocessable("Update is not a fast forward"));
        }

        repo.refs.insert(branch.to_string(), sha.to_string());
        Ok(ref_json(branch, sha))
    }

    fn apply_pending_writes(&mut self, owner: &str, name: &str, branch: &str) {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_writes)
            .into_iter()
            .partition(|w| w.owner == owner && w.name == name && w.branch == branch);
        self.pending_writes = rest;

        for write in matching {
            self.commit_file(
                &write.owner,
                &write.name,
                &write.branch,
                &write.path,
                write.content.as_bytes(),
                "concurrent write",
            );
        }
    }

    /// Commit one file on top of a branch head without going through HTTP.
    fn commit_file(
        &mut self,
        owner: &str,
        name: &str,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> String {
        self.commit_counter += 1;
        let counter = self.commit_counter;
        let repo = self
            .repos
            .entry((owner.to_string(), name.to_string()))
            .or_default();

        let blob = object_id("blob", content);
        repo.blobs.insert(blob.clone(), content.to_vec());

        let parent = repo.refs.get(branch).cloned();
        let mut files = parent
            .as_ref()
            .and_then(|p| repo.commits.get(p))
            .and_then(|c| repo.trees.get(&c.tree))
            .cloned()
            .unwrap_or_default();
        files.insert(path.to_string(), blob);
        let tree = store_tree(repo, files);

        let commit = MockCommit {
            tree,
            parents: parent.into_iter().collect(),
            message: message.to_string(),
            author: "mock".to_string(),
        };
        let sha = commit_id(&commit, counter);
        repo.commits.insert(sha.clone(), commit);
        repo.refs.insert(branch.to_string(), sha.clone());
        sha
    }
}

// --------------------------------------------------------------------------
// Routing
// --------------------------------------------------------------------------

fn parse_route(method: HttpMethod, path: &str) -> Option<Route> {
    let (path, query) = path.split_once('?').unwrap_or((path, ""));
    let recursive = query.split('&').any(|kv| kv == "recursive=1");
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let route = |call: MockCall, repo: Option<(String, String)>, target: String| Route {
        call,
        repo,
        target,
        recursive,
    };

    match (method, segments.as_slice()) {
        (HttpMethod::Get, ["user", "repos"]) => Some(route(MockCall::ListRepos, None, String::new())),
        (_, ["repos", owner, name, rest @ ..]) => {
            let repo = Some((owner.to_string(), name.to_string()));
            let call = match (method, rest) {
                (HttpMethod::Get, []) => MockCall::ShowRepo,
                (HttpMethod::Get, ["git", "refs", "heads"]) => MockCall::ListRefs,
                (HttpMethod::Get, ["git", "refs", "heads", _, ..]) => MockCall::GetRef,
                (HttpMethod::Patch, ["git", "refs", "heads", _, ..]) => MockCall::UpdateRef,
                (HttpMethod::Get, ["git", "blobs", _]) => MockCall::GetBlob,
                (HttpMethod::Post, ["git", "blobs"]) => MockCall::CreateBlob,
                (HttpMethod::Get, ["git", "trees", _, ..]) => MockCall::GetTree,
                (HttpMethod::Post, ["git", "trees"]) => MockCall::CreateTree,
                (HttpMethod::Post, ["git", "commits"]) => MockCall::CreateCommit,
                _ => return None,
            };
            let target = match call {
                MockCall::GetRef | MockCall::UpdateRef => rest[3..].join("/"),
                MockCall::GetBlob | MockCall::GetTree => rest[2..].join("/"),
                _ => String::new(),
            };
            Some(route(call, repo, target))
        }
        _ => None,
    }
}

// --------------------------------------------------------------------------
// Object store operations
// --------------------------------------------------------------------------

fn create_blob(repo: &mut MockRepo, body: CreateBlobBody) -> Result<Value, ApiError> {
    let content = if body.encoding == ENCODING_BASE64 {
        BASE64
            .decode(body.content.as_bytes())
            .map_err(|_| unprocessable("Invalid base64 content"))?
    } else {
        body.content.into_bytes()
    };

    let sha = object_id("blob", &content);
    repo.blobs.insert(sha.clone(), content);
    Ok(json!({ "sha": sha }))
}

fn get_tree(repo: &MockRepo, target: &str, recursive: bool) -> Result<Value, ApiError> {
    // Branch names and commit ids resolve to the commit's tree
    let tree_sha = repo
        .refs
        .get(target)
        .and_then(|commit| repo.commits.get(commit))
        .or_else(|| repo.commits.get(target))
        .map(|commit| commit.tree.clone())
        .unwrap_or_else(|| target.to_string());
    let files = repo.trees.get(&tree_sha).ok_or_else(not_found)?;

    Ok(tree_json(repo, &tree_sha, files, recursive))
}

fn create_tree(repo: &mut MockRepo, body: CreateTreeBody) -> Result<Value, ApiError> {
    let mut files = match &body.base_tree {
        Some(base) => repo
            .trees
            .get(base.as_str())
            .cloned()
            .ok_or_else(|| unprocessable("Invalid base_tree"))?,
        None => BTreeMap::new(),
    };

    for entry in body.tree {
        if entry.kind != "blob" || !repo.blobs.contains_key(entry.sha.as_str()) {
            return Err(unprocessable("Invalid tree info"));
        }
        files.insert(entry.path, entry.sha.into());
    }

    let sha = store_tree(repo, files);
    let files = &repo.trees[&sha];
    Ok(tree_json(repo, &sha, files, true))
}

fn create_commit(repo: &mut MockRepo, body: CreateCommitBody, counter: u64) -> Result<Value, ApiError> {
    if !repo.trees.contains_key(body.tree.as_str()) {
        return Err(unprocessable("Tree SHA does not exist"));
    }
    if body
        .parents
        .iter()
        .any(|p| !repo.commits.contains_key(p.as_str()))
    {
        return Err(unprocessable("Parent SHA does not exist or is not a commit object"));
    }

    let commit = MockCommit {
        tree: body.tree.into(),
        parents: body.parents.into_iter().map(Into::into).collect(),
        message: body.message,
        author: body.author.name,
    };
    let sha = commit_id(&commit, counter);
    let response = json!({
        "sha": sha,
        "message": commit.message,
        "author": { "name": commit.author },
        "tree": { "sha": commit.tree },
        "parents": commit.parents.iter().map(|p| json!({ "sha": p })).collect::<Vec<_>>(),
    });
    repo.commits.insert(sha, commit);
    Ok(response)
}

fn store_tree(repo: &mut MockRepo, files: BTreeMap<String, String>) -> String {
    let listing: String = files
        .iter()
        .map(|(path, sha)| format!("{} {} {}\n", MODE_FILE, path, sha))
        .collect();
    let sha = object_id("tree", listing.as_bytes());
    repo.trees.insert(sha.clone(), files);
    sha
}

fn is_ancestor(repo: &MockRepo, ancestor: &str, descendant: &str) -> bool {
    let mut queue = VecDeque::from([descendant.to_string()]);
    let mut seen = HashSet::new();
    while let Some(sha) = queue.pop_front() {
        if sha == ancestor {
            return true;
        }
        if !seen.insert(sha.clone()) {
            continue;
        }
        if let Some(commit) = repo.commits.get(&sha) {
            queue.extend(commit.parents.iter().cloned());
        }
    }
    false
}

fn object_id(kind: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{} {}\0", kind, content.len()).as_bytes());
    hasher.update(content);
    let digest = hex::encode(hasher.finalize());
    digest[..40].to_string()
}

fn commit_id(commit: &MockCommit, counter: u64) -> String {
    let text = format!(
        "tree {}\nparents {}\nauthor {}\nseq {}\n\n{}",
        commit.tree,
        commit.parents.join(" "),
        commit.author,
        counter,
        commit.message
    );
    object_id("commit", text.as_bytes())
}

// --------------------------------------------------------------------------
// Response rendering
// --------------------------------------------------------------------------

fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "owner": { "login": owner },
        "private": false,
        "default_branch": "master",
    })
}

fn ref_json(branch: &str, sha: &str) -> Value {
    json!({
        "ref": format!("refs/heads/{}", branch),
        "object": { "sha": sha, "type": "commit" },
    })
}

fn blob_json(sha: &str, content: &[u8]) -> Value {
    let encoded = BASE64.encode(content);
    let wrapped: String = encoded
        .as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .map(|line| format!("{}\n", String::from_utf8_lossy(line)))
        .collect();
    json!({
        "sha": sha,
        "size": content.len(),
        "content": wrapped,
        "encoding": ENCODING_BASE64,
    })
}

fn tree_json(repo: &MockRepo, sha: &str, files: &BTreeMap<String, String>, recursive: bool) -> Value {
    let mut dirs = BTreeSet::new();
    for path in files.keys() {
        let components: Vec<&str> = path.split('/').collect();
        let mut prefix = String::new();
        for component in &components[..components.len() - 1] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(component);
            dirs.insert(prefix.clone());
        }
    }

    let mut entries: Vec<(String, Value)> = Vec::new();
    for dir in dirs {
        if recursive || !dir.contains('/') {
            let dir_sha = object_id("tree", format!("{}:{}", sha, dir).as_bytes());
            entries.push((
                dir.clone(),
                json!({ "path": dir, "mode": "040000", "type": "tree", "sha": dir_sha }),
            ));
        }
    }
    for (path, blob) in files {
        if recursive || !path.contains('/') {
            let size = repo.blobs.get(blob).map(|b| b.len()).unwrap_or(0);
            entries.push((
                path.clone(),
                json!({ "path": path, "mode": MODE_FILE, "type": "blob", "sha": blob, "size": size }),
            ));
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    json!({
        "sha": sha,
        "tree": entries.into_iter().map(|(_, v)| v).collect::<Vec<_>>(),
        "truncated": false,
    })
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let body = body.ok_or_else(|| unprocessable("Missing request body"))?;
    serde_json::from_value(body).map_err(|e| unprocessable(&format!("Invalid request: {}", e)))
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not Found".into(),
    }
}

fn unprocessable(message: &str) -> ApiError {
    ApiError::Status {
        status: 422,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod routing {
        use super::*;

        fn call(method: HttpMethod, path: &str) -> Option<MockCall> {
            parse_route(method, path).map(|r| r.call)
        }

        #[test]
        fn classifies_endpoints() {
            assert_eq!(call(HttpMethod::Get, "/user/repos?type=all"), Some(MockCall::ListRepos));
            assert_eq!(call(HttpMethod::Get, "/repos/o/r"), Some(MockCall::ShowRepo));
            assert_eq!(call(HttpMethod::Get, "/repos/o/r/git/refs/heads"), Some(MockCall::ListRefs));
            assert_eq!(call(HttpMethod::Get, "/repos/o/r/git/refs/heads/main"), Some(MockCall::GetRef));
            assert_eq!(call(HttpMethod::Patch, "/repos/o/r/git/refs/heads/main"), Some(MockCall::UpdateRef));
            assert_eq!(call(HttpMethod::Get, "/repos/o/r/git/blobs/b1"), Some(MockCall::GetBlob));
            assert_eq!(call(HttpMethod::Post, "/repos/o/r/git/blobs"), Some(MockCall::CreateBlob));
            assert_eq!(call(HttpMethod::Get, "/repos/o/r/git/trees/t1"), Some(MockCall::GetTree));
            assert_eq!(call(HttpMethod::Post, "/repos/o/r/git/trees"), Some(MockCall::CreateTree));
            assert_eq!(call(HttpMethod::Post, "/repos/o/r/git/commits"), Some(MockCall::CreateCommit));
        }

        #[test]
        fn unknown_paths() {
            assert_eq!(call(HttpMethod::Get, "/orgs/rust-lang"), None);
            assert_eq!(call(HttpMethod::Patch, "/repos/o/r/git/blobs"), None);
        }

        #[test]
        fn ref_names_with_slashes() {
            let route = parse_route(HttpMethod::Get, "/repos/o/r/git/refs/heads/feature/x").unwrap();
            assert_eq!(route.target, "feature/x");
        }

        #[test]
        fn recursive_query() {
            let route = parse_route(HttpMethod::Get, "/repos/o/r/git/trees/main?recursive=1").unwrap();
            assert_eq!(route.target, "main");
            assert!(route.recursive);

            let route = parse_route(HttpMethod::Get, "/repos/o/r/git/trees/main").unwrap();
            assert!(!route.recursive);
        }
    }

    mod store {
        use super::*;

        #[test]
        fn object_ids_look_like_shas() {
            let sha = MockTransport::blob_sha(b"hello");
            assert_eq!(sha.len(), 40);
            assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(sha, MockTransport::blob_sha(b"hello"));
            assert_ne!(sha, MockTransport::blob_sha(b"hello!"));
        }

        #[test]
        fn seed_file_builds_history() {
            let mock = MockTransport::new();
            let c1 = mock.seed_file("o", "r", "master", "a.txt", "one");
            let c2 = mock.seed_file("o", "r", "master", "b.txt", "two");

            assert_eq!(mock.ref_sha("o", "r", "master"), Some(c2.clone()));
            let commit = mock.commit("o", "r", &c2).unwrap();
            assert_eq!(commit.parents, vec![c1]);

            let files = mock.tree_files("o", "r", &commit.tree).unwrap();
            assert_eq!(files.len(), 2);
            assert_eq!(mock.file_at("o", "r", "master", "a.txt"), Some(b"one".to_vec()));
        }

        #[test]
        fn identical_commits_get_distinct_ids() {
            let mock = MockTransport::new();
            let c1 = mock.seed_file("o", "r", "a", "f", "x");
            let c2 = mock.seed_file("o", "r", "b", "f", "x");
            assert_ne!(c1, c2);
        }

        #[test]
        fn blob_content_is_wrapped_base64() {
            let content = vec![b'x'; 100];
            let json = blob_json("b1", &content);
            let text = json["content"].as_str().unwrap();
            assert!(text.contains('\n'));
            assert!(text.lines().all(|l| l.len() <= BASE64_LINE_WIDTH));
            assert_eq!(json["encoding"], "base64");
        }

        #[test]
        fn tree_listing_includes_directories() {
            let mock = MockTransport::new();
            mock.seed_file("o", "r", "master", "docs/guide/intro.md", "hi");
            mock.seed_file("o", "r", "master", "README.md", "readme");

            let inner = mock.inner.lock().unwrap();
            let repo = inner.repo("o", "r").unwrap();

            let flat = get_tree(repo, "master", false).unwrap();
            let paths: Vec<&str> = flat["tree"]
                .as_array()
                .unwrap()
                .iter()
                .map(|e| e["path"].as_str().unwrap())
                .collect();
            assert_eq!(paths, vec!["README.md", "docs"]);

            let deep = get_tree(repo, "master", true).unwrap();
            let paths: Vec<&str> = deep["tree"]
                .as_array()
                .unwrap()
                .iter()
                .map(|e| e["path"].as_str().unwrap())
                .collect();
            assert_eq!(
                paths,
                vec!["README.md", "docs", "docs/guide", "docs/guide/intro.md"]
            );
        }

        #[test]
        fn ancestry() {
            let mock = MockTransport::new();
            let c1 = mock.seed_file("o", "r", "master", "a", "1");
            let c2 = mock.seed_file("o", "r", "master", "a", "2");

            let inner = mock.inner.lock().unwrap();
            let repo = inner.repo("o", "r").unwrap();
            assert!(is_ancestor(repo, &c1, &c2));
            assert!(!is_ancestor(repo, &c2, &c1));
        }
    }

    mod requests {
        use super::*;

        #[tokio::test]
        async fn records_every_request() {
            let mock = MockTransport::new();
            mock.create_repo("o", "r");

            let _ = mock.request(HttpMethod::Get, "/repos/o/r", None).await;
            let _ = mock.request(HttpMethod::Get, "/nowhere", None).await;

            let requests = mock.requests();
            assert_eq!(requests.len(), 2);
            assert_eq!(requests[0].call, Some(MockCall::ShowRepo));
            assert_eq!(requests[1].call, None);
            assert_eq!(mock.calls(), vec![MockCall::ShowRepo]);
        }

        #[tokio::test]
        async fn unknown_repo_is_404() {
            let mock = MockTransport::new();
            let err = mock
                .request(HttpMethod::Get, "/repos/o/missing", None)
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(404));
        }

        #[tokio::test]
        async fn fail_on_configured_call() {
            let mock = MockTransport::new().fail_on(
                MockCall::ShowRepo,
                ApiError::Network("connection reset".into()),
            );
            mock.create_repo("o", "r");

            let err = mock.request(HttpMethod::Get, "/repos/o/r", None).await.unwrap_err();
            assert_eq!(err, ApiError::Network("connection reset".into()));

            mock.clear_fail_on();
            assert!(mock.request(HttpMethod::Get, "/repos/o/r", None).await.is_ok());
        }

        #[tokio::test]
        async fn tree_with_unknown_blob_rejected() {
            let mock = MockTransport::new();
            mock.create_repo("o", "r");

            let err = mock
                .request(
                    HttpMethod::Post,
                    "/repos/o/r/git/trees",
                    Some(json!({
                        "tree": [{ "path": "a", "mode": "100644", "type": "blob", "sha": "nope" }]
                    })),
                )
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(422));
        }

        #[tokio::test]
        async fn update_missing_ref_rejected() {
            let mock = MockTransport::new();
            let commit = mock.seed_file("o", "r", "master", "a", "1");

            let err = mock
                .request(
                    HttpMethod::Patch,
                    "/repos/o/r/git/refs/heads/ghost",
                    Some(json!({ "sha": commit })),
                )
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(422));
        }
    }
}

//! repo::write
//!
//! Single-file commit workflow.
//!
//! # State machine
//!
//! ```text
//! AwaitRef ─▶ AwaitTree ─▶ AwaitBlob ─▶ AwaitTreeUpdate ─▶ AwaitCommit ─▶ AwaitHeadUpdate ─▶ Done
//!    │            │            │               │                │                │
//!    └────────────┴────────────┴───────────────┴────────────────┴────────────────┴──▶ Failed
//! ```
//!
//! Each transition issues exactly one API call and consumes the ids
//! produced by the earlier states. An error moves straight to `Failed`
//! with the error unchanged, so nothing after the failing step runs and
//! the branch ref is only touched by the final transition.

use tracing::{debug, info, warn};

use super::RepositoryHandle;
use crate::api::ApiError;
use crate::core::types::Sha;

/// Inputs of one write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WriteRequest<'a> {
    pub branch: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
}

/// Ids produced by a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Commit the branch pointed at when the write started
    pub parent: Sha,
    /// Tree of `parent`
    pub base_tree: Sha,
    /// Blob holding the new content
    pub blob: Sha,
    /// Tree with the file replaced
    pub tree: Sha,
    /// New commit the branch now points at
    pub commit: Sha,
}

/// One step of the write workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    GetRef,
    GetTree,
    PostBlob,
    PostTree,
    Commit,
    UpdateHead,
}

impl std::fmt::Display for WriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStep::GetRef => write!(f, "get-ref"),
            WriteStep::GetTree => write!(f, "get-tree"),
            WriteStep::PostBlob => write!(f, "post-blob"),
            WriteStep::PostTree => write!(f, "post-tree"),
            WriteStep::Commit => write!(f, "commit"),
            WriteStep::UpdateHead => write!(f, "update-head"),
        }
    }
}

#[derive(Debug)]
enum WriteState {
    AwaitRef,
    AwaitTree {
        parent: Sha,
    },
    AwaitBlob {
        parent: Sha,
        base_tree: Sha,
    },
    AwaitTreeUpdate {
        parent: Sha,
        base_tree: Sha,
        blob: Sha,
    },
    AwaitCommit {
        parent: Sha,
        base_tree: Sha,
        blob: Sha,
        tree: Sha,
    },
    AwaitHeadUpdate(WriteReceipt),
    Done(WriteReceipt),
    Failed {
        step: WriteStep,
        error: ApiError,
    },
}

impl WriteState {
    /// Step the state is waiting on, if it is not terminal.
    fn pending_step(&self) -> Option<WriteStep> {
        match self {
            WriteState::AwaitRef => Some(WriteStep::GetRef),
            WriteState::AwaitTree { .. } => Some(WriteStep::GetTree),
            WriteState::AwaitBlob { .. } => Some(WriteStep::PostBlob),
            WriteState::AwaitTreeUpdate { .. } => Some(WriteStep::PostTree),
            WriteState::AwaitCommit { .. } => Some(WriteStep::Commit),
            WriteState::AwaitHeadUpdate(_) => Some(WriteStep::UpdateHead),
            WriteState::Done(_) | WriteState::Failed { .. } => None,
        }
    }

    /// Issue the pending call and move to the next state.
    async fn advance(self, repo: &RepositoryHandle, req: &WriteRequest<'_>) -> WriteState {
        match self {
            WriteState::AwaitRef => {
                let result = repo.get_ref(req.branch).await;
                transition(WriteStep::GetRef, result, |parent| WriteState::AwaitTree {
                    parent,
                })
            }
            WriteState::AwaitTree { parent } => {
                let result = repo.get_tree(&parent).await;
                transition(WriteStep::GetTree, result, |base_tree| {
                    WriteState::AwaitBlob { parent, base_tree }
                })
            }
            WriteState::AwaitBlob { parent, base_tree } => {
                let result = repo.post_blob(req.content).await;
                transition(WriteStep::PostBlob, result, |blob| {
                    WriteState::AwaitTreeUpdate {
                        parent,
                        base_tree,
                        blob,
                    }
                })
            }
            WriteState::AwaitTreeUpdate {
                parent,
                base_tree,
                blob,
            } => {
                let result = repo.post_tree(&base_tree, req.path, &blob).await;
                transition(WriteStep::PostTree, result, |tree| WriteState::AwaitCommit {
                    parent,
                    base_tree,
                    blob,
                    tree,
                })
            }
            WriteState::AwaitCommit {
                parent,
                base_tree,
                blob,
                tree,
            } => {
                let result = repo.commit(&parent, &tree, req.message).await;
                transition(WriteStep::Commit, result, |commit| {
                    WriteState::AwaitHeadUpdate(WriteReceipt {
                        parent,
                        base_tree,
                        blob,
                        tree,
                        commit,
                    })
                })
            }
            WriteState::AwaitHeadUpdate(receipt) => {
                let result = repo.update_head(req.branch, &receipt.commit).await;
                transition(WriteStep::UpdateHead, result, |()| WriteState::Done(receipt))
            }
            terminal @ (WriteState::Done(_) | WriteState::Failed { .. }) => terminal,
        }
    }
}

fn transition<T>(
    step: WriteStep,
    result: Result<T, ApiError>,
    next: impl FnOnce(T) -> WriteState,
) -> WriteState {
    match result {
        Ok(value) => next(value),
        Err(error) => WriteState::Failed { step, error },
    }
}

/// Drive the workflow to `Done` or `Failed`.
pub(crate) async fn run(
    repo: &RepositoryHandle,
    req: &WriteRequest<'_>,
) -> Result<WriteReceipt, ApiError> {
    let mut state = WriteState::AwaitRef;

    loop {
        state = match state {
            WriteState::Done(receipt) => {
                info!(
                    repo = %repo.coordinates(),
                    branch = req.branch,
                    path = req.path,
                    commit = %receipt.commit,
                    "write committed"
                );
                return Ok(receipt);
            }
            WriteState::Failed { step, error } => {
                warn!(
                    repo = %repo.coordinates(),
                    branch = req.branch,
                    path = req.path,
                    %step,
                    %error,
                    "write aborted"
                );
                return Err(error);
            }
            pending => {
                if let Some(step) = pending.pending_step() {
                    debug!(branch = req.branch, path = req.path, %step, "write step");
                }
                pending.advance(repo, req).await
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockCall, MockTransport};
    use crate::core::types::RepoCoordinates;
    use std::sync::Arc;

    fn handle(mock: &MockTransport) -> RepositoryHandle {
        RepositoryHandle::new(
            Arc::new(mock.clone()),
            "octocat",
            RepoCoordinates::new("o", "r", None),
        )
    }

    #[test]
    fn pending_steps_in_order() {
        let sha = Sha::new("x");
        let receipt = WriteReceipt {
            parent: sha.clone(),
            base_tree: sha.clone(),
            blob: sha.clone(),
            tree: sha.clone(),
            commit: sha.clone(),
        };
        let states = [
            WriteState::AwaitRef,
            WriteState::AwaitTree { parent: sha.clone() },
            WriteState::AwaitBlob {
                parent: sha.clone(),
                base_tree: sha.clone(),
            },
            WriteState::AwaitTreeUpdate {
                parent: sha.clone(),
                base_tree: sha.clone(),
                blob: sha.clone(),
            },
            WriteState::AwaitCommit {
                parent: sha.clone(),
                base_tree: sha.clone(),
                blob: sha.clone(),
                tree: sha.clone(),
            },
            WriteState::AwaitHeadUpdate(receipt.clone()),
            WriteState::Done(receipt),
        ];
        let steps: Vec<Option<WriteStep>> = states.iter().map(|s| s.pending_step()).collect();
        assert_eq!(
            steps,
            vec![
                Some(WriteStep::GetRef),
                Some(WriteStep::GetTree),
                Some(WriteStep::PostBlob),
                Some(WriteStep::PostTree),
                Some(WriteStep::Commit),
                Some(WriteStep::UpdateHead),
                None,
            ]
        );
    }

    #[test]
    fn step_display() {
        assert_eq!(WriteStep::UpdateHead.to_string(), "update-head");
        assert_eq!(WriteStep::GetRef.to_string(), "get-ref");
    }

    #[tokio::test]
    async fn failed_state_carries_error_and_step() {
        let error = ApiError::Status {
            status: 404,
            message: "Not Found".into(),
        };
        let mock = MockTransport::new().fail_on(MockCall::GetTree, error.clone());
        mock.seed_file("o", "r", "master", "a.txt", "a");
        let repo = handle(&mock);
        let req = WriteRequest {
            branch: "master",
            path: "b.txt",
            content: "b",
            message: "m",
        };

        let state = WriteState::AwaitRef.advance(&repo, &req).await;
        assert_eq!(state.pending_step(), Some(WriteStep::GetTree));

        match state.advance(&repo, &req).await {
            WriteState::Failed { step, error: got } => {
                assert_eq!(step, WriteStep::GetTree);
                assert_eq!(got, error);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn terminal_states_do_not_issue_calls() {
        let mock = MockTransport::new();
        let repo = handle(&mock);
        let req = WriteRequest {
            branch: "master",
            path: "a",
            content: "a",
            message: "m",
        };

        let failed = WriteState::Failed {
            step: WriteStep::Commit,
            error: ApiError::Network("reset".into()),
        };
        let state = failed.advance(&repo, &req).await;
        assert!(matches!(state, WriteState::Failed { .. }));
        assert!(mock.requests().is_empty());
    }
}

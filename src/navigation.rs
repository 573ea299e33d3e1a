use std::path::{Path, PathBuf};

use crate::error::ExplorerError;

/// A directory listing the navigator wants fetched. The token identifies the
/// request so that a reply overtaken by a newer request can be recognized
/// and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub token: u64,
    pub path: PathBuf,
}

/// What to do to the history once the requested listing actually arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryEffect {
    /// Fresh navigation: truncate forward entries, append, move to the end.
    Push,
    /// Back/forward revisit: just move the index.
    GoTo(usize),
    /// Re-list of the current directory: leave history alone.
    Refresh,
}

#[derive(Debug)]
struct PendingRequest {
    token: u64,
    path: PathBuf,
    effect: HistoryEffect,
}

/// Outcome of feeding a listing reply back into the navigator.
#[derive(Debug, PartialEq, Eq)]
pub enum NavOutcome {
    /// The reply matched the newest request and the listing succeeded; the
    /// history now reflects the new current directory.
    Entered(PathBuf),
    /// The reply matched the newest request but the listing failed. History
    /// and current directory are exactly as they were.
    Failed(ExplorerError),
    /// The reply belongs to a superseded request and was discarded.
    Stale,
}

/// Browser-style directory history. Issuing a navigation only records a
/// pending request; history and the current directory change when the
/// matching listing reply comes back, so a failed or superseded fetch
/// leaves everything untouched.
#[derive(Debug, Default)]
pub struct Navigator {
    history: Vec<PathBuf>,
    index: Option<usize>,
    next_token: u64,
    pending: Option<PendingRequest>,
}

impl Navigator {
    pub fn new() -> Self {
        Navigator::default()
    }

    pub fn current_directory(&self) -> Option<&Path> {
        self.index.map(|i| self.history[i].as_path())
    }

    pub fn can_go_back(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.history.len())
    }

    /// Starts a fresh navigation to `path`. Any still-unanswered request is
    /// superseded; its reply will come back as `Stale`.
    pub fn open(&mut self, path: PathBuf) -> ListingRequest {
        self.issue(path, HistoryEffect::Push)
    }

    /// Steps back in history, if there is anywhere to go. Returns the fetch
    /// to run; the index moves only when that fetch succeeds.
    pub fn back(&mut self) -> Option<ListingRequest> {
        let index = self.index?;
        if index == 0 {
            return None;
        }
        let target = self.history[index - 1].clone();
        Some(self.issue(target, HistoryEffect::GoTo(index - 1)))
    }

    pub fn forward(&mut self) -> Option<ListingRequest> {
        let index = self.index?;
        if index + 1 >= self.history.len() {
            return None;
        }
        let target = self.history[index + 1].clone();
        Some(self.issue(target, HistoryEffect::GoTo(index + 1)))
    }

    /// Navigates to the parent of the current directory. At a root (no
    /// parent) this is a no-op.
    pub fn up(&mut self) -> Option<ListingRequest> {
        let parent = self.current_directory()?.parent()?.to_path_buf();
        Some(self.issue(parent, HistoryEffect::Push))
    }

    /// Re-fetches the current directory without touching history.
    pub fn refresh(&mut self) -> Option<ListingRequest> {
        let current = self.current_directory()?.to_path_buf();
        Some(self.issue(current, HistoryEffect::Refresh))
    }

    /// Feeds a listing reply back in. Only the newest outstanding request is
    /// honored; anything else is reported as `Stale` and must be dropped by
    /// the caller without touching its own state.
    pub fn complete(&mut self, token: u64, result: Result<(), ExplorerError>) -> NavOutcome {
        let Some(pending) = self.pending.take_if(|p| p.token == token) else {
            tracing::debug!(token, "discarding listing reply for a superseded request");
            return NavOutcome::Stale;
        };

        match result {
            Ok(()) => {
                match pending.effect {
                    HistoryEffect::Push => {
                        if let Some(index) = self.index {
                            self.history.truncate(index + 1);
                        }
                        self.history.push(pending.path.clone());
                        self.index = Some(self.history.len() - 1);
                    }
                    HistoryEffect::GoTo(index) => {
                        self.index = Some(index);
                    }
                    HistoryEffect::Refresh => {}
                }
                NavOutcome::Entered(pending.path)
            }
            Err(err) => NavOutcome::Failed(err),
        }
    }

    fn issue(&mut self, path: PathBuf, effect: HistoryEffect) -> ListingRequest {
        self.next_token += 1;
        let token = self.next_token;
        self.pending = Some(PendingRequest {
            token,
            path: path.clone(),
            effect,
        });
        ListingRequest { token, path }
    }
}

//! State publication and task scoping shared by every controller.

use std::{
    future::Future,
    sync::{Mutex, PoisonError},
};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Holds one controller's state behind a `watch` channel. All mutation goes
/// through a reducer, so observers only ever see whole transitions.
pub struct Store<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone + PartialEq> Store<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Applies `event` and returns the resulting state.
    pub fn dispatch<E>(&self, reduce: fn(S, E) -> S, event: E) -> S {
        let mut applied = None;
        self.tx.send_if_modified(|state| {
            let next = reduce(state.clone(), event);
            let changed = next != *state;
            *state = next;
            applied = Some(state.clone());
            changed
        });
        applied.unwrap_or_else(|| self.snapshot())
    }

    /// Applies `event` only while `token` is live. Returns `false` when the
    /// event was discarded.
    pub fn dispatch_unless_cancelled<E>(
        &self,
        token: &CancellationToken,
        reduce: fn(S, E) -> S,
        event: E,
    ) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }
            let next = reduce(state.clone(), event);
            let changed = next != *state;
            *state = next;
            applied = true;
            changed
        });
        applied
    }
}

/// Lifetime of one screen. Every task a controller starts hangs off a child
/// token of this scope; shutting the scope down cancels all of them.
pub struct TaskScope {
    root: CancellationToken,
}

impl TaskScope {
    pub fn new() -> Self {
        Self {
            root: CancellationToken::new(),
        }
    }

    pub fn child(&self) -> CancellationToken {
        self.root.child_token()
    }

    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Slot for an operation where only the latest run matters. Starting a new
/// run cancels the one before it.
#[derive(Default)]
pub struct LatestTask {
    current: Mutex<Option<CancellationToken>>,
}

impl LatestTask {
    /// Hands out a fresh child of `scope` and cancels the token it replaces.
    pub fn restart(&self, scope: &TaskScope) -> CancellationToken {
        let next = scope.child();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        next
    }
}

/// Runs `fut` to completion unless `token` fires first.
pub async fn until_cancelled<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = fut => Some(output),
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

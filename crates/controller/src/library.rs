//! The user's playlist library: list, create, rename, delete.

use std::{future::Future, sync::Arc};

use client_core::{BackendApi, ClientError};
use shared::{domain::PlaylistId, protocol::Playlist};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    has_token,
    messages::{UiError, UiErrorContext},
    store::{until_cancelled, LatestTask, Store, TaskScope},
    INVALID_PLAYLIST_MESSAGE, INVALID_TOKEN_MESSAGE,
};

pub const EMPTY_NAME_MESSAGE: &str = "Playlist name must not be empty.";
pub const DELETED_MESSAGE: &str = "Playlist deleted.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryState {
    pub playlists: Vec<Playlist>,
    pub loading: bool,
    pub mutating: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub session_expired: bool,
}

#[derive(Debug, Clone)]
pub enum LibraryEvent {
    FetchStarted,
    Loaded(Vec<Playlist>),
    FetchFailed(UiError),
    MutationStarted,
    MutationSucceeded(String),
    MutationFailed(UiError),
    ClearMessages,
}

pub fn reduce(mut state: LibraryState, event: LibraryEvent) -> LibraryState {
    match event {
        LibraryEvent::FetchStarted => {
            // A success message from the mutation that triggered this
            // re-fetch stays visible.
            state.loading = true;
            state.error = None;
            state
        }
        LibraryEvent::Loaded(playlists) => {
            state.playlists = playlists;
            state.loading = false;
            state
        }
        LibraryEvent::FetchFailed(err) => {
            state.loading = false;
            state.session_expired |= err.requires_reauth();
            state.error = Some(err.into_message());
            state
        }
        LibraryEvent::MutationStarted => {
            state.mutating = true;
            state.error = None;
            state.success = None;
            state
        }
        LibraryEvent::MutationSucceeded(message) => {
            state.mutating = false;
            state.success = Some(message);
            state
        }
        LibraryEvent::MutationFailed(err) => {
            state.mutating = false;
            state.session_expired |= err.requires_reauth();
            state.error = Some(err.into_message());
            state
        }
        LibraryEvent::ClearMessages => {
            state.error = None;
            state.success = None;
            state
        }
    }
}

pub struct LibraryController {
    backend: Arc<dyn BackendApi>,
    store: Store<LibraryState>,
    scope: TaskScope,
    fetches: LatestTask,
}

impl LibraryController {
    pub fn new(backend: Arc<dyn BackendApi>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            store: Store::new(LibraryState::default()),
            scope: TaskScope::new(),
            fetches: LatestTask::default(),
        })
    }

    pub fn state(&self) -> LibraryState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LibraryState> {
        self.store.subscribe()
    }

    pub async fn fetch(&self, token: &str) {
        if self.scope.is_shut_down() {
            return;
        }
        if !has_token(token) {
            let err = UiError::validation(UiErrorContext::Playlists, INVALID_TOKEN_MESSAGE);
            self.store.dispatch(reduce, LibraryEvent::FetchFailed(err));
            return;
        }

        let task = self.fetches.restart(&self.scope);
        self.store.dispatch(reduce, LibraryEvent::FetchStarted);
        debug!("playlist library fetch started");
        let event = match until_cancelled(&task, self.backend.list_playlists(token)).await {
            None => return,
            Some(Ok(playlists)) => LibraryEvent::Loaded(playlists),
            Some(Err(err)) => {
                let ui = UiError::from_client_error(UiErrorContext::Playlists, &err);
                warn!(error = %err, "playlist library fetch failed");
                LibraryEvent::FetchFailed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    pub async fn create(&self, token: &str, name: &str) {
        let context = UiErrorContext::CreatePlaylist;
        let Some(name) = self.checked_name(context, name) else {
            return;
        };
        self.mutate(token, context, self.backend.create_playlist(token, name), |created| {
            info!(playlist_id = %created.id, "playlist created");
            format!("Playlist '{}' created.", created.name)
        })
        .await;
    }

    pub async fn rename(&self, token: &str, playlist_id: PlaylistId, name: &str) {
        let context = UiErrorContext::RenamePlaylist;
        if !self.checked_id(context, playlist_id) {
            return;
        }
        let Some(name) = self.checked_name(context, name) else {
            return;
        };
        self.mutate(
            token,
            context,
            self.backend.rename_playlist(token, playlist_id, name),
            |renamed| {
                info!(%playlist_id, "playlist renamed");
                format!("Playlist renamed to '{}'.", renamed.name)
            },
        )
        .await;
    }

    pub async fn delete(&self, token: &str, playlist_id: PlaylistId) {
        let context = UiErrorContext::DeletePlaylist;
        if !self.checked_id(context, playlist_id) {
            return;
        }
        self.mutate(
            token,
            context,
            self.backend.delete_playlist(token, playlist_id),
            |()| {
                info!(%playlist_id, "playlist deleted");
                DELETED_MESSAGE.to_string()
            },
        )
        .await;
    }

    pub fn clear_messages(&self) {
        self.store.dispatch(reduce, LibraryEvent::ClearMessages);
    }

    pub fn shutdown(&self) {
        self.scope.shutdown();
    }

    fn checked_name<'a>(&self, context: UiErrorContext, name: &'a str) -> Option<&'a str> {
        let name = name.trim();
        if name.is_empty() {
            self.reject(context, EMPTY_NAME_MESSAGE);
            return None;
        }
        Some(name)
    }

    fn checked_id(&self, context: UiErrorContext, playlist_id: PlaylistId) -> bool {
        if !playlist_id.is_valid() {
            self.reject(context, INVALID_PLAYLIST_MESSAGE);
        }
        playlist_id.is_valid()
    }

    fn reject(&self, context: UiErrorContext, message: &str) {
        let err = UiError::validation(context, message);
        self.store.dispatch(reduce, LibraryEvent::MutationFailed(err));
    }

    /// Runs one mutation and, when it succeeds, reloads the list so the
    /// library reflects the backend.
    async fn mutate<T>(
        &self,
        token: &str,
        context: UiErrorContext,
        call: impl Future<Output = Result<T, ClientError>>,
        describe: impl FnOnce(T) -> String,
    ) {
        if self.scope.is_shut_down() {
            return;
        }
        if !has_token(token) {
            self.reject(context, INVALID_TOKEN_MESSAGE);
            return;
        }

        let task = self.scope.child();
        self.store.dispatch(reduce, LibraryEvent::MutationStarted);
        let event = match until_cancelled(&task, call).await {
            None => return,
            Some(Ok(value)) => LibraryEvent::MutationSucceeded(describe(value)),
            Some(Err(err)) => {
                let ui = UiError::from_client_error(context, &err);
                warn!(?context, error = %err, "playlist mutation failed");
                LibraryEvent::MutationFailed(ui)
            }
        };
        let succeeded = matches!(event, LibraryEvent::MutationSucceeded(_));
        if self.store.dispatch_unless_cancelled(&task, reduce, event) && succeeded {
            self.fetch(token).await;
        }
    }
}

#[cfg(test)]
#[path = "tests/library_tests.rs"]
mod tests;

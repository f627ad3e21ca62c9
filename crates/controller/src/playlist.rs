//! A single playlist: its entries, removing them, and adding movies by hand.

use std::sync::Arc;

use client_core::BackendApi;
use shared::{
    domain::PlaylistId,
    protocol::{AddMovieRequest, Playlist, PlaylistEntry},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    detail::MISSING_MOVIE_MESSAGE,
    has_token,
    messages::{UiError, UiErrorContext},
    store::{until_cancelled, LatestTask, Store, TaskScope},
    INVALID_PLAYLIST_MESSAGE, INVALID_TOKEN_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaylistState {
    pub playlist: Option<Playlist>,
    pub loading: bool,
    pub mutating: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub session_expired: bool,
}

#[derive(Debug, Clone)]
pub enum PlaylistEvent {
    FetchStarted,
    Loaded(Playlist),
    FetchFailed(UiError),
    MutationStarted,
    EntryRemoved(String),
    EntryAdded { playlist: Playlist, message: String },
    MutationFailed(UiError),
    ClearMessages,
}

pub fn reduce(mut state: PlaylistState, event: PlaylistEvent) -> PlaylistState {
    match event {
        PlaylistEvent::FetchStarted => {
            state.loading = true;
            state.error = None;
            state
        }
        PlaylistEvent::Loaded(playlist) => {
            state.playlist = Some(playlist);
            state.loading = false;
            state
        }
        PlaylistEvent::FetchFailed(err) => {
            state.loading = false;
            state.session_expired |= err.requires_reauth();
            state.error = Some(err.into_message());
            state
        }
        PlaylistEvent::MutationStarted => {
            state.mutating = true;
            state.error = None;
            state.success = None;
            state
        }
        PlaylistEvent::EntryRemoved(message) => {
            state.mutating = false;
            state.success = Some(message);
            state
        }
        PlaylistEvent::EntryAdded { playlist, message } => {
            state.playlist = Some(playlist);
            state.mutating = false;
            state.success = Some(message);
            state
        }
        PlaylistEvent::MutationFailed(err) => {
            state.mutating = false;
            state.session_expired |= err.requires_reauth();
            state.error = Some(err.into_message());
            state
        }
        PlaylistEvent::ClearMessages => {
            state.error = None;
            state.success = None;
            state
        }
    }
}

pub struct PlaylistController {
    backend: Arc<dyn BackendApi>,
    store: Store<PlaylistState>,
    scope: TaskScope,
    fetches: LatestTask,
}

impl PlaylistController {
    pub fn new(backend: Arc<dyn BackendApi>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            store: Store::new(PlaylistState::default()),
            scope: TaskScope::new(),
            fetches: LatestTask::default(),
        })
    }

    pub fn state(&self) -> PlaylistState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaylistState> {
        self.store.subscribe()
    }

    pub async fn fetch(&self, token: &str, playlist_id: PlaylistId) {
        if self.scope.is_shut_down() {
            return;
        }
        if let Some(reason) = precondition(token, playlist_id) {
            let err = UiError::validation(UiErrorContext::PlaylistDetail, reason);
            self.store.dispatch(reduce, PlaylistEvent::FetchFailed(err));
            return;
        }

        let task = self.fetches.restart(&self.scope);
        self.store.dispatch(reduce, PlaylistEvent::FetchStarted);
        debug!(%playlist_id, "playlist fetch started");
        let event = match until_cancelled(&task, self.backend.get_playlist(token, playlist_id)).await
        {
            None => return,
            Some(Ok(playlist)) => PlaylistEvent::Loaded(playlist),
            Some(Err(err)) => {
                let ui = UiError::from_client_error(UiErrorContext::PlaylistDetail, &err);
                warn!(%playlist_id, error = %err, "playlist fetch failed");
                PlaylistEvent::FetchFailed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    /// Removes `entry` and reloads the playlist.
    pub async fn remove_entry(&self, token: &str, playlist_id: PlaylistId, entry: &PlaylistEntry) {
        let context = UiErrorContext::RemoveFromPlaylist;
        let Some(task) = self.begin_mutation(context, token, playlist_id) else {
            return;
        };
        let call = self.backend.remove_movie(token, playlist_id, entry.id);
        let event = match until_cancelled(&task, call).await {
            None => return,
            Some(Ok(())) => {
                info!(%playlist_id, entry_id = %entry.id, "playlist entry removed");
                PlaylistEvent::EntryRemoved(format!("'{}' removed.", entry.title))
            }
            Some(Err(err)) => {
                let ui = UiError::from_client_error(context, &err);
                warn!(%playlist_id, entry_id = %entry.id, error = %err, "entry removal failed");
                PlaylistEvent::MutationFailed(ui)
            }
        };
        let removed = matches!(event, PlaylistEvent::EntryRemoved(_));
        if self.store.dispatch_unless_cancelled(&task, reduce, event) && removed {
            self.fetch(token, playlist_id).await;
        }
    }

    /// Adds a movie described by hand. The backend's snapshot replaces the
    /// local playlist.
    pub async fn add_manually(&self, token: &str, playlist_id: PlaylistId, movie: &AddMovieRequest) {
        let context = UiErrorContext::AddToPlaylist;
        if movie.title.trim().is_empty() {
            self.reject(context, MISSING_MOVIE_MESSAGE);
            return;
        }
        let Some(task) = self.begin_mutation(context, token, playlist_id) else {
            return;
        };
        let event = match until_cancelled(&task, self.backend.add_movie(token, playlist_id, movie))
            .await
        {
            None => return,
            Some(Ok(playlist)) => {
                info!(%playlist_id, movie_id = %movie.tmdb_movie_id, "movie added by hand");
                PlaylistEvent::EntryAdded {
                    playlist,
                    message: format!("'{}' added.", movie.title),
                }
            }
            Some(Err(err)) => {
                let ui = UiError::from_client_error(context, &err);
                warn!(%playlist_id, error = %err, "manual add failed");
                PlaylistEvent::MutationFailed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    pub fn clear_messages(&self) {
        self.store.dispatch(reduce, PlaylistEvent::ClearMessages);
    }

    pub fn shutdown(&self) {
        self.scope.shutdown();
    }

    fn begin_mutation(
        &self,
        context: UiErrorContext,
        token: &str,
        playlist_id: PlaylistId,
    ) -> Option<CancellationToken> {
        if self.scope.is_shut_down() {
            return None;
        }
        if let Some(reason) = precondition(token, playlist_id) {
            self.reject(context, reason);
            return None;
        }
        self.store.dispatch(reduce, PlaylistEvent::MutationStarted);
        Some(self.scope.child())
    }

    fn reject(&self, context: UiErrorContext, message: &str) {
        let err = UiError::validation(context, message);
        self.store.dispatch(reduce, PlaylistEvent::MutationFailed(err));
    }
}

fn precondition(token: &str, playlist_id: PlaylistId) -> Option<&'static str> {
    if !has_token(token) {
        Some(INVALID_TOKEN_MESSAGE)
    } else if !playlist_id.is_valid() {
        Some(INVALID_PLAYLIST_MESSAGE)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/playlist_tests.rs"]
mod tests;

//! Movie detail screen: the movie itself, the user's playlists, and adding
//! the movie to one of them.

use std::sync::Arc;

use client_core::{BackendApi, CatalogApi};
use shared::{
    catalog::MovieDetail,
    domain::{MovieId, PlaylistId},
    protocol::{AddMovieRequest, Playlist},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    has_token,
    messages::{UiError, UiErrorContext},
    store::{until_cancelled, LatestTask, Store, TaskScope},
    INVALID_PLAYLIST_MESSAGE, INVALID_TOKEN_MESSAGE,
};

pub const MISSING_MOVIE_MESSAGE: &str = "Movie data is not available.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub movie: Option<MovieDetail>,
    pub loading_movie: bool,
    pub movie_error: Option<String>,
    pub playlists: Vec<Playlist>,
    pub loading_playlists: bool,
    pub playlists_error: Option<String>,
    pub adding: bool,
    pub add_success: bool,
    pub add_error: Option<String>,
    /// Set once the backend rejected the session; the user has to sign in again.
    pub session_expired: bool,
}

#[derive(Debug, Clone)]
pub enum DetailEvent {
    LoadStarted { fetch_playlists: bool },
    MovieLoaded(MovieDetail),
    MovieFailed(String),
    PlaylistsLoaded(Vec<Playlist>),
    PlaylistsFailed(UiError),
    AddStarted,
    AddSucceeded(Playlist),
    AddFailed(UiError),
    ResetAddStatus,
}

pub fn reduce(mut state: DetailState, event: DetailEvent) -> DetailState {
    match event {
        DetailEvent::LoadStarted { fetch_playlists } => {
            state.movie = None;
            state.loading_movie = true;
            state.movie_error = None;
            state.playlists.clear();
            state.loading_playlists = fetch_playlists;
            state.playlists_error = (!fetch_playlists).then(|| INVALID_TOKEN_MESSAGE.to_string());
            reset_add(state)
        }
        DetailEvent::MovieLoaded(movie) => {
            state.movie = Some(movie);
            state.loading_movie = false;
            state
        }
        DetailEvent::MovieFailed(message) => {
            state.loading_movie = false;
            state.movie_error = Some(message);
            state
        }
        DetailEvent::PlaylistsLoaded(playlists) => {
            state.playlists = playlists;
            state.loading_playlists = false;
            state
        }
        DetailEvent::PlaylistsFailed(err) => {
            state.loading_playlists = false;
            state.session_expired |= err.requires_reauth();
            state.playlists_error = Some(err.into_message());
            state
        }
        DetailEvent::AddStarted => {
            state.adding = true;
            state.add_success = false;
            state.add_error = None;
            state
        }
        DetailEvent::AddSucceeded(playlist) => {
            match state.playlists.iter_mut().find(|p| p.id == playlist.id) {
                Some(existing) => *existing = playlist,
                None => state.playlists.push(playlist),
            }
            state.adding = false;
            state.add_success = true;
            state
        }
        DetailEvent::AddFailed(err) => {
            state.adding = false;
            state.add_success = false;
            state.session_expired |= err.requires_reauth();
            state.add_error = Some(err.into_message());
            state
        }
        DetailEvent::ResetAddStatus => reset_add(state),
    }
}

fn reset_add(mut state: DetailState) -> DetailState {
    state.adding = false;
    state.add_success = false;
    state.add_error = None;
    state
}

pub struct DetailController {
    catalog: Arc<dyn CatalogApi>,
    backend: Arc<dyn BackendApi>,
    store: Store<DetailState>,
    scope: TaskScope,
    current_load: LatestTask,
}

impl DetailController {
    pub fn new(catalog: Arc<dyn CatalogApi>, backend: Arc<dyn BackendApi>) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            backend,
            store: Store::new(DetailState::default()),
            scope: TaskScope::new(),
            current_load: LatestTask::default(),
        })
    }

    pub fn state(&self) -> DetailState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.store.subscribe()
    }

    /// Fetches the movie and the user's playlists concurrently. Starting a new
    /// load cancels whatever the previous one still has outstanding.
    pub async fn load(&self, movie_id: MovieId, token: &str) {
        if self.scope.is_shut_down() {
            return;
        }
        let task = self.current_load.restart(&self.scope);

        let fetch_playlists = has_token(token);
        let started = DetailEvent::LoadStarted { fetch_playlists };
        if !self.store.dispatch_unless_cancelled(&task, reduce, started) {
            return;
        }
        debug!(%movie_id, fetch_playlists, "detail load started");

        let movie = async {
            let event = match until_cancelled(&task, self.catalog.detail(movie_id)).await {
                None => return,
                Some(Ok(movie)) => DetailEvent::MovieLoaded(movie),
                Some(Err(err)) => {
                    let ui = UiError::from_client_error(UiErrorContext::MovieDetail, &err);
                    warn!(%movie_id, error = %err, "movie detail fetch failed");
                    DetailEvent::MovieFailed(ui.into_message())
                }
            };
            self.store.dispatch_unless_cancelled(&task, reduce, event);
        };

        let playlists = async {
            if !fetch_playlists {
                return;
            }
            let event = match until_cancelled(&task, self.backend.list_playlists(token)).await {
                None => return,
                Some(Ok(playlists)) => DetailEvent::PlaylistsLoaded(playlists),
                Some(Err(err)) => {
                    let ui = UiError::from_client_error(UiErrorContext::Playlists, &err);
                    warn!(error = %err, "playlist list fetch failed");
                    DetailEvent::PlaylistsFailed(ui)
                }
            };
            self.store.dispatch_unless_cancelled(&task, reduce, event);
        };

        tokio::join!(movie, playlists);
    }

    /// Adds `movie` to the playlist. Input is validated before anything is
    /// sent; on success the backend's copy of the playlist replaces ours.
    pub async fn add_to_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        movie: Option<&MovieDetail>,
    ) {
        if self.scope.is_shut_down() {
            return;
        }
        let Some(movie) = movie else {
            self.reject(MISSING_MOVIE_MESSAGE);
            return;
        };
        if !playlist_id.is_valid() {
            self.reject(INVALID_PLAYLIST_MESSAGE);
            return;
        }
        if !has_token(token) {
            self.reject(INVALID_TOKEN_MESSAGE);
            return;
        }

        let task = self.scope.child();
        self.store.dispatch(reduce, DetailEvent::AddStarted);
        let request = AddMovieRequest::from(movie);
        let event = match until_cancelled(&task, self.backend.add_movie(token, playlist_id, &request))
            .await
        {
            None => return,
            Some(Ok(playlist)) => {
                info!(%playlist_id, movie_id = %movie.id, "movie added to playlist");
                DetailEvent::AddSucceeded(playlist)
            }
            Some(Err(err)) => {
                let ui = UiError::from_client_error(UiErrorContext::AddToPlaylist, &err);
                warn!(%playlist_id, error = %err, "add to playlist failed");
                DetailEvent::AddFailed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    pub fn reset_add_status(&self) {
        self.store.dispatch(reduce, DetailEvent::ResetAddStatus);
    }

    pub fn shutdown(&self) {
        self.scope.shutdown();
    }

    fn reject(&self, message: &str) {
        let err = UiError::validation(UiErrorContext::AddToPlaylist, message);
        self.store.dispatch(reduce, DetailEvent::AddFailed(err));
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;

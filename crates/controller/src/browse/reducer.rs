//! Pure browse/search state transitions.

use std::collections::HashSet;

use shared::{
    catalog::{Genre, Movie, MoviePage},
    domain::{MovieQuery, MovieSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Replaces the list.
    Fresh,
    /// Appends the next page.
    More,
}

/// What a dispatched fetch is for. Completions carry their request back so
/// the reducer can tell current results from superseded ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub kind: FetchKind,
    pub query: MovieQuery,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Raw input text, echoed back to the search field.
    pub query: String,
    pub source: MovieSource,
    pub selected_genre: Option<Genre>,
    pub genres: Vec<Genre>,
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub phase: Phase,
    pub inflight: Option<FetchRequest>,
    /// Listing the displayed movies came from; `None` until something loads.
    pub loaded_query: Option<MovieQuery>,
    pub generation: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            source: MovieSource::Popular,
            selected_genre: None,
            genres: Vec::new(),
            movies: Vec::new(),
            current_page: 1,
            total_pages: 1,
            loading: false,
            loading_more: false,
            error: None,
            phase: Phase::Idle,
            inflight: None,
            loaded_query: None,
            generation: 0,
        }
    }
}

impl SearchState {
    /// The listing a fresh fetch would request right now.
    pub fn active_query(&self) -> MovieQuery {
        match self.source {
            MovieSource::Popular => MovieQuery::Popular,
            MovieSource::Search => {
                let text = self.query.trim();
                if text.is_empty() {
                    MovieQuery::Popular
                } else {
                    MovieQuery::Search(text.to_string())
                }
            }
            MovieSource::Genre => self
                .selected_genre
                .as_ref()
                .map_or(MovieQuery::Popular, |genre| MovieQuery::Genre(genre.id)),
        }
    }

    pub fn can_load_more(&self) -> bool {
        self.inflight.is_none()
            && !self.loading
            && !self.loading_more
            && self.loaded_query.is_some()
            && self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone)]
pub enum BrowseEvent {
    QueryChanged(String),
    CategorySelected(Option<Genre>),
    Refresh,
    LoadMore,
    GenresLoaded(Vec<Genre>),
    GenresFailed(String),
    PageLoaded {
        request: FetchRequest,
        page: MoviePage,
    },
    FetchFailed {
        request: FetchRequest,
        message: String,
    },
    ClearError,
}

pub fn reduce(mut state: SearchState, event: BrowseEvent) -> SearchState {
    match event {
        BrowseEvent::QueryChanged(text) => {
            state.source = if text.trim().is_empty() {
                MovieSource::Popular
            } else {
                MovieSource::Search
            };
            state.query = text;
            state
        }
        BrowseEvent::CategorySelected(genre) => {
            // Toggling matches on id; labels may differ between callers.
            let next = match (&state.selected_genre, &genre) {
                (Some(current), Some(picked)) if current.id == picked.id => None,
                _ => genre,
            };
            state.source = if next.is_some() {
                MovieSource::Genre
            } else {
                MovieSource::Popular
            };
            state.selected_genre = next;
            state.current_page = 1;
            begin_fresh(state)
        }
        BrowseEvent::Refresh => begin_fresh(state),
        BrowseEvent::LoadMore => begin_more(state),
        BrowseEvent::GenresLoaded(genres) => {
            state.genres = genres;
            state
        }
        BrowseEvent::GenresFailed(message) => {
            state.error = Some(message);
            state
        }
        BrowseEvent::PageLoaded { request, page } => {
            if state.inflight.as_ref() != Some(&request) {
                return state;
            }
            let incoming = page.results.into_iter().filter(Movie::has_poster);
            state.movies = match request.kind {
                FetchKind::Fresh => merge_unique(Vec::new(), incoming),
                FetchKind::More => merge_unique(std::mem::take(&mut state.movies), incoming),
            };
            state.current_page = page.page;
            state.total_pages = page.total_pages.max(page.page);
            state.loaded_query = Some(request.query);
            state.inflight = None;
            state.loading = false;
            state.loading_more = false;
            state.phase = Phase::Ready;
            state
        }
        BrowseEvent::FetchFailed { request, message } => {
            if state.inflight.as_ref() != Some(&request) {
                return state;
            }
            if request.kind == FetchKind::Fresh && state.loaded_query.is_none() {
                state.movies.clear();
            }
            state.inflight = None;
            state.loading = false;
            state.loading_more = false;
            state.error = Some(message);
            state.phase = Phase::Error;
            state
        }
        BrowseEvent::ClearError => {
            state.error = None;
            state
        }
    }
}

fn begin_fresh(mut state: SearchState) -> SearchState {
    state.generation += 1;
    state.inflight = Some(FetchRequest {
        generation: state.generation,
        kind: FetchKind::Fresh,
        query: state.active_query(),
        page: 1,
    });
    state.loading = true;
    state.loading_more = false;
    state.error = None;
    state.phase = Phase::Loading;
    state
}

fn begin_more(mut state: SearchState) -> SearchState {
    if !state.can_load_more() {
        return state;
    }
    let Some(query) = state.loaded_query.clone() else {
        return state;
    };
    state.generation += 1;
    state.inflight = Some(FetchRequest {
        generation: state.generation,
        kind: FetchKind::More,
        query,
        page: state.current_page + 1,
    });
    state.loading_more = true;
    state.error = None;
    state.phase = Phase::LoadingMore;
    state
}

/// Appends `incoming` to `existing`, keeping the first occurrence of each id.
pub fn merge_unique(existing: Vec<Movie>, incoming: impl IntoIterator<Item = Movie>) -> Vec<Movie> {
    let mut seen: HashSet<_> = existing.iter().map(|movie| movie.id).collect();
    let mut merged = existing;
    for movie in incoming {
        if seen.insert(movie.id) {
            merged.push(movie);
        }
    }
    merged
}

#[cfg(test)]
#[path = "../tests/browse_reducer_tests.rs"]
mod tests;

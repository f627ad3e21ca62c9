//! Browse/search screen: debounced text search, genre filter, infinite scroll.

pub mod reducer;

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use client_core::CatalogApi;
use shared::catalog::Genre;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use reducer::{BrowseEvent, FetchKind, FetchRequest, Phase, SearchState};

use crate::{
    messages::{UiError, UiErrorContext},
    store::{until_cancelled, Store, TaskScope},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const GENRES_FAILED_MESSAGE: &str = "Failed to load genres.";

#[derive(Default)]
struct TaskSlots {
    /// Token of the fetch currently running, keyed by request generation.
    fetch: Option<(u64, CancellationToken)>,
    debounce: Option<CancellationToken>,
    genres_requested: bool,
}

pub struct BrowseController {
    catalog: Arc<dyn CatalogApi>,
    store: Store<SearchState>,
    scope: TaskScope,
    debounce: Duration,
    slots: Mutex<TaskSlots>,
}

impl BrowseController {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Arc<Self> {
        Self::with_debounce(catalog, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(catalog: Arc<dyn CatalogApi>, debounce: Duration) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            store: Store::new(SearchState::default()),
            scope: TaskScope::new(),
            debounce,
            slots: Mutex::new(TaskSlots::default()),
        })
    }

    pub fn state(&self) -> SearchState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.store.subscribe()
    }

    /// Loads the genre list (once per controller) and the default listing.
    pub fn start(self: &Arc<Self>) {
        if self.scope.is_shut_down() {
            return;
        }
        self.load_genres();
        self.refresh();
    }

    /// Echoes `text` into state immediately and restarts the debounce timer.
    /// Only the last call inside the window triggers a fetch.
    pub fn set_query(self: &Arc<Self>, text: impl Into<String>) {
        if self.scope.is_shut_down() {
            return;
        }
        self.store
            .dispatch(reducer::reduce, BrowseEvent::QueryChanged(text.into()));

        let timer = self.scope.child();
        if let Some(previous) = self.slots().debounce.replace(timer.clone()) {
            previous.cancel();
        }

        let controller = Arc::clone(self);
        let delay = self.debounce;
        tokio::spawn(async move {
            if until_cancelled(&timer, tokio::time::sleep(delay))
                .await
                .is_some()
            {
                controller.fire_debounce(&timer);
            }
        });
    }

    /// Toggles the genre filter and fetches page 1 right away.
    pub fn select_category(self: &Arc<Self>, genre: Option<Genre>) {
        self.dispatch_fetch(BrowseEvent::CategorySelected(genre));
    }

    pub fn refresh(self: &Arc<Self>) {
        self.dispatch_fetch(BrowseEvent::Refresh);
    }

    /// Requests the next page. Returns `false` when the guard refused it.
    pub fn load_more(self: &Arc<Self>) -> bool {
        self.dispatch_fetch(BrowseEvent::LoadMore)
    }

    pub fn clear_error(&self) {
        self.store.dispatch(reducer::reduce, BrowseEvent::ClearError);
    }

    /// Screen teardown: cancels the running fetch and any pending debounce.
    pub fn shutdown(&self) {
        self.scope.shutdown();
    }

    fn slots(&self) -> MutexGuard<'_, TaskSlots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fire_debounce(self: &Arc<Self>, timer: &CancellationToken) {
        let mut slots = self.slots();
        if timer.is_cancelled() {
            return;
        }
        slots.debounce = None;
        debug!(query = %self.store.snapshot().query, "debounce elapsed");
        self.dispatch_fetch_locked(&mut slots, BrowseEvent::Refresh);
    }

    fn dispatch_fetch(self: &Arc<Self>, event: BrowseEvent) -> bool {
        if self.scope.is_shut_down() {
            return false;
        }
        let mut slots = self.slots();
        self.dispatch_fetch_locked(&mut slots, event)
    }

    /// Runs `event` through the reducer and starts whatever request it put in
    /// flight. Callers hold the slot lock, so token order matches dispatch order.
    fn dispatch_fetch_locked(self: &Arc<Self>, slots: &mut TaskSlots, event: BrowseEvent) -> bool {
        let state = self.store.dispatch(reducer::reduce, event);
        let Some(request) = state.inflight else {
            return false;
        };
        if slots
            .fetch
            .as_ref()
            .is_some_and(|(generation, _)| *generation == request.generation)
        {
            return false;
        }

        let token = self.scope.child();
        if let Some((generation, previous)) = slots.fetch.replace((request.generation, token.clone()))
        {
            debug!(generation, "superseding in-flight fetch");
            previous.cancel();
        }
        self.spawn_fetch(request, token);
        true
    }

    fn spawn_fetch(self: &Arc<Self>, request: FetchRequest, token: CancellationToken) {
        debug!(
            generation = request.generation,
            kind = ?request.kind,
            query = ?request.query,
            page = request.page,
            "browse fetch started"
        );
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let result =
                until_cancelled(&token, controller.catalog.page(&request.query, request.page))
                    .await;
            let event = match result {
                None => {
                    debug!(generation = request.generation, "browse fetch cancelled");
                    return;
                }
                Some(Ok(page)) => BrowseEvent::PageLoaded { request, page },
                Some(Err(err)) => {
                    let ui = UiError::from_client_error(UiErrorContext::Browse, &err);
                    warn!(generation = request.generation, error = %err, "browse fetch failed");
                    BrowseEvent::FetchFailed {
                        request,
                        message: ui.into_message(),
                    }
                }
            };
            controller
                .store
                .dispatch_unless_cancelled(&token, reducer::reduce, event);
        });
    }

    fn load_genres(self: &Arc<Self>) {
        {
            let mut slots = self.slots();
            if slots.genres_requested {
                return;
            }
            slots.genres_requested = true;
        }

        let token = self.scope.child();
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let event = match until_cancelled(&token, controller.catalog.genres()).await {
                None => return,
                Some(Ok(genres)) => BrowseEvent::GenresLoaded(genres),
                Some(Err(err)) => {
                    warn!(error = %err, "genre list fetch failed");
                    BrowseEvent::GenresFailed(GENRES_FAILED_MESSAGE.to_string())
                }
            };
            controller
                .store
                .dispatch_unless_cancelled(&token, reducer::reduce, event);
        });
    }
}

#[cfg(test)]
#[path = "../tests/browse_controller_tests.rs"]
mod tests;

use std::time::Duration;

use super::*;
use crate::test_support::{detail, FakeBackend, FakeCatalog, Reply};

fn controller(catalog: &Arc<FakeCatalog>, backend: &Arc<FakeBackend>) -> Arc<DetailController> {
    DetailController::new(
        Arc::clone(catalog) as Arc<dyn CatalogApi>,
        Arc::clone(backend) as Arc<dyn BackendApi>,
    )
}

#[tokio::test]
async fn load_fetches_movie_and_playlists() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);

    detail_screen.load(MovieId(42), "abc").await;
    let state = detail_screen.state();

    assert_eq!(state.movie.as_ref().map(|m| m.id), Some(MovieId(42)));
    assert_eq!(state.playlists.len(), 2);
    assert!(!state.loading_movie);
    assert!(!state.loading_playlists);
    assert_eq!(state.movie_error, None);
    assert_eq!(state.playlists_error, None);
    assert_eq!(backend.tokens(), vec!["Bearer abc".to_string()]);
}

#[tokio::test]
async fn blank_token_skips_playlists_but_loads_movie() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);

    for blank in ["   ", "Bearer", "Bearer "] {
        detail_screen.load(MovieId(42), blank).await;
        let state = detail_screen.state();

        assert!(state.movie.is_some());
        assert_eq!(state.playlists_error.as_deref(), Some(INVALID_TOKEN_MESSAGE));
        assert!(!state.loading_playlists);
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn playlist_list_failure_ignores_server_body() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    backend.fail(
        "list_playlists",
        Reply::Status(503, Some("upstream unavailable".into())),
    );
    let detail_screen = controller(&catalog, &backend);

    detail_screen.load(MovieId(42), "abc").await;

    assert_eq!(
        detail_screen.state().playlists_error.as_deref(),
        Some("Failed to load playlists (HTTP 503).")
    );
}

#[tokio::test]
async fn each_fetch_fails_independently() {
    let catalog = FakeCatalog::new();
    catalog.script_detail(
        MovieId(5),
        Reply::Status(404, Some("The resource you requested could not be found.".into())),
    );
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);

    detail_screen.load(MovieId(5), "abc").await;
    let state = detail_screen.state();
    assert_eq!(
        state.movie_error.as_deref(),
        Some("HTTP 404: The resource you requested could not be found.")
    );
    assert_eq!(state.playlists.len(), 2);

    catalog.script_detail(MovieId(5), Reply::Ok(detail(5)));
    backend.fail("list_playlists", Reply::Status(500, None));
    detail_screen.load(MovieId(5), "abc").await;
    let state = detail_screen.state();
    assert!(state.movie.is_some());
    assert_eq!(state.movie_error, None);
    assert_eq!(
        state.playlists_error.as_deref(),
        Some("Failed to load playlists (HTTP 500).")
    );
    assert!(!state.session_expired);
}

#[tokio::test]
async fn expired_session_is_flagged() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    backend.fail("list_playlists", Reply::Status(401, None));
    let detail_screen = controller(&catalog, &backend);

    detail_screen.load(MovieId(1), "stale").await;
    let state = detail_screen.state();

    assert!(state.session_expired);
    assert_eq!(
        state.playlists_error.as_deref(),
        Some("Access denied. Please sign in again.")
    );
}

#[tokio::test(start_paused = true)]
async fn new_load_cancels_previous_one() {
    let catalog = FakeCatalog::new();
    catalog.delay_detail(MovieId(1), Duration::from_secs(5));
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);

    let first = {
        let detail_screen = Arc::clone(&detail_screen);
        tokio::spawn(async move { detail_screen.load(MovieId(1), "abc").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    detail_screen.load(MovieId(2), "abc").await;
    first.await.expect("first load task");

    tokio::time::sleep(Duration::from_secs(10)).await;
    let state = detail_screen.state();
    assert_eq!(state.movie.map(|m| m.id), Some(MovieId(2)));
    assert!(!state.loading_movie);
}

#[tokio::test]
async fn add_validates_before_sending() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);
    let movie = detail(42);

    detail_screen.add_to_playlist("abc", PlaylistId(7), None).await;
    assert_eq!(
        detail_screen.state().add_error.as_deref(),
        Some(MISSING_MOVIE_MESSAGE)
    );

    detail_screen
        .add_to_playlist("abc", PlaylistId(0), Some(&movie))
        .await;
    assert_eq!(
        detail_screen.state().add_error.as_deref(),
        Some(INVALID_PLAYLIST_MESSAGE)
    );

    detail_screen
        .add_to_playlist("", PlaylistId(7), Some(&movie))
        .await;
    assert_eq!(
        detail_screen.state().add_error.as_deref(),
        Some(INVALID_TOKEN_MESSAGE)
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn add_replaces_playlist_with_server_copy() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);
    detail_screen.load(MovieId(42), "abc").await;
    let movie = detail_screen.state().movie;

    detail_screen
        .add_to_playlist("abc", PlaylistId(7), movie.as_ref())
        .await;
    let state = detail_screen.state();

    assert!(state.add_success);
    assert!(!state.adding);
    assert_eq!(state.add_error, None);
    let weekend = state
        .playlists
        .iter()
        .find(|p| p.id == PlaylistId(7))
        .expect("playlist kept");
    assert_eq!(weekend.item_count, 1);
    assert_eq!(weekend.entries()[0].title, "Movie 42");
    assert_eq!(state.playlists.len(), 2);
}

#[tokio::test]
async fn duplicate_add_shows_server_message() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);
    let movie = detail(42);

    detail_screen
        .add_to_playlist("abc", PlaylistId(7), Some(&movie))
        .await;
    detail_screen
        .add_to_playlist("abc", PlaylistId(7), Some(&movie))
        .await;
    let state = detail_screen.state();

    assert!(!state.add_success);
    assert_eq!(state.add_error.as_deref(), Some("Already added"));
}

#[tokio::test]
async fn conflict_without_body_uses_fallback() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    backend.fail("add_movie", Reply::Status(409, None));
    let detail_screen = controller(&catalog, &backend);

    detail_screen
        .add_to_playlist("abc", PlaylistId(7), Some(&detail(1)))
        .await;

    assert_eq!(
        detail_screen.state().add_error.as_deref(),
        Some("This movie is already in the playlist.")
    );
}

#[tokio::test]
async fn reset_and_reload_clear_add_status() {
    let catalog = FakeCatalog::new();
    let backend = FakeBackend::new();
    backend.fail("add_movie", Reply::Status(403, None));
    let detail_screen = controller(&catalog, &backend);

    detail_screen
        .add_to_playlist("abc", PlaylistId(8), Some(&detail(1)))
        .await;
    assert_eq!(
        detail_screen.state().add_error.as_deref(),
        Some("You do not have permission for this playlist.")
    );
    detail_screen.reset_add_status();
    assert_eq!(detail_screen.state().add_error, None);

    detail_screen
        .add_to_playlist("abc", PlaylistId(8), Some(&detail(1)))
        .await;
    detail_screen.load(MovieId(1), "abc").await;
    let state = detail_screen.state();
    assert_eq!(state.add_error, None);
    assert!(!state.add_success);
}

#[tokio::test]
async fn broken_connection_reads_as_network_failure() {
    let catalog = FakeCatalog::new();
    catalog.script_detail(MovieId(9), Reply::Broken);
    let backend = FakeBackend::new();
    let detail_screen = controller(&catalog, &backend);

    detail_screen.load(MovieId(9), "abc").await;

    assert_eq!(
        detail_screen.state().movie_error.as_deref(),
        Some("Failed to load movie detail. Check your network connection.")
    );
}

//! One function per subcommand. Each drives a screen controller to
//! completion and prints what the screen would show.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use client_core::{BackendApi, CatalogApi};
use controller::{
    BrowseController, DetailController, LibraryController, PlaylistController, ProfileController,
    SearchState,
};
use shared::{
    catalog::{Genre, Movie, MovieDetail},
    domain::{EntryId, GenreId, MovieId, PlaylistId},
    protocol::{AddMovieRequest, Playlist, UpdateProfileRequest, UserProfile},
};
use tokio::sync::watch;

use crate::{config::Settings, PlaylistAction, ProfileAction};

const GENRE_WAIT: Duration = Duration::from_secs(10);

pub async fn browse(
    catalog: Arc<dyn CatalogApi>,
    settings: &Settings,
    query: Option<String>,
    genre: Option<i64>,
    pages: u32,
) -> Result<()> {
    let screen = BrowseController::with_debounce(catalog, settings.debounce());
    let mut rx = screen.subscribe();

    screen.start();
    let mut state = wait_idle(&mut rx, 0).await?;

    if let Some(genre_id) = genre {
        let genre = find_genre(&mut rx, GenreId(genre_id)).await;
        let generation = state.generation;
        screen.select_category(Some(genre));
        state = wait_idle(&mut rx, generation).await?;
    } else if let Some(query) = query {
        let generation = state.generation;
        screen.set_query(query);
        state = wait_idle(&mut rx, generation).await?;
    }

    for _ in 1..pages {
        let generation = state.generation;
        if !screen.load_more() {
            break;
        }
        state = wait_idle(&mut rx, generation).await?;
    }
    screen.shutdown();

    if state.movies.is_empty() {
        if let Some(err) = state.error {
            bail!(err);
        }
    }
    for movie in &state.movies {
        print_movie(movie);
    }
    println!(
        "page {}/{} ({} movies)",
        state.current_page,
        state.total_pages,
        state.movies.len()
    );
    if let Some(err) = state.error {
        eprintln!("warning: {err}");
    }
    Ok(())
}

pub async fn genres(catalog: &dyn CatalogApi) -> Result<()> {
    let genres = catalog.genres().await.context("failed to load genres")?;
    for genre in genres {
        println!("{:>6}  {}", genre.id.0, genre.name);
    }
    Ok(())
}

pub async fn detail(
    catalog: Arc<dyn CatalogApi>,
    backend: Arc<dyn BackendApi>,
    token: &str,
    movie_id: i64,
    add_to: Option<i64>,
) -> Result<()> {
    let screen = DetailController::new(catalog, backend);
    screen.load(MovieId(movie_id), token).await;
    let state = screen.state();

    let Some(movie) = state.movie.as_ref() else {
        bail!(state
            .movie_error
            .unwrap_or_else(|| format!("movie {movie_id} did not load")));
    };
    print_detail(movie);

    match &state.playlists_error {
        Some(err) => eprintln!("playlists: {err}"),
        None => {
            println!();
            for playlist in &state.playlists {
                print_playlist(playlist);
            }
        }
    }

    if let Some(playlist_id) = add_to {
        screen
            .add_to_playlist(token, PlaylistId(playlist_id), Some(movie))
            .await;
        let after = screen.state();
        finish(after.add_error, after.session_expired)?;
        println!("Added '{}' to playlist {playlist_id}.", movie.title);
    }
    Ok(())
}

pub async fn playlists(
    backend: Arc<dyn BackendApi>,
    token: &str,
    action: PlaylistAction,
) -> Result<()> {
    match action {
        PlaylistAction::List => {
            let library = LibraryController::new(backend);
            library.fetch(token).await;
            let state = library.state();
            finish(state.error, state.session_expired)?;
            state.playlists.iter().for_each(print_playlist);
        }
        PlaylistAction::Create { name } => {
            let library = LibraryController::new(backend);
            library.create(token, &name).await;
            report_library(&library)?;
        }
        PlaylistAction::Rename { playlist_id, name } => {
            let library = LibraryController::new(backend);
            library.rename(token, PlaylistId(playlist_id), &name).await;
            report_library(&library)?;
        }
        PlaylistAction::Delete { playlist_id } => {
            let library = LibraryController::new(backend);
            library.delete(token, PlaylistId(playlist_id)).await;
            report_library(&library)?;
        }
        PlaylistAction::Show { playlist_id } => {
            let screen = PlaylistController::new(backend);
            screen.fetch(token, PlaylistId(playlist_id)).await;
            report_playlist(&screen)?;
        }
        PlaylistAction::Add {
            playlist_id,
            tmdb_movie_id,
            title,
            poster_path,
            release_date,
            overview,
        } => {
            let screen = PlaylistController::new(backend);
            let movie = AddMovieRequest {
                tmdb_movie_id: MovieId(tmdb_movie_id),
                title,
                poster_path,
                release_date,
                overview,
            };
            screen
                .add_manually(token, PlaylistId(playlist_id), &movie)
                .await;
            report_playlist(&screen)?;
        }
        PlaylistAction::Remove {
            playlist_id,
            entry_id,
        } => {
            let screen = PlaylistController::new(backend);
            let playlist_id = PlaylistId(playlist_id);
            screen.fetch(token, playlist_id).await;
            let state = screen.state();
            finish(state.error, state.session_expired)?;
            let entry = state
                .playlist
                .as_ref()
                .and_then(|p| p.entries().iter().find(|e| e.id == EntryId(entry_id)))
                .cloned()
                .ok_or_else(|| anyhow!("entry {entry_id} is not in playlist {playlist_id}"))?;
            screen.remove_entry(token, playlist_id, &entry).await;
            report_playlist(&screen)?;
        }
    }
    Ok(())
}

pub async fn profile(backend: Arc<dyn BackendApi>, token: &str, action: ProfileAction) -> Result<()> {
    let screen = ProfileController::new(backend);
    match action {
        ProfileAction::Show => screen.load(token).await,
        ProfileAction::Update {
            username,
            avatar_url,
            bio,
        } => {
            let update = UpdateProfileRequest {
                username,
                avatar_url,
                bio,
            };
            screen.update(token, &update).await;
        }
    }
    let state = screen.state();
    finish(state.error, state.session_expired)?;
    if let Some(message) = state.success {
        println!("{message}");
    }
    if let Some(profile) = &state.profile {
        print_profile(profile);
    }
    Ok(())
}

/// Waits until a fetch newer than `after_generation` has settled.
async fn wait_idle(
    rx: &mut watch::Receiver<SearchState>,
    after_generation: u64,
) -> Result<SearchState> {
    let state = rx
        .wait_for(|s| s.generation > after_generation && s.inflight.is_none())
        .await
        .context("browse screen closed")?
        .clone();
    Ok(state)
}

/// Resolves a genre id against the loaded genre list. Falls back to a bare
/// id when the list is unavailable; only the id reaches the catalog.
async fn find_genre(rx: &mut watch::Receiver<SearchState>, id: GenreId) -> Genre {
    let listed = tokio::time::timeout(GENRE_WAIT, rx.wait_for(|s| !s.genres.is_empty()))
        .await
        .ok()
        .and_then(Result::ok)
        .and_then(|state| state.genres.iter().find(|g| g.id == id).cloned());
    listed.unwrap_or_else(|| Genre {
        id,
        name: id.to_string(),
    })
}

fn finish(error: Option<String>, session_expired: bool) -> Result<()> {
    match error {
        None => Ok(()),
        Some(err) if session_expired => {
            bail!("{err} (pass a fresh --token or set CATASTREAM_TOKEN)")
        }
        Some(err) => bail!(err),
    }
}

fn report_library(library: &LibraryController) -> Result<()> {
    let state = library.state();
    finish(state.error, state.session_expired)?;
    if let Some(message) = state.success {
        println!("{message}");
    }
    state.playlists.iter().for_each(print_playlist);
    Ok(())
}

fn report_playlist(screen: &PlaylistController) -> Result<()> {
    let state = screen.state();
    finish(state.error, state.session_expired)?;
    if let Some(message) = state.success {
        println!("{message}");
    }
    if let Some(playlist) = &state.playlist {
        print_playlist(playlist);
        for entry in playlist.entries() {
            let year = year_of(entry.release_date.as_deref());
            println!("    [{}] {} {year}", entry.id, entry.title);
        }
    }
    Ok(())
}

fn year_of(release_date: Option<&str>) -> &str {
    release_date
        .and_then(|date| date.get(..4))
        .unwrap_or("----")
}

fn print_movie(movie: &Movie) {
    println!(
        "{:>8}  {}  {}",
        movie.id.0,
        year_of(movie.release_date.as_deref()),
        movie.title
    );
}

fn print_detail(movie: &MovieDetail) {
    println!("{} ({})", movie.title, year_of(movie.release_date.as_deref()));
    if let Some(runtime) = movie.runtime {
        println!("runtime: {runtime} min");
    }
    if let Some(vote) = movie.vote_average {
        println!("rating: {vote:.1}");
    }
    if let Some(genres) = &movie.genres {
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        println!("genres: {}", names.join(", "));
    }
    if let Some(overview) = movie.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{overview}");
    }
}

fn print_playlist(playlist: &Playlist) {
    let updated = playlist
        .updated_at_parsed()
        .map(|at| format!("  updated {}", at.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "{:>6}  {} ({} movies){updated}",
        playlist.id.0, playlist.name, playlist.item_count
    );
}

fn print_profile(profile: &UserProfile) {
    println!("{} <{}>", profile.username, profile.email);
    if let Some(bio) = &profile.bio {
        println!("{bio}");
    }
    if let Some(avatar) = &profile.avatar_url {
        println!("avatar: {avatar}");
    }
}

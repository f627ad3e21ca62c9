//! In-memory catalog and backend fakes for controller tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use client_core::{BackendApi, CatalogApi, ClientError};
use shared::{
    catalog::{Genre, Movie, MovieDetail, MoviePage},
    domain::{EntryId, GenreId, MovieId, MovieQuery, PlaylistId, SortOrder, UserId},
    protocol::{AddMovieRequest, Playlist, PlaylistEntry, UpdateProfileRequest, UserProfile},
};

/// How a scripted call answers.
#[derive(Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16, Option<String>),
    Broken,
}

impl<T: Clone> Reply<T> {
    fn resolve(&self) -> Result<T, ClientError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::Status(status, message) => Err(ClientError::from_status(*status, message.clone())),
            Self::Broken => Err(ClientError::Decode("connection reset".into())),
        }
    }
}

pub fn movie(id: i64, poster: bool) -> Movie {
    Movie {
        id: MovieId(id),
        title: format!("Movie {id}"),
        overview: Some("Overview.".into()),
        release_date: Some("2020-01-01".into()),
        poster_path: poster.then(|| format!("/poster-{id}.jpg")),
        backdrop_path: None,
        genre_ids: Some(vec![GenreId(28)]),
    }
}

pub fn page(page: u32, total_pages: u32, ids: &[i64]) -> MoviePage {
    MoviePage {
        page,
        results: ids.iter().map(|id| movie(*id, true)).collect(),
        total_pages,
        total_results: total_pages * 20,
    }
}

pub fn genre(id: i64, name: &str) -> Genre {
    Genre {
        id: GenreId(id),
        name: name.to_string(),
    }
}

pub fn detail(id: i64) -> MovieDetail {
    MovieDetail {
        id: MovieId(id),
        title: format!("Movie {id}"),
        overview: Some("Overview.".into()),
        poster_path: Some(format!("/poster-{id}.jpg")),
        backdrop_path: None,
        release_date: Some("2020-01-01".into()),
        vote_average: Some(7.5),
        runtime: Some(120),
        genres: Some(vec![genre(28, "Action")]),
    }
}

pub fn playlist(id: i64, name: &str, item_count: u32) -> Playlist {
    Playlist {
        id: PlaylistId(id),
        name: name.to_string(),
        user: None,
        created_at: None,
        updated_at: None,
        item_count,
        items_preview: Some(Vec::new()),
    }
}

pub fn entry(id: i64, title: &str) -> PlaylistEntry {
    PlaylistEntry {
        id: EntryId(id),
        tmdb_id: Some(MovieId(id * 10)),
        title: title.to_string(),
        poster_path: None,
        release_date: None,
        overview: String::new(),
        genre_ids: None,
    }
}

pub fn profile(username: &str) -> UserProfile {
    UserProfile {
        id: UserId(3),
        email: "rina@example.com".into(),
        username: username.to_string(),
        avatar_url: None,
        bio: None,
    }
}

/// Unscripted pages answer with two postered movies whose ids encode the
/// page number, out of three pages.
pub struct FakeCatalog {
    calls: Mutex<Vec<(MovieQuery, u32)>>,
    pages: Mutex<HashMap<(MovieQuery, u32), Reply<MoviePage>>>,
    delays: Mutex<HashMap<MovieQuery, Duration>>,
    genres: Mutex<Reply<Vec<Genre>>>,
    genres_delay: Mutex<Option<Duration>>,
    details: Mutex<HashMap<MovieId, Reply<MovieDetail>>>,
    detail_delays: Mutex<HashMap<MovieId, Duration>>,
    genre_calls: Mutex<u32>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            pages: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            genres: Mutex::new(Reply::Ok(vec![genre(28, "Action"), genre(35, "Comedy")])),
            genres_delay: Mutex::new(None),
            details: Mutex::new(HashMap::new()),
            detail_delays: Mutex::new(HashMap::new()),
            genre_calls: Mutex::new(0),
        })
    }

    pub fn script(&self, query: MovieQuery, page: u32, reply: Reply<MoviePage>) {
        self.pages.lock().unwrap().insert((query, page), reply);
    }

    pub fn delay(&self, query: MovieQuery, delay: Duration) {
        self.delays.lock().unwrap().insert(query, delay);
    }

    pub fn script_genres(&self, reply: Reply<Vec<Genre>>) {
        *self.genres.lock().unwrap() = reply;
    }

    pub fn delay_genres(&self, delay: Duration) {
        *self.genres_delay.lock().unwrap() = Some(delay);
    }

    pub fn script_detail(&self, id: MovieId, reply: Reply<MovieDetail>) {
        self.details.lock().unwrap().insert(id, reply);
    }

    pub fn delay_detail(&self, id: MovieId, delay: Duration) {
        self.detail_delays.lock().unwrap().insert(id, delay);
    }

    pub fn calls(&self) -> Vec<(MovieQuery, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn genre_calls(&self) -> u32 {
        *self.genre_calls.lock().unwrap()
    }

    async fn answer(&self, query: MovieQuery, page_number: u32) -> Result<MoviePage, ClientError> {
        self.calls.lock().unwrap().push((query.clone(), page_number));
        let delay = self.delays.lock().unwrap().get(&query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .pages
            .lock()
            .unwrap()
            .get(&(query, page_number))
            .cloned();
        match scripted {
            Some(reply) => reply.resolve(),
            None => {
                let base = i64::from(page_number) * 10;
                Ok(page(page_number, 3, &[base + 1, base + 2]))
            }
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn popular(&self, page: u32) -> Result<MoviePage, ClientError> {
        self.answer(MovieQuery::Popular, page).await
    }

    async fn by_genre(
        &self,
        genre: GenreId,
        page: u32,
        _sort: SortOrder,
    ) -> Result<MoviePage, ClientError> {
        self.answer(MovieQuery::Genre(genre), page).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ClientError> {
        self.answer(MovieQuery::Search(query.to_string()), page)
            .await
    }

    async fn detail(&self, id: MovieId) -> Result<MovieDetail, ClientError> {
        let delay = self.detail_delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.details.lock().unwrap().get(&id).cloned();
        scripted.unwrap_or_else(|| Reply::Ok(detail(id.0))).resolve()
    }

    async fn genres(&self) -> Result<Vec<Genre>, ClientError> {
        *self.genre_calls.lock().unwrap() += 1;
        let delay = *self.genres_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.genres.lock().unwrap().resolve()
    }
}

/// Backend fake with a mutable playlist table. Scripted replies override the
/// table-driven behaviour per operation name.
pub struct FakeBackend {
    pub playlists: Mutex<Vec<Playlist>>,
    pub profile: Mutex<UserProfile>,
    replies: Mutex<HashMap<&'static str, Reply<()>>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            playlists: Mutex::new(vec![playlist(7, "Weekend", 0), playlist(8, "Classics", 2)]),
            profile: Mutex::new(profile("rina")),
            replies: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Makes `operation` fail with the given reply. `Reply::Ok` clears it.
    pub fn fail(&self, operation: &'static str, reply: Reply<()>) {
        self.replies.lock().unwrap().insert(operation, reply);
    }

    pub fn delay(&self, operation: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(operation, delay);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(op, _)| *op).collect()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }

    async fn enter(&self, operation: &'static str, token: &str) -> Result<(), ClientError> {
        let authorization = client_core::auth::authorization_value(token)?;
        self.calls.lock().unwrap().push((operation, authorization));
        let delay = self.delays.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().get(operation).cloned();
        match reply {
            Some(reply) => reply.resolve(),
            None => Ok(()),
        }
    }

    fn find(&self, playlist_id: PlaylistId) -> Result<Playlist, ClientError> {
        self.playlists
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == playlist_id)
            .cloned()
            .ok_or(ClientError::NotFound { message: None })
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn list_playlists(&self, token: &str) -> Result<Vec<Playlist>, ClientError> {
        self.enter("list_playlists", token).await?;
        Ok(self.playlists.lock().unwrap().clone())
    }

    async fn create_playlist(&self, token: &str, name: &str) -> Result<Playlist, ClientError> {
        self.enter("create_playlist", token).await?;
        let mut playlists = self.playlists.lock().unwrap();
        let id = playlists.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        let created = playlist(id, name, 0);
        playlists.push(created.clone());
        Ok(created)
    }

    async fn rename_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        name: &str,
    ) -> Result<Playlist, ClientError> {
        self.enter("rename_playlist", token).await?;
        let mut playlists = self.playlists.lock().unwrap();
        let target = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or(ClientError::NotFound { message: None })?;
        target.name = name.to_string();
        Ok(target.clone())
    }

    async fn get_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
    ) -> Result<Playlist, ClientError> {
        self.enter("get_playlist", token).await?;
        self.find(playlist_id)
    }

    async fn delete_playlist(&self, token: &str, playlist_id: PlaylistId) -> Result<(), ClientError> {
        self.enter("delete_playlist", token).await?;
        let mut playlists = self.playlists.lock().unwrap();
        let before = playlists.len();
        playlists.retain(|p| p.id != playlist_id);
        if playlists.len() == before {
            return Err(ClientError::NotFound { message: None });
        }
        Ok(())
    }

    async fn add_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        movie: &AddMovieRequest,
    ) -> Result<Playlist, ClientError> {
        self.enter("add_movie", token).await?;
        let mut playlists = self.playlists.lock().unwrap();
        let target = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or(ClientError::NotFound { message: None })?;
        let entries = target.items_preview.get_or_insert_with(Vec::new);
        if entries.iter().any(|e| e.tmdb_id == Some(movie.tmdb_movie_id)) {
            return Err(ClientError::Conflict {
                message: Some("Already added".into()),
            });
        }
        let next_id = entries.iter().map(|e| e.id.0).max().unwrap_or(100) + 1;
        entries.push(PlaylistEntry {
            id: EntryId(next_id),
            tmdb_id: Some(movie.tmdb_movie_id),
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            overview: movie.overview.clone().unwrap_or_default(),
            genre_ids: None,
        });
        target.item_count += 1;
        Ok(target.clone())
    }

    async fn remove_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        entry_id: EntryId,
    ) -> Result<(), ClientError> {
        self.enter("remove_movie", token).await?;
        let mut playlists = self.playlists.lock().unwrap();
        let target = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or(ClientError::NotFound { message: None })?;
        if let Some(entries) = target.items_preview.as_mut() {
            entries.retain(|e| e.id != entry_id);
            target.item_count = entries.len() as u32;
        }
        Ok(())
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, ClientError> {
        self.enter("profile", token).await?;
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        self.enter("update_profile", token).await?;
        let mut profile = self.profile.lock().unwrap();
        if let Some(username) = &update.username {
            profile.username = username.clone();
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(bio) = &update.bio {
            profile.bio = Some(bio.clone());
        }
        Ok(profile.clone())
    }
}

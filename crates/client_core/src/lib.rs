use async_trait::async_trait;
use shared::{
    catalog::{Genre, MovieDetail, MoviePage},
    domain::{EntryId, GenreId, MovieId, MovieQuery, PlaylistId, SortOrder},
    protocol::{AddMovieRequest, Playlist, UpdateProfileRequest, UserProfile},
};

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod error;
pub mod transport;

pub use backend::HttpBackendClient;
pub use catalog::TmdbClient;
pub use error::ClientError;

/// Read-only access to the movie catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn popular(&self, page: u32) -> Result<MoviePage, ClientError>;
    async fn by_genre(
        &self,
        genre: GenreId,
        page: u32,
        sort: SortOrder,
    ) -> Result<MoviePage, ClientError>;
    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ClientError>;
    async fn detail(&self, id: MovieId) -> Result<MovieDetail, ClientError>;
    async fn genres(&self) -> Result<Vec<Genre>, ClientError>;

    /// Fetches one page of whichever listing `query` describes.
    async fn page(&self, query: &MovieQuery, page: u32) -> Result<MoviePage, ClientError> {
        match query {
            MovieQuery::Popular => self.popular(page).await,
            MovieQuery::Search(text) => self.search(text, page).await,
            MovieQuery::Genre(genre) => {
                self.by_genre(*genre, page, SortOrder::PopularityDesc).await
            }
        }
    }
}

/// Authenticated playlist and profile operations. `token` is the raw access
/// token; implementations normalize it into a bearer header.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn list_playlists(&self, token: &str) -> Result<Vec<Playlist>, ClientError>;
    async fn create_playlist(&self, token: &str, name: &str) -> Result<Playlist, ClientError>;
    async fn rename_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        name: &str,
    ) -> Result<Playlist, ClientError>;
    async fn get_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
    ) -> Result<Playlist, ClientError>;
    async fn delete_playlist(&self, token: &str, playlist_id: PlaylistId)
        -> Result<(), ClientError>;
    async fn add_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        movie: &AddMovieRequest,
    ) -> Result<Playlist, ClientError>;
    async fn remove_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        entry_id: EntryId,
    ) -> Result<(), ClientError>;
    async fn profile(&self, token: &str) -> Result<UserProfile, ClientError>;
    async fn update_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

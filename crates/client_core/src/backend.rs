//! HTTP client for the playlist/user backend. Every call is authenticated.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder};
use shared::{
    domain::{EntryId, PlaylistId},
    protocol::{
        AddMovieRequest, CreatePlaylistRequest, Playlist, RenamePlaylistRequest,
        UpdateProfileRequest, UserProfile,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{
    auth::authorization_value,
    error::ClientError,
    transport::{decode_json, endpoint, expect_empty, parse_base_url},
    BackendApi,
};

pub struct HttpBackendClient {
    http: Client,
    base: Url,
}

impl HttpBackendClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            base: parse_base_url(base_url)?,
        })
    }

    fn request(&self, method: Method, token: &str, path: &str) -> Result<RequestBuilder, ClientError> {
        let authorization = authorization_value(token)?;
        let url = endpoint(&self.base, path)?;
        debug!(%method, path, "backend request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, authorization))
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn list_playlists(&self, token: &str) -> Result<Vec<Playlist>, ClientError> {
        let response = self
            .request(Method::GET, token, "api/playlists/me")?
            .send()
            .await?;
        decode_json(response).await
    }

    async fn create_playlist(&self, token: &str, name: &str) -> Result<Playlist, ClientError> {
        let response = self
            .request(Method::POST, token, "api/playlists")?
            .json(&CreatePlaylistRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        let playlist: Playlist = decode_json(response).await?;
        info!(playlist_id = %playlist.id, "playlist created");
        Ok(playlist)
    }

    async fn rename_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        name: &str,
    ) -> Result<Playlist, ClientError> {
        let response = self
            .request(Method::PUT, token, &format!("api/playlists/{playlist_id}"))?
            .json(&RenamePlaylistRequest {
                new_name: name.to_string(),
            })
            .send()
            .await?;
        let playlist = decode_json(response).await?;
        info!(%playlist_id, "playlist renamed");
        Ok(playlist)
    }

    async fn get_playlist(
        &self,
        token: &str,
        playlist_id: PlaylistId,
    ) -> Result<Playlist, ClientError> {
        let response = self
            .request(Method::GET, token, &format!("api/playlists/{playlist_id}"))?
            .send()
            .await?;
        decode_json(response).await
    }

    async fn delete_playlist(&self, token: &str, playlist_id: PlaylistId) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, token, &format!("api/playlists/{playlist_id}"))?
            .send()
            .await?;
        expect_empty(response).await?;
        info!(%playlist_id, "playlist deleted");
        Ok(())
    }

    async fn add_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        movie: &AddMovieRequest,
    ) -> Result<Playlist, ClientError> {
        let response = self
            .request(
                Method::POST,
                token,
                &format!("api/playlists/{playlist_id}/movies"),
            )?
            .json(movie)
            .send()
            .await?;
        let playlist = decode_json(response).await?;
        info!(%playlist_id, tmdb_movie_id = %movie.tmdb_movie_id, "movie added to playlist");
        Ok(playlist)
    }

    async fn remove_movie(
        &self,
        token: &str,
        playlist_id: PlaylistId,
        entry_id: EntryId,
    ) -> Result<(), ClientError> {
        let response = self
            .request(
                Method::DELETE,
                token,
                &format!("api/playlists/{playlist_id}/movies/{entry_id}"),
            )?
            .send()
            .await?;
        expect_empty(response).await?;
        info!(%playlist_id, %entry_id, "movie removed from playlist");
        Ok(())
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .request(Method::GET, token, "api/users/me")?
            .send()
            .await?;
        decode_json(response).await
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        let response = self
            .request(Method::PUT, token, "api/users/me")?
            .json(update)
            .send()
            .await?;
        let profile = decode_json(response).await?;
        info!("profile updated");
        Ok(profile)
    }
}

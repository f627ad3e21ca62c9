//! HTTP client for the TMDB-shaped movie catalog.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    catalog::{Genre, GenreList, MovieDetail, MoviePage},
    domain::{GenreId, MovieId, SortOrder},
};
use tracing::debug;
use url::Url;

use crate::{
    error::ClientError,
    transport::{decode_json, endpoint, parse_base_url},
    CatalogApi,
};

pub const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_LANGUAGE: &str = "en-US";

pub struct TmdbClient {
    http: Client,
    base: Url,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), base_url, api_key)
    }

    pub fn with_http(
        http: Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            base: parse_base_url(base_url)?,
            api_key: api_key.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = endpoint(&self.base, path)?;
        debug!(path, ?params, "catalog request");
        let response = self
            .http
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;
        decode_json(response).await
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn popular(&self, page: u32) -> Result<MoviePage, ClientError> {
        self.get("movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn by_genre(
        &self,
        genre: GenreId,
        page: u32,
        sort: SortOrder,
    ) -> Result<MoviePage, ClientError> {
        self.get(
            "discover/movie",
            &[
                ("with_genres", genre.to_string()),
                ("page", page.to_string()),
                ("sort_by", sort.as_param().to_string()),
            ],
        )
        .await
    }

    async fn search(&self, query: &str, page: u32) -> Result<MoviePage, ClientError> {
        self.get(
            "search/movie",
            &[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("include_adult", "false".to_string()),
            ],
        )
        .await
    }

    async fn detail(&self, id: MovieId) -> Result<MovieDetail, ClientError> {
        self.get(&format!("movie/{id}"), &[]).await
    }

    async fn genres(&self) -> Result<Vec<Genre>, ClientError> {
        let list: GenreList = self.get("genre/movie/list", &[]).await?;
        Ok(list.genres)
    }
}

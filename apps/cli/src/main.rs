mod commands;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{BackendApi, CatalogApi, HttpBackendClient, TmdbClient};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catastream", about = "Browse the movie catalog and manage playlists")]
struct Cli {
    /// Access token for the playlist backend.
    #[arg(long, env = "CATASTREAM_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List movies: popular by default, or matching a search or genre.
    Browse {
        #[arg(long)]
        query: Option<String>,
        #[arg(long, conflicts_with = "query")]
        genre: Option<i64>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Genres,
    /// Show one movie, optionally adding it to a playlist.
    Detail {
        movie_id: i64,
        #[arg(long)]
        add_to: Option<i64>,
    },
    Playlists {
        #[command(subcommand)]
        action: PlaylistAction,
    },
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlaylistAction {
    List,
    Create {
        name: String,
    },
    Rename {
        playlist_id: i64,
        name: String,
    },
    Delete {
        playlist_id: i64,
    },
    Show {
        playlist_id: i64,
    },
    /// Add a movie by hand, without looking it up in the catalog.
    Add {
        playlist_id: i64,
        tmdb_movie_id: i64,
        title: String,
        #[arg(long)]
        poster_path: Option<String>,
        #[arg(long)]
        release_date: Option<String>,
        #[arg(long)]
        overview: Option<String>,
    },
    Remove {
        playlist_id: i64,
        entry_id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(
        catalog = %settings.catalog_base_url,
        backend = %settings.backend_base_url,
        "settings loaded"
    );
    if settings.catalog_api_key.trim().is_empty() {
        warn!("catalog_api_key is not set; catalog requests will be rejected");
    }

    let catalog: Arc<dyn CatalogApi> = Arc::new(
        TmdbClient::new(&settings.catalog_base_url, settings.catalog_api_key.clone())
            .context("invalid catalog_base_url")?
            .with_language(settings.catalog_language.clone()),
    );
    let backend: Arc<dyn BackendApi> = Arc::new(
        HttpBackendClient::new(&settings.backend_base_url).context("invalid backend_base_url")?,
    );
    let token = cli.token.unwrap_or_default();

    match cli.command {
        Command::Browse {
            query,
            genre,
            pages,
        } => commands::browse(catalog, &settings, query, genre, pages).await,
        Command::Genres => commands::genres(catalog.as_ref()).await,
        Command::Detail { movie_id, add_to } => {
            commands::detail(catalog, backend, &token, movie_id, add_to).await
        }
        Command::Playlists { action } => commands::playlists(backend, &token, action).await,
        Command::Profile { action } => commands::profile(backend, &token, action).await,
    }
}

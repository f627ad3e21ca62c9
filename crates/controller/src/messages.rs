//! User-facing error modeling for controller state.

use client_core::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Permission,
    NotFound,
    Conflict,
    Validation,
    Transport,
    Server,
}

/// The operation that failed. Picks fallback wording and decides whether the
/// catalog or the backend phrasing applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Browse,
    Genres,
    MovieDetail,
    Playlists,
    AddToPlaylist,
    PlaylistDetail,
    RemoveFromPlaylist,
    CreatePlaylist,
    RenamePlaylist,
    DeletePlaylist,
    Profile,
    UpdateProfile,
}

impl UiErrorContext {
    fn is_catalog(self) -> bool {
        matches!(self, Self::Browse | Self::Genres | Self::MovieDetail)
    }

    fn fallback(self) -> &'static str {
        match self {
            Self::Browse => "Failed to load movies",
            Self::Genres => "Failed to load genres",
            Self::MovieDetail => "Failed to load movie detail",
            Self::Playlists => "Failed to load playlists",
            Self::AddToPlaylist => "Failed to add movie",
            Self::PlaylistDetail => "Failed to load playlist",
            Self::RemoveFromPlaylist => "Failed to remove movie",
            Self::CreatePlaylist => "Failed to create playlist",
            Self::RenamePlaylist => "Failed to rename playlist",
            Self::DeletePlaylist => "Failed to delete playlist",
            Self::Profile => "Failed to load profile",
            Self::UpdateProfile => "Failed to update profile",
        }
    }

    fn subject(self) -> &'static str {
        match self {
            Self::Profile | Self::UpdateProfile => "profile",
            _ => "playlist",
        }
    }

    fn not_found(self) -> &'static str {
        match self {
            Self::Profile | Self::UpdateProfile => "Profile not found.",
            _ => "Playlist not found.",
        }
    }

    fn conflict(self) -> &'static str {
        match self {
            Self::AddToPlaylist => "This movie is already in the playlist.",
            Self::CreatePlaylist | Self::RenamePlaylist => {
                "A playlist with this name already exists."
            }
            _ => "The request conflicts with the current state.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Classifies a client failure for display in `context`.
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            // A catalog 401 means a bad API key, not an expired session.
            ClientError::Unauthorized { .. } if context.is_catalog() => UiErrorCategory::Server,
            ClientError::Unauthorized { .. } => UiErrorCategory::Auth,
            ClientError::Forbidden { .. } => UiErrorCategory::Permission,
            ClientError::NotFound { .. } => UiErrorCategory::NotFound,
            ClientError::Conflict { .. } => UiErrorCategory::Conflict,
            ClientError::Http { .. } => UiErrorCategory::Server,
            ClientError::Transport(_) | ClientError::Decode(_) => UiErrorCategory::Transport,
            ClientError::Validation(_) => UiErrorCategory::Validation,
        };
        Self {
            category,
            context,
            message: describe(context, err),
        }
    }

    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: message.into(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

fn describe(context: UiErrorContext, err: &ClientError) -> String {
    let server = err.server_message();
    match err {
        ClientError::Transport(_) | ClientError::Decode(_) => {
            format!("{}. Check your network connection.", context.fallback())
        }
        ClientError::Validation(reason) => reason.clone(),
        _ if context.is_catalog() => {
            let status = err.status().unwrap_or_default();
            let detail = server.map_or_else(|| format!("{}.", context.fallback()), str::to_string);
            format!("HTTP {status}: {detail}")
        }
        ClientError::Unauthorized { .. } => "Access denied. Please sign in again.".to_string(),
        // The playlist list reports only the status, whatever the body says.
        _ if matches!(context, UiErrorContext::Playlists) => {
            let status = err.status().unwrap_or_default();
            format!("{} (HTTP {status}).", context.fallback())
        }
        ClientError::Forbidden { .. } => {
            format!("You do not have permission for this {}.", context.subject())
        }
        ClientError::NotFound { .. } => context.not_found().to_string(),
        ClientError::Conflict { .. } => server
            .map(str::to_string)
            .unwrap_or_else(|| context.conflict().to_string()),
        ClientError::Http { status, .. } => server
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} (HTTP {status}).", context.fallback())),
    }
}

#[cfg(test)]
#[path = "tests/messages_tests.rs"]
mod tests;

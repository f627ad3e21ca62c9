//! Screen controllers: pure reducers over explicit state structs, plus the
//! async shells that run catalog/backend calls and feed results back in.

pub mod browse;
pub mod detail;
pub mod library;
pub mod messages;
pub mod playlist;
pub mod profile;
pub mod store;

pub use browse::{BrowseController, SearchState};
pub use detail::{DetailController, DetailState};
pub use library::{LibraryController, LibraryState};
pub use messages::{UiError, UiErrorCategory, UiErrorContext};
pub use playlist::{PlaylistController, PlaylistState};
pub use profile::{ProfileController, ProfileState};

/// Shown whenever an authenticated operation is attempted without a token.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token.";
pub const INVALID_PLAYLIST_MESSAGE: &str = "Invalid playlist id.";

/// Whether `token` would produce a usable bearer header.
pub(crate) fn has_token(token: &str) -> bool {
    client_core::auth::authorization_value(token).is_ok()
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

use super::*;

fn conflict(message: Option<&str>) -> ClientError {
    ClientError::Conflict {
        message: message.map(str::to_string),
    }
}

#[test]
fn conflict_prefers_server_message() {
    let err = UiError::from_client_error(UiErrorContext::AddToPlaylist, &conflict(Some("Already added")));
    assert_eq!(err.message(), "Already added");
    assert_eq!(err.category(), UiErrorCategory::Conflict);
}

#[test]
fn conflict_falls_back_to_context_wording() {
    let err = UiError::from_client_error(UiErrorContext::AddToPlaylist, &conflict(None));
    assert_eq!(err.message(), "This movie is already in the playlist.");
}

#[test]
fn unauthorized_asks_for_sign_in() {
    let err = UiError::from_client_error(
        UiErrorContext::Playlists,
        &ClientError::Unauthorized {
            message: Some("jwt expired".into()),
        },
    );
    assert_eq!(err.message(), "Access denied. Please sign in again.");
    assert!(err.requires_reauth());
}

#[test]
fn forbidden_and_not_found_name_the_subject() {
    let forbidden = UiError::from_client_error(
        UiErrorContext::AddToPlaylist,
        &ClientError::Forbidden { message: None },
    );
    assert_eq!(
        forbidden.message(),
        "You do not have permission for this playlist."
    );

    let missing = UiError::from_client_error(
        UiErrorContext::Profile,
        &ClientError::NotFound { message: None },
    );
    assert_eq!(missing.message(), "Profile not found.");
}

#[test]
fn other_statuses_use_server_message_then_code() {
    let with_message = UiError::from_client_error(
        UiErrorContext::CreatePlaylist,
        &ClientError::Http {
            status: 422,
            message: Some("Name too long".into()),
        },
    );
    assert_eq!(with_message.message(), "Name too long");

    let bare = UiError::from_client_error(
        UiErrorContext::Playlists,
        &ClientError::Http {
            status: 500,
            message: None,
        },
    );
    assert_eq!(bare.message(), "Failed to load playlists (HTTP 500).");
}

#[test]
fn catalog_errors_lead_with_status() {
    let err = UiError::from_client_error(
        UiErrorContext::MovieDetail,
        &ClientError::NotFound {
            message: Some("The resource you requested could not be found.".into()),
        },
    );
    assert_eq!(
        err.message(),
        "HTTP 404: The resource you requested could not be found."
    );

    let unauthorized = UiError::from_client_error(
        UiErrorContext::Browse,
        &ClientError::Unauthorized { message: None },
    );
    assert_eq!(unauthorized.message(), "HTTP 401: Failed to load movies.");
    assert!(!unauthorized.requires_reauth());
}

#[test]
fn decode_failures_read_as_network_errors() {
    let err = UiError::from_client_error(
        UiErrorContext::Browse,
        &ClientError::Decode("expected value".into()),
    );
    assert_eq!(err.category(), UiErrorCategory::Transport);
    assert_eq!(
        err.message(),
        "Failed to load movies. Check your network connection."
    );
}

#[test]
fn playlist_list_failures_report_status_only() {
    let with_message = UiError::from_client_error(
        UiErrorContext::Playlists,
        &ClientError::Http {
            status: 503,
            message: Some("upstream unavailable".into()),
        },
    );
    assert_eq!(with_message.message(), "Failed to load playlists (HTTP 503).");

    let missing = UiError::from_client_error(
        UiErrorContext::Playlists,
        &ClientError::NotFound {
            message: Some("no such user".into()),
        },
    );
    assert_eq!(missing.message(), "Failed to load playlists (HTTP 404).");
    assert_eq!(missing.category(), UiErrorCategory::NotFound);
}

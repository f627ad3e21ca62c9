use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized (HTTP 401)")]
    Unauthorized { message: Option<String> },
    #[error("forbidden (HTTP 403)")]
    Forbidden { message: Option<String> },
    #[error("not found (HTTP 404)")]
    NotFound { message: Option<String> },
    #[error("conflict (HTTP 409)")]
    Conflict { message: Option<String> },
    #[error("HTTP {status}")]
    Http {
        status: u16,
        message: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match ErrorCode::from_status(status) {
            ErrorCode::Unauthorized => Self::Unauthorized { message },
            ErrorCode::Forbidden => Self::Forbidden { message },
            ErrorCode::NotFound => Self::NotFound { message },
            ErrorCode::Conflict => Self::Conflict { message },
            _ => Self::Http { status, message },
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Http { .. } => ErrorCode::Http,
            Self::Transport(_) | Self::Decode(_) => ErrorCode::Transport,
            Self::Validation(_) => ErrorCode::Validation,
        }
    }

    /// HTTP status for errors that came back from a server.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

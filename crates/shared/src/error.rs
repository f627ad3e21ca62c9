use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Transport,
    Http,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            _ => Self::Http,
        }
    }
}

/// Fields servers use for a human-readable failure reason: the playlist
/// backend sends `error`, the catalog sends `status_message`.
const MESSAGE_FIELDS: [&str; 2] = ["error", "status_message"];

/// Best-effort extraction of a server error message. Bodies that are not
/// JSON objects, or have no non-blank string in a known field, yield `None`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    let object = value.as_object()?;
    MESSAGE_FIELDS.iter().find_map(|field| {
        object
            .get(*field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;

//! Load errors surfaced to the loading indicator.

use serde::Deserialize;

/// Everything that can stop a scene from loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Endpoint string could not be parsed as a URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Connection, timeout or body read failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Body was not the expected JSON
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("No assets returned")]
    NoAssets,
}

impl LoadError {
    /// Build an `Http` error from a failed response body.
    pub fn http(status: u16, body: &str) -> Self {
        LoadError::Http {
            status,
            detail: error_detail(body),
        }
    }

    /// Short tag for logs.
    pub fn phase(&self) -> &'static str {
        match self {
            LoadError::InvalidEndpoint(_) => "config",
            LoadError::Transport(_) | LoadError::Http { .. } => "fetch",
            LoadError::Decode(_) => "decode",
            LoadError::NoAssets => "assets",
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Decode(e.to_string())
    }
}

impl From<url::ParseError> for LoadError {
    fn from(e: url::ParseError) -> Self {
        LoadError::InvalidEndpoint(e.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The JSON `message` field when present, else the trimmed body text.
pub fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let text = body.trim();
    if text.is_empty() {
        "no detail".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_json_message() {
        assert_eq!(error_detail(r#"{"code":40410000,"message":"asset not found"}"#), "asset not found");
    }

    #[test]
    fn detail_falls_back_to_text() {
        assert_eq!(error_detail("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_detail(""), "no detail");
        assert_eq!(error_detail(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[test]
    fn display() {
        assert_eq!(LoadError::http(403, r#"{"message":"forbidden"}"#).to_string(), "HTTP 403: forbidden");
        assert_eq!(LoadError::NoAssets.to_string(), "No assets returned");
        assert_eq!(LoadError::NoAssets.phase(), "assets");
    }
}

//! Error types for the alertgram-telegram crate.

use thiserror::Error;

/// Errors returned by the Telegram Bot API client.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The Bot API answered with `ok: false`.
    #[error("telegram api error {code:?}: {description}")]
    Api {
        /// Error code reported by the API, if any.
        code: Option<i64>,
        /// Human-readable description from the API.
        description: String,
    },

    /// The HTTP request could not be completed.
    #[error("http error: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client configuration is invalid.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        let err = err.without_url();
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TelegramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for Bot API operations.
pub type Result<T> = std::result::Result<T, TelegramError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_api() {
        let err = TelegramError::Api {
            code: Some(400),
            description: "Bad Request: can't parse entities".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "telegram api error Some(400): Bad Request: can't parse entities"
        );
    }

    #[test]
    fn error_display_http() {
        let err = TelegramError::Http("connection refused".to_string());
        assert_eq!(err.to_string(), "http error: connection refused");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("not json");
        assert!(json_err.is_err());
        let err: TelegramError = json_err.unwrap_err().into();
        assert!(matches!(err, TelegramError::Decode(_)));
    }
}

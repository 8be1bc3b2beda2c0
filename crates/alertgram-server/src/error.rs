//! Error types for the bridge server.

use std::net::SocketAddr;

use alertgram_core::AlertError;
use alertgram_telegram::TelegramError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the bridge server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    /// The webhook secret header was missing or wrong.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Alert handling failed.
    #[error(transparent)]
    Alert(#[from] AlertError),

    /// Telegram call failed.
    #[error(transparent)]
    Telegram(#[from] TelegramError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ServerError {
    const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::InvalidRequest(_)
            | Self::Alert(
                AlertError::InvalidCallback { .. }
                | AlertError::InvalidBlackout { .. }
                | AlertError::UnknownField { .. },
            ) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Alert(AlertError::AlertNotFound { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Telegram(_) | Self::Alert(AlertError::Store(_) | AlertError::Telegram(_)) => {
                (StatusCode::BAD_GATEWAY, "upstream_error")
            }
            Self::Config(_) | Self::BindFailed(_, _) | Self::Alert(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use test_case::test_case;

    #[test_case(ServerError::Unauthorized("bad secret".into()), StatusCode::UNAUTHORIZED ; "unauthorized")]
    #[test_case(ServerError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST ; "invalid request")]
    #[test_case(ServerError::Alert(AlertError::AlertNotFound { id: "a".into() }), StatusCode::NOT_FOUND ; "not found")]
    #[test_case(ServerError::Alert(AlertError::Store("down".into())), StatusCode::BAD_GATEWAY ; "store down")]
    #[test_case(ServerError::Telegram(TelegramError::Http("timeout".into())), StatusCode::BAD_GATEWAY ; "telegram down")]
    #[test_case(ServerError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR ; "internal")]
    fn status_mapping(err: ServerError, expected: StatusCode) {
        assert_eq!(err.into_response().status(), expected);
    }

    #[tokio::test]
    async fn body_is_json() {
        let response = ServerError::Unauthorized("bad secret token".to_string()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["error"], "unauthorized");
        assert_eq!(json["message"], "unauthorized: bad secret token");
    }

    #[test]
    fn alert_errors_display_transparently() {
        let err = ServerError::from(AlertError::AlertNotFound {
            id: "abc".to_string(),
        });
        assert_eq!(
            err.to_string(),
            AlertError::AlertNotFound {
                id: "abc".to_string()
            }
            .to_string()
        );
    }
}

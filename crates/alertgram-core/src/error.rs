//! Error types for the alertgram-core crate.

use thiserror::Error;

/// Errors raised while deciding on, rendering or acting on alerts.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A field name is not part of the alert record.
    #[error("unknown alert field: {name}")]
    UnknownField {
        /// The requested field name.
        name: String,
    },

    /// Alert with the given ID was not found.
    #[error("alert not found: {id}")]
    AlertNotFound {
        /// The alert ID that was not found.
        id: String,
    },

    /// An inhibition rule is malformed.
    #[error("invalid inhibition rule '{name}': {reason}")]
    InvalidRule {
        /// Rule name.
        name: String,
        /// Why the rule was rejected.
        reason: String,
    },

    /// A rule pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// The rule file could not be read or parsed.
    #[error("failed to load rules from {path}: {reason}")]
    RuleFile {
        /// Path of the rule file.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// A message template failed to compile or render.
    #[error("template error: {0}")]
    Template(String),

    /// A chat callback could not be interpreted.
    #[error("invalid callback: {reason}")]
    InvalidCallback {
        /// Why the callback was rejected.
        reason: String,
    },

    /// A blackout definition is invalid.
    #[error("invalid blackout: {reason}")]
    InvalidBlackout {
        /// Why the blackout was rejected.
        reason: String,
    },

    /// The alert store rejected or failed a request.
    #[error("alert store error: {0}")]
    Store(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Chat transport error.
    #[error("telegram error: {0}")]
    Telegram(#[from] alertgram_telegram::TelegramError),
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<handlebars::TemplateError> for AlertError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for AlertError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

/// Result type for alertgram-core operations.
pub type Result<T> = std::result::Result<T, AlertError>;

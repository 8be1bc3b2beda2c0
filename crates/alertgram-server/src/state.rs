//! Shared state for the bridge server.

use std::time::Instant;

use alertgram_core::{CallbackHandler, Notifier};

/// State shared by every request handler.
#[derive(Debug)]
pub struct BridgeState {
    notifier: Notifier,
    callbacks: CallbackHandler,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`, if one is configured.
    webhook_secret: Option<String>,
    start_time: Instant,
}

impl BridgeState {
    /// Creates state around the outbound and inbound components.
    #[must_use]
    pub fn new(notifier: Notifier, callbacks: CallbackHandler) -> Self {
        Self {
            notifier,
            callbacks,
            webhook_secret: None,
            start_time: Instant::now(),
        }
    }

    /// Requires inbound webhooks to carry `secret`.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    /// The outbound notifier.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The inbound callback handler.
    #[must_use]
    pub const fn callbacks(&self) -> &CallbackHandler {
        &self.callbacks
    }

    /// Returns true if `presented` satisfies the configured secret.
    #[must_use]
    pub fn webhook_authorized(&self, presented: Option<&str>) -> bool {
        match &self.webhook_secret {
            None => true,
            Some(expected) => presented == Some(expected.as_str()),
        }
    }

    /// Server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

//! Retrying message delivery.
//!
//! Delivery is best-effort: failures are retried a fixed number of times and
//! exhaustion is reported in the returned [`DeliveryReport`] instead of an
//! error, so the caller's own flow is never broken by the chat transport.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::client::BotApi;
use crate::types::SendMessage;

/// Retry schedule for [`deliver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of send attempts.
    pub max_attempts: u32,
    /// Pause before a delayed attempt.
    pub backoff: Duration,
    /// Zero-based index of the first attempt preceded by `backoff`.
    pub backoff_from_attempt: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: Duration::from_secs(10),
            backoff_from_attempt: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without pausing.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
            backoff_from_attempt: 0,
        }
    }

    /// Pause to apply before the given zero-based attempt.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        (attempt >= self.backoff_from_attempt && !self.backoff.is_zero()).then_some(self.backoff)
    }
}

/// Outcome of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Number of send attempts made.
    pub attempts: u32,
    /// Identifier of the delivered message, if any attempt succeeded.
    pub message_id: Option<i64>,
    /// Whether the inline keyboard was dropped after a failure.
    pub keyboard_stripped: bool,
    /// Description of the last failure.
    pub last_error: Option<String>,
}

impl DeliveryReport {
    /// Returns true if the message was delivered.
    #[must_use]
    pub const fn delivered(&self) -> bool {
        self.message_id.is_some()
    }
}

/// Sends `request`, retrying according to `policy`.
///
/// Any failed attempt drops the inline keyboard for the following attempts,
/// ruling out malformed markup as the cause.
pub async fn deliver(
    bot: &dyn BotApi,
    mut request: SendMessage,
    policy: &RetryPolicy,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        attempts: 0,
        message_id: None,
        keyboard_stripped: false,
        last_error: None,
    };

    for attempt in 0..policy.max_attempts {
        if let Some(delay) = policy.delay_before(attempt) {
            debug!(attempt, delay_secs = delay.as_secs(), "waiting before retry");
            tokio::time::sleep(delay).await;
        }

        report.attempts = attempt + 1;

        match bot.send_message(&request).await {
            Ok(message) => {
                info!(
                    chat_id = %request.chat_id,
                    message_id = message.message_id,
                    attempts = report.attempts,
                    silent = request.disable_notification,
                    "telegram message sent"
                );
                report.message_id = Some(message.message_id);
                return report;
            }
            Err(e) => {
                warn!(
                    attempt,
                    error = %e,
                    has_keyboard = request.reply_markup.is_some(),
                    "telegram send failed"
                );
                if request.reply_markup.take().is_some() {
                    report.keyboard_stripped = true;
                }
                report.last_error = Some(e.to_string());
            }
        }
    }

    error!(
        chat_id = %request.chat_id,
        attempts = report.attempts,
        last_error = ?report.last_error,
        text = %request.text,
        "telegram message not delivered, giving up"
    );
    report
}

//! In-memory [`BotApi`] for tests and dry runs.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::client::BotApi;
use crate::error::{Result, TelegramError};
use crate::types::{
    AnswerCallbackQuery, Chat, EditMessageText, Message, SendMessage, SetWebhook, User,
    WebhookInfo,
};

/// A bot that records every request instead of calling Telegram.
///
/// Sends can be made to fail a given number of times to exercise retries.
#[derive(Debug, Default)]
pub struct FakeBot {
    sent: Mutex<Vec<SendMessage>>,
    edited: Mutex<Vec<EditMessageText>>,
    answered: Mutex<Vec<AnswerCallbackQuery>>,
    webhook_url: Mutex<String>,
    fail_sends: AtomicU32,
    fail_edits: AtomicBool,
    send_attempts: AtomicU32,
    next_message_id: AtomicI64,
}

impl FakeBot {
    /// Creates a fake bot with no recorded traffic.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` sends fail.
    pub fn fail_next_sends(&self, count: u32) {
        self.fail_sends.store(count, Ordering::SeqCst);
    }

    /// Makes every edit fail.
    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SendMessage> {
        self.sent.lock().clone()
    }

    /// Edits applied so far.
    #[must_use]
    pub fn edited(&self) -> Vec<EditMessageText> {
        self.edited.lock().clone()
    }

    /// Callback queries answered so far.
    #[must_use]
    pub fn answered(&self) -> Vec<AnswerCallbackQuery> {
        self.answered.lock().clone()
    }

    /// Number of send attempts, successful or not.
    #[must_use]
    pub fn send_attempts(&self) -> u32 {
        self.send_attempts.load(Ordering::SeqCst)
    }

    /// Currently registered webhook URL.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        self.webhook_url.lock().clone()
    }
}

impl BotApi for FakeBot {
    fn get_me(&self) -> BoxFuture<'_, Result<User>> {
        Box::pin(async {
            Ok(User {
                id: 1,
                is_bot: true,
                first_name: "alertgram".to_string(),
                last_name: None,
                username: Some("alertgram_bot".to_string()),
            })
        })
    }

    fn get_webhook_info(&self) -> BoxFuture<'_, Result<WebhookInfo>> {
        Box::pin(async move {
            Ok(WebhookInfo {
                url: self.webhook_url(),
                pending_update_count: 0,
            })
        })
    }

    fn set_webhook<'a>(&'a self, request: &'a SetWebhook) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            request.url.clone_into(&mut self.webhook_url.lock());
            Ok(())
        })
    }

    fn send_message<'a>(&'a self, request: &'a SendMessage) -> BoxFuture<'a, Result<Message>> {
        Box::pin(async move {
            self.send_attempts.fetch_add(1, Ordering::SeqCst);

            let failing = self
                .fail_sends
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(TelegramError::Api {
                    code: Some(400),
                    description: "Bad Request: injected failure".to_string(),
                });
            }

            let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.sent.lock().push(request.clone());

            Ok(Message {
                message_id,
                chat: request.chat_id.parse().ok().map(|id| Chat { id }),
                text: Some(request.text.clone()),
            })
        })
    }

    fn edit_message_text<'a>(
        &'a self,
        request: &'a EditMessageText,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.fail_edits.load(Ordering::SeqCst) {
                return Err(TelegramError::Api {
                    code: Some(400),
                    description: "Bad Request: message to edit not found".to_string(),
                });
            }
            self.edited.lock().push(request.clone());
            Ok(())
        })
    }

    fn answer_callback_query<'a>(
        &'a self,
        request: &'a AnswerCallbackQuery,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.answered.lock().push(request.clone());
            Ok(())
        })
    }
}

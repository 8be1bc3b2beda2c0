//! Bot API request and response types.
//!
//! Only the subset of the Telegram Bot API used by alertgram is modelled:
//! sending and editing messages with inline keyboards, answering callback
//! queries, and webhook registration.

use serde::{Deserialize, Serialize};

/// Markup dialect used to format message text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// Legacy Markdown.
    #[default]
    Markdown,
    /// Markdown V2.
    MarkdownV2,
    /// HTML subset.
    #[serde(rename = "HTML")]
    Html,
}

/// A single button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label shown on the button.
    pub text: String,
    /// URL opened when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Data sent back in a callback query when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    /// Maximum size of `callback_data` in bytes accepted by the Bot API.
    pub const MAX_CALLBACK_DATA: usize = 64;

    /// Creates a button that opens a URL.
    #[must_use]
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
        }
    }

    /// Creates a button that sends `data` back as a callback query.
    #[must_use]
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
        }
    }
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Creates a keyboard with a single row.
    #[must_use]
    pub fn single_row(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }

    /// Iterates over every button in every row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineKeyboardButton> {
        self.inline_keyboard.iter().flatten()
    }
}

/// Parameters of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Target chat identifier or `@channelusername`.
    pub chat_id: String,
    /// Message text.
    pub text: String,
    /// Text markup dialect.
    pub parse_mode: ParseMode,
    /// Deliver without sound.
    pub disable_notification: bool,
    /// Do not render link previews.
    pub disable_web_page_preview: bool,
    /// Optional inline keyboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendMessage {
    /// Creates a Markdown message with link previews disabled.
    #[must_use]
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: ParseMode::Markdown,
            disable_notification: false,
            disable_web_page_preview: true,
            reply_markup: None,
        }
    }

    /// Sets whether the message is delivered silently.
    #[must_use]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.disable_notification = silent;
        self
    }

    /// Attaches an inline keyboard.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: Option<InlineKeyboardMarkup>) -> Self {
        self.reply_markup = keyboard;
        self
    }
}

/// Parameters of `editMessageText`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMessageText {
    /// Chat holding the message.
    pub chat_id: String,
    /// Identifier of the message to edit.
    pub message_id: i64,
    /// New text.
    pub text: String,
    /// Text markup dialect.
    pub parse_mode: ParseMode,
    /// Do not render link previews.
    pub disable_web_page_preview: bool,
    /// Replacement inline keyboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Parameters of `answerCallbackQuery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCallbackQuery {
    /// Identifier of the query being answered.
    pub callback_query_id: String,
    /// Notification text shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Parameters of `setWebhook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetWebhook {
    /// Public HTTPS URL receiving updates.
    pub url: String,
    /// Secret echoed in `X-Telegram-Bot-Api-Secret-Token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

/// Result of `getWebhookInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookInfo {
    /// Currently registered webhook URL, empty when none.
    #[serde(default)]
    pub url: String,
    /// Number of updates awaiting delivery.
    #[serde(default)]
    pub pending_update_count: i64,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Returns the first and last name joined by a space.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier.
    pub id: i64,
}

/// A message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier unique within the chat.
    pub message_id: i64,
    /// Chat the message belongs to.
    #[serde(default)]
    pub chat: Option<Chat>,
    /// Text of the message, without markup.
    #[serde(default)]
    pub text: Option<String>,
}

/// A callback query produced by pressing an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Query identifier.
    pub id: String,
    /// User that pressed the button.
    pub from: User,
    /// Message carrying the keyboard.
    #[serde(default)]
    pub message: Option<Message>,
    /// The button's `callback_data`.
    #[serde(default)]
    pub data: Option<String>,
}

/// An incoming update delivered to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// Update identifier.
    #[serde(default)]
    pub update_id: i64,
    /// Present when a keyboard button was pressed.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// Envelope of every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Payload on success.
    pub result: Option<T>,
    /// Error description on failure.
    #[serde(default)]
    pub description: Option<String>,
    /// Error code on failure.
    #[serde(default)]
    pub error_code: Option<i64>,
}

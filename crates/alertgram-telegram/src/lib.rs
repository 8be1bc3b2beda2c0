//! Telegram Bot API client for alertgram.
//!
//! This crate covers the chat side of the bridge:
//!
//! - [`BotApi`]: the bot operations the bridge relies on
//! - [`TelegramClient`]: HTTPS implementation with optional proxy support
//! - [`deliver`]: best-effort sending with a fixed retry schedule
//! - [`FakeBot`]: in-memory implementation used by tests
//!
//! # Example
//!
//! ```rust,no_run
//! use alertgram_telegram::{deliver, RetryPolicy, SendMessage, TelegramClient, TelegramConfig};
//!
//! # async fn run() -> alertgram_telegram::Result<()> {
//! let client = TelegramClient::new(TelegramConfig::new("123:token")?)?;
//! let message = SendMessage::new("-100200300", "*disk full* on db-1").silent(true);
//!
//! let report = deliver(&client, message, &RetryPolicy::default()).await;
//! println!("delivered: {}", report.delivered());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod delivery;
pub mod error;
pub mod fake;
pub mod types;

pub use client::{BotApi, DEFAULT_API_BASE, ProxyConfig, TelegramClient, TelegramConfig};
pub use delivery::{DeliveryReport, RetryPolicy, deliver};
pub use error::{Result, TelegramError};
pub use fake::FakeBot;
pub use types::{
    AnswerCallbackQuery, CallbackQuery, Chat, EditMessageText, InlineKeyboardButton,
    InlineKeyboardMarkup, Message, ParseMode, SendMessage, SetWebhook, Update, User, WebhookInfo,
};

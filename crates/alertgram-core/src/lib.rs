//! Notification decisions and chat callbacks for alertgram.
//!
//! This crate holds everything between an incoming alert and the chat:
//!
//! - [`Alert`] and friends: the alert platform's data model
//! - [`RuleSet`] / [`Inhibitor`]: YAML inhibition rules that silence alerts
//!   caused by another open alert
//! - [`MessageTemplate`]: handlebars rendering of the chat message
//! - [`Notifier`]: repeat handling, sound policy, keyboard and delivery
//! - [`CallbackHandler`]: applies inline button presses back to alerts
//!
//! The alert platform is reached through the [`AlertStore`] trait; the chat
//! through [`alertgram_telegram::BotApi`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use alertgram_core::{
//!     Alert, InMemoryAlertStore, MessageTemplate, Notifier, NotifyPolicy, TemplateSource,
//! };
//! use alertgram_telegram::FakeBot;
//!
//! # async fn run() -> alertgram_core::Result<()> {
//! let template = MessageTemplate::compile(&TemplateSource::Default)?;
//! let policy = NotifyPolicy::new("-100200300").with_dashboard_url("https://alerta.example.com");
//! let notifier = Notifier::new(
//!     policy,
//!     template,
//!     Arc::new(FakeBot::new()),
//!     Arc::new(InMemoryAlertStore::new()),
//! );
//!
//! let outcome = notifier.notify(&Alert::new("a1", "db-1", "DiskFull")).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod callback;
pub mod error;
pub mod inhibit;
pub mod notify;
pub mod store;
pub mod template;
pub mod types;

pub use callback::{
    ALERT_NOT_FOUND, CallbackConfig, CallbackData, CallbackHandler, Command, NO_CALLBACK_QUERY,
    ReplyStatus, WebhookReply,
};
pub use error::{AlertError, Result};
pub use inhibit::{InhibitRule, InhibitionReport, Inhibitor, RuleKind, RuleSet};
pub use notify::{
    Notifier, NotifyOutcome, NotifyPolicy, merge_raw_links, mute_payload, parse_severity_set,
};
pub use store::{AlertStore, InMemoryAlertStore, customer_visible};
pub use template::{MessageContext, MessageTemplate, TemplateSource};
pub use types::{Alert, AlertStatus, Blackout, HistoryEntry, StatusChange};

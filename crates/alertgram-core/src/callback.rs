//! Inbound chat callbacks.
//!
//! Pressing an inline keyboard button sends its `callback_data` back as
//! `"<command> <target>"`. The [`CallbackHandler`] applies the command to the
//! alert, appends a confirmation line to the chat message, answers the query
//! and writes an audit record. The alert change is never rolled back when the
//! chat side fails afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alertgram_audit::{AuditEvent, AuditLogger, RequestContext};
use alertgram_telegram::{
    AnswerCallbackQuery, BotApi, CallbackQuery, EditMessageText, InlineKeyboardButton,
    InlineKeyboardMarkup, ParseMode, Update,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{AlertError, Result};
use crate::store::AlertStore;
use crate::types::{Alert, AlertStatus, Blackout, StatusChange};

/// Reply when the alert referenced by a button no longer exists.
pub const ALERT_NOT_FOUND: &str = "alert not found for Telegram message";

/// Reply when an update carries no button press.
pub const NO_CALLBACK_QUERY: &str = "no callback_query in Telegram message";

/// A button command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Re-open the alert.
    Open,
    /// Acknowledge the alert.
    Ack,
    /// Set the status to closed.
    Closed,
    /// Close with a short timeout.
    Close,
    /// Start watching the alert.
    Watch,
    /// Stop watching the alert.
    Unwatch,
    /// Black out a resource/event pair.
    Blackout,
}

impl Command {
    /// Returns the command name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Ack => "ack",
            Self::Closed => "closed",
            Self::Close => "close",
            Self::Watch => "watch",
            Self::Unwatch => "unwatch",
            Self::Blackout => "blackout",
        }
    }

    /// The watch command that undoes this one.
    #[must_use]
    pub const fn toggled(&self) -> Option<Self> {
        match self {
            Self::Watch => Some(Self::Unwatch),
            Self::Unwatch => Some(Self::Watch),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('/') {
            "open" => Ok(Self::Open),
            "ack" => Ok(Self::Ack),
            "closed" => Ok(Self::Closed),
            "close" => Ok(Self::Close),
            "watch" => Ok(Self::Watch),
            "unwatch" => Ok(Self::Unwatch),
            "blackout" => Ok(Self::Blackout),
            other => Err(AlertError::InvalidCallback {
                reason: format!("unknown command '{other}'"),
            }),
        }
    }
}

/// A parsed button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    /// Command to apply.
    pub command: Command,
    /// Alert id, or `resource|event` for blackouts.
    pub target: String,
}

impl CallbackData {
    /// Parses `"<command> <target>"`; a leading `/` on the command is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidCallback` if the payload has no target or
    /// names an unknown command.
    pub fn parse(data: &str) -> Result<Self> {
        let (command, target) =
            data.trim()
                .split_once(' ')
                .ok_or_else(|| AlertError::InvalidCallback {
                    reason: format!("expected '<command> <alert id>', got '{data}'"),
                })?;

        let target = target.trim();
        if target.is_empty() {
            return Err(AlertError::InvalidCallback {
                reason: "missing target".to_string(),
            });
        }

        Ok(Self {
            command: command.parse()?,
            target: target.to_string(),
        })
    }

    /// Splits a blackout target into resource and event.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidCallback` if the target has no `|`.
    pub fn blackout_target(&self) -> Result<(&str, &str)> {
        self.target
            .split_once('|')
            .filter(|(resource, event)| !resource.is_empty() && !event.is_empty())
            .ok_or_else(|| AlertError::InvalidCallback {
                reason: format!("expected '<resource>|<event>', got '{}'", self.target),
            })
    }
}

/// Settings of the callback handler.
#[derive(Debug, Clone)]
pub struct CallbackConfig {
    /// Chat used when the callback does not say which chat it came from.
    pub chat_id: String,
    /// Dashboard base URL for links.
    pub dashboard_url: String,
    /// Customers the chat may act on; empty means all.
    pub customers: Vec<String>,
    /// Scopes recorded in audit records.
    pub scopes: Vec<String>,
    /// Environment of blackouts created from the chat.
    pub blackout_environment: String,
    /// Length of blackouts created from the chat.
    pub blackout_duration: Duration,
}

impl CallbackConfig {
    /// Creates a configuration with default blackout settings.
    #[must_use]
    pub fn new(chat_id: impl Into<String>, dashboard_url: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            dashboard_url: dashboard_url.into().trim_end_matches('/').to_string(),
            customers: Vec::new(),
            scopes: Vec::new(),
            blackout_environment: "Production".to_string(),
            blackout_duration: Duration::from_secs(3600),
        }
    }

    /// Restricts the chat to the given customers.
    #[must_use]
    pub fn with_customers(mut self, customers: Vec<String>) -> Self {
        self.customers = customers;
        self
    }

    /// Sets the scopes recorded in audit records.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the blackout environment and length.
    #[must_use]
    pub fn with_blackout(mut self, environment: impl Into<String>, duration: Duration) -> Self {
        self.blackout_environment = environment.into();
        self.blackout_duration = duration;
        self
    }
}

/// Outcome status reported back to the webhook caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// The update was handled.
    Ok,
    /// The update was rejected.
    Error,
}

/// Response body of the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookReply {
    /// Outcome.
    pub status: ReplyStatus,
    /// Explanation, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookReply {
    /// A successful reply.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            status: ReplyStatus::Ok,
            message: None,
        }
    }

    /// A successful reply with a note.
    #[must_use]
    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Ok,
            message: Some(message.into()),
        }
    }

    /// An error reply.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: Some(message.into()),
        }
    }
}

/// Status change applied for a command, if it changes status.
#[must_use]
pub fn status_change_for(command: Command) -> Option<StatusChange> {
    match command {
        Command::Close => {
            Some(StatusChange::new(AlertStatus::Closed, "Closed via Telegram").with_timeout(10))
        }
        Command::Open => Some(StatusChange::new(
            AlertStatus::Open,
            "status change via Telegram",
        )),
        Command::Ack => Some(StatusChange::new(
            AlertStatus::Ack,
            "status change via Telegram",
        )),
        Command::Closed => Some(StatusChange::new(
            AlertStatus::Closed,
            "status change via Telegram",
        )),
        Command::Watch | Command::Unwatch | Command::Blackout => None,
    }
}

/// Keyboard offered after a watch or unwatch.
#[must_use]
pub fn watch_keyboard(next: Command, alert_id: &str) -> InlineKeyboardMarkup {
    let label = {
        let name = next.as_str();
        let mut chars = name.chars();
        chars.next().map_or_else(String::new, |c| {
            c.to_uppercase().chain(chars).collect::<String>()
        })
    };

    InlineKeyboardMarkup::single_row(vec![
        InlineKeyboardButton::callback(label, format!("/{next} {alert_id}")),
        InlineKeyboardButton::callback("Ack", format!("/ack {alert_id}")),
        InlineKeyboardButton::callback("Close", format!("/closed {alert_id}")),
    ])
}

/// Applies chat button presses to alerts.
#[derive(Clone)]
pub struct CallbackHandler {
    config: CallbackConfig,
    store: Arc<dyn AlertStore>,
    bot: Arc<dyn BotApi>,
    audit: Arc<dyn AuditLogger>,
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("bot", &self.bot)
            .finish_non_exhaustive()
    }
}

impl CallbackHandler {
    /// Creates a handler.
    #[must_use]
    pub fn new(
        config: CallbackConfig,
        store: Arc<dyn AlertStore>,
        bot: Arc<dyn BotApi>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            config,
            store,
            bot,
            audit,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CallbackConfig {
        &self.config
    }

    /// Handles one webhook update.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert store fails while looking up or
    /// changing the alert. Chat failures after the change are only logged.
    pub async fn handle(&self, update: &Update, request: RequestContext) -> Result<WebhookReply> {
        let Some(query) = &update.callback_query else {
            debug!(update_id = update.update_id, "update without callback query");
            return Ok(WebhookReply::ok_with(NO_CALLBACK_QUERY));
        };

        let user = query.from.display_name();
        let data = match CallbackData::parse(query.data.as_deref().unwrap_or_default()) {
            Ok(data) => data,
            Err(e) => {
                warn!(user = %user, error = %e, "rejected callback");
                self.answer(query, None).await;
                return Ok(WebhookReply::error(e.to_string()));
            }
        };

        info!(user = %user, command = %data.command, target = %data.target, "callback received");

        if data.command == Command::Blackout {
            return self.blackout(query, &data, &user, request).await;
        }

        let Some(alert) = self
            .store
            .find_by_id(&data.target, &self.config.customers)
            .await?
        else {
            warn!(alert_id = %data.target, "callback for unknown alert");
            self.answer(query, Some(ALERT_NOT_FOUND)).await;
            return Ok(WebhookReply::error(ALERT_NOT_FOUND));
        };

        let status = self.apply(&alert, data.command, &user).await?;

        let line = confirmation(
            &alert,
            data.command,
            status,
            &user,
            &self.config.dashboard_url,
        );
        let keyboard = data
            .command
            .toggled()
            .map(|next| watch_keyboard(next, &alert.id));
        self.edit_reply(query, &line, keyboard).await;

        match AuditEvent::builder()
            .webhook_updated()
            .actor(user)
            .customers(self.config.customers.clone())
            .scopes(self.config.scopes.clone())
            .resource_id(alert.id.clone())
            .action(data.command.as_str())
            .request(request)
            .build()
        {
            Ok(event) => self.audit.log(&event),
            Err(e) => warn!(error = %e, "failed to build audit record"),
        }
        self.answer(query, None).await;

        Ok(WebhookReply::ok())
    }

    /// Applies a command to an alert and returns the resulting status.
    async fn apply(&self, alert: &Alert, command: Command, user: &str) -> Result<AlertStatus> {
        if let Some(change) = status_change_for(command) {
            self.store.set_status(&alert.id, &change).await?;
            return Ok(change.status);
        }

        let tag = format!("{command}:{user}");
        self.store.untag(&alert.id, &[tag]).await?;

        let blackout = Blackout::new(
            self.config.blackout_environment.clone(),
            alert.resource.clone(),
            alert.event.clone(),
            self.config.blackout_duration,
        )?
        .with_text(format!("{command} via Telegram by {user}"));
        let blackout_id = self.store.create_blackout(&blackout).await?;
        debug!(alert_id = %alert.id, %blackout_id, "blackout created for watch toggle");

        Ok(alert.status)
    }

    async fn blackout(
        &self,
        query: &CallbackQuery,
        data: &CallbackData,
        user: &str,
        request: RequestContext,
    ) -> Result<WebhookReply> {
        let (resource, event) = match data.blackout_target() {
            Ok(target) => target,
            Err(e) => {
                self.answer(query, None).await;
                return Ok(WebhookReply::error(e.to_string()));
            }
        };

        let blackout = Blackout::new(
            self.config.blackout_environment.clone(),
            resource,
            event,
            self.config.blackout_duration,
        )?
        .with_text(format!("muted via Telegram by {user}"));
        let blackout_id = self.store.create_blackout(&blackout).await?;

        let minutes = self.config.blackout_duration.as_secs() / 60;
        let line = format!("User `{user}` muted *{resource}* {event} for {minutes} min");
        self.edit_reply(query, &line, None).await;

        match AuditEvent::builder()
            .blackout_created()
            .actor(user)
            .customers(self.config.customers.clone())
            .blackout(
                blackout.environment.clone(),
                resource,
                event,
                self.config.blackout_duration.as_secs(),
            )
            .metadata("blackout_id", serde_json::Value::String(blackout_id))
            .request(request)
            .build()
        {
            Ok(event) => self.audit.log(&event),
            Err(e) => warn!(error = %e, "failed to build audit record"),
        }
        self.answer(query, Some("Muted")).await;

        Ok(WebhookReply::ok())
    }

    /// Appends `line` to the original message. Failures are logged.
    async fn edit_reply(
        &self,
        query: &CallbackQuery,
        line: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) {
        let Some(message) = &query.message else {
            warn!(query_id = %query.id, "callback without message, reply not edited");
            return;
        };

        let chat_id = message
            .chat
            .as_ref()
            .map_or_else(|| self.config.chat_id.clone(), |c| c.id.to_string());
        let original = message.text.as_deref().unwrap_or_default();

        let request = EditMessageText {
            chat_id,
            message_id: message.message_id,
            text: format!("{original}\n\n{line}"),
            parse_mode: ParseMode::Markdown,
            disable_web_page_preview: true,
            reply_markup: keyboard,
        };

        if let Err(e) = self.bot.edit_message_text(&request).await {
            warn!(message_id = message.message_id, error = %e, "failed to edit telegram reply");
        }
    }

    async fn answer(&self, query: &CallbackQuery, text: Option<&str>) {
        let request = AnswerCallbackQuery {
            callback_query_id: query.id.clone(),
            text: text.map(str::to_string),
        };
        if let Err(e) = self.bot.answer_callback_query(&request).await {
            debug!(query_id = %query.id, error = %e, "failed to answer callback query");
        }
    }
}

/// Confirmation line appended to the chat message.
#[must_use]
pub fn confirmation(
    alert: &Alert,
    command: Command,
    status: AlertStatus,
    user: &str,
    dashboard_url: &str,
) -> String {
    let link = format!("[{}]({dashboard_url}/#/alert/{})", alert.short_id(), alert.id);
    match command {
        Command::Watch | Command::Unwatch => {
            format!("User `{user}` is _{command}ing_ alert {link}")
        }
        _ => format!("User `{user}` moved alert {link} to *{status}* (`/{command}`)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAlertStore;
    use alertgram_audit::MemoryAuditLogger;
    use alertgram_telegram::{Chat, FakeBot, Message, User};
    use test_case::test_case;

    const ALERT_ID: &str = "6d1a8e3c-51a9-4d6b-9a64-58e0f2e6a0d4";

    struct Harness {
        handler: CallbackHandler,
        store: InMemoryAlertStore,
        bot: Arc<FakeBot>,
        audit: Arc<MemoryAuditLogger>,
    }

    fn harness(config: CallbackConfig) -> Harness {
        let store = InMemoryAlertStore::new();
        let mut alert = Alert::new(ALERT_ID, "db-1", "DiskFull");
        alert.tags = vec!["watch:Ada Lovelace".to_string()];
        alert.customer = Some("acme".to_string());
        store.insert(alert);

        let bot = Arc::new(FakeBot::new());
        let audit = Arc::new(MemoryAuditLogger::new());
        let handler = CallbackHandler::new(
            config,
            Arc::new(store.clone()),
            bot.clone(),
            audit.clone(),
        );
        Harness {
            handler,
            store,
            bot,
            audit,
        }
    }

    fn default_harness() -> Harness {
        harness(CallbackConfig::new("-100", "https://alerta.example.com"))
    }

    fn update(data: &str) -> Update {
        Update {
            update_id: 1,
            callback_query: Some(CallbackQuery {
                id: "q1".to_string(),
                from: User {
                    id: 7,
                    is_bot: false,
                    first_name: "Ada".to_string(),
                    last_name: Some("Lovelace".to_string()),
                    username: None,
                },
                message: Some(Message {
                    message_id: 55,
                    chat: Some(Chat { id: -100 }),
                    text: Some("disk full on db-1".to_string()),
                }),
                data: Some(data.to_string()),
            }),
        }
    }

    fn request() -> RequestContext {
        RequestContext::new("/api/webhooks/telegram")
    }

    mod parse_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("/ack abc", Command::Ack, "abc")]
        #[test_case("ack abc", Command::Ack, "abc")]
        #[test_case("/close abc", Command::Close, "abc")]
        #[test_case("/closed abc", Command::Closed, "abc")]
        #[test_case("/open abc", Command::Open, "abc")]
        #[test_case("/watch abc", Command::Watch, "abc")]
        #[test_case("/unwatch abc", Command::Unwatch, "abc")]
        #[test_case("/blackout db-1|Disk Full", Command::Blackout, "db-1|Disk Full")]
        fn parses(data: &str, command: Command, target: &str) {
            let parsed = CallbackData::parse(data).unwrap();
            assert_eq!(parsed.command, command);
            assert_eq!(parsed.target, target);
        }

        #[test_case("/ack" ; "no target")]
        #[test_case("/ack   " ; "blank target")]
        #[test_case("/reboot abc" ; "unknown command")]
        #[test_case("" ; "empty")]
        fn rejects(data: &str) {
            assert!(matches!(
                CallbackData::parse(data),
                Err(AlertError::InvalidCallback { .. })
            ));
        }

        #[test]
        fn blackout_target_splits() {
            let data = CallbackData::parse("/blackout db-1|DiskFull").unwrap();
            assert_eq!(data.blackout_target().unwrap(), ("db-1", "DiskFull"));

            let bad = CallbackData::parse("/blackout db-1").unwrap();
            assert!(bad.blackout_target().is_err());
        }

        #[test]
        fn toggles() {
            assert_eq!(Command::Watch.toggled(), Some(Command::Unwatch));
            assert_eq!(Command::Unwatch.toggled(), Some(Command::Watch));
            assert_eq!(Command::Ack.toggled(), None);
        }
    }

    mod mapping_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn close_uses_timeout() {
            let change = status_change_for(Command::Close).unwrap();
            assert_eq!(change.status, AlertStatus::Closed);
            assert_eq!(change.timeout, Some(10));
            assert_eq!(change.text, "Closed via Telegram");
        }

        #[test_case(Command::Open, AlertStatus::Open)]
        #[test_case(Command::Ack, AlertStatus::Ack)]
        #[test_case(Command::Closed, AlertStatus::Closed)]
        fn literal_status(command: Command, status: AlertStatus) {
            let change = status_change_for(command).unwrap();
            assert_eq!(change.status, status);
            assert_eq!(change.timeout, None);
            assert_eq!(change.text, "status change via Telegram");
        }

        #[test]
        fn watch_changes_no_status() {
            assert!(status_change_for(Command::Watch).is_none());
            assert!(status_change_for(Command::Unwatch).is_none());
        }

        #[test]
        fn watch_keyboard_layout() {
            let keyboard = watch_keyboard(Command::Unwatch, "abc");
            let buttons: Vec<_> = keyboard.buttons().collect();

            assert_eq!(buttons[0].text, "Unwatch");
            assert_eq!(buttons[0].callback_data.as_deref(), Some("/unwatch abc"));
            assert_eq!(buttons[1].callback_data.as_deref(), Some("/ack abc"));
            assert_eq!(buttons[2].callback_data.as_deref(), Some("/closed abc"));
        }

        #[test]
        fn confirmation_lines() {
            let alert = Alert::new(ALERT_ID, "db-1", "DiskFull");
            let line = confirmation(&alert, Command::Ack, AlertStatus::Ack, "Ada", "https://a");
            assert_eq!(
                line,
                format!(
                    "User `Ada` moved alert [6d1a8e3c](https://a/#/alert/{ALERT_ID}) to *ack* (`/ack`)"
                )
            );

            let close = confirmation(&alert, Command::Close, AlertStatus::Closed, "Ada", "https://a");
            let closed =
                confirmation(&alert, Command::Closed, AlertStatus::Closed, "Ada", "https://a");
            assert!(close.ends_with("to *closed* (`/close`)"));
            assert!(closed.ends_with("to *closed* (`/closed`)"));

            let line = confirmation(&alert, Command::Watch, AlertStatus::Open, "Ada", "https://a");
            assert!(line.starts_with("User `Ada` is _watching_ alert [6d1a8e3c]"));
        }
    }

    mod handle_tests {
        use super::*;

        #[tokio::test]
        async fn close_sets_status_and_edits_message() {
            let h = default_harness();

            let reply = h
                .handler
                .handle(&update(&format!("/close {ALERT_ID}")), request())
                .await
                .unwrap();
            assert_eq!(reply, WebhookReply::ok());

            let alert = h.store.get(ALERT_ID).unwrap();
            assert_eq!(alert.status, AlertStatus::Closed);
            assert_eq!(alert.timeout, Some(10));

            let edited = h.bot.edited();
            assert_eq!(edited.len(), 1);
            assert_eq!(edited[0].message_id, 55);
            assert_eq!(edited[0].chat_id, "-100");
            assert!(edited[0].text.starts_with("disk full on db-1\n\nUser `Ada Lovelace`"));
            assert!(edited[0].text.contains("to *closed*"));
            assert!(edited[0].reply_markup.is_none());

            let events = h.audit.events();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_type(), "webhook-updated");
            assert_eq!(events[0].actor(), "Ada Lovelace");

            assert_eq!(h.bot.answered().len(), 1);
        }

        #[tokio::test]
        async fn unknown_alert_is_error_without_mutation() {
            let h = default_harness();

            let reply = h
                .handler
                .handle(&update("/ack does-not-exist"), request())
                .await
                .unwrap();

            assert_eq!(reply, WebhookReply::error(ALERT_NOT_FOUND));
            assert_eq!(h.store.get(ALERT_ID).unwrap().status, AlertStatus::Open);
            assert!(h.bot.edited().is_empty());
            assert!(h.audit.events().is_empty());
        }

        #[tokio::test]
        async fn customer_scope_hides_alert() {
            let h = harness(
                CallbackConfig::new("-100", "https://a").with_customers(vec!["globex".to_string()]),
            );

            let reply = h
                .handler
                .handle(&update(&format!("/ack {ALERT_ID}")), request())
                .await
                .unwrap();

            assert_eq!(reply.status, ReplyStatus::Error);
            assert_eq!(h.store.get(ALERT_ID).unwrap().status, AlertStatus::Open);
        }

        #[tokio::test]
        async fn watch_untags_and_creates_blackout() {
            let h = default_harness();

            h.handler
                .handle(&update(&format!("/watch {ALERT_ID}")), request())
                .await
                .unwrap();

            assert!(h.store.get(ALERT_ID).unwrap().tags.is_empty());

            let blackouts = h.store.blackouts();
            assert_eq!(blackouts.len(), 1);
            assert_eq!(blackouts[0].environment, "Production");
            assert_eq!(blackouts[0].resource, "db-1");
            assert_eq!(blackouts[0].event, "DiskFull");

            let edited = h.bot.edited();
            assert!(edited[0].text.contains("_watching_"));
            let keyboard = edited[0].reply_markup.as_ref().unwrap();
            assert_eq!(keyboard.buttons().next().unwrap().text, "Unwatch");
        }

        #[tokio::test]
        async fn mute_button_creates_blackout_directly() {
            let h = default_harness();

            let reply = h
                .handler
                .handle(&update("/blackout web-9|HttpError"), request())
                .await
                .unwrap();

            assert_eq!(reply, WebhookReply::ok());
            let blackouts = h.store.blackouts();
            assert_eq!(blackouts[0].resource, "web-9");
            assert_eq!(blackouts[0].event, "HttpError");
            assert_eq!(blackouts[0].duration, Duration::from_secs(3600));
            assert_eq!(h.audit.events()[0].event_type(), "blackout-created");
            assert!(h.bot.edited()[0].text.contains("muted *web-9*"));
        }

        #[tokio::test]
        async fn edit_failure_keeps_mutation() {
            let h = default_harness();
            h.bot.fail_edits(true);

            let reply = h
                .handler
                .handle(&update(&format!("/ack {ALERT_ID}")), request())
                .await
                .unwrap();

            assert_eq!(reply, WebhookReply::ok());
            assert_eq!(h.store.get(ALERT_ID).unwrap().status, AlertStatus::Ack);
            assert_eq!(h.audit.events().len(), 1);
        }

        #[tokio::test]
        async fn update_without_callback_is_ok() {
            let h = default_harness();
            let reply = h
                .handler
                .handle(
                    &Update {
                        update_id: 3,
                        callback_query: None,
                    },
                    request(),
                )
                .await
                .unwrap();

            assert_eq!(reply, WebhookReply::ok_with(NO_CALLBACK_QUERY));
        }

        #[tokio::test]
        async fn malformed_data_is_error() {
            let h = default_harness();
            let reply = h.handler.handle(&update("/ack"), request()).await.unwrap();

            assert_eq!(reply.status, ReplyStatus::Error);
            assert!(h.audit.events().is_empty());
        }

        #[test]
        fn reply_serialization() {
            let json = serde_json::to_value(WebhookReply::ok()).unwrap();
            assert_eq!(json, serde_json::json!({"status": "ok"}));

            let json = serde_json::to_value(WebhookReply::error(ALERT_NOT_FOUND)).unwrap();
            assert_eq!(json["status"], "error");
            assert_eq!(json["message"], ALERT_NOT_FOUND);
        }
    }
}

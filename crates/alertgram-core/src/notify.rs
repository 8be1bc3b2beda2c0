//! Outbound notifications.
//!
//! The [`Notifier`] turns one alert event into at most one chat message:
//!
//! 1. Repeats are dropped, except for alerts from the timeout-only group that
//!    previously expired and for escalations out of the baseline severity.
//! 2. The message text is rendered from the template.
//! 3. Open alerts get an inline keyboard when chat callbacks are enabled.
//! 4. The message is silent unless a sound severity is involved, and is
//!    forced silent when an inhibition rule matches.
//! 5. Delivery is retried; exhaustion is reported, never raised.

use std::path::PathBuf;
use std::sync::Arc;

use alertgram_telegram::{
    BotApi, InlineKeyboardButton, InlineKeyboardMarkup, RetryPolicy, SendMessage, deliver,
};
use chrono::Duration;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::inhibit::{InhibitionReport, Inhibitor, RuleSet};
use crate::store::AlertStore;
use crate::template::{MessageContext, MessageTemplate};
use crate::types::{Alert, AlertStatus};

/// Raw payload keys copied into the attributes for templates.
pub const RAW_LINK_KEYS: [&str; 2] = ["ruleUrl", "incident_url"];

/// Parses a comma-separated severity list into normalized names.
#[must_use]
pub fn parse_severity_set(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Callback payload of the Mute button, if it fits the transport limit.
#[must_use]
pub fn mute_payload(resource: &str, event: &str) -> Option<String> {
    let payload = format!("/blackout {resource}|{event}");
    (payload.len() < InlineKeyboardButton::MAX_CALLBACK_DATA).then_some(payload)
}

/// Copies link fields found in the raw payload into the attributes.
///
/// A missing or unparseable payload leaves the alert unchanged.
pub fn merge_raw_links(alert: &mut Alert) {
    let Some(raw) = alert.raw_data.as_deref() else {
        return;
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => {
            for key in RAW_LINK_KEYS {
                if let Some(value) = map.get(key) {
                    alert.attributes.insert(key.to_string(), value.clone());
                }
            }
        }
        Ok(_) => debug!(alert_id = %alert.id, "raw payload is not an object"),
        Err(e) => debug!(alert_id = %alert.id, error = %e, "raw payload is not JSON"),
    }
}

/// Settings of the outbound notifier.
#[derive(Debug, Clone)]
pub struct NotifyPolicy {
    /// Target chat.
    pub chat_id: String,
    /// Severities that make a notification audible.
    pub sound_severities: Vec<String>,
    /// Lowest severity tier; escalating out of it is never a repeat.
    pub baseline_severity: String,
    /// Group whose alerts only clear by timing out.
    pub timeout_only_group: String,
    /// Shift applied to times shown in messages.
    pub time_offset: Duration,
    /// Dashboard base URL for links.
    pub dashboard_url: String,
    /// Whether chat callbacks are wired up, enabling inline keyboards.
    pub interactive: bool,
    /// Inhibition rule file, re-read for every event.
    pub rules_path: Option<PathBuf>,
    /// Delivery retry schedule.
    pub retry: RetryPolicy,
}

impl NotifyPolicy {
    /// Creates a policy for `chat_id` with default settings.
    #[must_use]
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            sound_severities: Vec::new(),
            baseline_severity: "warning".to_string(),
            timeout_only_group: "elastalert".to_string(),
            time_offset: Duration::hours(3),
            dashboard_url: String::new(),
            interactive: false,
            rules_path: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the sound severities.
    #[must_use]
    pub fn with_sound_severities(mut self, severities: Vec<String>) -> Self {
        self.sound_severities = severities;
        self
    }

    /// Sets the baseline severity.
    #[must_use]
    pub fn with_baseline_severity(mut self, severity: impl Into<String>) -> Self {
        self.baseline_severity = severity.into();
        self
    }

    /// Sets the timeout-only group.
    #[must_use]
    pub fn with_timeout_only_group(mut self, group: impl Into<String>) -> Self {
        self.timeout_only_group = group.into();
        self
    }

    /// Sets the display time offset.
    #[must_use]
    pub const fn with_time_offset(mut self, offset: Duration) -> Self {
        self.time_offset = offset;
        self
    }

    /// Sets the dashboard base URL.
    #[must_use]
    pub fn with_dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.dashboard_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enables or disables inline keyboards.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Sets the inhibition rule file.
    #[must_use]
    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    /// Sets the delivery retry schedule.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn is_sound(&self, severity: &str) -> bool {
        self.sound_severities.iter().any(|s| s == severity)
    }
}

/// What happened to an alert event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
    /// The event repeats a known state; nothing was sent.
    SkippedRepeat,
    /// The message was delivered.
    Delivered {
        /// Chat message identifier.
        message_id: i64,
        /// Send attempts used.
        attempts: u32,
        /// Whether the message was sent without sound.
        silent: bool,
        /// Inhibition rules that matched.
        inhibited_by: Vec<String>,
    },
    /// Every attempt failed.
    Failed {
        /// Send attempts used.
        attempts: u32,
        /// Whether the message would have been silent.
        silent: bool,
        /// Last failure.
        error: Option<String>,
    },
}

/// Sends alert notifications to the chat.
#[derive(Debug)]
pub struct Notifier {
    policy: NotifyPolicy,
    template: MessageTemplate,
    bot: Arc<dyn BotApi>,
    inhibitor: Inhibitor,
}

impl Notifier {
    /// Creates a notifier.
    #[must_use]
    pub fn new(
        policy: NotifyPolicy,
        template: MessageTemplate,
        bot: Arc<dyn BotApi>,
        store: Arc<dyn AlertStore>,
    ) -> Self {
        Self {
            policy,
            template,
            bot,
            inhibitor: Inhibitor::new(store),
        }
    }

    /// Returns the policy.
    #[must_use]
    pub const fn policy(&self) -> &NotifyPolicy {
        &self.policy
    }

    /// Returns the repeat flag after applying the two overrides.
    #[must_use]
    pub fn effective_repeat(&self, alert: &Alert) -> bool {
        if !alert.repeat {
            return false;
        }
        let Some(previous) = alert.previous() else {
            return true;
        };

        let timed_out = alert.group == self.policy.timeout_only_group
            && previous.status == Some(AlertStatus::Expired);
        let escalated = self.policy.is_sound(&alert.severity)
            && previous.severity.as_deref() == Some(self.policy.baseline_severity.as_str());

        if timed_out || escalated {
            debug!(alert_id = %alert.id, timed_out, escalated, "repeat overridden");
            return false;
        }
        true
    }

    /// Renders the message text, falling back to a fixed text on failure.
    #[must_use]
    pub fn render_text(&self, alert: &Alert) -> String {
        let mut alert = alert.clone();
        merge_raw_links(&mut alert);
        let context = MessageContext::new(&alert, self.policy.time_offset);
        self.template.render_or_fallback(&context)
    }

    /// Builds the inline keyboard for an open alert.
    #[must_use]
    pub fn keyboard(&self, alert: &Alert) -> Option<InlineKeyboardMarkup> {
        if !self.policy.interactive || alert.status != AlertStatus::Open {
            return None;
        }

        let mut row = vec![
            InlineKeyboardButton::url(
                "📄 Details",
                format!("{}/alert/{}", self.policy.dashboard_url, alert.id),
            ),
            InlineKeyboardButton::callback("⛑ Ack", format!("/ack {}", alert.id)),
        ];
        if let Some(payload) = mute_payload(&alert.resource, &alert.event) {
            row.push(InlineKeyboardButton::callback("🔇 Mute", payload));
        }
        if alert.group == self.policy.timeout_only_group {
            row.push(InlineKeyboardButton::callback(
                "❌ Close",
                format!("/close {}", alert.id),
            ));
        }

        Some(InlineKeyboardMarkup::single_row(row))
    }

    /// Returns true if the alert should be delivered without sound, before
    /// inhibition.
    #[must_use]
    pub fn silent_by_severity(&self, alert: &Alert) -> bool {
        if self.policy.sound_severities.is_empty() {
            return false;
        }
        let audible = self.policy.is_sound(&alert.severity)
            || alert
                .history
                .iter()
                .filter_map(|h| h.severity.as_deref())
                .any(|s| self.policy.is_sound(s));
        !audible
    }

    /// Loads the inhibition rules, empty when no rule file is configured.
    #[must_use]
    pub fn load_rules(&self) -> RuleSet {
        self.policy
            .rules_path
            .as_deref()
            .map(RuleSet::load_or_empty)
            .unwrap_or_default()
    }

    /// Evaluates the inhibition rules for an alert.
    pub async fn inhibition(&self, alert: &Alert) -> InhibitionReport {
        let rules = self.load_rules();
        self.inhibitor.evaluate(alert, &rules).await
    }

    /// Handles one alert event.
    pub async fn notify(&self, alert: &Alert) -> NotifyOutcome {
        if self.effective_repeat(alert) {
            debug!(alert_id = %alert.id, "repeat alert, not notifying");
            return NotifyOutcome::SkippedRepeat;
        }

        let text = self.render_text(alert);
        let keyboard = self.keyboard(alert);

        let report = self.inhibition(alert).await;
        if report.rules_errored > 0 {
            warn!(
                alert_id = %alert.id,
                rules_errored = report.rules_errored,
                errors = ?report.errors,
                "some inhibition rules failed"
            );
        }
        let silent = self.silent_by_severity(alert) || report.suppressed();

        debug!(
            alert_id = %alert.id,
            severity = %alert.severity,
            silent,
            inhibited_by = ?report.matched,
            has_keyboard = keyboard.is_some(),
            "sending alert notification"
        );

        let request = SendMessage::new(self.policy.chat_id.clone(), text)
            .silent(silent)
            .with_keyboard(keyboard);
        let delivery = deliver(self.bot.as_ref(), request, &self.policy.retry).await;

        match delivery.message_id {
            Some(message_id) => {
                info!(alert_id = %alert.id, message_id, silent, "alert notification delivered");
                NotifyOutcome::Delivered {
                    message_id,
                    attempts: delivery.attempts,
                    silent,
                    inhibited_by: report.matched,
                }
            }
            None => NotifyOutcome::Failed {
                attempts: delivery.attempts,
                silent,
                error: delivery.last_error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAlertStore;
    use crate::template::{FALLBACK_TEXT, TemplateSource};
    use crate::types::HistoryEntry;
    use alertgram_telegram::FakeBot;
    use proptest::prelude::*;
    use std::io::Write;
    use test_case::test_case;

    const ALERT_ID: &str = "6d1a8e3c-51a9-4d6b-9a64-58e0f2e6a0d4";

    fn policy() -> NotifyPolicy {
        NotifyPolicy::new("-100200300")
            .with_sound_severities(parse_severity_set("critical, major"))
            .with_dashboard_url("https://alerta.example.com/")
            .with_interactive(true)
            .with_retry(RetryPolicy::immediate(10))
    }

    fn notifier_with(
        policy: NotifyPolicy,
        source: &TemplateSource,
    ) -> (Notifier, Arc<FakeBot>, InMemoryAlertStore) {
        let bot = Arc::new(FakeBot::new());
        let store = InMemoryAlertStore::new();
        let notifier = Notifier::new(
            policy,
            MessageTemplate::compile(source).unwrap(),
            bot.clone(),
            Arc::new(store.clone()),
        );
        (notifier, bot, store)
    }

    fn notifier() -> (Notifier, Arc<FakeBot>, InMemoryAlertStore) {
        notifier_with(policy(), &TemplateSource::Default)
    }

    fn alert(severity: &str) -> Alert {
        let mut alert = Alert::new(ALERT_ID, "db-1", "DiskFull");
        alert.environment = "Production".to_string();
        alert.severity = severity.to_string();
        alert.group = "System".to_string();
        alert.text = "95% used".to_string();
        alert
    }

    fn history(severity: &str, status: AlertStatus) -> HistoryEntry {
        HistoryEntry {
            severity: Some(severity.to_string()),
            status: Some(status),
            ..HistoryEntry::default()
        }
    }

    mod helper_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("critical,major", &["critical", "major"])]
        #[test_case(" Critical , ,major ", &["critical", "major"])]
        #[test_case("", &[])]
        fn severity_set(raw: &str, expected: &[&str]) {
            assert_eq!(parse_severity_set(raw), expected);
        }

        #[test]
        fn merge_raw_links_copies_known_keys() {
            let mut alert = alert("major");
            alert.raw_data = Some(
                r#"{"ruleUrl": "http://grafana/r/1", "incident_url": "http://pd/1", "other": 1}"#
                    .to_string(),
            );
            merge_raw_links(&mut alert);

            assert_eq!(alert.attributes["ruleUrl"], "http://grafana/r/1");
            assert_eq!(alert.attributes["incident_url"], "http://pd/1");
            assert!(!alert.attributes.contains_key("other"));
        }

        #[test_case(None)]
        #[test_case(Some("not json"))]
        #[test_case(Some("[1, 2]"))]
        fn merge_raw_links_ignores_bad_payload(raw: Option<&str>) {
            let mut alert = alert("major");
            alert.raw_data = raw.map(str::to_string);
            merge_raw_links(&mut alert);
            assert!(alert.attributes.is_empty());
        }
    }

    mod mute_tests {
        use super::*;

        #[test]
        fn short_payload_is_kept() {
            assert_eq!(
                mute_payload("db-1", "DiskFull").as_deref(),
                Some("/blackout db-1|DiskFull")
            );
        }

        #[test]
        fn boundary_at_64_bytes() {
            // "/blackout " + "|" is 11 bytes.
            let event_63 = "e".repeat(63 - 11 - 1);
            assert!(mute_payload("r", &event_63).is_some());

            let event_64 = "e".repeat(64 - 11 - 1);
            assert!(mute_payload("r", &event_64).is_none());
        }

        proptest! {
            #[test]
            fn payload_always_fits(resource in "[a-z0-9-]{0,60}", event in "[A-Za-z_]{0,60}") {
                let full_len = format!("/blackout {resource}|{event}").len();
                match mute_payload(&resource, &event) {
                    Some(payload) => {
                        prop_assert!(payload.len() < 64);
                        prop_assert_eq!(payload.len(), full_len);
                    }
                    None => prop_assert!(full_len >= 64),
                }
            }
        }
    }

    mod repeat_tests {
        use super::*;

        #[test]
        fn non_repeat_passes() {
            let (notifier, _, _) = notifier();
            assert!(!notifier.effective_repeat(&alert("major")));
        }

        #[test]
        fn repeat_without_history_stays_repeat() {
            let (notifier, _, _) = notifier();
            let mut a = alert("major");
            a.repeat = true;
            assert!(notifier.effective_repeat(&a));
        }

        #[test]
        fn timeout_only_group_after_expiry_is_not_repeat() {
            let (notifier, _, _) = notifier();
            let mut a = alert("minor");
            a.repeat = true;
            a.group = "elastalert".to_string();
            a.history = vec![history("minor", AlertStatus::Expired)];
            assert!(!notifier.effective_repeat(&a));
        }

        #[test]
        fn expiry_in_other_group_stays_repeat() {
            let (notifier, _, _) = notifier();
            let mut a = alert("minor");
            a.repeat = true;
            a.history = vec![history("minor", AlertStatus::Expired)];
            assert!(notifier.effective_repeat(&a));
        }

        #[test]
        fn escalation_from_baseline_is_not_repeat() {
            let (notifier, _, _) = notifier();
            let mut a = alert("critical");
            a.repeat = true;
            a.history = vec![
                history("warning", AlertStatus::Open),
                history("critical", AlertStatus::Open),
            ];
            assert!(!notifier.effective_repeat(&a));
        }

        #[test]
        fn only_most_recent_history_counts() {
            let (notifier, _, _) = notifier();
            let mut a = alert("critical");
            a.repeat = true;
            a.history = vec![
                history("major", AlertStatus::Open),
                history("warning", AlertStatus::Open),
            ];
            assert!(notifier.effective_repeat(&a));
        }

        #[test]
        fn escalation_needs_sound_severity() {
            let (notifier, _, _) =
                notifier_with(policy().with_sound_severities(Vec::new()), &TemplateSource::Default);
            let mut a = alert("critical");
            a.repeat = true;
            a.history = vec![history("warning", AlertStatus::Open)];
            assert!(notifier.effective_repeat(&a));
        }

        #[tokio::test]
        async fn repeat_sends_nothing() {
            let (notifier, bot, _) = notifier();
            let mut a = alert("major");
            a.repeat = true;
            a.history = vec![history("major", AlertStatus::Open)];

            assert_eq!(notifier.notify(&a).await, NotifyOutcome::SkippedRepeat);
            assert_eq!(bot.send_attempts(), 0);
        }
    }

    mod keyboard_tests {
        use super::*;

        fn labels(keyboard: &InlineKeyboardMarkup) -> Vec<&str> {
            keyboard.buttons().map(|b| b.text.as_str()).collect()
        }

        #[test]
        fn open_alert_gets_details_ack_mute() {
            let (notifier, _, _) = notifier();
            let keyboard = notifier.keyboard(&alert("major")).unwrap();

            assert_eq!(labels(&keyboard), vec!["📄 Details", "⛑ Ack", "🔇 Mute"]);
            let buttons: Vec<_> = keyboard.buttons().collect();
            assert_eq!(
                buttons[0].url.as_deref(),
                Some(format!("https://alerta.example.com/alert/{ALERT_ID}").as_str())
            );
            assert_eq!(
                buttons[1].callback_data.as_deref(),
                Some(format!("/ack {ALERT_ID}").as_str())
            );
            assert_eq!(
                buttons[2].callback_data.as_deref(),
                Some("/blackout db-1|DiskFull")
            );
        }

        #[test]
        fn timeout_only_group_gets_close() {
            let (notifier, _, _) = notifier();
            let mut a = alert("major");
            a.group = "elastalert".to_string();

            let keyboard = notifier.keyboard(&a).unwrap();
            assert_eq!(labels(&keyboard).last(), Some(&"❌ Close"));
        }

        #[test]
        fn long_mute_payload_is_omitted() {
            let (notifier, _, _) = notifier();
            let mut a = alert("major");
            a.event = "E".repeat(60);

            let keyboard = notifier.keyboard(&a).unwrap();
            assert_eq!(labels(&keyboard), vec!["📄 Details", "⛑ Ack"]);
        }

        #[test]
        fn closed_alert_has_no_keyboard() {
            let (notifier, _, _) = notifier();
            let mut a = alert("major");
            a.status = AlertStatus::Closed;
            assert!(notifier.keyboard(&a).is_none());
        }

        #[test]
        fn no_keyboard_without_callbacks() {
            let (notifier, _, _) =
                notifier_with(policy().with_interactive(false), &TemplateSource::Default);
            assert!(notifier.keyboard(&alert("major")).is_none());
        }
    }

    mod silence_tests {
        use super::*;
        use test_case::test_case;

        #[test_case("critical", &[], false ; "sound severity")]
        #[test_case("minor", &[], true ; "quiet severity")]
        #[test_case("minor", &["major"], false ; "sound severity in history")]
        #[test_case("minor", &["warning", "normal"], true ; "quiet history")]
        fn silent_by_severity(severity: &str, past: &[&str], expected: bool) {
            let (notifier, _, _) = notifier();
            let mut a = alert(severity);
            a.history = past.iter().map(|s| history(s, AlertStatus::Open)).collect();
            assert_eq!(notifier.silent_by_severity(&a), expected);
        }

        #[test]
        fn empty_sound_set_is_never_silent() {
            let (notifier, _, _) =
                notifier_with(policy().with_sound_severities(Vec::new()), &TemplateSource::Default);
            assert!(!notifier.silent_by_severity(&alert("minor")));
        }
    }

    mod notify_tests {
        use super::*;

        fn rules_file(yaml: &str) -> tempfile::NamedTempFile {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(yaml.as_bytes()).unwrap();
            file
        }

        #[tokio::test]
        async fn delivers_audible_message_with_keyboard() {
            let (notifier, bot, _) = notifier();

            let outcome = notifier.notify(&alert("critical")).await;
            assert_eq!(
                outcome,
                NotifyOutcome::Delivered {
                    message_id: 1,
                    attempts: 1,
                    silent: false,
                    inhibited_by: Vec::new(),
                }
            );

            let sent = bot.sent();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].chat_id, "-100200300");
            assert!(sent[0].text.contains("*[Open] Production Critical*"));
            assert!(sent[0].disable_web_page_preview);
            assert!(sent[0].reply_markup.is_some());
        }

        #[tokio::test]
        async fn dependent_rule_delivers_silently() {
            let rules = rules_file(
                r#"
node-down:
  dependent: true
  link_field: resource
  find_field: event
  find_regexp: "NodeDown"
"#,
            );
            let (notifier, bot, store) =
                notifier_with(policy().with_rules_path(rules.path()), &TemplateSource::Default);
            let mut node = alert("critical");
            node.id = "other".to_string();
            node.event = "NodeDown".to_string();
            store.insert(node);

            let outcome = notifier.notify(&alert("critical")).await;

            match outcome {
                NotifyOutcome::Delivered {
                    silent,
                    inhibited_by,
                    ..
                } => {
                    assert!(silent);
                    assert_eq!(inhibited_by, vec!["node-down".to_string()]);
                }
                other => panic!("expected delivery, got {other:?}"),
            }
            assert!(bot.sent()[0].disable_notification);
        }

        #[tokio::test]
        async fn missing_rule_file_does_not_block_delivery() {
            let dir = tempfile::tempdir().unwrap();
            let (notifier, bot, _) = notifier_with(
                policy().with_rules_path(dir.path().join("inhibit.yaml")),
                &TemplateSource::Default,
            );

            notifier.notify(&alert("critical")).await;
            assert_eq!(bot.sent().len(), 1);
        }

        #[tokio::test]
        async fn template_failure_sends_fallback() {
            let (notifier, bot, _) = notifier_with(
                policy(),
                &TemplateSource::Inline("{{undefined_thing}}".to_string()),
            );

            notifier.notify(&alert("critical")).await;
            assert_eq!(bot.sent()[0].text, FALLBACK_TEXT);
        }

        #[tokio::test]
        async fn raw_links_reach_template() {
            let (notifier, bot, _) = notifier_with(
                policy(),
                &TemplateSource::Inline("{{attributes.ruleUrl}}".to_string()),
            );
            let mut a = alert("critical");
            a.raw_data = Some(r#"{"ruleUrl": "http://grafana/r/1"}"#.to_string());

            notifier.notify(&a).await;
            assert_eq!(bot.sent()[0].text, "http://grafana/r/1");
        }

        #[tokio::test]
        async fn send_failure_retries_without_keyboard() {
            let (notifier, bot, _) = notifier();
            bot.fail_next_sends(1);

            let outcome = notifier.notify(&alert("critical")).await;

            assert!(matches!(outcome, NotifyOutcome::Delivered { attempts: 2, .. }));
            assert!(bot.sent()[0].reply_markup.is_none());
        }

        #[tokio::test]
        async fn exhausted_delivery_is_reported() {
            let (notifier, bot, _) = notifier();
            bot.fail_next_sends(50);

            let outcome = notifier.notify(&alert("critical")).await;

            assert!(matches!(outcome, NotifyOutcome::Failed { attempts: 10, .. }));
            assert!(bot.sent().is_empty());
        }

        #[test]
        fn outcome_serializes_with_tag() {
            let json = serde_json::to_value(NotifyOutcome::SkippedRepeat).unwrap();
            assert_eq!(json["outcome"], "skipped_repeat");
        }
    }
}

//! Bridge configuration.
//!
//! Every setting can be given as a flag or through its environment variable.
//! Empty values count as unset. The parsed [`BridgeConfig`] is validated once
//! and turned into the per-component configurations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alertgram_audit::{AuditLogger, NoopAuditLogger, TracingAuditLogger};
use alertgram_core::{CallbackConfig, NotifyPolicy, TemplateSource, parse_severity_set};
use alertgram_telegram::{ProxyConfig, TelegramConfig};
use clap::{ArgAction, Args};
use url::Url;

use crate::alerta::AlertaConfig;
use crate::error::{ServerError, ServerResult};

/// Settings of the bridge server.
#[derive(Debug, Clone, Args)]
pub struct BridgeConfig {
    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: String,

    /// Chat that receives notifications.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: String,

    /// Public URL Telegram should post button presses to.
    #[arg(long, env = "TELEGRAM_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Secret Telegram echoes in the `X-Telegram-Bot-Api-Secret-Token` header.
    #[arg(long, env = "TELEGRAM_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Message template: a file path or the template text itself.
    #[arg(long, env = "TELEGRAM_TEMPLATE")]
    pub template: Option<String>,

    /// Proxy URL for reaching Telegram.
    #[arg(long, env = "TELEGRAM_PROXY")]
    pub proxy: Option<String>,

    /// Proxy username.
    #[arg(long, env = "TELEGRAM_PROXY_USERNAME")]
    pub proxy_username: Option<String>,

    /// Proxy password.
    #[arg(long, env = "TELEGRAM_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,

    /// Comma-separated severities that notify with sound.
    #[arg(long, env = "TELEGRAM_SOUND_NOTIFICATION_SEVERITY", default_value = "")]
    pub sound_severities: String,

    /// Severity a sound-worthy repeat must escalate from.
    #[arg(long, env = "ALERTGRAM_BASELINE_SEVERITY", default_value = "warning")]
    pub baseline_severity: String,

    /// Alert group whose repeats only notify after expiry.
    #[arg(long, env = "ALERTGRAM_TIMEOUT_GROUP", default_value = "elastalert")]
    pub timeout_group: String,

    /// Hours added to timestamps shown in messages.
    #[arg(long, env = "ALERTGRAM_TIME_OFFSET_HOURS", default_value_t = 3)]
    pub time_offset_hours: i64,

    /// Attach inline buttons to notifications; needs a webhook URL.
    #[arg(long, env = "ALERTGRAM_INTERACTIVE", default_value_t = true, action = ArgAction::Set)]
    pub interactive: bool,

    /// Dashboard base URL used in links.
    #[arg(long, env = "DASHBOARD_URL", default_value = "")]
    pub dashboard_url: String,

    /// Alerta API base URL.
    #[arg(long, env = "ALERTA_ENDPOINT", default_value = "http://localhost:8080/api")]
    pub alerta_endpoint: String,

    /// Alerta API key.
    #[arg(long, env = "ALERTA_API_KEY", hide_env_values = true)]
    pub alerta_api_key: Option<String>,

    /// Customers the chat may act on; empty means all.
    #[arg(long, env = "ALERTGRAM_CUSTOMERS", value_delimiter = ',')]
    pub customers: Vec<String>,

    /// Scopes recorded on audit records of chat actions.
    #[arg(long, env = "ALERTGRAM_AUDIT_SCOPES", value_delimiter = ',')]
    pub audit_scopes: Vec<String>,

    /// Write audit records for chat actions.
    #[arg(long, env = "ALERTGRAM_AUDIT", default_value_t = true, action = ArgAction::Set)]
    pub audit: bool,

    /// YAML inhibition rule file.
    #[arg(long, env = "INHIBIT_RULES_PATH")]
    pub rules_path: Option<PathBuf>,

    /// Address the HTTP server binds to.
    #[arg(long, env = "ALERTGRAM_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}

/// Drops blank entries of a comma-separated list.
fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Treats blank strings as unset.
fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BridgeConfig {
    /// Checks settings that clap cannot.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` naming the first invalid setting.
    pub fn validate(&self) -> ServerResult<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(ServerError::Config("TELEGRAM_TOKEN is empty".to_string()));
        }
        if self.chat_id.trim().is_empty() {
            return Err(ServerError::Config("TELEGRAM_CHAT_ID is empty".to_string()));
        }
        if let Some(url) = self.webhook_url() {
            Url::parse(&url)
                .map_err(|e| ServerError::Config(format!("invalid TELEGRAM_WEBHOOK_URL: {e}")))?;
        }
        Url::parse(&self.alerta_endpoint)
            .map_err(|e| ServerError::Config(format!("invalid ALERTA_ENDPOINT: {e}")))?;
        if self.proxy_username().is_some() != self.proxy_password().is_some() {
            return Err(ServerError::Config(
                "TELEGRAM_PROXY_USERNAME and TELEGRAM_PROXY_PASSWORD must be set together"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Webhook URL, if set.
    #[must_use]
    pub fn webhook_url(&self) -> Option<String> {
        non_empty(self.webhook_url.as_ref())
    }

    /// Webhook secret, if set.
    #[must_use]
    pub fn webhook_secret(&self) -> Option<String> {
        non_empty(self.webhook_secret.as_ref())
    }

    fn proxy_username(&self) -> Option<String> {
        non_empty(self.proxy_username.as_ref())
    }

    fn proxy_password(&self) -> Option<String> {
        non_empty(self.proxy_password.as_ref())
    }

    /// Customer scope with blanks removed.
    #[must_use]
    pub fn customers(&self) -> Vec<String> {
        trimmed(&self.customers)
    }

    /// Audit scopes with blanks removed.
    #[must_use]
    pub fn audit_scopes(&self) -> Vec<String> {
        trimmed(&self.audit_scopes)
    }

    /// Audit backend: tracing when enabled, otherwise discarded.
    #[must_use]
    pub fn audit_logger(&self) -> Arc<dyn AuditLogger> {
        if self.audit {
            Arc::new(TracingAuditLogger::new())
        } else {
            Arc::new(NoopAuditLogger::new())
        }
    }

    /// Where the message template comes from.
    #[must_use]
    pub fn template_source(&self) -> TemplateSource {
        TemplateSource::from_setting(self.template.as_deref())
    }

    /// Bot API client settings.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Telegram` if the token is empty.
    pub fn telegram_config(&self) -> ServerResult<TelegramConfig> {
        let mut config = TelegramConfig::new(self.telegram_token.trim())?;
        if let Some(url) = non_empty(self.proxy.as_ref()) {
            config = config.with_proxy(ProxyConfig {
                url,
                username: self.proxy_username(),
                password: self.proxy_password(),
            });
        }
        Ok(config)
    }

    /// Outbound notification policy.
    #[must_use]
    pub fn notify_policy(&self) -> NotifyPolicy {
        let mut policy = NotifyPolicy::new(self.chat_id.trim())
            .with_sound_severities(parse_severity_set(&self.sound_severities))
            .with_baseline_severity(self.baseline_severity.trim())
            .with_timeout_only_group(self.timeout_group.trim())
            .with_time_offset(chrono::Duration::hours(self.time_offset_hours))
            .with_dashboard_url(self.dashboard_url.trim())
            .with_interactive(self.interactive && self.webhook_url().is_some());
        if let Some(path) = self
            .rules_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            policy = policy.with_rules_path(path.clone());
        }
        policy
    }

    /// Inbound callback settings.
    #[must_use]
    pub fn callback_config(&self) -> CallbackConfig {
        CallbackConfig::new(self.chat_id.trim(), self.dashboard_url.trim())
            .with_customers(self.customers())
            .with_scopes(self.audit_scopes())
            .with_blackout("Production", Duration::from_secs(3600))
    }

    /// Alerta API client settings.
    #[must_use]
    pub fn alerta_config(&self) -> AlertaConfig {
        let mut config = AlertaConfig::new(self.alerta_endpoint.trim());
        if let Some(key) = non_empty(self.alerta_api_key.as_ref()) {
            config = config.with_api_key(key);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use test_case::test_case;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: BridgeConfig,
    }

    fn parse(extra: &[&str]) -> BridgeConfig {
        let mut args = vec![
            "alertgram",
            "--telegram-token",
            "123:abc",
            "--chat-id",
            "-100200300",
        ];
        args.extend_from_slice(extra);
        TestCli::try_parse_from(args).unwrap().config
    }

    mod parsing {
        use super::*;

        #[test]
        fn defaults() {
            let config = parse(&[]);

            assert_eq!(config.baseline_severity, "warning");
            assert_eq!(config.timeout_group, "elastalert");
            assert_eq!(config.time_offset_hours, 3);
            assert!(config.interactive);
            assert_eq!(config.bind.port(), 8080);
            assert!(config.customers().is_empty());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn customers_are_comma_separated() {
            let config = parse(&["--customers", "acme, globex,,"]);
            assert_eq!(config.customers(), vec!["acme", "globex"]);
        }

        #[test]
        fn interactive_can_be_disabled() {
            let config = parse(&["--interactive", "false"]);
            assert!(!config.interactive);
        }
    }

    mod validation {
        use super::*;
        use test_case::test_case;

        #[test_case(&["--webhook-url", "not a url"] ; "bad webhook url")]
        #[test_case(&["--alerta-endpoint", "::"] ; "bad alerta endpoint")]
        #[test_case(&["--proxy-username", "bob"] ; "username without password")]
        fn rejects(extra: &[&str]) {
            assert!(matches!(
                parse(extra).validate(),
                Err(ServerError::Config(_))
            ));
        }

        #[test]
        fn blank_token_is_rejected() {
            let mut config = parse(&[]);
            config.telegram_token = "  ".to_string();
            assert!(config.validate().is_err());
        }

        #[test]
        fn blank_optionals_are_unset() {
            let config = parse(&["--webhook-url", "", "--webhook-secret", " "]);
            assert_eq!(config.webhook_url(), None);
            assert_eq!(config.webhook_secret(), None);
            assert!(config.validate().is_ok());
        }
    }

    mod conversion {
        use super::*;

        #[test]
        fn notify_policy_carries_settings() {
            let config = parse(&[
                "--sound-severities",
                "Critical, major",
                "--dashboard-url",
                "https://alerta.example.com/",
                "--rules-path",
                "/etc/alertgram/rules.yaml",
            ]);
            let policy = config.notify_policy();

            assert_eq!(policy.chat_id, "-100200300");
            assert_eq!(policy.sound_severities, vec!["critical", "major"]);
            assert_eq!(policy.time_offset, chrono::Duration::hours(3));
            assert_eq!(
                policy.rules_path.as_deref(),
                Some(std::path::Path::new("/etc/alertgram/rules.yaml"))
            );
        }

        #[test]
        fn keyboards_need_a_webhook() {
            assert!(!parse(&[]).notify_policy().interactive);

            let config = parse(&["--webhook-url", "https://bridge.example.com/hook"]);
            assert!(config.notify_policy().interactive);
        }

        #[test]
        fn callback_config_uses_scope() {
            let config = parse(&["--customers", "acme"]);
            let callbacks = config.callback_config();

            assert_eq!(callbacks.customers, vec!["acme"]);
            assert!(callbacks.scopes.is_empty());
            assert_eq!(callbacks.blackout_environment, "Production");
            assert_eq!(callbacks.blackout_duration, Duration::from_secs(3600));
        }

        #[test]
        fn audit_scopes_reach_callbacks() {
            let config = parse(&["--audit-scopes", "write:alerts, admin:blackouts,"]);
            assert_eq!(
                config.callback_config().scopes,
                vec!["write:alerts", "admin:blackouts"]
            );
        }

        #[test]
        fn audit_can_be_disabled() {
            assert!(parse(&[]).audit);
            assert!(!parse(&["--audit", "false"]).audit);
        }

        #[test]
        fn telegram_config_with_proxy() {
            let config = parse(&[
                "--proxy",
                "http://proxy:3128",
                "--proxy-username",
                "bob",
                "--proxy-password",
                "secret",
            ]);
            let telegram = config.telegram_config().unwrap();
            let proxy = telegram.proxy.unwrap();

            assert_eq!(proxy.url, "http://proxy:3128");
            assert_eq!(proxy.username.as_deref(), Some("bob"));
        }

        #[test]
        fn template_defaults() {
            assert_eq!(parse(&[]).template_source(), TemplateSource::Default);
        }
    }
}

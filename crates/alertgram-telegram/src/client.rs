//! The [`BotApi`] trait and its HTTP implementation.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, TelegramError};
use crate::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, Message, SendMessage, SetWebhook, User,
    WebhookInfo,
};

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Operations alertgram needs from a Telegram bot.
///
/// Implemented over HTTP by [`TelegramClient`] and in memory by
/// [`FakeBot`](crate::fake::FakeBot).
pub trait BotApi: Send + Sync + fmt::Debug {
    /// Returns the bot's own user record.
    fn get_me(&self) -> BoxFuture<'_, Result<User>>;

    /// Returns the current webhook registration.
    fn get_webhook_info(&self) -> BoxFuture<'_, Result<WebhookInfo>>;

    /// Registers a webhook URL.
    fn set_webhook<'a>(&'a self, request: &'a SetWebhook) -> BoxFuture<'a, Result<()>>;

    /// Sends a message and returns it as stored by Telegram.
    fn send_message<'a>(&'a self, request: &'a SendMessage) -> BoxFuture<'a, Result<Message>>;

    /// Replaces the text (and optionally the keyboard) of a sent message.
    fn edit_message_text<'a>(&'a self, request: &'a EditMessageText)
    -> BoxFuture<'a, Result<()>>;

    /// Acknowledges a callback query.
    fn answer_callback_query<'a>(
        &'a self,
        request: &'a AnswerCallbackQuery,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Proxy settings for reaching the Bot API.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `socks5://proxy:1080` or `http://proxy:3128`.
    pub url: String,
    /// Optional username for proxy authentication.
    pub username: Option<String>,
    /// Optional password for proxy authentication.
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Configuration for [`TelegramClient`].
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub token: String,
    /// Base URL of the Bot API.
    pub api_base: String,
    /// Optional outbound proxy.
    pub proxy: Option<ProxyConfig>,
    /// Request timeout.
    pub timeout: Duration,
}

impl TelegramConfig {
    /// Creates a configuration for the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError::Config` if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TelegramError::Config(
                "bot token cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Overrides the Bot API base URL.
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Routes requests through a proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("api_base", &self.api_base)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bot API client over HTTPS.
#[derive(Clone)]
pub struct TelegramClient {
    config: TelegramConfig,
    http: reqwest::Client,
}

impl TelegramClient {
    /// Builds a client, configuring the proxy if one is set.
    ///
    /// # Errors
    ///
    /// Returns `TelegramError::Config` if the proxy URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            let mut p = reqwest::Proxy::all(&proxy.url)
                .map_err(|e| TelegramError::Config(format!("invalid proxy url: {e}")))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            debug!(proxy = %proxy.url, "using proxy for telegram");
            builder = builder.proxy(p);
        }

        let http = builder
            .build()
            .map_err(|e| TelegramError::Config(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// URL of a Bot API method.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.config.api_base, self.config.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let bytes = response.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        unwrap_envelope(envelope)
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Turns a response envelope into its result or an API error.
fn unwrap_envelope<T>(envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.ok {
        return Err(TelegramError::Api {
            code: envelope.error_code,
            description: envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    envelope
        .result
        .ok_or_else(|| TelegramError::Decode("response has no result".to_string()))
}

#[derive(Serialize)]
struct Empty {}

impl BotApi for TelegramClient {
    fn get_me(&self) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move { self.call("getMe", &Empty {}).await })
    }

    fn get_webhook_info(&self) -> BoxFuture<'_, Result<WebhookInfo>> {
        Box::pin(async move { self.call("getWebhookInfo", &Empty {}).await })
    }

    fn set_webhook<'a>(&'a self, request: &'a SetWebhook) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let _: bool = self.call("setWebhook", request).await?;
            Ok(())
        })
    }

    fn send_message<'a>(&'a self, request: &'a SendMessage) -> BoxFuture<'a, Result<Message>> {
        Box::pin(self.call("sendMessage", request))
    }

    fn edit_message_text<'a>(
        &'a self,
        request: &'a EditMessageText,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            // Returns the edited Message, or `true` for inline messages.
            let _: serde_json::Value = self.call("editMessageText", request).await?;
            Ok(())
        })
    }

    fn answer_callback_query<'a>(
        &'a self,
        request: &'a AnswerCallbackQuery,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let _: bool = self.call("answerCallbackQuery", request).await?;
            Ok(())
        })
    }
}

//! Bridge server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use alertgram_core::{AlertStore, CallbackHandler, MessageTemplate, Notifier};
use alertgram_telegram::{BotApi, SetWebhook, TelegramClient};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::alerta::AlertaClient;
use crate::config::BridgeConfig;
use crate::error::{ServerError, ServerResult};
use crate::routes::create_router;
use crate::state::BridgeState;

/// Alerta to Telegram bridge.
///
/// Serves the notify endpoint for alert events and the webhook endpoint for
/// Telegram button presses.
#[derive(Debug, Clone)]
pub struct BridgeServer {
    state: Arc<BridgeState>,
    bot: Arc<dyn BotApi>,
    webhook: Option<SetWebhook>,
}

impl BridgeServer {
    /// Creates a server from already built parts.
    #[must_use]
    pub fn new(state: BridgeState, bot: Arc<dyn BotApi>) -> Self {
        Self {
            state: Arc::new(state),
            bot,
            webhook: None,
        }
    }

    /// Builds every component from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the template does
    /// not compile, or a client cannot be built.
    pub fn from_config(config: &BridgeConfig) -> ServerResult<Self> {
        config.validate()?;

        let bot: Arc<dyn BotApi> = Arc::new(TelegramClient::new(config.telegram_config()?)?);
        let store: Arc<dyn AlertStore> = Arc::new(AlertaClient::new(config.alerta_config())?);
        let template = MessageTemplate::compile(&config.template_source())?;

        let notifier = Notifier::new(
            config.notify_policy(),
            template,
            bot.clone(),
            store.clone(),
        );
        let callbacks = CallbackHandler::new(
            config.callback_config(),
            store,
            bot.clone(),
            config.audit_logger(),
        );
        let state = BridgeState::new(notifier, callbacks)
            .with_webhook_secret(config.webhook_secret());

        let server = Self::new(state, bot);
        Ok(match config.webhook_url() {
            Some(url) => server.with_webhook(url, config.webhook_secret()),
            None => server,
        })
    }

    /// Registers `url` as the Telegram webhook during [`prepare`](Self::prepare).
    #[must_use]
    pub fn with_webhook(mut self, url: impl Into<String>, secret: Option<String>) -> Self {
        self.webhook = Some(SetWebhook {
            url: url.into(),
            secret_token: secret,
        });
        self
    }

    /// Get the shared state.
    #[must_use]
    pub fn state(&self) -> Arc<BridgeState> {
        self.state.clone()
    }

    /// Checks the bot token and registers the webhook if it changed.
    ///
    /// # Errors
    ///
    /// Returns an error if Telegram rejects the token or the webhook.
    pub async fn prepare(&self) -> ServerResult<()> {
        let me = self.bot.get_me().await?;
        info!(
            bot_id = me.id,
            username = me.username.as_deref().unwrap_or_default(),
            "telegram bot ready"
        );

        let Some(webhook) = &self.webhook else {
            warn!("no webhook url configured, buttons will not be handled");
            return Ok(());
        };

        let current = self.bot.get_webhook_info().await?;
        if current.url == webhook.url {
            info!(url = %webhook.url, "telegram webhook already registered");
            return Ok(());
        }

        self.bot.set_webhook(webhook).await?;
        info!(url = %webhook.url, previous = %current.url, "telegram webhook registered");
        Ok(())
    }

    /// Start the server and listen for connections.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> ServerResult<()> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ServerResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e))?;

        info!(addr = %addr, "alertgram listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        info!("alertgram shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

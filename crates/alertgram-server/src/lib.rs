//! HTTP bridge between the Alerta alert platform and Telegram.
//!
//! The server exposes:
//!
//! - `GET /api/health` - liveness
//! - `POST /api/alerts/notify` - an alert event to forward to the chat
//! - `POST /api/webhooks/telegram` - inline button presses from Telegram
//!
//! Alerts are read and changed through the Alerta REST API ([`AlertaClient`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use alertgram_server::{BridgeConfig, BridgeServer};
//!
//! # async fn run(config: BridgeConfig) -> alertgram_server::ServerResult<()> {
//! let server = BridgeServer::from_config(&config)?;
//! server.prepare().await?;
//! server.serve(config.bind).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alerta;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use alerta::{AlertaClient, AlertaConfig};
pub use commands::{RulesCheck, check_rules, render_alert};
pub use config::BridgeConfig;
pub use error::{ServerError, ServerResult};
pub use routes::create_router;
pub use server::BridgeServer;
pub use state::BridgeState;

//! alertgram - Alerta to Telegram bridge
//!
//! Forwards alert events to a Telegram chat and applies the chat's inline
//! button presses back to the alerts.

use std::path::PathBuf;

use alertgram_core::TemplateSource;
use alertgram_server::{BridgeConfig, BridgeServer, check_rules, render_alert};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "alertgram")]
#[command(about = "Alerta to Telegram notification bridge")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, env = "ALERTGRAM_LOG_FORMAT", default_value = "plain")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge server
    Run(Box<BridgeConfig>),

    /// Parse an inhibition rule file and report invalid rules
    CheckRules {
        /// Rule file
        path: PathBuf,
    },

    /// Render the message template against an alert JSON file
    Render {
        /// Alert JSON file
        #[arg(long)]
        alert: PathBuf,

        /// Template file or text
        #[arg(long, env = "TELEGRAM_TEMPLATE")]
        template: Option<String>,

        /// Hours added to displayed times
        #[arg(long, env = "ALERTGRAM_TIME_OFFSET_HOURS", default_value_t = 3)]
        time_offset_hours: i64,
    },
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    // Covers every alertgram_* crate, audit records included.
    let filter = EnvFilter::from_default_env().add_directive("alertgram=info".parse()?);

    match format {
        LogFormat::Plain => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Commands::Run(config) => run(&config).await?,

        Commands::CheckRules { path } => {
            let check = check_rules(&path)?;
            println!("{}", check.report);
            if check.invalid > 0 {
                anyhow::bail!("{} invalid rule(s) in {}", check.invalid, path.display());
            }
        }

        Commands::Render {
            alert,
            template,
            time_offset_hours,
        } => {
            let source = TemplateSource::from_setting(template.as_deref());
            println!("{}", render_alert(&alert, &source, time_offset_hours)?);
        }
    }

    Ok(())
}

async fn run(config: &BridgeConfig) -> anyhow::Result<()> {
    info!(
        bind = %config.bind,
        chat_id = %config.chat_id,
        alerta = %config.alerta_endpoint,
        "starting alertgram"
    );

    let server = BridgeServer::from_config(config)?;
    server.prepare().await?;

    server
        .serve_with_shutdown(config.bind, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    Ok(())
}

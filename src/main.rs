//! sauna-link entry point.
//!
//! Loads configuration, then runs the reconnect loop until the operator
//! interrupts the process.

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use sauna_link::config::{LinkConfig, RawSettings};
use sauna_link::console::Console;
use sauna_link::reconnect::ReconnectLoop;
use sauna_link::transport::WsConnector;

/// Console bridge to the sauna controller's WebSocket endpoint.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Controller host name or IP address [env: SAUNA_HOST]
    host: Option<String>,

    /// Controller port [env: SAUNA_PORT, default: 80]
    port: Option<u16>,

    /// WebSocket path [env: SAUNA_WS_PATH, default: /ws]
    #[arg(long)]
    path: Option<String>,

    /// Pre-shared secret enabling signed commands [env: SAUNA_SECRET]
    #[arg(long)]
    secret: Option<String>,

    /// Seconds to wait between connection attempts [env: SAUNA_RECONNECT_DELAY_SECS, default: 5]
    #[arg(long)]
    reconnect_delay: Option<u64>,
}

impl From<Cli> for RawSettings {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            path: cli.path,
            secret: cli.secret,
            reconnect_delay_secs: cli.reconnect_delay,
        }
    }
}

/// Initializes tracing on stderr; stdout belongs to the operator console.
///
/// `RUST_LOG` sets the filter (default `warn`); `SAUNA_LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing() {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    if std::env::var("SAUNA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Loads `.env` first, so the tracing setup below sees its variables.
    let config =
        LinkConfig::from_env_with_overrides(cli.into()).context("cannot start sauna-link")?;
    init_tracing();

    tracing::info!(
        uri = %config.endpoint.uri(),
        authenticated = config.secret.is_some(),
        delay_secs = config.reconnect_delay.as_secs(),
        "starting sauna-link"
    );

    let (console, writer) = Console::spawn_stdout();
    let lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut link = ReconnectLoop::new(WsConnector, &config, console, lines);

    tokio::select! {
        never = link.run() => match never {},
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "cannot listen for interrupt");
                match link.run().await {}
            }
        }
    }

    // Flush whatever is queued, then exit without waiting on the blocked
    // stdin reader thread.
    drop(link);
    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "console writer task failed");
    }
    std::process::exit(0);
}

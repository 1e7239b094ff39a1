//! SunoNa TUI entry point.

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use sunona_client::transport::{self, TransportConfig};
use sunona_core::SystemEnv;
use sunona_tui::{App, Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// SunoNa terminal chat client
#[derive(Parser, Debug)]
#[command(name = "sunona-tui")]
#[command(about = "Terminal UI for the SunoNa chat room")]
#[command(version)]
struct Args {
    /// Relay address to connect to (host:port)
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    server: String,

    /// Write logs to this file. Logging is off without it, since the
    /// terminal is taken over by the UI.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        let file = File::create(path)?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(filter)
            .init();
    }

    tracing::info!(server = %args.server, "SunoNa TUI starting");

    let client = transport::connect(args.server.clone(), TransportConfig::default());
    let driver = TerminalDriver::new(client)?;
    let app = App::new(SystemEnv::new(), args.server);

    Ok(Runtime::new(driver, app).run().await?)
}

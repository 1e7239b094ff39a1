//! SunoNa relay binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port
//! sunona-server
//!
//! # Custom address with verbose logging
//! sunona-server --bind 127.0.0.1:4000 --log-level debug
//! ```

use clap::Parser;
use sunona_server::{DEFAULT_BIND, Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// SunoNa chat relay
#[derive(Parser, Debug)]
#[command(name = "sunona-server")]
#[command(about = "Single-room SunoNa chat relay")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_BIND)]
    bind: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "10000")]
    max_connections: usize,

    /// Longest accepted inbound line in bytes
    #[arg(long, default_value_t = sunona_proto::MAX_LINE_LEN)]
    max_line_len: usize,

    /// Signals buffered per connection before dropping
    #[arg(long, default_value = "256")]
    outbound_queue: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("SunoNa relay starting");
    tracing::info!("Binding to {}", args.bind);

    let config = ServerConfig {
        bind_address: args.bind,
        max_connections: args.max_connections,
        max_line_len: args.max_line_len,
        outbound_queue: args.outbound_queue,
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}

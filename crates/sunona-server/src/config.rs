//! Server configuration.

use sunona_proto::MAX_LINE_LEN;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:3000")
    pub bind_address: String,
    /// Maximum concurrent connections
    pub max_connections: usize,
    /// Longest accepted inbound line in bytes
    pub max_line_len: usize,
    /// Outbound signals buffered per connection before dropping
    pub outbound_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND.to_string(),
            max_connections: 10_000,
            max_line_len: MAX_LINE_LEN,
            outbound_queue: 256,
        }
    }
}

//! SunoNa room relay.
//!
//! Production relay for the single implicit chat room. Accepts TCP
//! connections speaking newline-delimited JSON signals and fans every signal
//! out to the other joined connections.
//!
//! # Architecture
//!
//! The relay logic lives in the Sans-IO [`RoomHub`]: it consumes
//! [`ServerEvent`]s and returns [`ServerAction`]s. [`Server`] executes those
//! actions with Tokio: one reader loop and one writer task per connection,
//! with broadcasts queued onto each writer's bounded channel.
//!
//! # Components
//!
//! - [`RoomHub`]: Action-based relay (pure logic, no I/O)
//! - [`ConnectionRegistry`]: Joined names and typing state per connection
//! - [`Server`]: Production runtime that executes hub actions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod hub;
mod registry;

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use bytes::Bytes;
pub use config::{DEFAULT_BIND, ServerConfig};
pub use error::{HubError, ServerError};
pub use hub::{LogLevel, RoomHub, ServerAction, ServerEvent};
pub use registry::{ConnectionRegistry, SessionInfo};
use sunona_proto::{ClientSignal, LineDecoder, ProtocolError, encode_signal};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    sync::{Mutex, Notify, RwLock, mpsc},
};

/// Runtime side of one connection.
struct ConnectionHandle {
    /// Encoded lines queued for the writer task
    outbound: mpsc::Sender<Bytes>,
    /// Wakes the reader loop when the hub closes the connection
    close: Arc<Notify>,
}

/// Shared state for all connections.
struct SharedState {
    /// Session ID → connection handle
    connections: RwLock<HashMap<u64, ConnectionHandle>>,
    /// Longest accepted inbound line
    max_line_len: usize,
    /// Per-connection outbound queue depth
    outbound_queue: usize,
}

/// Production SunoNa relay.
///
/// Wraps [`RoomHub`] with a TCP listener.
pub struct Server {
    /// The action-based relay
    hub: RoomHub,
    /// Bound listener
    listener: TcpListener,
    /// Runtime settings
    config: ServerConfig,
}

impl Server {
    /// Create and bind a new server.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address)
            .await
            .map_err(|e| ServerError::Config(format!("bind {}: {e}", config.bind_address)))?;
        let hub = RoomHub::new(config.max_connections);

        Ok(Self { hub, listener, config })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections and relaying signals.
    ///
    /// This method runs until the task is cancelled.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.listener.local_addr()?);

        let hub = Arc::new(Mutex::new(self.hub));
        let shared = Arc::new(SharedState {
            connections: RwLock::new(HashMap::new()),
            max_line_len: self.config.max_line_len,
            outbound_queue: self.config.outbound_queue,
        });
        let next_session = AtomicU64::new(1);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let session_id = next_session.fetch_add(1, Ordering::Relaxed);
                    let hub = Arc::clone(&hub);
                    let shared = Arc::clone(&shared);
                    tracing::debug!(session_id, %peer, "Accepted connection");

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, session_id, hub, shared).await {
                            tracing::warn!(session_id, "Connection error: {}", e);
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}

/// Serve one TCP connection until the peer leaves or the hub closes it.
async fn handle_connection(
    stream: TcpStream,
    session_id: u64,
    hub: Arc<Mutex<RoomHub>>,
    shared: Arc<SharedState>,
) -> Result<(), ServerError> {
    let (mut reader, writer) = stream.into_split();
    let (outbound_tx, outbound_rx) = mpsc::channel(shared.outbound_queue.max(1));
    let close = Arc::new(Notify::new());

    shared
        .connections
        .write()
        .await
        .insert(session_id, ConnectionHandle { outbound: outbound_tx, close: Arc::clone(&close) });

    let writer_task = tokio::spawn(write_loop(session_id, writer, outbound_rx));

    {
        let mut hub = hub.lock().await;
        let actions = hub.process_event(ServerEvent::ConnectionAccepted { session_id })?;
        execute_actions(&hub, actions, &shared).await?;
    }

    let mut decoder = LineDecoder::new(shared.max_line_len);
    let reason = loop {
        tokio::select! {
            () = close.notified() => break "closed by server".to_string(),
            read = reader.read_buf(decoder.buffer_mut()) => {
                match read {
                    Ok(0) => break "peer closed".to_string(),
                    Ok(_) => {},
                    Err(e) => break format!("read error: {e}"),
                }

                while let Some(decoded) = decoder.next_signal::<ClientSignal>() {
                    match decoded {
                        Ok(signal) => process_signal(session_id, signal, &hub, &shared).await?,
                        Err(e) => log_bad_line(session_id, &e),
                    }
                }
            },
        }
    };

    // Dropping the handle closes the writer channel once queued lines flush.
    shared.connections.write().await.remove(&session_id);

    {
        let mut hub = hub.lock().await;
        let actions = hub.process_event(ServerEvent::ConnectionClosed { session_id, reason })?;
        execute_actions(&hub, actions, &shared).await?;
    }

    if let Err(e) = writer_task.await {
        tracing::debug!(session_id, "Writer task ended abnormally: {}", e);
    }

    Ok(())
}

async fn process_signal(
    session_id: u64,
    signal: ClientSignal,
    hub: &Mutex<RoomHub>,
    shared: &SharedState,
) -> Result<(), ServerError> {
    tracing::trace!(session_id, signal = signal.name(), "Received signal");

    let mut hub = hub.lock().await;
    match hub.process_event(ServerEvent::SignalReceived { session_id, signal }) {
        Ok(actions) => execute_actions(&hub, actions, shared).await,
        Err(e) => {
            tracing::warn!(session_id, "Signal processing error: {}", e);
            Ok(())
        },
    }
}

fn log_bad_line(session_id: u64, error: &ProtocolError) {
    tracing::warn!(session_id, "Skipping undecodable line: {}", error);
}

/// Drain queued lines onto the socket.
async fn write_loop(session_id: u64, mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<Bytes>) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = writer.write_all(&line).await {
            tracing::debug!(session_id, "Write failed: {}", e);
            return;
        }
    }
    let _ = writer.shutdown().await;
}

/// Execute hub actions.
async fn execute_actions(
    hub: &RoomHub,
    actions: Vec<ServerAction>,
    shared: &SharedState,
) -> Result<(), ServerError> {
    for action in actions {
        match action {
            ServerAction::Broadcast { signal, exclude_session } => {
                let line = Bytes::from(encode_signal(&signal)?);
                let connections = shared.connections.read().await;

                for session_id in hub.recipients(exclude_session) {
                    let Some(conn) = connections.get(&session_id) else {
                        continue;
                    };
                    match conn.outbound.try_send(line.clone()) {
                        Ok(()) => {},
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::warn!(
                                session_id,
                                signal = signal.name(),
                                "Outbound queue full, dropping signal"
                            );
                        },
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            tracing::debug!(session_id, "Outbound queue closed");
                        },
                    }
                }
            },

            ServerAction::CloseConnection { session_id, reason } => {
                tracing::info!("Closing connection {}: {}", session_id, reason);
                let connections = shared.connections.read().await;
                if let Some(conn) = connections.get(&session_id) {
                    conn.close.notify_one();
                }
            },

            ServerAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
            },
        }
    }

    Ok(())
}

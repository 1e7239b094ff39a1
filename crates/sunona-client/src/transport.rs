//! TCP transport for the client.
//!
//! Provides [`ConnectedClient`] which carries newline-delimited JSON signals
//! over TCP and reconnects with exponential backoff. This is a thin layer
//! that only moves signals; session logic remains in the Sans-IO
//! [`crate::Session`].
//!
//! # Reconnection
//!
//! Connection loss is reported as [`TransportEvent::Disconnected`]; the task
//! keeps retrying until [`ConnectedClient::stop`] is called or the handle is
//! dropped. Outbound signals issued while disconnected are dropped, except
//! the latest `joinRoom`, which is replayed on every reconnect so the room
//! keeps knowing our name.
//!
//! # Backpressure
//!
//! The outbound channel is drained at all times, including while a connect
//! attempt is pending. Socket writes happen on a separate writer task behind
//! a bounded queue; when a peer stops reading and that queue fills, further
//! signals are dropped with a warning instead of stalling the sender.

use std::time::Duration;

use sunona_proto::{
    ClientSignal, LineDecoder, MAX_LINE_LEN, ProtocolError, ServerSignal, encode_signal,
};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::{JoinError, JoinHandle},
};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket I/O failed.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound signal could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The socket writer task panicked or was cancelled.
    #[error("writer task failed: {0}")]
    Writer(#[from] JoinError),
}

/// Events delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established (initially or after a reconnect).
    Connected,
    /// Connection lost.
    Disconnected,
    /// Signal received from the room.
    Signal(ServerSignal),
}

/// Reconnection and framing settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Delay before the first reconnect attempt.
    pub initial_backoff: Duration,
    /// Upper bound for the doubling backoff.
    pub max_backoff: Duration,
    /// Give up on a connect attempt after this long.
    pub connect_timeout: Duration,
    /// Encoded lines buffered for the socket writer before dropping.
    pub write_queue: usize,
    /// Longest accepted inbound line.
    pub max_line_len: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            write_queue: 256,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

/// Handle to a client transport task.
///
/// Signals are sent and received via the channels; an internal task handles
/// the TCP I/O and reconnection.
pub struct ConnectedClient {
    /// Send signals to the room.
    pub to_server: mpsc::Sender<ClientSignal>,
    /// Receive lifecycle events and signals from the room.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the transport task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the transport.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ConnectedClient {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Start a transport to a SunoNa relay at `server_addr` (`host:port`).
///
/// Never fails up front: the first connection attempt happens in the
/// background and failures surface as retries. Must be called from within a
/// tokio runtime.
pub fn connect(server_addr: impl Into<String>, config: TransportConfig) -> ConnectedClient {
    let (to_server_tx, to_server_rx) = mpsc::channel::<ClientSignal>(64);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(64);

    let handle = tokio::spawn(run_transport(
        server_addr.into(),
        config,
        to_server_rx,
        from_server_tx,
    ));

    ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    }
}

/// How a single connection ended.
enum ConnectionEnd {
    /// Peer closed the socket.
    Closed,
    /// The handle was dropped; stop for good.
    Shutdown,
}

/// Outcome of one connect attempt.
enum Dial {
    Connected(TcpStream),
    Failed(String),
    /// The handle was dropped while connecting.
    Shutdown,
}

/// Connect, serve, back off, repeat.
async fn run_transport(
    addr: String,
    config: TransportConfig,
    mut outbound: mpsc::Receiver<ClientSignal>,
    inbound: mpsc::Sender<TransportEvent>,
) {
    let mut backoff = config.initial_backoff;
    let mut last_join: Option<ClientSignal> = None;

    loop {
        match dial(&addr, config.connect_timeout, &mut outbound, &mut last_join).await {
            Dial::Shutdown => return,
            Dial::Connected(stream) => {
                backoff = config.initial_backoff;
                tracing::info!(%addr, "Connected");

                if inbound.send(TransportEvent::Connected).await.is_err() {
                    return;
                }

                match run_connection(stream, &config, &mut outbound, &inbound, &mut last_join).await
                {
                    Ok(ConnectionEnd::Shutdown) => return,
                    Ok(ConnectionEnd::Closed) => tracing::info!(%addr, "Connection closed by peer"),
                    Err(e) => tracing::warn!(%addr, error = %e, "Connection lost"),
                }

                if inbound.send(TransportEvent::Disconnected).await.is_err() {
                    return;
                }
            },
            Dial::Failed(reason) => {
                tracing::debug!(%addr, %reason, ?backoff, "Connect failed");
            },
        }

        if !wait_backoff(backoff, &mut outbound, &mut last_join).await {
            return;
        }
        backoff = (backoff * 2).min(config.max_backoff);
    }
}

/// Attempt one connection while keeping the outbound channel drained.
async fn dial(
    addr: &str,
    connect_timeout: Duration,
    outbound: &mut mpsc::Receiver<ClientSignal>,
    last_join: &mut Option<ClientSignal>,
) -> Dial {
    let attempt = tokio::time::timeout(connect_timeout, TcpStream::connect(addr));
    tokio::pin!(attempt);

    loop {
        tokio::select! {
            result = &mut attempt => {
                return match result {
                    Ok(Ok(stream)) => Dial::Connected(stream),
                    Ok(Err(e)) => Dial::Failed(e.to_string()),
                    Err(_) => Dial::Failed(format!("timed out after {connect_timeout:?}")),
                };
            },
            signal = outbound.recv() => {
                if !hold_while_disconnected(signal, last_join) {
                    return Dial::Shutdown;
                }
            },
        }
    }
}

/// Sleep for `backoff`, dropping outbound signals but remembering joins.
///
/// Returns false when the handle was dropped.
async fn wait_backoff(
    backoff: Duration,
    outbound: &mut mpsc::Receiver<ClientSignal>,
    last_join: &mut Option<ClientSignal>,
) -> bool {
    let sleep = tokio::time::sleep(backoff);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return true,
            signal = outbound.recv() => {
                if !hold_while_disconnected(signal, last_join) {
                    return false;
                }
            },
        }
    }
}

/// Remember a join, drop anything else. Returns false once the channel closed.
fn hold_while_disconnected(
    signal: Option<ClientSignal>,
    last_join: &mut Option<ClientSignal>,
) -> bool {
    match signal {
        None => false,
        Some(signal @ ClientSignal::JoinRoom(_)) => {
            *last_join = Some(signal);
            true
        },
        Some(signal) => {
            tracing::debug!(signal = signal.name(), "Dropping signal while disconnected");
            true
        },
    }
}

/// Queue an encoded signal for the writer task, dropping it if the socket is backed up.
fn queue_line(
    lines: &mpsc::Sender<Vec<u8>>,
    signal: &ClientSignal,
) -> Result<(), TransportError> {
    let line = encode_signal(signal)?;
    match lines.try_send(line) {
        Ok(()) => {},
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(signal = signal.name(), "Write queue full, dropping signal");
        },
        // Writer already ended; the connection loop reports why.
        Err(mpsc::error::TrySendError::Closed(_)) => {},
    }
    Ok(())
}

/// Drain queued lines into the socket.
async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut lines: mpsc::Receiver<Vec<u8>>,
) -> std::io::Result<()> {
    while let Some(line) = lines.recv().await {
        writer.write_all(&line).await?;
    }
    Ok(())
}

/// Bridge one TCP connection and the channels until either side closes.
async fn run_connection(
    stream: TcpStream,
    config: &TransportConfig,
    outbound: &mut mpsc::Receiver<ClientSignal>,
    inbound: &mpsc::Sender<TransportEvent>,
    last_join: &mut Option<ClientSignal>,
) -> Result<ConnectionEnd, TransportError> {
    let (reader, writer) = stream.into_split();
    let (lines_tx, lines_rx) = mpsc::channel::<Vec<u8>>(config.write_queue.max(1));
    let mut writer_task = tokio::spawn(write_loop(writer, lines_rx));

    let end =
        serve(reader, config, &lines_tx, &mut writer_task, outbound, inbound, last_join).await;
    writer_task.abort();
    end
}

/// Pump both directions of one connection.
async fn serve(
    mut reader: OwnedReadHalf,
    config: &TransportConfig,
    lines: &mpsc::Sender<Vec<u8>>,
    writer_task: &mut JoinHandle<std::io::Result<()>>,
    outbound: &mut mpsc::Receiver<ClientSignal>,
    inbound: &mpsc::Sender<TransportEvent>,
    last_join: &mut Option<ClientSignal>,
) -> Result<ConnectionEnd, TransportError> {
    let mut decoder = LineDecoder::new(config.max_line_len);

    if let Some(join) = last_join.as_ref() {
        tracing::debug!("Replaying joinRoom after reconnect");
        queue_line(lines, join)?;
    }

    loop {
        tokio::select! {
            signal = outbound.recv() => {
                let Some(signal) = signal else {
                    return Ok(ConnectionEnd::Shutdown);
                };
                // Recorded before the write so a join lost mid-write is replayed.
                if matches!(signal, ClientSignal::JoinRoom(_)) {
                    *last_join = Some(signal.clone());
                }
                queue_line(lines, &signal)?;
            },
            written = &mut *writer_task => {
                written??;
                return Ok(ConnectionEnd::Closed);
            },
            read = reader.read_buf(decoder.buffer_mut()) => {
                if read? == 0 {
                    return Ok(ConnectionEnd::Closed);
                }
                while let Some(decoded) = decoder.next_signal::<ServerSignal>() {
                    match decoded {
                        Ok(signal) => {
                            if inbound.send(TransportEvent::Signal(signal)).await.is_err() {
                                return Ok(ConnectionEnd::Shutdown);
                            }
                        },
                        Err(e) => tracing::warn!(error = %e, "Skipping undecodable line"),
                    }
                }
            },
        }
    }
}

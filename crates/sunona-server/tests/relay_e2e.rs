//! End-to-end tests: the relay over real sockets with the client transport.

use std::time::Duration;

use sunona_client::transport::{self, ConnectedClient, TransportConfig, TransportEvent};
use sunona_proto::{ClientSignal, LineDecoder, ServerSignal, WireMessage, encode_signal};
use sunona_server::{Server, ServerConfig};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

const WAIT: Duration = Duration::from_secs(5);

async fn start_server(config: ServerConfig) -> String {
    let config = ServerConfig { bind_address: "127.0.0.1:0".to_string(), ..config };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: &str) -> ConnectedClient {
    let config = TransportConfig {
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        ..TransportConfig::default()
    };
    let mut client = transport::connect(addr, config);
    let event = timeout(WAIT, client.from_server.recv()).await.unwrap();
    assert_eq!(event, Some(TransportEvent::Connected));
    client
}

async fn next_signal(client: &mut ConnectedClient) -> ServerSignal {
    loop {
        match timeout(WAIT, client.from_server.recv()).await.unwrap() {
            Some(TransportEvent::Signal(signal)) => return signal,
            Some(_) => {},
            None => panic!("transport ended"),
        }
    }
}

/// Join `bob` first, then re-send Alice's join until Bob sees it.
async fn join_both(alice: &mut ConnectedClient, bob: &mut ConnectedClient) {
    bob.to_server.send(ClientSignal::JoinRoom("Bob".into())).await.unwrap();

    for _ in 0..50 {
        alice.to_server.send(ClientSignal::JoinRoom("Alice".into())).await.unwrap();
        if let Ok(Some(TransportEvent::Signal(ServerSignal::RoomNotice(name)))) =
            timeout(Duration::from_millis(100), bob.from_server.recv()).await
        {
            assert_eq!(name, "Alice");
            // Late notices from earlier attempts.
            while let Ok(Some(_)) =
                timeout(Duration::from_millis(50), bob.from_server.recv()).await
            {}
            return;
        }
    }
    panic!("Bob never saw Alice join");
}

async fn next_chat(client: &mut ConnectedClient) -> WireMessage {
    loop {
        if let ServerSignal::ChatMessage(message) = next_signal(client).await {
            return message;
        }
    }
}

#[tokio::test]
async fn chat_reaches_others_but_not_origin() {
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join_both(&mut alice, &mut bob).await;

    let hello = WireMessage::chat(1, "Alice", "hello", 10);
    alice.to_server.send(ClientSignal::ChatMessage(hello)).await.unwrap();

    let received = next_chat(&mut bob).await;
    assert_eq!(received.sender.as_deref(), Some("Alice"));
    assert_eq!(received.text, "hello");

    // Alice's first delivered chat must be Bob's reply, not her own echo.
    let reply = WireMessage::chat(2, "Bob", "hi Alice", 20);
    bob.to_server.send(ClientSignal::ChatMessage(reply)).await.unwrap();

    let received = next_chat(&mut alice).await;
    assert_eq!(received.sender.as_deref(), Some("Bob"));
    assert_eq!(received.text, "hi Alice");
}

#[tokio::test]
async fn typing_is_relayed_and_cleared_on_disconnect() {
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join_both(&mut alice, &mut bob).await;

    alice.to_server.send(ClientSignal::Typing("Alice".into())).await.unwrap();
    assert_eq!(next_signal(&mut bob).await, ServerSignal::Typing("Alice".into()));

    drop(alice);
    assert_eq!(next_signal(&mut bob).await, ServerSignal::StopTyping("Alice".into()));
}

#[tokio::test]
async fn malformed_lines_do_not_drop_the_connection() {
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join_both(&mut alice, &mut bob).await;

    let mut raw = TcpStream::connect(&addr).await.unwrap();
    raw.write_all(b"garbage\n{\"event\":\"nope\"}\n").await.unwrap();
    raw.write_all(&encode_signal(&ClientSignal::JoinRoom("Carol".into())).unwrap()).await.unwrap();

    assert_eq!(next_signal(&mut bob).await, ServerSignal::RoomNotice("Carol".into()));
}

#[tokio::test]
async fn connections_over_limit_are_closed() {
    let config = ServerConfig { max_connections: 1, ..ServerConfig::default() };
    let addr = start_server(config).await;

    let mut first = TcpStream::connect(&addr).await.unwrap();
    let join = encode_signal(&ClientSignal::JoinRoom("Alice".into())).unwrap();
    first.write_all(&join).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut second = TcpStream::connect(&addr).await.unwrap();
    let mut decoder = LineDecoder::default();
    let read = timeout(WAIT, second.read_buf(decoder.buffer_mut())).await.unwrap().unwrap();
    assert_eq!(read, 0);
}

//! Integration tests for the WebSocket transport.
//!
//! These spin up a real tokio-tungstenite server so the whole path —
//! URL validation, background handshake, frame pumping, close — is
//! exercised over an actual socket. The transport is poll-oriented, so
//! the tests poll its state with a bounded retry loop instead of
//! awaiting it.

#![cfg(feature = "websocket")]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use tether_transport::{Transport, TransportState, WebSocketTransport};

/// Starts a WebSocket server that echoes every text frame back.
/// Returns its address.
async fn echo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await
                else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    match msg {
                        Message::Text(text) => {
                            if ws.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
            });
        }
    });
    addr
}

/// Polls until the transport reports `expected`, panicking after ~5s.
async fn wait_for_state(transport: &WebSocketTransport, expected: TransportState) {
    for _ in 0..500 {
        if transport.state() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "transport never reached {expected:?}, still {:?}",
        transport.state()
    );
}

#[tokio::test]
async fn test_open_reaches_open_state() {
    let addr = echo_server().await;
    let transport = WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Open).await;
}

#[tokio::test]
async fn test_invalid_url_fails_immediately() {
    let result = WebSocketTransport::open("definitely not a url");
    assert!(result.is_err(), "malformed URL must be rejected up front");

    // A URL with no host cannot become a request either.
    let result = WebSocketTransport::open("ws://");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_echo_round_trip() {
    let addr = echo_server().await;
    let mut transport =
        WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Open).await;

    transport.send_text("hello".to_string()).unwrap();

    // The echo travels through the background task; poll for it.
    for _ in 0..500 {
        if transport.buffered() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(transport.try_receive().as_deref(), Some("hello"));
    assert_eq!(transport.buffered(), 0);
}

#[tokio::test]
async fn test_frames_arrive_in_order() {
    let addr = echo_server().await;
    let mut transport =
        WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Open).await;

    for i in 0..5 {
        transport.send_text(format!("frame-{i}")).unwrap();
    }
    for _ in 0..500 {
        if transport.buffered() >= 5 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    for i in 0..5 {
        assert_eq!(
            transport.try_receive().as_deref(),
            Some(format!("frame-{i}").as_str())
        );
    }
}

#[tokio::test]
async fn test_refused_connection_becomes_closed() {
    // Bind and immediately drop a listener so the port actively refuses.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let transport = WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Closed).await;
}

#[tokio::test]
async fn test_close_transitions_to_closed() {
    let addr = echo_server().await;
    let mut transport =
        WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Open).await;

    transport.close();
    wait_for_state(&transport, TransportState::Closed).await;
}

#[tokio::test]
async fn test_server_close_is_observed() {
    // A server that accepts the handshake and immediately hangs up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.close(None).await;
    });

    let transport = WebSocketTransport::open(&format!("ws://{addr}/ws")).unwrap();
    wait_for_state(&transport, TransportState::Closed).await;
}

//! WebSocket transport implementation using `tokio-tungstenite`.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use crate::{
    Connector, SharedQueue, StateCell, Transport, TransportError,
    TransportState,
};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// A client WebSocket connection driven by a background tokio task.
///
/// [`WebSocketTransport::open`] validates the URL synchronously and
/// spawns the task; the handshake and all later socket I/O happen
/// there. Handle and task share only the state cell, the inbound frame
/// queue, and the outbound channel, so every method on the handle
/// returns immediately.
///
/// Dropping the handle tells the task to close the socket and exit — a
/// discarded transport can never deliver another frame, which is what
/// makes "does the client still hold this handle" the authoritative
/// cancellation check.
pub struct WebSocketTransport {
    state: StateCell,
    inbound: SharedQueue<String>,
    outbound_tx: mpsc::UnboundedSender<String>,
    shutdown_tx: watch::Sender<bool>,
}

impl WebSocketTransport {
    /// Validates `url` and starts connecting in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Fails immediately with [`TransportError::InvalidUrl`] if `url`
    /// is not a well-formed WebSocket URL. Anything that goes wrong
    /// *after* initiation (refused connection, handshake failure,
    /// dropped socket) surfaces as the [`TransportState::Closed`] state
    /// instead.
    pub fn open(url: &str) -> Result<Self, TransportError> {
        let request = url
            .into_client_request()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let state = StateCell::new(TransportState::Connecting);
        let inbound = SharedQueue::new();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run_connection(
            request,
            state.clone(),
            inbound.clone(),
            outbound_rx,
            shutdown_rx,
        ));

        Ok(Self {
            state,
            inbound,
            outbound_tx,
            shutdown_tx,
        })
    }
}

impl Transport for WebSocketTransport {
    fn state(&self) -> TransportState {
        self.state.get()
    }

    fn buffered(&self) -> usize {
        self.inbound.len()
    }

    fn try_receive(&mut self) -> Option<String> {
        self.inbound.try_pop()
    }

    fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        self.outbound_tx
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if self.state.get() == TransportState::Open {
            self.state.set(TransportState::Closing);
        }
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Production [`Connector`] that opens [`WebSocketTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn open(&self, url: &str) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(WebSocketTransport::open(url)?))
    }
}

/// The background connection task: handshake, then pump frames both
/// ways until the peer goes away or the handle asks us to stop.
async fn run_connection(
    request: Request,
    state: StateCell,
    inbound: SharedQueue<String>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let ws: WsStream = tokio::select! {
        result = tokio_tungstenite::connect_async(request) => match result {
            Ok((ws, _)) => ws,
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket connect failed");
                state.set(TransportState::Closed);
                return;
            }
        },
        _ = shutdown_signalled(&mut shutdown_rx) => {
            state.set(TransportState::Closed);
            return;
        }
    };

    state.set(TransportState::Open);
    tracing::debug!("WebSocket connection established");

    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => inbound.push(text.to_string()),
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong and fragments are handled inside tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "WebSocket read failed");
                    break;
                }
            },
            queued = outbound_rx.recv() => match queued {
                Some(text) => {
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        tracing::debug!(error = %e, "WebSocket write failed");
                        break;
                    }
                }
                // Handle dropped without an explicit close.
                None => break,
            },
            _ = shutdown_signalled(&mut shutdown_rx) => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
        }
    }

    state.set(TransportState::Closed);
    tracing::debug!("WebSocket connection task finished");
}

/// Resolves once the handle has requested shutdown (even if the request
/// was sent before we started waiting).
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

//! The connection state machine.
//!
//! [`GameClient`] is synchronous and single-threaded by contract: the
//! game loop calls [`GameClient::poll`] once per tick, and every state
//! transition, deadline check, and message in either direction happens
//! inside that call. The only concurrency lives behind the
//! [`Transport`] seam.

use std::time::Instant;

use tracing::{debug, info, warn};

use tether_protocol::{
    Codec, ConnectResponse, Envelope, JsonCodec, MessageType, PlayerId,
};
use tether_transport::{Connector, Transport, TransportState};

#[cfg(feature = "websocket")]
use tether_transport::WsConnector;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{ClientEvent, EventBus, EventKind, SubscriptionId};

/// Client-side session with the game server.
///
/// Owns the transport, the outbound queue, the liveness timers, and the
/// subscriber registry. Drive it by calling [`GameClient::poll`] every
/// tick; it never blocks and never panics on remote misbehavior.
///
/// At most one connection at a time: calling [`GameClient::connect`]
/// while a previous transport is still around tears the old one down
/// first.
pub struct GameClient {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    codec: JsonCodec,

    /// `Some` from `connect` until teardown. Ownership doubles as the
    /// cancellation token: events from a transport we no longer hold
    /// cannot reach us, because we drain only the one we hold.
    transport: Option<Box<dyn Transport>>,
    outbound: OutboundQueue,
    events: EventBus,

    player_id: PlayerId,
    player_name: String,

    /// A `connect` was issued and neither Open nor failure has been
    /// observed yet.
    pending: bool,
    /// The current attempt reached Open at some point.
    was_connected: bool,
    connect_deadline: Option<Instant>,
    next_heartbeat: Option<Instant>,
    last_activity: Instant,
    heartbeat_failures: u32,
}

/// Pending outbound envelopes, flushed each tick while Open.
type OutboundQueue = std::collections::VecDeque<Envelope>;

impl GameClient {
    /// Creates a client that connects over WebSocket.
    #[cfg(feature = "websocket")]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, WsConnector)
    }

    /// Creates a client with a custom connector. Tests use this to
    /// substitute scripted transports.
    pub fn with_connector(
        config: ClientConfig,
        connector: impl Connector + 'static,
    ) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            codec: JsonCodec,
            transport: None,
            outbound: OutboundQueue::new(),
            events: EventBus::new(),
            player_id: PlayerId::UNASSIGNED,
            player_name: String::new(),
            pending: false,
            was_connected: false,
            connect_deadline: None,
            next_heartbeat: None,
            last_activity: Instant::now(),
            heartbeat_failures: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Registers a callback for one kind of event. Callbacks run
    /// synchronously inside [`GameClient::poll`].
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&ClientEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(kind, callback)
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Whether the transport is currently Open.
    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .is_some_and(|t| t.state() == TransportState::Open)
    }

    /// The server-assigned id, or [`PlayerId::UNASSIGNED`] before the
    /// `ConnectResponse` arrives.
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Consecutive heartbeats sent without any inbound frame since.
    pub fn heartbeat_failures(&self) -> u32 {
        self.heartbeat_failures
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Starts connecting to `address` (a `host:port` string) as
    /// `player_name`.
    ///
    /// Returns immediately; the outcome arrives as a [`ClientEvent`]
    /// from a later `poll`. If already connected this is a logged
    /// no-op. Any previous attempt, pending or established, is torn
    /// down silently first.
    ///
    /// # Errors
    /// Fails only when the connector rejects the address outright. The
    /// same failure is also reported as `Error` + `Disconnected` events
    /// so subscribers see one uniform stream.
    pub fn connect(
        &mut self,
        address: &str,
        player_name: &str,
    ) -> Result<(), ClientError> {
        if self.is_connected() {
            info!(address, "already connected; ignoring connect request");
            return Ok(());
        }
        self.disconnect();

        let url = format!("ws://{address}/ws");
        info!(%url, player_name, "connecting");

        match self.connector.open(&url) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.player_name = player_name.to_owned();
                self.pending = true;
                self.was_connected = false;
                self.heartbeat_failures = 0;
                self.connect_deadline =
                    Some(Instant::now() + self.config.connect_timeout);
                Ok(())
            }
            Err(err) => {
                warn!(%url, error = %err, "connection setup failed");
                self.events.emit(&ClientEvent::Error {
                    message: format!("connect failed: {err}"),
                });
                self.events.emit(&ClientEvent::Disconnected {
                    reason: "init failed".to_owned(),
                });
                Err(err.into())
            }
        }
    }

    /// Tears down the connection, if any. Emits nothing; an
    /// intentional disconnect is not an event.
    ///
    /// Invalidates any pending attempt: a transport abandoned here can
    /// no longer produce events, even if it reaches Open afterwards.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if !transport.state().is_terminal() {
                transport.close();
            }
            debug!("transport released");
        }
        self.player_id = PlayerId::UNASSIGNED;
        self.pending = false;
        self.was_connected = false;
        self.connect_deadline = None;
        self.next_heartbeat = None;
        self.heartbeat_failures = 0;
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    /// Queues an envelope for delivery on a subsequent `poll`.
    ///
    /// Queueing always succeeds; frames queued while not Open are
    /// dropped at flush time with a debug log, never an error.
    pub fn send(&mut self, envelope: Envelope) {
        self.outbound.push_back(envelope);
        self.last_activity = Instant::now();
    }

    /// Serializes `payload` under `kind` and queues it.
    ///
    /// # Errors
    /// Fails only if `payload` cannot be serialized.
    pub fn send_message<T: serde::Serialize>(
        &mut self,
        kind: MessageType,
        payload: &T,
    ) -> Result<(), ClientError> {
        let envelope = Envelope::new(kind, payload)?;
        self.send(envelope);
        Ok(())
    }

    /// Queues a position update for the local player.
    ///
    /// Dropped with a debug log until the server has assigned an id;
    /// a move from player 0 would confuse it.
    pub fn send_move(&mut self, x: f32, y: f32, direction: f32) {
        if !self.player_id.is_assigned() {
            debug!("no player id yet; dropping move");
            return;
        }
        match Envelope::player_move(self.player_id, x, y, direction) {
            Ok(envelope) => self.send(envelope),
            Err(err) => warn!(error = %err, "failed to encode move"),
        }
    }

    /// Queues a chat line from the local player. Dropped until an id
    /// is assigned, like [`GameClient::send_move`].
    pub fn send_chat(&mut self, text: &str) {
        if !self.player_id.is_assigned() {
            debug!("no player id yet; dropping chat message");
            return;
        }
        match Envelope::chat(self.player_id, text) {
            Ok(envelope) => self.send(envelope),
            Err(err) => warn!(error = %err, "failed to encode chat message"),
        }
    }

    // -----------------------------------------------------------------------
    // The tick
    // -----------------------------------------------------------------------

    /// Advances the state machine by one tick.
    ///
    /// In order: observe the transport state, check the connect
    /// deadline, run the heartbeat schedule, drain inbound frames,
    /// flush the outbound queue. Subscribers fire synchronously before
    /// this returns; the same events come back in the returned `Vec`
    /// for callers that prefer pull over push.
    pub fn poll(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        self.poll_transport_state(&mut events);
        self.check_connect_deadline(&mut events);
        self.check_heartbeat(&mut events);
        self.drain_inbound(&mut events);
        self.drain_outbound();

        for event in &events {
            self.events.emit(event);
        }
        events
    }

    fn poll_transport_state(&mut self, events: &mut Vec<ClientEvent>) {
        let Some(transport) = self.transport.as_ref() else {
            return;
        };
        match transport.state() {
            TransportState::Open if self.pending => {
                info!("connection established");
                self.pending = false;
                self.connect_deadline = None;
                self.was_connected = true;
                self.last_activity = Instant::now();
                self.next_heartbeat =
                    Some(Instant::now() + self.config.heartbeat_interval);
                events.push(ClientEvent::Connected);

                // Introduce ourselves before anything else goes out.
                match Envelope::connect_request(&self.player_name) {
                    Ok(envelope) => self.outbound.push_front(envelope),
                    Err(err) => warn!(error = %err, "failed to encode connect request"),
                }
            }
            TransportState::Open => {
                if self.last_activity.elapsed() > self.config.idle_timeout {
                    warn!(
                        idle_secs = self.last_activity.elapsed().as_secs(),
                        "connection idle too long; tearing down"
                    );
                    self.release_transport();
                }
            }
            TransportState::Closed => {
                if self.pending {
                    warn!("connection attempt failed");
                    events.push(ClientEvent::Error {
                        message: "unable to reach server".to_owned(),
                    });
                    events.push(ClientEvent::Disconnected {
                        reason: "connect failed".to_owned(),
                    });
                } else if self.was_connected {
                    info!("connection closed by server");
                    events.push(ClientEvent::Disconnected {
                        reason: "closed".to_owned(),
                    });
                }
                self.transport = None;
                self.pending = false;
                self.was_connected = false;
                self.connect_deadline = None;
                self.next_heartbeat = None;
            }
            TransportState::Connecting => {
                debug!("still connecting");
            }
            TransportState::Closing => {
                debug!("transport closing");
            }
        }
    }

    fn check_connect_deadline(&mut self, events: &mut Vec<ClientEvent>) {
        if !self.pending {
            return;
        }
        let Some(deadline) = self.connect_deadline else {
            return;
        };
        if Instant::now() < deadline {
            return;
        }
        warn!(
            timeout_secs = self.config.connect_timeout.as_secs(),
            "connection attempt timed out"
        );
        self.pending = false;
        self.connect_deadline = None;
        self.release_transport();
        events.push(ClientEvent::Error {
            message: "connection timed out".to_owned(),
        });
        events.push(ClientEvent::Disconnected {
            reason: "timeout".to_owned(),
        });
    }

    fn check_heartbeat(&mut self, events: &mut Vec<ClientEvent>) {
        let Some(due) = self.next_heartbeat else {
            return;
        };
        if Instant::now() < due {
            return;
        }
        self.next_heartbeat = Some(due + self.config.heartbeat_interval);

        if !(self.was_connected && self.is_connected()) {
            return;
        }

        // Count first: the heartbeat is provisionally a failure until
        // some inbound frame resets the counter.
        self.heartbeat_failures += 1;
        if self.heartbeat_failures >= self.config.max_heartbeat_failures {
            warn!(
                failures = self.heartbeat_failures,
                "heartbeats unacknowledged; closing connection"
            );
            self.release_transport();
            events.push(ClientEvent::HeartbeatTimeout);
            return;
        }

        debug!(failures = self.heartbeat_failures, "sending heartbeat");
        match Envelope::heartbeat(self.player_id, unix_millis()) {
            Ok(envelope) => self.outbound.push_back(envelope),
            Err(err) => warn!(error = %err, "failed to encode heartbeat"),
        }
    }

    fn drain_inbound(&mut self, events: &mut Vec<ClientEvent>) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let mut frames = Vec::new();
        while let Some(frame) = transport.try_receive() {
            frames.push(frame);
        }
        for frame in frames {
            self.last_activity = Instant::now();
            self.heartbeat_failures = 0;
            match self.codec.decode(&frame) {
                Ok(envelope) => {
                    self.apply_inbound(&envelope);
                    events.push(ClientEvent::MessageReceived(envelope));
                }
                Err(err) => {
                    warn!(error = %err, "dropping malformed frame");
                }
            }
        }
    }

    /// Side effects of specific inbound messages, before dispatch.
    fn apply_inbound(&mut self, envelope: &Envelope) {
        if envelope.message_type() != Some(MessageType::ConnectResponse) {
            return;
        }
        match envelope.payload::<ConnectResponse>() {
            Ok(response) => {
                if self.player_id.is_assigned() && self.player_id != response.player_id
                {
                    warn!(
                        old = %self.player_id,
                        new = %response.player_id,
                        "server reassigned player id"
                    );
                }
                self.player_id = response.player_id;
                info!(player_id = %self.player_id, "player id assigned");
            }
            Err(err) => warn!(error = %err, "bad connect response payload"),
        }
    }

    fn drain_outbound(&mut self) {
        while let Some(envelope) = self.outbound.pop_front() {
            let open = self
                .transport
                .as_ref()
                .is_some_and(|t| t.state() == TransportState::Open);
            if !open {
                debug!(kind = envelope.kind, "not connected; dropping outbound message");
                continue;
            }
            let frame = match self.codec.encode(&envelope) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(error = %err, "failed to encode outbound message");
                    continue;
                }
            };
            if let Some(transport) = self.transport.as_mut() {
                match transport.send_text(frame) {
                    Ok(()) => self.last_activity = Instant::now(),
                    Err(err) => warn!(error = %err, "failed to send frame"),
                }
            }
        }
    }

    /// Drops the transport without emitting anything. Used where the
    /// caller already reports the outcome (or deliberately does not:
    /// the idle guard and heartbeat exhaustion speak for themselves).
    fn release_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if !transport.state().is_terminal() {
                transport.close();
            }
        }
        self.was_connected = false;
        self.next_heartbeat = None;
    }
}

/// Wall-clock milliseconds since the epoch, for heartbeat stamps.
fn unix_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

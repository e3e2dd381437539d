//! Console client: connects to a server, introduces itself, says one
//! chat line, and logs everything it receives until disconnected.
//!
//! ```text
//! console-client [address] [player-name]
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tether::prelude::*;
use tether_tick::TickScheduler;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_else(|| "localhost:8080".to_owned());
    let name = args.next().unwrap_or_else(|| "console".to_owned());

    let mut client = GameClient::new(ClientConfig::default());
    let done = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&done);
    client.subscribe(EventKind::Disconnected, move |event| {
        if let ClientEvent::Disconnected { reason } = event {
            info!(%reason, "disconnected");
            flag.store(true, Ordering::SeqCst);
        }
    });
    client.subscribe(EventKind::Error, |event| {
        if let ClientEvent::Error { message } = event {
            warn!(%message, "client error");
        }
    });
    client.subscribe(EventKind::MessageReceived, |event| {
        if let ClientEvent::MessageReceived(envelope) = event {
            log_message(envelope);
        }
    });

    if client.connect(&address, &name).is_err() {
        return;
    }

    let mut scheduler = TickScheduler::with_rate(30);
    let mut greeted = false;
    while !done.load(Ordering::SeqCst) {
        scheduler.wait_for_tick().await;
        client.poll();

        if !greeted && client.player_id().is_assigned() {
            client.send_chat("hello from the console client");
            greeted = true;
        }
    }
}

fn log_message(envelope: &Envelope) {
    match envelope.message_type() {
        Some(MessageType::ConnectResponse) => {
            if let Ok(response) = envelope.payload::<ConnectResponse>() {
                info!(
                    player_id = %response.player_id,
                    x = response.x as f64,
                    y = response.y as f64,
                    "joined world"
                );
            }
        }
        Some(MessageType::ChatMessage) => {
            if let Ok(chat) = envelope.payload::<ChatMessage>() {
                info!(from = %chat.player_id, text = %chat.text, "chat");
            }
        }
        Some(MessageType::PlayerJoin) => {
            if let Ok(join) = envelope.payload::<PlayerJoin>() {
                info!(player = %join.player.id, name = %join.player.name, "player joined");
            }
        }
        Some(MessageType::PlayerLeave) => {
            if let Ok(leave) = envelope.payload::<PlayerLeave>() {
                info!(player = %leave.player_id, "player left");
            }
        }
        Some(MessageType::WorldState) => {
            if let Ok(state) = envelope.payload::<WorldState>() {
                info!(players = state.players.len(), "world state");
            }
        }
        Some(MessageType::Heartbeat) => {}
        _ => {
            info!(kind = envelope.kind, "message");
        }
    }
}

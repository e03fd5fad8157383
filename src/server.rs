//! WebSocket room relay.
//!
//! Each socket gets a connection id and an outbound channel. Inbound frames
//! are decoded and handed to the [`RoomManager`]; the resulting deliveries are
//! pushed onto the recipients' channels.

use crate::rooms::{ConnectionId, Delivery, RoomManager};
use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use bughouse_core::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Relay {
    rooms: RoomManager,
    peers: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Relay {
    fn dispatch(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, message } in deliveries {
            match self.peers.get(&to) {
                Some(tx) => {
                    if tx.send(message).is_err() {
                        debug!(conn = to, "Peer channel closed");
                    }
                }
                None => debug!(conn = to, "No peer for delivery"),
            }
        }
    }
}

/// Shared server state.
#[derive(Debug, Clone, Default)]
pub struct RelayServer {
    relay: Arc<Mutex<Relay>>,
    next_id: Arc<AtomicU64>,
}

impl RelayServer {
    /// Creates a server with no rooms.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating relay server");
        Self::default()
    }

    /// Axum router with the WebSocket endpoint at `/`.
    pub fn router(self) -> Router {
        Router::new().route("/", get(ws_handler)).with_state(self)
    }

    /// Binds `host:port` and serves until the process exits.
    #[instrument(skip(self))]
    pub async fn serve(self, host: &str, port: u16) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind((host, port)).await?;
        info!("Room server ready at ws://{}:{}/", host, port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    fn connect(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[instrument(skip(self, text))]
    async fn on_frame(&self, conn: ConnectionId, text: &str) {
        let mut relay = self.relay.lock().await;
        let deliveries = match ClientMessage::decode(text) {
            Ok(message) => relay.rooms.handle(conn, message).unwrap_or_else(|e| {
                debug!(error = %e, "Request refused");
                vec![Delivery {
                    to: conn,
                    message: ServerMessage::Error {
                        message: e.to_string(),
                    },
                }]
            }),
            Err(e) => {
                warn!(error = %e, "Bad frame");
                vec![Delivery {
                    to: conn,
                    message: ServerMessage::Error {
                        message: format!("Bad message: {}", e),
                    },
                }]
            }
        };
        relay.dispatch(deliveries);
    }
}

async fn ws_handler(State(server): State<RelayServer>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(server, socket))
}

#[instrument(skip_all)]
async fn handle_socket(server: RelayServer, socket: WebSocket) {
    let conn = server.connect();
    info!(conn, "Client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    server.relay.lock().await.peers.insert(conn, tx);

    let forward = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match message.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => server.on_frame(conn, text.as_str()).await,
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    {
        let mut relay = server.relay.lock().await;
        relay.peers.remove(&conn);
        let deliveries = relay.rooms.leave(conn);
        relay.dispatch(deliveries);
    }
    forward.abort();
    info!(conn, "Client disconnected");
}

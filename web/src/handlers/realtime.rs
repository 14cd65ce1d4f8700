//! WebSocket channel for live slot updates.
//!
//! A client opens `/api/ws`, joins the rooms of the experts it is viewing and
//! receives a `slotBooked` frame whenever one of their slots is reserved.
//!
//! # Message Protocol
//!
//! **Client → Server:**
//! ```json
//! { "type": "joinExpertRoom", "expertId": "…" }
//! { "type": "leaveExpertRoom", "expertId": "…" }
//! { "type": "ping" }
//! ```
//!
//! **Server → Client:**
//! ```json
//! { "type": "joined", "expertId": "…" }
//! { "type": "left", "expertId": "…" }
//! { "type": "slotBooked", "expertId": "…", "date": "…", "timeSlot": "…", "booking": { … } }
//! { "type": "pong" }
//! { "type": "error", "message": "Invalid expert ID format" }
//! ```

use crate::{AppError, AppState};
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use expert_booking_core::{
    BookingLedger, ConnectionId, ExpertCatalog, ExpertId, SlotBooked, SlotStore,
    SubscriptionRegistry,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Start receiving events for an expert
    JoinExpertRoom {
        /// Expert to watch
        #[serde(rename = "expertId")]
        expert_id: String,
    },
    /// Stop receiving events for an expert
    LeaveExpertRoom {
        /// Expert to stop watching
        #[serde(rename = "expertId")]
        expert_id: String,
    },
    /// Application-level keep-alive
    Ping,
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Join acknowledged
    Joined {
        /// Expert now watched
        #[serde(rename = "expertId")]
        expert_id: ExpertId,
    },
    /// Leave acknowledged
    Left {
        /// Expert no longer watched
        #[serde(rename = "expertId")]
        expert_id: ExpertId,
    },
    /// A watched expert's slot was reserved
    SlotBooked(SlotBooked),
    /// Reply to `ping`
    Pong,
    /// The last client frame could not be applied
    Error {
        /// What went wrong
        message: String,
    },
}

impl ServerMessage {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// `GET /api/ws`: upgrade to the real-time channel.
///
/// Refuses with 503 once `max_connections` connections are open.
pub async fn realtime_handler<E, L>(
    State(state): State<AppState<E, L>>,
    ws: WebSocketUpgrade,
) -> Response
where
    E: SlotStore + ExpertCatalog + 'static,
    L: BookingLedger + 'static,
{
    let open = state.registry.connection_count();
    if open >= state.max_connections {
        warn!(open, limit = state.max_connections, "Refusing real-time connection");
        metrics::counter!("realtime_connections_refused_total").increment(1);
        return AppError::unavailable("Too many real-time connections").into_response();
    }

    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn handle_socket(socket: WebSocket, registry: Arc<SubscriptionRegistry>) {
    let mut subscriber = registry.connect();
    let connection_id = subscriber.id();
    info!(%connection_id, "Real-time connection established");

    let (mut sender, mut receiver) = socket.split();

    loop {
        let outgoing = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => Some(apply_client_frame(&registry, connection_id, &text)),
                Some(Ok(Message::Binary(_))) => {
                    warn!(%connection_id, "Received unexpected binary message");
                    Some(ServerMessage::error("Binary frames are not supported"))
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => None,
                Some(Ok(Message::Close(_))) | None => {
                    debug!(%connection_id, "Client closed the connection");
                    break;
                }
                Some(Err(e)) => {
                    debug!(%connection_id, error = %e, "Real-time connection failed");
                    break;
                }
            },
            event = subscriber.recv() => match event {
                Some(event) => Some(ServerMessage::SlotBooked(SlotBooked::clone(&event))),
                None => {
                    debug!(%connection_id, "Registry closed the connection");
                    break;
                }
            },
        };

        let Some(outgoing) = outgoing else {
            continue;
        };
        let frame = match serde_json::to_string(&outgoing) {
            Ok(json) => Message::Text(json),
            Err(e) => {
                error!(error = %e, "Failed to serialize real-time frame");
                continue;
            }
        };
        if sender.send(frame).await.is_err() {
            break;
        }
    }

    registry.disconnect(connection_id);
    info!(%connection_id, "Real-time connection closed");
}

/// Apply one client text frame to the registry and build the reply.
fn apply_client_frame(
    registry: &SubscriptionRegistry,
    connection_id: ConnectionId,
    text: &str,
) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            debug!(%connection_id, error = %e, "Unrecognized real-time frame");
            return ServerMessage::error("Unrecognized message");
        }
    };

    match message {
        ClientMessage::JoinExpertRoom { expert_id } => {
            let Ok(expert_id) = expert_id.trim().parse::<ExpertId>() else {
                return ServerMessage::error("Invalid expert ID format");
            };
            match registry.subscribe(connection_id, expert_id) {
                Ok(_) => ServerMessage::Joined { expert_id },
                Err(e) => ServerMessage::error(e.to_string()),
            }
        }
        ClientMessage::LeaveExpertRoom { expert_id } => {
            let Ok(expert_id) = expert_id.trim().parse::<ExpertId>() else {
                return ServerMessage::error("Invalid expert ID format");
            };
            match registry.unsubscribe(connection_id, expert_id) {
                Ok(_) => ServerMessage::Left { expert_id },
                Err(e) => ServerMessage::error(e.to_string()),
            }
        }
        ClientMessage::Ping => ServerMessage::Pong,
    }
}

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    TODOS_ROOM,
    message::{ClientMessage, Notification, ServerMessage},
    rooms::{ConnectionId, OutboundSender, Rooms},
};
use crate::AppState;

/// Per-connection loop: register in the todos room, then shuttle between the
/// outbound multicast queue and the inbound socket until either side closes.
pub async fn handle(socket: WebSocket, state: AppState) {
    let connection_id: ConnectionId = Uuid::new_v4();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let rooms = state.rooms().clone();

    // Every connection lands in the todos room immediately.
    rooms.join(TODOS_ROOM, connection_id, outbound_tx.clone());
    tracing::debug!(%connection_id, "client connected");

    let (mut sender, mut inbound) = socket.split();

    let welcome =
        ServerMessage::Notification(Notification::success("Connected to TodoList real-time updates"));
    if send_message(&mut sender, &welcome).await.is_err() {
        rooms.remove_connection(connection_id);
        return;
    }

    loop {
        tokio::select! {
            maybe_outbound = outbound_rx.recv() => {
                match maybe_outbound {
                    Some(message) => {
                        if send_message(&mut sender, &message).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            maybe_inbound = inbound.next() => {
                match maybe_inbound {
                    Some(Ok(msg)) => {
                        if matches!(msg, Message::Close(_)) {
                            break;
                        }
                        if let Message::Text(text) = msg {
                            match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(message) => {
                                    handle_client_message(message, connection_id, &rooms, &outbound_tx);
                                }
                                Err(error) => {
                                    tracing::debug!(?error, "invalid inbound message");
                                }
                            }
                        }
                    }
                    Some(Err(error)) => {
                        tracing::debug!(?error, "websocket receive error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    rooms.remove_connection(connection_id);
    tracing::debug!(%connection_id, "client disconnected");
}

fn handle_client_message(
    message: ClientMessage,
    connection_id: ConnectionId,
    rooms: &Rooms,
    outbound: &OutboundSender,
) {
    let reply = match message {
        ClientMessage::JoinTodoRoom => {
            rooms.join(TODOS_ROOM, connection_id, outbound.clone());
            tracing::debug!(%connection_id, "client joined todos room");
            Notification::info("Joined todo updates room")
        }
        ClientMessage::LeaveTodoRoom => {
            rooms.leave(TODOS_ROOM, connection_id);
            tracing::debug!(%connection_id, "client left todos room");
            Notification::info("Left todo updates room")
        }
        ClientMessage::Ping => Notification::info("pong"),
    };

    // The reply goes to the sender only, even when it just left the room.
    let _ = outbound.send(ServerMessage::Notification(reply));
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ()> {
    match serde_json::to_string(message) {
        Ok(json) => sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|error| {
                tracing::debug!(?error, "failed to send websocket message");
            }),
        Err(error) => {
            tracing::error!(?error, "failed to serialise websocket message");
            Err(())
        }
    }
}

use axum::{
    Router,
    extract::{State, ws::WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::AppState;

pub mod fanout;
pub mod message;
pub mod rooms;
mod session;

/// The only multicast room in scope.
pub const TODOS_ROOM: &str = "todos";

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(upgrade))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::handle(socket, state))
}

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::app_state::AppState;

/// Streams scheduling events to connected dashboards. Read-only: inbound
/// frames are drained and dropped.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: axum::extract::ws::WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.notifier.subscribe();

    let drain_task = tokio::spawn(async move {
        while let Some(Ok(_)) = receiver.next().await {}
    });

    let send_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = drain_task => {},
        _ = send_task => {},
    }
}

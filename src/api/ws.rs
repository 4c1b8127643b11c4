//! `/ws/battery-data` streaming feed.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use chrono::Utc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::AppState;
use super::types::StreamFrame;

pub async fn battery_feed(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| client_loop(socket, state))
}

/// Sends one frame per interval until the client leaves or a send fails.
async fn client_loop(mut socket: WebSocket, state: Arc<AppState>) {
    let id = state.registry.register();
    info!(id, active = state.registry.len(), "feed client connected");

    let mut ticker = time::interval(state.stream_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let battery_data = state.service.generate_snapshot();
                let prediction = state.service.predict(&battery_data);
                let frame = StreamFrame {
                    timestamp: Utc::now(),
                    battery_data,
                    prediction,
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(id, error = %err, "failed to serialise feed frame");
                        continue;
                    }
                };
                if let Err(err) = socket.send(Message::Text(text.into())).await {
                    debug!(id, error = %err, "feed send failed");
                    break;
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(id, error = %err, "feed receive failed");
                        break;
                    }
                }
            }
        }
    }

    state.registry.deregister(id);
    info!(id, active = state.registry.len(), "feed client disconnected");
}

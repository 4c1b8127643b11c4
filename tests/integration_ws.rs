//! End-to-end tests for the WebSocket feed.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use battery_diag::api::{AppState, router};

async fn spawn_server() -> (String, Arc<AppState>) {
    let mut config = common::seeded_config(11);
    config.stream.interval_ms = 20;
    let state = Arc::new(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://{addr}/ws/battery-data"), state)
}

async fn wait_for_connections(state: &AppState, expected: usize) {
    for _ in 0..100 {
        if state.registry.len() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} connections, registry has {}",
        state.registry.len()
    );
}

#[tokio::test]
async fn feed_streams_snapshot_and_prediction_frames() {
    let (url, state) = spawn_server().await;
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

    let mut frames = 0;
    while frames < 3 {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("frame within timeout")
            .expect("stream open")
            .unwrap();
        let Message::Text(text) = msg else { continue };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["battery_data"]["batteries"].as_array().unwrap().len(), 3);
        assert_eq!(
            json["prediction"]["battery_predictions"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
        frames += 1;
    }

    assert!(state.service.history_len() >= 3);
    socket.close(None).await.unwrap();
}

#[tokio::test]
async fn closing_client_is_deregistered() {
    let (url, state) = spawn_server().await;

    let (mut first, _) = connect_async(url.as_str()).await.unwrap();
    let (second, _) = connect_async(url.as_str()).await.unwrap();
    wait_for_connections(&state, 2).await;

    first.close(None).await.unwrap();
    wait_for_connections(&state, 1).await;

    drop(second);
    wait_for_connections(&state, 0).await;
}

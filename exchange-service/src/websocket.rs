//! WebSocket handler for real-time order event streaming.
//!
//! Each connection gets its own broadcast receiver, so per-subscriber event
//! order matches commit order. Uses tokio::select! for concurrent handling
//! of incoming frames, event delivery, and heartbeats.

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::types::WsMessage;
use crate::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Streams order events to one subscriber until it disconnects, errors, or
/// falls too far behind the broadcast channel. Cleanup is automatic: the
/// receiver is dropped when this function returns.
pub async fn handle_stream(socket: WebSocket, filter: Option<String>, state: AppState) {
    match &filter {
        Some(symbol) => info!("new event stream subscriber for {}", symbol),
        None => info!("new event stream subscriber (all symbols)"),
    }

    let (mut sender, mut receiver) = socket.split();
    let mut events = state.exchange.subscribe();
    let mut ping_interval = interval(PING_INTERVAL);

    loop {
        tokio::select! {
            // Handle incoming WebSocket frames.
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(WsMessage::Ping { timestamp }) =
                            serde_json::from_str::<WsMessage>(&text)
                        {
                            let pong = WsMessage::Pong { timestamp };
                            if let Ok(json) = serde_json::to_string(&pong) {
                                let _ = sender.send(Message::Text(json)).await;
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {} // Ignore binary
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) => {} // Ignore pong
                    Some(Ok(Message::Close(_))) => {
                        info!("event stream connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("websocket error in event stream: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            // Forward order events, optionally filtered by symbol.
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if filter.as_deref().is_some_and(|s| s != event.symbol) {
                            continue;
                        }
                        let msg = WsMessage::OrderEvent(event);
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                warn!("failed to deliver order event, dropping subscriber");
                                break;
                            }
                        }
                    }
                    // Channel closed, or this subscriber lagged past the
                    // channel capacity; either way it is dropped.
                    Err(_) => break,
                }
            }

            // Periodic heartbeat.
            _ = ping_interval.tick() => {
                let ping = WsMessage::Ping { timestamp: unix_millis() };
                if let Ok(json) = serde_json::to_string(&ping) {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break; // Connection broken
                    }
                }
            }
        }
    }

    info!("event stream handler ended");
}

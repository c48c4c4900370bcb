//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::dtos::{WsClientEventDTO, WsEventDTO};
use crate::entities::UserId;
use crate::ws::usermap::InternalSignal;
use crate::ws::{RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use crate::AppState;
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Duration;
use tokio::time::{interval, timeout};
use tracing::{error, info, instrument, warn};

#[instrument(skip(ws, state))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: UserId) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale interno: il dispatcher delle notifiche scrive qui
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(&user_id, int_tx.clone());

    tokio::spawn(listen_ws(user_id.clone(), ws_rx, int_tx, state));
    tokio::spawn(write_ws(user_id, ws_tx, int_rx));
}

async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &WsEventDTO,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize event: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await
}

#[instrument(skip(websocket_tx, internal_rx))]
pub async fn write_ws(
    user_id: UserId,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
) {
    info!("Write task started");

    while let Some(signal) = internal_rx.recv().await {
        match signal {
            InternalSignal::Shutdown => {
                info!("Shutdown signal received");
                break;
            }
            InternalSignal::Error(err_msg) => {
                warn!(error_message = err_msg, "Sending error message to client");
                let event = WsEventDTO::Error {
                    code: 400,
                    message: err_msg.to_string(),
                };
                if let Err(e) = send_event(&mut websocket_tx, &event).await {
                    error!("Failed to send error message: {:?}", e);
                    break;
                }
            }
            InternalSignal::Notification(notification) => {
                info!(invite_id = %notification.invite_id, "Pushing notification to client");
                if let Err(e) = send_event(&mut websocket_tx, &WsEventDTO::Notification(notification)).await {
                    error!("Failed to send notification: {:?}", e);
                    break;
                }
            }
        }
    }

    let _ = websocket_tx.close().await;
    info!("Write task terminated");
}

#[instrument(skip(websocket_rx, internal_tx, state))]
pub async fn listen_ws(
    user_id: UserId,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<WsClientEventDTO>(&text) {
                        Ok(WsClientEventDTO::MarkRead { ids }) => {
                            if let Err(e) = state.notification.mark_read(&user_id, &ids).await {
                                warn!("Failed to mark notifications as read: {}", e);
                                let _ = internal_tx
                                    .send(InternalSignal::Error("Could not mark notifications as read"));
                            }
                        }
                        Err(_) => {
                            warn!("Failed to deserialize client event");
                            let _ = internal_tx.send(InternalSignal::Error("Unknown event"));
                        }
                    },
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(timeout_secs = TIMEOUT_DURATION_SECONDS, "Connection timeout");
                break;
            }
        }
    }

    // Cleanup
    info!("Cleaning up connection");
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id, &internal_tx);
    info!("Listen task terminated");
}

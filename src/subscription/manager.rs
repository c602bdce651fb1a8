use crate::state::{AggregatedView, ViewEngine};
use crate::subscription::protocol::{ClientMessage, ViewMessage};
use axum::extract::ws::{Message, WebSocket};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Manages a single WebSocket connection with device-tag subscriptions
pub struct ConnectionManager {
    /// Device tags this connection is watching (empty = all devices)
    watched: HashSet<String>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            watched: HashSet::new(),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(mut self, mut socket: WebSocket, engine: Arc<ViewEngine>) {
        info!("WebSocket connection established");

        let mut view_rx = engine.subscribe();

        // Push the current view up front so the consumer never renders blank
        // while waiting for the next upstream message
        let current = engine.current();
        if let Err(e) = self.send_view(&mut socket, &current).await {
            warn!(error = %e, "Failed to send initial view");
            return;
        }

        loop {
            tokio::select! {
                // Handle incoming client messages
                Some(msg) = socket.recv() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            if let Err(e) = self.handle_client_message(&text) {
                                error!(error = %e, "Error handling client message");
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Ok(Message::Ping(data)) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Ok(_) => {
                            // Ignore binary, pong messages
                        }
                        Err(e) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward published views from the broadcast channel
                result = view_rx.recv() => {
                    match result {
                        Ok(view) => {
                            if let Err(e) = self.send_view(&mut socket, &view).await {
                                error!(error = %e, "Failed to send view update");
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Intermediate views are superseded anyway; the
                            // next received one is the latest
                            warn!(skipped = skipped, "WebSocket lagged, skipped views");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("View broadcast channel closed");
                            break;
                        }
                    }
                }

                else => {
                    break;
                }
            }
        }

        info!("WebSocket connection closed");
    }

    /// Handle client message (subscribe/unsubscribe)
    fn handle_client_message(&mut self, text: &str) -> anyhow::Result<()> {
        let msg: ClientMessage = serde_json::from_str(text)?;

        match msg {
            ClientMessage::Subscribe { device_tag } => {
                info!(device_tag = %device_tag, "Client watching device");
                self.watched.insert(device_tag);
            }
            ClientMessage::Unsubscribe { device_tag } => {
                info!(device_tag = %device_tag, "Client stopped watching device");
                self.watched.remove(&device_tag);
            }
        }

        Ok(())
    }

    /// Send one view to the client, projected for this connection
    async fn send_view(&self, socket: &mut WebSocket, view: &AggregatedView) -> anyhow::Result<()> {
        let msg = ViewMessage::project(view, &self.watched);
        let json = serde_json::to_string(&msg)?;
        socket.send(Message::Text(json)).await?;
        Ok(())
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Persistent relay channel
//!
//! Maintains a long-lived WebSocket connection to the relay for real-time
//! sync. Handles reconnection automatically with exponential backoff.
//!
//! On each successful connect the task hands the owner a fresh outbound
//! sender via [`ChannelEvent::Connected`]; everything pushed into it is
//! encoded and written to the socket, and every decodable frame read from
//! the socket comes back as [`ChannelEvent::Remote`]. Frames that fail to
//! decode are logged and dropped.

use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::client::SyncStatus;
use crate::protocol::SyncMessage;

/// Commands sent to the channel task
#[derive(Debug, Clone)]
pub enum ChannelCommand {
    /// Close the connection and stop the task
    Shutdown,
}

/// Events emitted by the channel task
#[derive(Debug)]
pub enum ChannelEvent {
    /// Connected to the relay; push local messages into the sender
    Connected(mpsc::UnboundedSender<SyncMessage>),
    /// Connection lost; the last `Connected` sender is dead
    Disconnected,
    /// A peer's message arrived
    Remote(SyncMessage),
}

/// Configuration for the relay channel
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// WebSocket URL of the relay
    pub url: String,
    /// Initial reconnect delay
    pub initial_reconnect_delay: Duration,
    /// Maximum reconnect delay
    pub max_reconnect_delay: Duration,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

/// Handle to control and monitor the channel task
pub struct ChannelHandle {
    /// Send commands to the channel task
    pub command_tx: mpsc::Sender<ChannelCommand>,
    /// Receive events from the channel task
    pub event_rx: mpsc::Receiver<ChannelEvent>,
    /// Watch connection status
    pub status_rx: watch::Receiver<SyncStatus>,
}

/// Spawn a relay channel task
///
/// Returns a handle to control and monitor the task. The task will
/// automatically reconnect on disconnection.
pub fn spawn_channel(config: ChannelConfig) -> ChannelHandle {
    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let (status_tx, status_rx) = watch::channel(SyncStatus::Disconnected);

    tokio::spawn(channel_task_loop(config, command_rx, event_tx, status_tx));

    ChannelHandle {
        command_tx,
        event_rx,
        status_rx,
    }
}

/// Main channel task loop with reconnection
async fn channel_task_loop(
    config: ChannelConfig,
    mut command_rx: mpsc::Receiver<ChannelCommand>,
    event_tx: mpsc::Sender<ChannelEvent>,
    status_tx: watch::Sender<SyncStatus>,
) {
    let peer_id = format!("listsync-{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let mut reconnect_delay = config.initial_reconnect_delay;

    loop {
        match run_connection(&config, &peer_id, &mut command_rx, &event_tx, &status_tx).await {
            Ok(should_shutdown) => {
                if should_shutdown {
                    let _ = status_tx.send(SyncStatus::Disconnected);
                    break;
                }
                // Connection closed normally, reset backoff
                reconnect_delay = config.initial_reconnect_delay;
            }
            Err(e) => {
                tracing::debug!(peer_id = %peer_id, error = %e, "Relay connection failed");
            }
        }

        let _ = status_tx.send(SyncStatus::Disconnected);
        let _ = event_tx.send(ChannelEvent::Disconnected).await;

        // Wait before reconnecting, but check for shutdown command
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {
                // Exponential backoff
                reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(ChannelCommand::Shutdown) | None => break,
                }
            }
        }
    }
}

/// Connect and shuttle messages until disconnection or shutdown
///
/// Returns `Ok(true)` on shutdown, `Ok(false)` when the connection closed
/// and the task should reconnect.
async fn run_connection(
    config: &ChannelConfig,
    peer_id: &str,
    command_rx: &mut mpsc::Receiver<ChannelCommand>,
    event_tx: &mpsc::Sender<ChannelEvent>,
    status_tx: &watch::Sender<SyncStatus>,
) -> Result<bool> {
    let (ws_stream, _) = connect_async(&config.url).await?;
    let (mut write, mut read) = ws_stream.split();

    // The clone goes to the owner; keeping the original alive here means
    // outbound_rx never closes while this connection runs.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<SyncMessage>();
    let _ = status_tx.send(SyncStatus::Connected);
    let _ = event_tx
        .send(ChannelEvent::Connected(outbound_tx.clone()))
        .await;
    tracing::info!(peer_id = %peer_id, url = %config.url, "Connected to relay");

    loop {
        tokio::select! {
            // Drain queued local messages before reacting to anything else,
            // so a shutdown right after a mutation still flushes it
            biased;

            Some(msg) = outbound_rx.recv() => {
                write.send(Message::Text(msg.encode())).await?;
            }

            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match SyncMessage::decode(&text) {
                            Ok(msg) => {
                                let _ = event_tx.send(ChannelEvent::Remote(msg)).await;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Ignoring undecodable relay frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Ok(false);
                    }
                    Some(Err(e)) => {
                        return Err(e.into());
                    }
                    _ => {}
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(ChannelCommand::Shutdown) | None => {
                        write.close().await.ok();
                        return Ok(true);
                    }
                }
            }
        }
    }
}

//! Relay server
//!
//! Stateless WebSocket fan-out: every text or binary frame a client sends
//! is forwarded verbatim to every other connected client. The relay never
//! parses, validates, or stores list content, so clients with divergent
//! lists exchange messages through it without it taking a side.
//!
//! Each connection gets an unbounded outbound queue drained by its own
//! writer task; a slow client therefore never blocks broadcast to the
//! others.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

type ConnId = u64;
type Registry = Arc<Mutex<HashMap<ConnId, mpsc::UnboundedSender<Message>>>>;

/// WebSocket fan-out server
pub struct RelayServer {
    listener: TcpListener,
    connections: Registry,
    next_id: AtomicU64,
}

impl RelayServer {
    /// Bind the relay to a listen address
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind relay to {}", addr))?;
        Ok(Self {
            listener,
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        })
    }

    /// The address the relay is actually listening on
    ///
    /// Useful when bound to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to get relay listen address")
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "Relay listening");

        loop {
            let (stream, addr) = self
                .listener
                .accept()
                .await
                .context("Failed to accept connection")?;
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let connections = Arc::clone(&self.connections);
            tokio::spawn(handle_connection(id, stream, addr, connections));
        }
    }
}

/// Serve one client until it disconnects
async fn handle_connection(
    id: ConnId,
    stream: TcpStream,
    addr: SocketAddr,
    connections: Registry,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(%addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };
    tracing::info!(conn = id, %addr, "Client connected");

    let (mut write, mut read) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    if let Ok(mut conns) = connections.lock() {
        conns.insert(id, tx);
    }

    // Writer task: drain this connection's outbound queue
    let outbound = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = read.next().await {
        match msg {
            Ok(msg @ Message::Text(_)) | Ok(msg @ Message::Binary(_)) => {
                broadcast_from(id, msg, &connections);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Ping/pong handled by tungstenite
            }
            Err(e) => {
                tracing::debug!(conn = id, error = %e, "Read error");
                break;
            }
        }
    }

    if let Ok(mut conns) = connections.lock() {
        conns.remove(&id);
    }
    outbound.abort();
    tracing::info!(conn = id, %addr, "Client disconnected");
}

/// Forward a frame to every connection except the sender
fn broadcast_from(sender: ConnId, msg: Message, connections: &Registry) {
    if let Ok(conns) = connections.lock() {
        for (&id, tx) in conns.iter() {
            if id == sender {
                continue;
            }
            // A dead receiver is cleaned up by its own connection task
            let _ = tx.send(msg.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;

    type WsStream =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

    async fn start_relay() -> String {
        let relay = RelayServer::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", relay.local_addr().unwrap());
        tokio::spawn(relay.run());
        url
    }

    async fn connect(url: &str) -> WsStream {
        let (stream, _) = connect_async(url).await.unwrap();
        stream
    }

    async fn expect_text(stream: &mut WsStream) -> String {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("read error");
        match msg {
            Message::Text(text) => text,
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    async fn expect_silence(stream: &mut WsStream) {
        let result = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
        assert!(result.is_err(), "expected no frame, got {:?}", result);
    }

    #[tokio::test]
    async fn test_fan_out_excludes_sender() {
        let url = start_relay().await;
        let mut a = connect(&url).await;
        let mut b = connect(&url).await;
        let mut c = connect(&url).await;

        // Let the relay register all three before broadcasting
        tokio::time::sleep(Duration::from_millis(100)).await;

        a.send(Message::Text(r#"{"action":"remove","id":1}"#.into()))
            .await
            .unwrap();

        assert_eq!(expect_text(&mut b).await, r#"{"action":"remove","id":1}"#);
        assert_eq!(expect_text(&mut c).await, r#"{"action":"remove","id":1}"#);
        expect_silence(&mut a).await;
    }

    #[tokio::test]
    async fn test_frames_forwarded_verbatim() {
        let url = start_relay().await;
        let mut a = connect(&url).await;
        let mut b = connect(&url).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        // The relay does not care whether the payload is a valid message
        a.send(Message::Text("not a sync message".into()))
            .await
            .unwrap();
        assert_eq!(expect_text(&mut b).await, "not a sync message");
    }

    #[tokio::test]
    async fn test_disconnect_does_not_break_others() {
        let url = start_relay().await;
        let mut a = connect(&url).await;
        let b = connect(&url).await;
        let mut c = connect(&url).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        drop(b);
        tokio::time::sleep(Duration::from_millis(100)).await;

        a.send(Message::Text("still flowing".into())).await.unwrap();
        assert_eq!(expect_text(&mut c).await, "still flowing");
    }

    #[tokio::test]
    async fn test_messages_flow_both_ways() {
        let url = start_relay().await;
        let mut a = connect(&url).await;
        let mut b = connect(&url).await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        a.send(Message::Text("from a".into())).await.unwrap();
        assert_eq!(expect_text(&mut b).await, "from a");

        b.send(Message::Text("from b".into())).await.unwrap();
        assert_eq!(expect_text(&mut a).await, "from b");
    }
}

//! Scoreboard server listener
//!
//! Handles TCP accept loop and spawns connection handlers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;
use crate::registry::SessionRegistry;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::dispatch::Dispatcher;

/// Scoreboard server
pub struct ScoreServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    next_connection_id: AtomicU64,
}

impl ScoreServer {
    /// Create a server driving `registry`
    pub fn new(config: ServerConfig, registry: Arc<SessionRegistry>) -> Self {
        let dispatcher = Dispatcher::from_config(registry, &config);

        Self {
            config,
            dispatcher: Arc::new(dispatcher),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.dispatcher.registry()
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails to bind.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Scoreboard server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Scoreboard server listening");

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            connection_id = connection_id,
            peer = %peer_addr,
            "New connection"
        );

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let mut connection = Connection::new(
            connection_id,
            socket,
            peer_addr,
            Arc::clone(&self.dispatcher),
            self.config.send_state_on_connect,
            self.config.max_line_length,
        );

        tokio::spawn(async move {
            if let Err(e) = connection.run().await {
                tracing::debug!(
                    connection_id = connection_id,
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(connection_id = connection_id, "Connection closed");
        });
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::sync::oneshot;

    use super::*;
    use crate::game::Phase;
    use crate::server::protocol::Reply;

    struct Client {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl Client {
        async fn connect(addr: SocketAddr) -> Self {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (reader, writer) = stream.into_split();
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn send(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn recv(&mut self) -> Reply {
            let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
                .await
                .expect("timed out waiting for reply")
                .unwrap()
                .expect("connection closed");
            serde_json::from_str(&line).unwrap()
        }
    }

    async fn start() -> (SocketAddr, Arc<SessionRegistry>, oneshot::Sender<()>) {
        start_with(ServerConfig::default()).await
    }

    async fn start_with(
        config: ServerConfig,
    ) -> (SocketAddr, Arc<SessionRegistry>, oneshot::Sender<()>) {
        let registry = Arc::new(SessionRegistry::new());
        let server = Arc::new(ScoreServer::new(config, Arc::clone(&registry)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        (addr, registry, stop_tx)
    }

    #[tokio::test]
    async fn test_updates_fan_out_to_all_clients() {
        let (addr, registry, _stop) = start().await;
        let mut scorer = Client::connect(addr).await;
        let mut viewer = Client::connect(addr).await;

        // Make sure both connections are subscribed before mutating
        scorer.send(r#"{"type":"getGameState"}"#).await;
        assert!(matches!(scorer.recv().await, Reply::Error { .. }));
        viewer.send(r#"{"type":"getGameState"}"#).await;
        assert!(matches!(viewer.recv().await, Reply::Error { .. }));

        scorer
            .send(r#"{"type":"createGame","p1Name":"Ana","p2Name":"Ben","maxScore":11,"serving":1}"#)
            .await;
        assert!(matches!(scorer.recv().await, Reply::GameState { .. }));
        assert!(matches!(viewer.recv().await, Reply::GameState { .. }));

        scorer.send(r#"{"type":"incrementScore","player":2}"#).await;
        for client in [&mut scorer, &mut viewer] {
            match client.recv().await {
                Reply::GameState { state } => {
                    assert_eq!(state.p2_score, vec![0, 1]);
                    assert_eq!(state.phase, Phase::InProgress);
                }
                other => panic!("unexpected reply: {:?}", other),
            }
        }

        assert!(registry.is_active().await);
    }

    #[tokio::test]
    async fn test_errors_only_reach_sender() {
        let (addr, _registry, _stop) = start().await;
        let mut scorer = Client::connect(addr).await;
        let mut viewer = Client::connect(addr).await;

        scorer.send("{ not json").await;
        match scorer.recv().await {
            Reply::Error { message } => assert!(message.starts_with("Malformed message")),
            other => panic!("unexpected reply: {:?}", other),
        }

        scorer.send(r#"{"type":"undo"}"#).await;
        assert!(matches!(scorer.recv().await, Reply::Error { .. }));

        // The viewer sees nothing until it asks
        viewer.send(r#"{"type":"getWinner"}"#).await;
        match viewer.recv().await {
            Reply::Error { message } => assert_eq!(message, "No active game session"),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_joiner_receives_state() {
        let (addr, registry, _stop) = start().await;
        let handle = registry
            .create(crate::game::SessionConfig::new("Ana", "Ben"))
            .await;
        handle.increment(1).await.unwrap();

        let mut late = Client::connect(addr).await;
        match late.recv().await {
            Reply::GameState { state } => assert_eq!(state.p1_score, vec![0, 1]),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overlong_line_disconnects() {
        let (addr, registry, _stop) = start_with(ServerConfig::default().max_line_length(64)).await;
        let mut client = Client::connect(addr).await;

        // A line right at the limit is still accepted
        let create = r#"{"type":"createGame","p1Name":"Ana","p2Name":"Ben"}"#;
        let padded = format!("{}{}", create, " ".repeat(64 - create.len()));
        client.send(&padded).await;
        assert!(matches!(client.recv().await, Reply::GameState { .. }));

        client.writer.write_all(&[b'x'; 65]).await.unwrap();
        match client.recv().await {
            Reply::Error { message } => assert_eq!(message, "Line exceeds 64 bytes"),
            other => panic!("unexpected reply: {:?}", other),
        }

        let closed = tokio::time::timeout(Duration::from_secs(5), client.lines.next_line())
            .await
            .expect("timed out waiting for disconnect")
            .unwrap();
        assert!(closed.is_none());
        assert!(registry.is_active().await);
    }
}

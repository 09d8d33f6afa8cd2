//! Per-client connection handling
//!
//! Reads commands line by line, answers queries to the sender only, and
//! relays the dispatcher's broadcast of state changes to the client.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::error::Result;

use super::dispatch::{Delivery, Dispatcher};
use super::protocol::{Command, Reply};

/// One connected scoreboard client
pub struct Connection {
    id: u64,
    peer_addr: SocketAddr,
    socket: Option<TcpStream>,
    dispatcher: Arc<Dispatcher>,
    send_state_on_connect: bool,
    max_line_length: usize,
}

impl Connection {
    pub(super) fn new(
        id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        send_state_on_connect: bool,
        max_line_length: usize,
    ) -> Self {
        Self {
            id,
            peer_addr,
            socket: Some(socket),
            dispatcher,
            send_state_on_connect,
            max_line_length,
        }
    }

    /// Serve the client until it disconnects
    pub async fn run(&mut self) -> Result<()> {
        let Some(socket) = self.socket.take() else {
            return Ok(());
        };
        let (reader, mut writer) = socket.into_split();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        // Subscribe before anything is dispatched so our own updates echo back
        let (mut rx, state) = self.dispatcher.subscribe().await;

        if self.send_state_on_connect {
            if let Some(reply) = state {
                writer.write_all(&reply.to_frame()?).await?;
            }
        }

        loop {
            tokio::select! {
                inbound = read_line(&mut reader, &mut buf, self.max_line_length) => match inbound? {
                    Inbound::Line(line) => self.on_line(line.trim(), &mut writer).await?,
                    Inbound::TooLong => {
                        tracing::warn!(
                            connection_id = self.id,
                            peer = %self.peer_addr,
                            limit = self.max_line_length,
                            "Command line too long, disconnecting"
                        );
                        let reply = Reply::Error {
                            message: format!("Line exceeds {} bytes", self.max_line_length),
                        };
                        writer.write_all(&reply.to_frame()?).await?;
                        writer.shutdown().await?;
                        break;
                    }
                    Inbound::Eof => break,
                },
                update = rx.recv() => match update {
                    Ok(frame) => writer.write_all(&frame).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            connection_id = self.id,
                            peer = %self.peer_addr,
                            skipped = skipped,
                            "Client lagging, resending current state"
                        );
                        self.send_current_state(&mut writer).await?;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        Ok(())
    }

    async fn on_line(&self, line: &str, writer: &mut OwnedWriteHalf) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(connection_id = self.id, error = %e, "Malformed command");
                let reply = Reply::Error {
                    message: e.to_string(),
                };
                writer.write_all(&reply.to_frame()?).await?;
                return Ok(());
            }
        };

        match self.dispatcher.submit(command).await? {
            // Our own receiver delivers it back to this client
            Delivery::Broadcast { .. } => {}
            Delivery::Direct(frame) => writer.write_all(&frame).await?,
        }

        Ok(())
    }

    async fn send_current_state(&self, writer: &mut OwnedWriteHalf) -> Result<()> {
        if let Some(reply) = self.dispatcher.current_state().await {
            writer.write_all(&reply.to_frame()?).await?;
        }
        Ok(())
    }
}

/// Result of reading one command line
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    Line(String),
    TooLong,
    Eof,
}

/// Read one newline-terminated line of at most `max` bytes
///
/// Bytes read so far stay in `buf`, so a call cancelled by `select!` picks
/// up where it left off. A final line without a newline is still returned.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, max: usize) -> std::io::Result<Inbound>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        // One byte past the limit is enough to tell an overlong line apart
        let budget = (max + 1).saturating_sub(buf.len()) as u64;
        let read = (&mut *reader).take(budget).read_until(b'\n', buf).await?;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            let line = String::from_utf8_lossy(buf).into_owned();
            buf.clear();
            return Ok(Inbound::Line(line));
        }
        if buf.len() > max {
            buf.clear();
            return Ok(Inbound::TooLong);
        }
        if read == 0 {
            if buf.is_empty() {
                return Ok(Inbound::Eof);
            }
            let line = String::from_utf8_lossy(buf).into_owned();
            buf.clear();
            return Ok(Inbound::Line(line));
        }
    }
}

//! Server configuration

use std::net::SocketAddr;

use crate::game::ServeIntervals;

/// Default scoreboard port
pub const DEFAULT_PORT: u16 = 4100;

/// Default limit on one inbound command line, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Frames buffered per client before it is considered lagging
    pub broadcast_capacity: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Send the current state to clients as they connect
    pub send_state_on_connect: bool,

    /// Longest accepted command line, excluding the newline
    pub max_line_length: usize,

    /// Serve interval table applied to sessions created over the wire
    pub serve_intervals: ServeIntervals,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            broadcast_capacity: 64,
            tcp_nodelay: true, // Score updates are tiny and latency sensitive
            send_state_on_connect: true,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            serve_intervals: ServeIntervals::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the per-client broadcast buffer (minimum 1)
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }

    /// Do not push the current state to new clients
    pub fn disable_state_on_connect(mut self) -> Self {
        self.send_state_on_connect = false;
        self
    }

    /// Set the longest accepted command line (minimum 1)
    ///
    /// Clients sending a longer line get an error and are disconnected.
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes.max(1);
        self
    }

    /// Set the serve interval table
    pub fn serve_intervals(mut self, intervals: ServeIntervals) -> Self {
        self.serve_intervals = intervals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.broadcast_capacity, 64);
        assert!(config.tcp_nodelay);
        assert!(config.send_state_on_connect);
        assert_eq!(config.max_line_length, 64 * 1024);
        assert_eq!(config.serve_intervals, ServeIntervals::default());
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:4200".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 4200);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:4100".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .broadcast_capacity(0)
            .disable_state_on_connect()
            .max_line_length(0)
            .serve_intervals(ServeIntervals::uniform(3));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.broadcast_capacity, 1);
        assert!(!config.send_state_on_connect);
        assert_eq!(config.max_line_length, 1);
        assert_eq!(config.serve_intervals.interval_for(21), 3);
    }
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use crate::inbound::http::state::DEFAULT_DEADLINE;
use crate::settings::Settings;

const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) read_timeout: Duration,
    pub(crate) write_timeout: Duration,
    pub(crate) max_header_bytes: usize,
}

impl ServerConfig {
    /// Listen on `bind_addr` with default timeouts and header limit.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            read_timeout: DEFAULT_DEADLINE,
            write_timeout: DEFAULT_DEADLINE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }

    /// Time allowed for request headers to arrive.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Time allowed for a request to be served.
    ///
    /// Also bounds every service call made by a handler.
    #[must_use]
    pub const fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Largest accepted total header size in bytes.
    #[must_use]
    pub const fn with_max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the per-request service deadline.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Return the header size limit.
    #[must_use]
    pub const fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }
}

impl From<&Settings> for ServerConfig {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.bind_addr())
            .with_read_timeout(settings.read_timeout())
            .with_write_timeout(settings.write_timeout())
            .with_max_header_bytes(settings.server_max_header_bytes)
    }
}

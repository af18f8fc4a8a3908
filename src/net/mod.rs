//! Administrative socket transport.
//!
//! # Data Flow
//! ```text
//! ReconcileEngine
//!     → AdminChannel::ensure_available (preflight, once)
//!     → AdminChannel::execute("show stat")            read path
//!     → AdminChannel::execute("get weight ...; ...")  write path (composite)
//!
//! Each execute():
//!     connect → write "<cmd>\n" → read until EOF → close
//! ```
//!
//! # Design Decisions
//! - One connection per command line; nothing is pooled or reused
//! - No retries: a broken admin socket is a misconfiguration
//! - Read timeout is optional and off by default; the peer ends the stream

pub mod socket;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use socket::SocketTransport;

/// Errors raised while talking to the admin socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Nothing exists at the configured socket path.
    #[error("unable to locate haproxy socket at {path}")]
    NotFound { path: PathBuf },

    /// The path exists but is not a Unix domain socket.
    #[error("{path} is not a unix socket")]
    NotASocket { path: PathBuf },

    /// Connecting to the socket failed (refused, permission denied, ...).
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sending or receiving failed after the connection was established.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The peer did not close the stream within the configured read timeout.
    #[error("no response from {path} within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },
}

/// A command/response channel to the load balancer's runtime API.
///
/// Implemented by [`SocketTransport`]; tests substitute recording channels.
pub trait AdminChannel: Send + Sync {
    /// Check that the endpoint can be reached at all.
    fn ensure_available(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send one command line and return the full response.
    fn execute(&self, command: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

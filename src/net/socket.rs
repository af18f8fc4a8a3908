//! Unix stream socket transport.
//!
//! # Responsibilities
//! - Open a fresh connection per command line
//! - Write the command followed by a newline
//! - Read until the peer closes the stream
//! - Close the connection on every exit path (drop)

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::Instrument;
use uuid::Uuid;

use crate::net::{AdminChannel, TransportError};

/// Default location of the HAProxy admin socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/haproxy.sock";

/// Talks to a local admin socket, one round trip per command line.
#[derive(Debug, Clone)]
pub struct SocketTransport {
    path: PathBuf,
    read_timeout: Option<Duration>,
}

impl SocketTransport {
    /// Create a transport for the socket at `path` without a read timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_timeout: None,
        }
    }

    /// Bound each round trip by `timeout`.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// The configured socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn round_trip(&self, command: &str) -> Result<String, TransportError> {
        let mut stream = UnixStream::connect(&self.path)
            .await
            .map_err(|source| TransportError::Connect {
                path: self.path.clone(),
                source,
            })?;

        let line = format!("{}\n", command);
        stream
            .write_all(line.as_bytes())
            .await
            .map_err(|source| self.io_error(source))?;

        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .await
            .map_err(|source| self.io_error(source))?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn io_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for SocketTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

impl AdminChannel for SocketTransport {
    async fn ensure_available(&self) -> Result<(), TransportError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => TransportError::NotFound {
                    path: self.path.clone(),
                },
                _ => TransportError::Connect {
                    path: self.path.clone(),
                    source,
                },
            })?;

        if !metadata.file_type().is_socket() {
            return Err(TransportError::NotASocket {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    async fn execute(&self, command: &str) -> Result<String, TransportError> {
        let span = tracing::debug_span!(
            "exchange",
            exchange_id = %Uuid::new_v4(),
            socket = %self.path.display(),
        );

        async move {
            tracing::debug!(command, "Sending admin command");

            let response = match self.read_timeout {
                Some(limit) => tokio::time::timeout(limit, self.round_trip(command))
                    .await
                    .map_err(|_| TransportError::Timeout {
                        path: self.path.clone(),
                        timeout: limit,
                    })??,
                None => self.round_trip(command).await?,
            };

            tracing::trace!(bytes = response.len(), "Admin response received");
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::UnixListener;

    fn temp_socket_path() -> PathBuf {
        std::env::temp_dir().join(format!("haproxy-reconcile-{}.sock", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_execute_reads_until_eof() {
        let path = temp_socket_path();
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut line = String::new();
            BufReader::new(read).read_line(&mut line).await.unwrap();
            // Respond in two writes to make sure the client keeps reading.
            write.write_all(b"1 (initial ").await.unwrap();
            write.write_all(b"1)\n").await.unwrap();
            write.shutdown().await.unwrap();
            line
        });

        let transport = SocketTransport::new(&path);
        let response = transport.execute("get weight www/web1").await.unwrap();
        assert_eq!(response, "1 (initial 1)\n");
        assert_eq!(server.await.unwrap(), "get weight www/web1\n");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_missing_socket_is_not_found() {
        let transport = SocketTransport::new(temp_socket_path());
        let err = transport.ensure_available().await.unwrap_err();
        assert!(matches!(err, TransportError::NotFound { .. }));

        let err = transport.execute("show stat").await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_regular_file_is_not_a_socket() {
        let path = std::env::temp_dir().join(format!("haproxy-reconcile-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"not a socket").unwrap();

        let transport = SocketTransport::new(&path);
        let err = transport.ensure_available().await.unwrap_err();
        assert!(matches!(err, TransportError::NotASocket { .. }));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let path = temp_socket_path();
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Hold the stream open without answering.
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let transport = SocketTransport::new(&path).with_read_timeout(Some(Duration::from_millis(100)));
        let err = transport.execute("show stat").await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert!(err.to_string().ends_with("within 100ms"));

        server.abort();
        std::fs::remove_file(&path).unwrap_or_default();
    }
}

//! One-shot exchanges with the HAProxy admin socket.
//!
//! # Responsibilities
//! - Connect to the Unix stream socket with a bounded deadline
//! - Send one CRLF-terminated command and collect the reply until EOF
//! - Release the connection on every exit path
//!
//! # Design Decisions
//! - Every connect and every read is wrapped in the same timeout
//! - Failures are reported, never retried; the caller aborts the run
//! - `Drop` releases a connection the caller forgot to close

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::error::{AutoscaleError, AutoscaleResult};

/// Default deadline for connecting and for each read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default location of the HAProxy admin socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/haproxy.sock";

const READ_CHUNK: usize = 4096;

/// A scoped connection to the admin socket.
///
/// A session owns at most one stream. `close` is idempotent and safe to call
/// on a session whose `open` failed.
#[derive(Debug)]
pub struct AdminSession {
    path: PathBuf,
    timeout: Duration,
    stream: Option<UnixStream>,
}

impl AdminSession {
    /// Create a session for `path` without connecting yet.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            stream: None,
        }
    }

    /// Create a session and connect it.
    pub async fn connect(path: impl Into<PathBuf>, timeout: Duration) -> AutoscaleResult<Self> {
        let mut session = Self::new(path, timeout);
        session.open().await?;
        Ok(session)
    }

    /// Establish the connection. Reopening an open session is a no-op.
    pub async fn open(&mut self) -> AutoscaleResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match timeout(self.timeout, UnixStream::connect(&self.path)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(AutoscaleError::ConnectionFailed {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(AutoscaleError::ConnectionTimeout {
                    path: self.path.clone(),
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        tracing::debug!(path = %self.path.display(), "Admin session opened");
        self.stream = Some(stream);
        Ok(())
    }

    /// Send `command` and return everything the peer writes before closing.
    pub async fn call(&mut self, command: &str) -> AutoscaleResult<String> {
        let deadline = self.timeout;
        let stream = self.stream.as_mut().ok_or_else(|| AutoscaleError::ConnectionFailed {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotConnected, "admin session is not open"),
        })?;

        let request = format!("{command}\r\n");
        match timeout(deadline, stream.write_all(request.as_bytes())).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AutoscaleError::ResponseTimeout {
                    timeout_secs: deadline.as_secs(),
                })
            }
        }

        let mut response = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = match timeout(deadline, stream.read(&mut chunk)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(AutoscaleError::ResponseTimeout {
                        timeout_secs: deadline.as_secs(),
                    })
                }
            };
            if read == 0 {
                break;
            }
            response.extend_from_slice(&chunk[..read]);
        }

        tracing::debug!(command, bytes = response.len(), "Admin command answered");
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    /// Release the connection. Safe to call repeatedly.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            tracing::debug!(path = %self.path.display(), "Admin session closed");
        }
    }

    /// Whether the session currently holds a connection.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Socket path this session targets.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AdminSession {
    fn drop(&mut self) {
        if self.stream.take().is_some() {
            tracing::trace!(path = %self.path.display(), "Admin session dropped while open");
        }
    }
}

/// Open a session, run one command, and close it whatever the outcome.
pub async fn exchange(path: &Path, deadline: Duration, command: &str) -> AutoscaleResult<String> {
    let mut session = AdminSession::connect(path, deadline).await?;
    let response = session.call(command).await;
    session.close().await;
    response
}

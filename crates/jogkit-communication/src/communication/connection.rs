//! Connection lifecycle
//!
//! [`ConnectionManager::open`] opens the port, offering the operator a retry
//! when access is denied. The resulting [`Connection`] owns the transport and
//! releases it exactly once: either through [`Connection::close`] or when it
//! is dropped.

use super::{ConnectionParams, Transport, TransportFactory};
use async_trait::async_trait;
use jogkit_core::ConnectionError;
use std::io;
use std::time::Duration;

/// Default pause before re-attempting a denied port
pub const DEFAULT_CONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Asks the operator whether to retry after access to the port was denied
#[async_trait]
pub trait RetryPrompt: Send {
    /// Return `true` to retry, `false` to give up
    async fn confirm_retry(&mut self, error: &ConnectionError) -> bool;
}

/// An exclusively-owned, open link to the controller
pub struct Connection {
    port: String,
    read_timeout: Duration,
    write_timeout: Duration,
    transport: Option<Box<dyn Transport>>,
}

impl Connection {
    /// Wrap an already opened transport
    pub fn new(params: &ConnectionParams, transport: Box<dyn Transport>) -> Self {
        Self {
            port: params.port.clone(),
            read_timeout: params.read_timeout,
            write_timeout: params.write_timeout,
            transport: Some(transport),
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        let port = &self.port;
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| ConnectionError::NotOpen { port: port.clone() })?;

        transport
            .write_all(data)
            .map_err(|e| ConnectionError::WriteFailed {
                port: port.clone(),
                reason: e.to_string(),
            })
    }

    pub(crate) fn read_available(&mut self) -> io::Result<Vec<u8>> {
        match self.transport.as_mut() {
            Some(transport) => transport.read_available(),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("{} is not open", self.port),
            )),
        }
    }

    /// Close the link. Later calls are no-ops.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            match transport.close() {
                Ok(()) => tracing::info!("Closed {}", self.port),
                Err(e) => tracing::warn!("Error while closing {}: {}", self.port, e),
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("port", &self.port)
            .field("open", &self.is_open())
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

/// Opens connections, retrying denied ports when the operator agrees
pub struct ConnectionManager<F> {
    factory: F,
    backoff: Duration,
}

impl<F: TransportFactory> ConnectionManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            backoff: DEFAULT_CONNECT_BACKOFF,
        }
    }

    /// Pause between a confirmed retry and the next attempt
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Open the port described by `params`.
    ///
    /// Access-denied failures ask `prompt` and, on confirmation, wait the
    /// backoff and try again for as long as the operator keeps agreeing. A
    /// refusal yields [`ConnectionError::RetryDeclined`]. Any other failure
    /// is returned immediately.
    pub async fn open(
        &mut self,
        params: &ConnectionParams,
        prompt: &mut dyn RetryPrompt,
    ) -> Result<Connection, ConnectionError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tracing::info!(
                "Opening {} at {} baud (attempt {})",
                params.port,
                params.baud_rate,
                attempt
            );

            match self.factory.open(params) {
                Ok(transport) => {
                    tracing::info!("Connected to controller on {}", params.port);
                    return Ok(Connection::new(params, transport));
                }
                Err(err) if err.is_access_denied() => {
                    tracing::warn!("{}", err);
                    if !prompt.confirm_retry(&err).await {
                        tracing::info!("Retry declined, not connecting to {}", params.port);
                        return Err(ConnectionError::RetryDeclined {
                            port: params.port.clone(),
                        });
                    }
                    tracing::info!("Retrying in {:?}...", self.backoff);
                    tokio::time::sleep(self.backoff).await;
                }
                Err(err) => {
                    tracing::error!("{}", err);
                    return Err(err);
                }
            }
        }
    }
}

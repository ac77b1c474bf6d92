//! Raw TCP transport (JetDirect style, usually port 9100).

use super::{PrinterTransport, TransportConfig, millis};
use crate::error::{PrinterError, Result};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Shutdown is best effort; a printer that stopped reading must not hang
/// the station.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    endpoint: String,
    write_timeout: Duration,
}

impl TcpTransport {
    /// Connect to `addr` (`host:port`).
    ///
    /// The socket is configured with TCP_NODELAY so small jobs leave at once.
    pub async fn connect(addr: &str, config: TransportConfig) -> Result<Self> {
        let endpoint = format!("tcp://{addr}");
        debug!(%endpoint, "connecting");

        let stream = match tokio::time::timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(PrinterError::connection_failed(endpoint, e)),
            Err(_) => {
                return Err(PrinterError::ConnectTimeout {
                    endpoint,
                    duration_ms: millis(config.connect_timeout),
                });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!(%endpoint, "Failed to set TCP_NODELAY: {}", e);
        }

        Ok(Self {
            stream: Some(stream),
            endpoint,
            write_timeout: config.write_timeout,
        })
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or_else(|| PrinterError::Closed {
            endpoint: self.endpoint.clone(),
        })
    }
}

impl PrinterTransport for TcpTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let timeout = self.write_timeout;
        let endpoint = self.endpoint.clone();
        let stream = self.stream()?;

        match tokio::time::timeout(timeout, stream.write_all(data)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PrinterError::write_failed(endpoint, e)),
            Err(_) => Err(PrinterError::WriteTimeout {
                endpoint,
                duration_ms: millis(timeout),
            }),
        }
    }

    async fn flush(&mut self) -> Result<()> {
        let timeout = self.write_timeout;
        let endpoint = self.endpoint.clone();
        let stream = self.stream()?;

        match tokio::time::timeout(timeout, stream.flush()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PrinterError::write_failed(endpoint, e)),
            Err(_) => Err(PrinterError::WriteTimeout {
                endpoint,
                duration_ms: millis(timeout),
            }),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, stream.shutdown()).await {
                Ok(Ok(())) => debug!(endpoint = %self.endpoint, "connection closed"),
                Ok(Err(e)) => warn!(endpoint = %self.endpoint, "Error during shutdown: {}", e),
                Err(_) => warn!(
                    endpoint = %self.endpoint,
                    "Shutdown timeout during close ({}ms)",
                    SHUTDOWN_TIMEOUT.as_millis()
                ),
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

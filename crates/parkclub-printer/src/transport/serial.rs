//! Serial transport.
//!
//! Covers RS-232 printers and Bluetooth SPP printers bound to an RFCOMM tty.
//! `serialport` is blocking, so every call runs on the blocking pool and the
//! port is moved in and back out of the closure.

use super::{PrinterTransport, TransportConfig, millis};
use crate::error::{PrinterError, Result};
use serialport::SerialPort;
use std::io::{ErrorKind, Write};
use std::time::Duration;
use tracing::debug;

pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    endpoint: String,
    write_timeout: Duration,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("endpoint", &self.endpoint)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl SerialTransport {
    /// Open `path` at `baud_rate`.
    pub async fn connect(path: &str, baud_rate: u32, config: TransportConfig) -> Result<Self> {
        let endpoint = format!("serial:{path}@{baud_rate}");
        debug!(%endpoint, "opening serial port");

        let owned_path = path.to_string();
        let write_timeout = config.write_timeout;
        let open = tokio::task::spawn_blocking(move || {
            serialport::new(owned_path, baud_rate)
                .timeout(write_timeout)
                .open()
        });

        let port = match tokio::time::timeout(config.connect_timeout, open).await {
            Ok(Ok(Ok(port))) => port,
            Ok(Ok(Err(e))) => return Err(PrinterError::connection_failed(endpoint, e)),
            Ok(Err(join)) => return Err(PrinterError::connection_failed(endpoint, join)),
            Err(_) => {
                return Err(PrinterError::ConnectTimeout {
                    endpoint,
                    duration_ms: millis(config.connect_timeout),
                });
            }
        };

        Ok(Self {
            port: Some(port),
            endpoint,
            write_timeout,
        })
    }

    /// Run a blocking operation on the port and put the port back.
    async fn with_port<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Box<dyn SerialPort>) -> std::io::Result<()> + Send + 'static,
    {
        let mut port = self.port.take().ok_or_else(|| PrinterError::Closed {
            endpoint: self.endpoint.clone(),
        })?;

        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut port);
            (port, result)
        })
        .await
        .map_err(|e| PrinterError::write_failed(self.endpoint.clone(), e))?;

        self.port = Some(port);
        result.map_err(|e| match e.kind() {
            ErrorKind::TimedOut => PrinterError::WriteTimeout {
                endpoint: self.endpoint.clone(),
                duration_ms: millis(self.write_timeout),
            },
            _ => PrinterError::write_failed(self.endpoint.clone(), e),
        })
    }
}

impl PrinterTransport for SerialTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let data = data.to_vec();
        self.with_port(move |port| port.write_all(&data)).await
    }

    async fn flush(&mut self) -> Result<()> {
        self.with_port(|port| port.flush()).await
    }

    async fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!(endpoint = %self.endpoint, "serial port closed");
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

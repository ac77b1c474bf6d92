//! Byte transports to the printer.
//!
//! A transport is one open connection: write the job, flush, close. The
//! [`PrinterTransport`] trait uses native `async fn`, which is not object
//! safe, so [`AnyTransport`] provides enum dispatch over the concrete
//! transports.

#![allow(async_fn_in_trait)]

pub mod file;
pub mod serial;
pub mod tcp;

pub use file::FileTransport;
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use crate::endpoint::Endpoint;
use crate::error::Result;
use std::time::Duration;

/// Timeouts applied to every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Timeout for opening the connection
    pub connect_timeout: Duration,

    /// Timeout for each write or flush
    pub write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            write_timeout: Duration::from_millis(5000),
        }
    }
}

/// An open connection to a printer.
pub trait PrinterTransport: Send {
    /// Write the whole buffer.
    async fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Flush buffered bytes to the device.
    async fn flush(&mut self) -> Result<()>;

    /// Close the connection. Calling it twice is safe.
    async fn close(&mut self) -> Result<()>;

    /// Endpoint text for logs and errors.
    fn describe(&self) -> String;
}

/// Enum wrapper for transport dispatch.
#[derive(Debug)]
pub enum AnyTransport {
    Tcp(TcpTransport),
    Serial(SerialTransport),
    File(FileTransport),
}

impl AnyTransport {
    /// Open a connection to `endpoint`.
    pub async fn connect(endpoint: &Endpoint, config: TransportConfig) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp { addr } => Ok(Self::Tcp(TcpTransport::connect(addr, config).await?)),
            Endpoint::Serial { path, baud_rate } => Ok(Self::Serial(
                SerialTransport::connect(path, *baud_rate, config).await?,
            )),
            Endpoint::File { path } => Ok(Self::File(FileTransport::open(path, config).await?)),
        }
    }
}

impl PrinterTransport for AnyTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(t) => t.write_all(data).await,
            Self::Serial(t) => t.write_all(data).await,
            Self::File(t) => t.write_all(data).await,
        }
    }

    async fn flush(&mut self) -> Result<()> {
        match self {
            Self::Tcp(t) => t.flush().await,
            Self::Serial(t) => t.flush().await,
            Self::File(t) => t.flush().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Tcp(t) => t.close().await,
            Self::Serial(t) => t.close().await,
            Self::File(t) => t.close().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Tcp(t) => t.describe(),
            Self::Serial(t) => t.describe(),
            Self::File(t) => t.describe(),
        }
    }
}

/// Duration in whole milliseconds, for error payloads.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

//! Ticket printer with endpoint fallback.
//!
//! A print job is a complete ESC/POS byte buffer. [`TicketPrinter`] tries
//! each configured endpoint in order until one connects, then writes the
//! whole job, flushes, waits for the printer to drain its buffer and closes
//! the connection.
//!
//! Fallback only covers connecting. Once a connection is open the job is
//! committed to that endpoint: a write error is returned as is, since part of
//! the ticket may already be on paper.

#![allow(async_fn_in_trait)]

use crate::endpoint::Endpoint;
use crate::error::{PrinterError, Result};
use crate::transport::{AnyTransport, PrinterTransport, TransportConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default wait between flushing a job and closing the connection.
///
/// Bluetooth printers in particular drop whatever is still in flight when
/// the link is torn down.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Default connect timeout per endpoint.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default write timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Something that can print a finished job.
pub trait Printer {
    /// Print a complete job.
    async fn print(&self, job: &[u8]) -> Result<()>;
}

/// Printer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Endpoints in fallback order
    pub endpoints: Vec<Endpoint>,

    /// Connect timeout per endpoint in milliseconds
    pub connect_timeout_ms: u64,

    /// Write timeout in milliseconds
    pub write_timeout_ms: u64,

    /// Wait after flush before closing, in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            connect_timeout_ms: duration_ms(DEFAULT_CONNECT_TIMEOUT),
            write_timeout_ms: duration_ms(DEFAULT_WRITE_TIMEOUT),
            settle_delay_ms: duration_ms(DEFAULT_SETTLE_DELAY),
        }
    }
}

impl PrinterConfig {
    /// Create a config with the given endpoints and default timings.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            ..Default::default()
        }
    }

    /// Append a fallback endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout_ms = duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = duration_ms(delay);
        self
    }

    /// Timeouts handed to each transport.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Printer backed by real transports.
#[derive(Debug, Clone)]
pub struct TicketPrinter {
    config: PrinterConfig,
}

impl TicketPrinter {
    pub fn new(config: PrinterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Open the first endpoint that accepts a connection.
    async fn connect(&self) -> Result<AnyTransport> {
        if self.config.endpoints.is_empty() {
            return Err(PrinterError::NoEndpoints);
        }

        let transport_config = self.config.transport_config();
        let mut attempts = Vec::with_capacity(self.config.endpoints.len());

        for endpoint in &self.config.endpoints {
            match AnyTransport::connect(endpoint, transport_config).await {
                Ok(transport) => {
                    debug!(%endpoint, "printer connected");
                    return Ok(transport);
                }
                Err(e) => {
                    warn!(%endpoint, "Printer endpoint unavailable: {}", e);
                    attempts.push(e.to_string());
                }
            }
        }

        Err(PrinterError::AllEndpointsFailed { attempts })
    }

    async fn send(&self, transport: &mut AnyTransport, job: &[u8]) -> Result<()> {
        transport.write_all(job).await?;
        transport.flush().await?;
        tokio::time::sleep(self.config.settle()).await;
        Ok(())
    }
}

impl Printer for TicketPrinter {
    async fn print(&self, job: &[u8]) -> Result<()> {
        let mut transport = self.connect().await?;
        let endpoint = transport.describe();

        let result = self.send(&mut transport, job).await;

        // Close errors never fail a job that was written
        if let Err(e) = transport.close().await {
            debug!(%endpoint, "Ignoring close error: {}", e);
        }

        match &result {
            Ok(()) => info!(%endpoint, bytes = job.len(), "job printed"),
            Err(e) => warn!(%endpoint, "Print job failed: {}", e),
        }
        result
    }
}

//! File transport for USB line-printer devices (`/dev/usb/lp0`) and spool
//! files.

use super::{PrinterTransport, TransportConfig, millis};
use crate::error::{PrinterError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug)]
pub struct FileTransport {
    file: Option<File>,
    endpoint: String,
    write_timeout: Duration,
}

impl FileTransport {
    /// Open `path` for appending, creating a regular file if missing.
    pub async fn open(path: &Path, config: TransportConfig) -> Result<Self> {
        let endpoint = format!("file:{}", path.display());
        debug!(%endpoint, "opening printer file");

        let mut options = OpenOptions::new();
        options.create(true).append(true);

        let file = match tokio::time::timeout(config.connect_timeout, options.open(path)).await {
            Ok(Ok(file)) => file,
            Ok(Err(e)) => return Err(PrinterError::connection_failed(endpoint, e)),
            Err(_) => {
                return Err(PrinterError::ConnectTimeout {
                    endpoint,
                    duration_ms: millis(config.connect_timeout),
                });
            }
        };

        Ok(Self {
            file: Some(file),
            endpoint,
            write_timeout: config.write_timeout,
        })
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| PrinterError::Closed {
            endpoint: self.endpoint.clone(),
        })
    }
}

impl PrinterTransport for FileTransport {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let timeout = self.write_timeout;
        let endpoint = self.endpoint.clone();
        let file = self.file()?;

        match tokio::time::timeout(timeout, file.write_all(data)).await {
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
        let file = self.file()?;

        match tokio::time::timeout(timeout, file.flush()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PrinterError::write_failed(endpoint, e)),
            Err(_) => Err(PrinterError::WriteTimeout {
                endpoint,
                duration_ms: millis(timeout),
            }),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            // tokio buffers writes internally; push them out before drop
            let _ = file.flush().await;
            debug!(endpoint = %self.endpoint, "printer file closed");
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

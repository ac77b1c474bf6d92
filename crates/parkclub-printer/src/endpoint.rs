//! Printer endpoints.
//!
//! An endpoint is one way to reach the thermal printer. A paired Bluetooth
//! SPP printer shows up as a serial device once bound with `rfcomm`; network
//! printers listen on a raw TCP port (usually 9100); USB printers are a
//! character device written like a file.
//!
//! Endpoints are written in config files as tables and on the command line as
//! text:
//!
//! ```
//! use parkclub_printer::Endpoint;
//!
//! let tcp: Endpoint = "tcp://192.168.1.50:9100".parse().unwrap();
//! let bt: Endpoint = "serial:/dev/rfcomm0@9600".parse().unwrap();
//! let usb: Endpoint = "file:/dev/usb/lp0".parse().unwrap();
//!
//! assert_eq!(bt.to_string(), "serial:/dev/rfcomm0@9600");
//! # let _ = (tcp, usb);
//! ```

use crate::error::PrinterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Baud rate used when none is given; the usual default of SPP printers.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

/// One way to reach the printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Endpoint {
    /// Raw TCP socket (`host:port`).
    Tcp { addr: String },

    /// Serial device, including RFCOMM-bound Bluetooth printers.
    Serial {
        path: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },

    /// Character device or plain file.
    File { path: PathBuf },
}

impl Endpoint {
    pub fn tcp(addr: impl Into<String>) -> Self {
        Self::Tcp { addr: addr.into() }
    }

    pub fn serial(path: impl Into<String>, baud_rate: u32) -> Self {
        Self::Serial {
            path: path.into(),
            baud_rate,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tcp { addr } => write!(f, "tcp://{addr}"),
            Self::Serial { path, baud_rate } => write!(f, "serial:{path}@{baud_rate}"),
            Self::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        if let Some(addr) = text.strip_prefix("tcp://") {
            if addr.rsplit_once(':').is_none_or(|(host, port)| {
                host.is_empty() || port.parse::<u16>().is_err()
            }) {
                return Err(PrinterError::invalid_endpoint(s, "expected tcp://host:port"));
            }
            return Ok(Self::tcp(addr));
        }

        if let Some(rest) = text.strip_prefix("serial:") {
            let (path, baud_rate) = match rest.rsplit_once('@') {
                Some((path, baud)) => {
                    let baud = baud
                        .parse::<u32>()
                        .map_err(|_| PrinterError::invalid_endpoint(s, "invalid baud rate"))?;
                    (path, baud)
                }
                None => (rest, DEFAULT_BAUD_RATE),
            };
            if path.is_empty() {
                return Err(PrinterError::invalid_endpoint(s, "missing device path"));
            }
            return Ok(Self::serial(path, baud_rate));
        }

        if let Some(path) = text.strip_prefix("file:") {
            if path.is_empty() {
                return Err(PrinterError::invalid_endpoint(s, "missing file path"));
            }
            return Ok(Self::file(path));
        }

        Err(PrinterError::invalid_endpoint(
            s,
            "expected tcp://, serial: or file: prefix",
        ))
    }
}

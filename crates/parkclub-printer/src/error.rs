//! Error types for printing.
//!
//! Errors carry the endpoint they happened on so a failed fallback chain can
//! report every attempt. [`PrinterError::user_message`] gives the short
//! Spanish text shown to the station operator.

/// Result type alias for printer operations.
pub type Result<T> = std::result::Result<T, PrinterError>;

/// Errors that can occur while printing a ticket.
#[derive(Debug, thiserror::Error)]
pub enum PrinterError {
    /// No endpoint is configured.
    #[error("No printer endpoint configured")]
    NoEndpoints,

    /// Endpoint text could not be parsed.
    #[error("Invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    /// Connecting to an endpoint failed.
    #[error("Connection to {endpoint} failed: {message}")]
    ConnectionFailed { endpoint: String, message: String },

    /// Connecting to an endpoint timed out.
    #[error("Connection to {endpoint} timed out after {duration_ms}ms")]
    ConnectTimeout { endpoint: String, duration_ms: u64 },

    /// Writing the job failed after connecting.
    #[error("Write to {endpoint} failed: {message}")]
    WriteFailed { endpoint: String, message: String },

    /// Writing the job timed out.
    #[error("Write to {endpoint} timed out after {duration_ms}ms")]
    WriteTimeout { endpoint: String, duration_ms: u64 },

    /// Every endpoint in the fallback chain failed to connect.
    #[error("All printer endpoints failed: {}", attempts.join("; "))]
    AllEndpointsFailed { attempts: Vec<String> },

    /// Transport used after it was closed.
    #[error("Transport to {endpoint} is closed")]
    Closed { endpoint: String },

    /// QR payload does not fit in a single store command.
    #[error("QR payload too large: {len} bytes (max {max})")]
    QrPayloadTooLarge { len: usize, max: usize },
}

impl PrinterError {
    /// Create a new connection failed error.
    pub fn connection_failed(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create a new write failed error.
    pub fn write_failed(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::WriteFailed {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create a new invalid endpoint error.
    pub fn invalid_endpoint(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error happened while connecting, i.e. nothing
    /// reached the printer.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            Self::NoEndpoints
                | Self::ConnectionFailed { .. }
                | Self::ConnectTimeout { .. }
                | Self::AllEndpointsFailed { .. }
        )
    }

    /// Short Spanish message for the station operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoEndpoints | Self::InvalidEndpoint { .. } => "No hay impresora configurada",
            Self::ConnectionFailed { .. } | Self::AllEndpointsFailed { .. } => {
                "No se pudo conectar con la impresora"
            }
            Self::ConnectTimeout { .. } | Self::WriteTimeout { .. } => {
                "La impresora no responde"
            }
            Self::WriteFailed { .. } | Self::Closed { .. } => {
                "Error al enviar el ticket a la impresora"
            }
            Self::QrPayloadTooLarge { .. } => "No se pudo generar el código QR",
        }
    }
}

//! Error types for station workflows.

use parkclub_printer::PrinterError;
use parkclub_storage::{DisplayMessages, StorageError};

/// Result type alias for desk operations.
pub type DeskResult<T> = std::result::Result<T, DeskError>;

/// Errors returned by [`ParkingDesk`](crate::ParkingDesk) workflows.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// Invalid input value (plate, ticket id, date).
    #[error(transparent)]
    Core(#[from] parkclub_core::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Printer(#[from] PrinterError),

    #[error("Plate is empty")]
    EmptyPlate,

    #[error("No plate found in recognised text")]
    NoPlateDetected,

    #[error("No open entry for ticket {0}")]
    TicketNotFound(String),

    #[error("No open entry for plate {0}")]
    PlateNotFound(String),

    #[error("Entry {0} not found this month")]
    EntryNotFound(String),

    #[error("Collection {0} not found today")]
    CollectionNotFound(String),

    /// The ticket reached the printer but the records were not updated.
    #[error("Printed, but storing failed: {source}")]
    PrintedNotSaved {
        #[source]
        source: StorageError,
    },

    #[error("License expired at {expires_at}")]
    LicenseExpired { expires_at: String },
}

impl DeskError {
    /// Short Spanish message for the station operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Core(parkclub_core::Error::InvalidPlate(_)) => DisplayMessages::INVALID_PLATE,
            Self::Core(parkclub_core::Error::UnknownJornada(_)) => DisplayMessages::INVALID_JORNADA,
            Self::Core(parkclub_core::Error::InvalidTicketId(_)) | Self::TicketNotFound(_) => {
                DisplayMessages::TICKET_NOT_FOUND
            }
            Self::Core(_) | Self::Storage(_) => DisplayMessages::STORAGE_ERROR,
            Self::Printer(e) => e.user_message(),
            Self::EmptyPlate => DisplayMessages::EMPTY_PLATE,
            Self::NoPlateDetected => DisplayMessages::NO_PLATE_DETECTED,
            Self::PlateNotFound(_) => DisplayMessages::PLATE_NOT_FOUND,
            Self::EntryNotFound(_) => DisplayMessages::ENTRY_NOT_FOUND,
            Self::CollectionNotFound(_) => DisplayMessages::COLLECTION_NOT_FOUND,
            Self::PrintedNotSaved { .. } => DisplayMessages::PRINTED_NOT_SAVED,
            Self::LicenseExpired { .. } => DisplayMessages::LICENSE_EXPIRED,
        }
    }

    /// Returns `true` if the failure left stored state untouched.
    pub fn is_clean_failure(&self) -> bool {
        !matches!(self, Self::PrintedNotSaved { .. })
    }
}

//! Shared constants for the parking station.
//!
//! Formats in this module are part of the persisted record layout: entry and
//! collection records store their dates and times as text, and bucket keys are
//! derived from those texts. Changing a format makes previously stored buckets
//! unreachable.
//!
//! # Usage
//!
//! ```
//! use parkclub_core::constants::*;
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 8, 19).unwrap();
//! assert_eq!(day.format(DATE_FORMAT).to_string(), "2025-08-19");
//! assert_eq!(day.format(MONTH_FORMAT).to_string(), "2025-08");
//! ```

// ============================================================================
// Record Formats
// ============================================================================

/// Calendar date stored in records (`fecha`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wall-clock time stored in records (`hora`, `hora_entrada`, `hora_salida`).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Month key used for the entry bucket.
pub const MONTH_FORMAT: &str = "%Y-%m";

/// Timestamp prefix of a ticket id (`yyyyMMdd-HHmmss`).
pub const TICKET_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

// ============================================================================
// Ticket Ids
// ============================================================================

/// Lower bound (inclusive) of the random ticket id suffix.
pub const TICKET_SUFFIX_MIN: u16 = 1000;

/// Upper bound (exclusive) of the random ticket id suffix.
pub const TICKET_SUFFIX_MAX: u16 = 9999;

/// Maximum accepted length of a scanned ticket id.
pub const MAX_TICKET_ID_LENGTH: usize = 64;

// ============================================================================
// Plates
// ============================================================================

/// Minimum plate length after normalization.
pub const MIN_PLATE_LENGTH: usize = 1;

/// Maximum plate length after normalization.
pub const MAX_PLATE_LENGTH: usize = 12;

/// Pattern used to pick a plate out of recognised text.
///
/// Three or four letters, a dash, three or four digits (`ABC-1234`).
pub const PLATE_PATTERN: &str = r"[A-Z]{3,4}-[0-9]{3,4}";

// ============================================================================
// Tariff
// ============================================================================

/// Maximum number of hours charged for a non-flat jornada.
pub const DEFAULT_MAX_HOURS: u32 = 6;

/// Minutes per charged hour.
pub const MINUTES_PER_HOUR: i64 = 60;

/// Cents per currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

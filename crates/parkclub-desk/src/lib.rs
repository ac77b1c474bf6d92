//! # ParkClub Desk
//!
//! Station workflows on top of the stores and the printer: entry
//! registration, checkout by ticket or plate, daily collections, the entry
//! control list and the licence gate.

pub mod desk;
pub mod error;
pub mod license;

pub use desk::{Checkout, CollectionsSummary, ControlSummary, Housekeeping, ParkingDesk};
pub use error::{DeskError, DeskResult};
pub use license::LicenseGate;

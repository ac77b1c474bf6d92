pub mod clock;
pub mod constants;
pub mod error;
pub mod plate;
pub mod tariff;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use plate::extract_plate;
pub use tariff::{FeeCalculation, TariffService, TariffTable};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

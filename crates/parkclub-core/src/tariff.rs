//! Tariff table and fee calculation.
//!
//! All pricing lives here. The rules are:
//!
//! - Flat jornadas (`Diario`, `Nocturno`, `Completo`) charge the base rate once.
//! - Other jornadas charge the base rate per started hour, with a minimum of one
//!   hour and a maximum of [`DEFAULT_MAX_HOURS`] (configurable).
//!
//! # Examples
//!
//! ```
//! use parkclub_core::{Jornada, TariffService, VehicleType};
//! use chrono::NaiveDate;
//!
//! let tariff = TariffService::default();
//! let entered = NaiveDate::from_ymd_opt(2025, 8, 19).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let now = entered + chrono::Duration::minutes(61);
//!
//! let fee = tariff.calculate(VehicleType::Carro, Jornada::Dia, Some(entered), now);
//! assert_eq!(fee.minutes, 61);
//! assert_eq!(fee.hours_charged, 2);
//! assert_eq!(fee.total.to_string(), "1.50");
//! ```

use crate::constants::{DEFAULT_MAX_HOURS, MINUTES_PER_HOUR};
use crate::types::{Jornada, Money, VehicleType, format_record_time};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base rate per vehicle type and jornada.
///
/// Combinations that are not present in the table have a base rate of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffTable {
    rates: HashMap<(VehicleType, Jornada), Money>,
}

impl TariffTable {
    /// Create a table with no rates at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Set the base rate for one combination.
    pub fn set_rate(&mut self, vehicle: VehicleType, jornada: Jornada, rate: Money) {
        self.rates.insert((vehicle, jornada), rate);
    }

    /// Builder form of [`set_rate`](Self::set_rate).
    #[must_use]
    pub fn with_rate(mut self, vehicle: VehicleType, jornada: Jornada, rate: Money) -> Self {
        self.set_rate(vehicle, jornada, rate);
        self
    }

    /// Base rate for a combination, zero when the table has none.
    #[must_use]
    pub fn rate(&self, vehicle: VehicleType, jornada: Jornada) -> Money {
        self.rates
            .get(&(vehicle, jornada))
            .copied()
            .unwrap_or(Money::ZERO)
    }
}

impl Default for TariffTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for vehicle in VehicleType::ALL {
            table.set_rate(vehicle, Jornada::Dia, Money::from_cents(75));
            table.set_rate(vehicle, Jornada::Noche, Money::from_cents(100));
            table.set_rate(vehicle, Jornada::Diario, Money::from_cents(500));
            table.set_rate(vehicle, Jornada::Nocturno, Money::from_cents(500));
            table.set_rate(vehicle, Jornada::Completo, Money::from_cents(500));
        }
        table
    }
}

/// Result of a fee calculation at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCalculation {
    /// Whole minutes parked (never negative).
    pub minutes: i64,

    /// Hours billed; always 1 for flat fares.
    pub hours_charged: u32,

    /// Base rate from the tariff table.
    pub base: Money,

    /// Amount owed.
    pub total: Money,

    /// Checkout time as printed on the receipt (`HH:mm:ss`).
    pub exit_time: String,

    /// Whether the jornada is a flat fare.
    pub flat: bool,
}

/// Fee calculator over a [`TariffTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffService {
    table: TariffTable,
    max_hours: u32,
}

impl Default for TariffService {
    fn default() -> Self {
        Self {
            table: TariffTable::default(),
            max_hours: DEFAULT_MAX_HOURS,
        }
    }
}

impl TariffService {
    pub fn new(table: TariffTable) -> Self {
        Self {
            table,
            ..Default::default()
        }
    }

    /// Set the cap on billed hours for non-flat jornadas.
    ///
    /// A cap of zero is raised to one so that a non-flat stay is never free.
    #[must_use]
    pub fn max_hours(mut self, max_hours: u32) -> Self {
        self.max_hours = max_hours.max(1);
        self
    }

    #[must_use]
    pub fn table(&self) -> &TariffTable {
        &self.table
    }

    #[must_use]
    pub fn max_hours_charged(&self) -> u32 {
        self.max_hours
    }

    /// Base rate shown to the customer at entry.
    #[must_use]
    pub fn base_rate(&self, vehicle: VehicleType, jornada: Jornada) -> Money {
        self.table.rate(vehicle, jornada)
    }

    /// Compute the amount owed for a stay.
    ///
    /// `entered_at` is `None` when the stored entry date/time could not be
    /// parsed; the stay then counts as zero minutes, which still bills one
    /// hour.
    #[must_use]
    pub fn calculate(
        &self,
        vehicle: VehicleType,
        jornada: Jornada,
        entered_at: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> FeeCalculation {
        let minutes = entered_at
            .map(|entered| (now - entered).num_minutes().max(0))
            .unwrap_or(0);

        let base = self.base_rate(vehicle, jornada);
        let flat = jornada.is_flat();

        let rounded_hours = u32::try_from(ceil_hours(minutes))
            .unwrap_or(u32::MAX)
            .max(1);
        let hours_charged = if flat {
            1
        } else {
            rounded_hours.min(self.max_hours)
        };

        let total = if flat { base } else { base * hours_charged };

        FeeCalculation {
            minutes,
            hours_charged,
            base,
            total,
            exit_time: format_record_time(now.time()),
            flat,
        }
    }
}

fn ceil_hours(minutes: i64) -> i64 {
    (minutes + MINUTES_PER_HOUR - 1) / MINUTES_PER_HOUR
}

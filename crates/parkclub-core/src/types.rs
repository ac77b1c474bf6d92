use crate::{
    Result,
    constants::{
        CENTS_PER_UNIT, DATE_FORMAT, MAX_PLATE_LENGTH, MAX_TICKET_ID_LENGTH, MIN_PLATE_LENGTH,
        MONTH_FORMAT, TICKET_SUFFIX_MAX, TICKET_SUFFIX_MIN, TICKET_TIMESTAMP_FORMAT, TIME_FORMAT,
    },
    error::Error,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// Vehicle category offered at entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Carro,
    Moto,
}

impl VehicleType {
    /// Every vehicle type, in the order shown to staff.
    pub const ALL: [VehicleType; 2] = [VehicleType::Carro, VehicleType::Moto];

    /// Name printed on tickets and stored in records.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            VehicleType::Carro => "Carro",
            VehicleType::Moto => "Moto",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl std::str::FromStr for VehicleType {
    type Err = Error;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "carro" => Ok(VehicleType::Carro),
            "moto" => Ok(VehicleType::Moto),
            _ => Err(Error::UnknownVehicleType(s.to_string())),
        }
    }
}

/// Billing shift category.
///
/// `Diario`, `Nocturno` and `Completo` are flat fares charged once regardless
/// of the time parked. `Completo` is kept as an alias so that records written
/// with it keep billing as a flat fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jornada {
    Dia,
    Noche,
    Diario,
    Nocturno,
    Completo,
}

impl Jornada {
    /// Jornadas offered when registering an entry.
    pub const SELECTABLE: [Jornada; 4] = [
        Jornada::Dia,
        Jornada::Noche,
        Jornada::Diario,
        Jornada::Nocturno,
    ];

    /// Returns `true` if staff may pick this jornada for a new entry.
    #[inline]
    #[must_use]
    pub fn is_selectable(self) -> bool {
        Self::SELECTABLE.contains(&self)
    }

    /// Returns `true` if the jornada is billed once instead of per hour.
    #[inline]
    #[must_use]
    pub fn is_flat(self) -> bool {
        matches!(self, Jornada::Diario | Jornada::Nocturno | Jornada::Completo)
    }

    /// Name printed on tickets and stored in records.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Jornada::Dia => "Dia",
            Jornada::Noche => "Noche",
            Jornada::Diario => "Diario",
            Jornada::Nocturno => "Nocturno",
            Jornada::Completo => "Completo",
        }
    }
}

impl fmt::Display for Jornada {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl std::str::FromStr for Jornada {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dia" | "día" => Ok(Jornada::Dia),
            "noche" => Ok(Jornada::Noche),
            "diario" => Ok(Jornada::Diario),
            "nocturno" => Ok(Jornada::Nocturno),
            "completo" => Ok(Jornada::Completo),
            _ => Err(Error::UnknownJornada(s.to_string())),
        }
    }
}

/// Licence plate as typed by staff or recognised from a photo.
///
/// The plate is normalized (trimmed and converted to uppercase) before
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plate(String);

impl Plate {
    /// Create a new plate with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPlate` if:
    /// - The plate is empty after trimming
    /// - The plate is longer than 12 characters
    /// - The plate contains anything other than ASCII letters, digits or `-`
    pub fn new(raw: &str) -> Result<Self> {
        let plate = raw.trim().to_uppercase();

        let len = plate.len();
        if !(MIN_PLATE_LENGTH..=MAX_PLATE_LENGTH).contains(&len) {
            return Err(Error::InvalidPlate(format!(
                "Plate must be {MIN_PLATE_LENGTH}-{MAX_PLATE_LENGTH} chars, got {len}"
            )));
        }

        if !plate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::InvalidPlate(format!(
                "Plate may only contain letters, digits and '-': {plate}"
            )));
        }

        Ok(Plate(plate))
    }

    /// Get the plate as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a stored plate.
    #[must_use]
    pub fn matches(&self, stored: &str) -> bool {
        self.0.eq_ignore_ascii_case(stored.trim())
    }
}

impl fmt::Display for Plate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Plate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Plate::new(s)
    }
}

/// Monetary amount in cents.
///
/// Serialized as a decimal string with two places (`"5.00"`) so stored
/// payloads and configuration files stay readable and exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create an amount from a number of cents.
    #[inline]
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Raw amount in cents.
    #[inline]
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let unit = CENTS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:02}", abs / unit, abs % unit)
    }
}

impl std::str::FromStr for Money {
    type Err = Error;

    /// Parse `"5"`, `"5.0"`, `"0.75"` or `"$ 0.75"`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let text = trimmed
            .strip_prefix('$')
            .map(str::trim_start)
            .unwrap_or(trimmed);

        let invalid = || Error::InvalidAmount(s.to_string());

        let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || frac.len() > 2
        {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for Money {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> String {
        value.to_string()
    }
}

// Saturating: rates are configured and can be arbitrarily large.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(rhs)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Entry ticket id, also the QR payload printed on the entry ticket.
///
/// Generated ids have the form `yyyyMMdd-HHmmss-NNNN` with a random four
/// digit suffix. Scanned ids are accepted as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    /// Generate a new id for a ticket issued at `at`.
    #[must_use]
    pub fn generate(at: NaiveDateTime) -> Self {
        let suffix = rand::thread_rng().gen_range(TICKET_SUFFIX_MIN..TICKET_SUFFIX_MAX);
        TicketId(format!("{}-{suffix}", at.format(TICKET_TIMESTAMP_FORMAT)))
    }

    /// Accept a scanned QR value as a ticket id.
    ///
    /// # Errors
    /// Returns `Error::InvalidTicketId` if the value is empty, too long, or
    /// contains whitespace or control characters.
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(Error::InvalidTicketId("empty ticket id".to_string()));
        }
        if id.len() > MAX_TICKET_ID_LENGTH {
            return Err(Error::InvalidTicketId(format!(
                "ticket id longer than {MAX_TICKET_ID_LENGTH} chars"
            )));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidTicketId(id.to_string()));
        }
        Ok(TicketId(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Issue timestamp encoded in a generated id, if the id has that shape.
    #[must_use]
    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        let prefix = self.0.get(..15)?;
        NaiveDateTime::parse_from_str(prefix, TICKET_TIMESTAMP_FORMAT).ok()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TicketId> for String {
    fn from(value: TicketId) -> String {
        value.0
    }
}

/// Parse a stored `fecha` (`yyyy-MM-dd`).
///
/// # Errors
/// Returns `Error::InvalidDateTime` if the text is not a valid calendar date.
pub fn parse_record_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| Error::InvalidDateTime {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a stored `hora` (`HH:mm:ss`).
///
/// # Errors
/// Returns `Error::InvalidDateTime` if the text is not a valid time of day.
pub fn parse_record_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|e| Error::InvalidDateTime {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Combine a stored `fecha` and `hora` into a timestamp.
///
/// # Errors
/// Returns `Error::InvalidDateTime` if either part is malformed.
pub fn parse_record_datetime(fecha: &str, hora: &str) -> Result<NaiveDateTime> {
    Ok(parse_record_date(fecha)?.and_time(parse_record_time(hora)?))
}

/// Format a date the way records store it.
#[must_use]
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a time the way records store it.
#[must_use]
pub fn format_record_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Key of the monthly bucket a date belongs to (`yyyy-MM`).
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    date.format(MONTH_FORMAT).to_string()
}

/// Key of the daily bucket a date belongs to (`yyyy-MM-dd`).
#[must_use]
pub fn day_key(date: NaiveDate) -> String {
    format_record_date(date)
}

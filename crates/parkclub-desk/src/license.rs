//! Licence expiry gate.
//!
//! The station refuses every workflow once the licence has expired. The
//! expiry is a fixed instant; the operator's local clock is not involved.

use crate::error::{DeskError, DeskResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default expiry, 2025-12-31T23:59:59Z, in milliseconds since the epoch.
pub const DEFAULT_LICENSE_EXPIRY_MS: i64 = 1_767_225_599_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseGate {
    expires_at: DateTime<Utc>,
}

impl LicenseGate {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self { expires_at }
    }

    /// Gate expiring at `millis` since the Unix epoch.
    ///
    /// Returns `None` if the value is out of range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::new)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// The licence is expired strictly after `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Fail with [`DeskError::LicenseExpired`] once expired.
    pub fn check(&self, now: DateTime<Utc>) -> DeskResult<()> {
        if self.is_expired(now) {
            return Err(DeskError::LicenseExpired {
                expires_at: self.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            });
        }
        Ok(())
    }
}

impl Default for LicenseGate {
    fn default() -> Self {
        Self::from_millis(DEFAULT_LICENSE_EXPIRY_MS).unwrap_or(Self {
            expires_at: DateTime::<Utc>::MAX_UTC,
        })
    }
}

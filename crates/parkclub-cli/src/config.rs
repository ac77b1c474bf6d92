//! Station configuration.
//!
//! Read from a TOML file found via `--config`, then `PARKCLUB_CONFIG`, then
//! `parkclub.toml` in the working directory. A missing file means defaults.
//! `PARKCLUB_DB` overrides the database path.
//!
//! ```toml
//! [branch]
//! name = "Las Carabelas"
//! phone = "telefono:0993403540"
//!
//! [printer]
//! settle_delay_ms = 1000
//!
//! [[printer.endpoints]]
//! kind = "serial"
//! path = "/dev/rfcomm0"
//!
//! [database]
//! path = "/var/lib/parkclub/parkclub.db"
//!
//! [tariff]
//! max_hours = 6
//!
//! [[tariff.rates]]
//! vehicle = "Moto"
//! jornada = "Dia"
//! rate = "0.50"
//!
//! [license]
//! expires_at_ms = 1767225599000
//! ```

use anyhow::{Context, Result, bail};
use parkclub_core::constants::DEFAULT_MAX_HOURS;
use parkclub_core::{Jornada, Money, TariffService, TariffTable, VehicleType};
use parkclub_desk::LicenseGate;
use parkclub_desk::license::DEFAULT_LICENSE_EXPIRY_MS;
use parkclub_printer::{BranchInfo, PrinterConfig};
use parkclub_storage::DatabaseConfig;
use parkclub_storage::connection::DEFAULT_DATABASE_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PARKCLUB_CONFIG";

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "PARKCLUB_DB";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "parkclub.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub branch: BranchInfo,
    pub printer: PrinterConfig,
    pub database: DatabaseSection,
    pub tariff: TariffSection,
    pub license: LicenseSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffSection {
    /// Cap on billed hours for hourly jornadas
    pub max_hours: u32,

    /// Overrides applied on top of the default table
    pub rates: Vec<RateOverride>,
}

impl Default for TariffSection {
    fn default() -> Self {
        Self {
            max_hours: DEFAULT_MAX_HOURS,
            rates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateOverride {
    pub vehicle: VehicleType,
    pub jornada: Jornada,
    pub rate: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseSection {
    /// Expiry instant in milliseconds since the Unix epoch
    pub expires_at_ms: i64,
}

impl Default for LicenseSection {
    fn default() -> Self {
        Self {
            expires_at_ms: DEFAULT_LICENSE_EXPIRY_MS,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Locate and read the configuration, then apply `PARKCLUB_DB`.
    ///
    /// Returns the config and the file it came from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let source = resolve_config_path(explicit, env_path, Path::new(DEFAULT_CONFIG_FILE));

        let mut config = match &source {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(db) = std::env::var_os(DATABASE_ENV) {
            config.database.path = PathBuf::from(db);
        }

        Ok((config, source))
    }

    fn validate(&self) -> Result<()> {
        if self.tariff.max_hours == 0 {
            bail!("tariff.max_hours must be at least 1");
        }
        if LicenseGate::from_millis(self.license.expires_at_ms).is_none() {
            bail!("license.expires_at_ms is out of range");
        }
        Ok(())
    }

    pub fn tariff_service(&self) -> TariffService {
        let table = self
            .tariff
            .rates
            .iter()
            .fold(TariffTable::default(), |table, r| {
                table.with_rate(r.vehicle, r.jornada, r.rate)
            });
        TariffService::new(table).max_hours(self.tariff.max_hours)
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database.path.to_string_lossy())
    }

    pub fn license_gate(&self) -> LicenseGate {
        LicenseGate::from_millis(self.license.expires_at_ms).unwrap_or_default()
    }
}

/// Config file to read: an explicit path or the environment's must be used
/// as given; the default file only when it exists.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    default_file: &Path,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(env_path)
        .or_else(|| default_file.exists().then(|| default_file.to_path_buf()))
}

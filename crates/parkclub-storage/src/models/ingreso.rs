use chrono::NaiveDateTime;
use parkclub_core::{Jornada, Money, VehicleType, parse_record_datetime};
use serde::{Deserialize, Serialize};

/// Vehicle entry record.
///
/// Created when the entry ticket has been printed and kept in the monthly
/// bucket until the vehicle checks out.
///
/// # Fields
///
/// * `id` - Ticket id, also the QR payload on the entry ticket
/// * `placa` - Normalized licence plate
/// * `tipo_vehiculo` - Vehicle type
/// * `jornada` - Billing shift chosen at entry
/// * `tarifa` - Base rate shown at entry
/// * `fecha` - Entry date (`yyyy-MM-dd`)
/// * `hora` - Entry time (`HH:mm:ss`)
///
/// # Examples
///
/// ```
/// use parkclub_storage::models::Ingreso;
/// use parkclub_core::{Jornada, Money, VehicleType};
///
/// let ingreso = Ingreso {
///     id: "20250819-080000-1234".to_string(),
///     placa: "PBX-1234".to_string(),
///     tipo_vehiculo: VehicleType::Carro,
///     jornada: Jornada::Dia,
///     tarifa: Money::from_cents(75),
///     fecha: "2025-08-19".to_string(),
///     hora: "08:00:00".to_string(),
/// };
///
/// assert!(ingreso.entered_at().is_some());
/// assert!(ingreso.has_placa("pbx-1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingreso {
    pub id: String,
    pub placa: String,
    pub tipo_vehiculo: VehicleType,
    pub jornada: Jornada,
    pub tarifa: Money,
    pub fecha: String,
    pub hora: String,
}

impl Ingreso {
    /// Entry timestamp, `None` if `fecha` or `hora` is malformed.
    pub fn entered_at(&self) -> Option<NaiveDateTime> {
        parse_record_datetime(&self.fecha, &self.hora).ok()
    }

    /// Case-insensitive plate comparison.
    pub fn has_placa(&self, placa: &str) -> bool {
        self.placa.trim().eq_ignore_ascii_case(placa.trim())
    }

    /// Ordering key for "latest entry" lookups.
    ///
    /// Records with a malformed timestamp sort before every valid one and
    /// fall back to comparing the raw texts.
    pub(crate) fn recency_key(&self) -> (Option<NaiveDateTime>, &str, &str) {
        (self.entered_at(), self.fecha.as_str(), self.hora.as_str())
    }
}

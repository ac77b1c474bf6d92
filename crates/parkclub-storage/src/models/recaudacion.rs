use parkclub_core::{Jornada, Money, VehicleType};
use serde::{Deserialize, Serialize};

/// Completed collection, kept in the daily bucket for reporting.
///
/// `fecha` is the collection day. `fecha_entrada` and `horas_cobradas` were
/// added later and are optional so older payloads keep decoding; receipt
/// reprints use them when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recaudacion {
    /// UUID of this collection
    pub id: String,

    /// Ticket id of the entry that was checked out
    pub id_ingreso: String,

    pub placa: String,
    pub tipo_vehiculo: VehicleType,
    pub jornada: Jornada,

    /// Collection day (`yyyy-MM-dd`)
    pub fecha: String,

    pub hora_entrada: String,
    pub hora_salida: String,
    pub monto: Money,

    /// Entry day (`yyyy-MM-dd`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_entrada: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horas_cobradas: Option<u32>,
}

impl Recaudacion {
    /// Date printed as the entry date on a reprinted receipt.
    pub fn receipt_date(&self) -> &str {
        self.fecha_entrada.as_deref().unwrap_or(&self.fecha)
    }
}

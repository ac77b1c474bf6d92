//! Ticket layouts.
//!
//! Two layouts are printed: the entry ticket (with the QR the vehicle hands
//! back at exit) and the exit receipt. Both start with the branch header and
//! end with free-form info lines built by the `*_info` helpers.

use crate::error::Result;
use crate::escpos::{Align, EscPos};
use bytes::Bytes;
use parkclub_core::{Jornada, Money, VehicleType};
use serde::{Deserialize, Serialize};

/// Line printed under the branch name on entry tickets.
pub const BRAND_LINE: &str = "PARKING CLUB";

/// Blank lines fed after every ticket.
pub const FEED_LINES: usize = 3;

/// Branch details printed on every ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchInfo {
    pub name: String,
    pub location: String,
    pub phone: String,
    pub email: String,

    /// Closing text of the entry ticket info block.
    pub entry_footer: String,
}

impl Default for BranchInfo {
    fn default() -> Self {
        Self {
            name: "Las Carabelas".to_string(),
            location: "Diego de Almagro y la Pinta".to_string(),
            phone: "telefono:0993403540".to_string(),
            email: "email: achavez0920@hotmail.com".to_string(),
            entry_footer: "Conserve este ticket para retirar su vehículo".to_string(),
        }
    }
}

/// Entry ticket contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTicket {
    pub placa: String,
    pub fecha: String,
    pub hora: String,

    /// QR payload, the ticket id.
    pub qr_data: String,

    pub info: Vec<String>,
}

impl EntryTicket {
    /// Render the ticket as an ESC/POS job.
    pub fn render(&self, branch: &BranchInfo) -> Result<Bytes> {
        let mut job = EscPos::new();

        job.bold(true)
            .double_size(true)
            .align(Align::Center)
            .line(&branch.name)
            .double_size(false)
            .bold(false)
            .line(BRAND_LINE)
            .line(&branch.location)
            .separator();

        job.bold(true)
            .line("TICKET DE INGRESO")
            .bold(false)
            .separator();

        job.align(Align::Left)
            .line(&format!("Placa: {}", self.placa))
            .line(&format!("Fecha: {}", self.fecha))
            .line(&format!("Hora de ingreso: {}", self.hora))
            .blank();

        job.align(Align::Center);
        job.qr(&self.qr_data)?;
        job.align(Align::Left).blank();

        job.small_font(true);
        for line in &self.info {
            job.line(line);
        }
        job.small_font(false).feed(FEED_LINES);

        Ok(job.finish())
    }
}

/// Exit receipt contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReceipt {
    pub placa: String,

    /// Entry date.
    pub fecha: String,

    pub hora_entrada: String,
    pub hora_salida: String,
    pub total: Money,
    pub info: Vec<String>,
}

impl ExitReceipt {
    /// Render the receipt as an ESC/POS job.
    pub fn render(&self, branch: &BranchInfo) -> Result<Bytes> {
        let mut job = EscPos::new();

        job.align(Align::Center)
            .double_size(true)
            .bold(true)
            .line(&branch.name)
            .double_size(false)
            .bold(false)
            .line(&branch.location)
            .separator()
            .bold(true)
            .line("TICKET DE SALIDA")
            .bold(false)
            .separator();

        job.align(Align::Left)
            .line(&format!("Placa: {}", self.placa))
            .line(&format!("Fecha: {}", self.fecha))
            .line(&format!("Entrada: {}", self.hora_entrada))
            .line(&format!("Salida: {}", self.hora_salida))
            .separator();

        job.bold(true)
            .line("TOTAL:")
            .double_size(true)
            .line(&format!("$ {}", self.total))
            .double_size(false)
            .bold(false)
            .separator();

        job.align(Align::Center);
        for line in &self.info {
            job.line(line);
        }
        job.feed(FEED_LINES);

        Ok(job.finish())
    }
}

/// Info block of an entry ticket (also used for reprints).
pub fn entry_info(
    branch: &BranchInfo,
    vehicle: VehicleType,
    jornada: Jornada,
    base: Money,
) -> Vec<String> {
    let mut info = vec![
        format!("Tipo: {vehicle}  ·  Jornada: {jornada}"),
        format!("Tarifa base: $ {base}"),
        crate::escpos::SEPARATOR.to_string(),
    ];
    if !branch.entry_footer.is_empty() {
        info.push(branch.entry_footer.clone());
    }
    info
}

/// Info block of an exit receipt printed at checkout.
pub fn exit_info(
    branch: &BranchInfo,
    vehicle: VehicleType,
    jornada: Jornada,
    hours_charged: u32,
) -> Vec<String> {
    vec![
        format!("Tipo: {vehicle} - {jornada}"),
        format!("Horas cobradas: {hours_charged}"),
        branch.phone.clone(),
        "¡Gracias por su visita!".to_string(),
    ]
}

/// Info block of a reprinted receipt.
///
/// Older collections may not know how many hours were charged; the line is
/// left out then.
pub fn reprint_info(
    branch: &BranchInfo,
    vehicle: VehicleType,
    jornada: Jornada,
    hours_charged: Option<u32>,
) -> Vec<String> {
    let mut info = vec![format!("Tipo: {vehicle} - {jornada}")];
    if let Some(hours) = hours_charged {
        info.push(format!("Horas cobradas: {hours}"));
    }
    info.push(branch.phone.clone());
    info.push("Reimpresion de recibo".to_string());
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escpos::cmd;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn position(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap()
    }

    fn entry_ticket() -> EntryTicket {
        let branch = BranchInfo::default();
        EntryTicket {
            placa: "PBX-1234".to_string(),
            fecha: "2025-08-19".to_string(),
            hora: "08:00:00".to_string(),
            qr_data: "20250819-080000-1234".to_string(),
            info: entry_info(&branch, VehicleType::Carro, Jornada::Dia, Money::from_cents(75)),
        }
    }

    #[test]
    fn test_entry_ticket_header_starts_bold_double_centered() {
        let bytes = entry_ticket().render(&BranchInfo::default()).unwrap();

        let mut header = Vec::new();
        header.extend_from_slice(&cmd::BOLD_ON);
        header.extend_from_slice(&cmd::SIZE_DOUBLE);
        header.extend_from_slice(&cmd::ALIGN_CENTER);
        header.extend_from_slice(b"Las Carabelas\n");
        assert!(bytes.starts_with(&header));
    }

    #[test]
    fn test_entry_ticket_fields_and_order() {
        let bytes = entry_ticket().render(&BranchInfo::default()).unwrap();

        let brand = position(&bytes, b"PARKING CLUB\n");
        let title = position(&bytes, b"TICKET DE INGRESO\n");
        let placa = position(&bytes, b"Placa: PBX-1234\n");
        let hora = position(&bytes, b"Hora de ingreso: 08:00:00\n");
        let qr = position(&bytes, b"20250819-080000-1234");
        let info = position(&bytes, "Tipo: Carro  ·  Jornada: Dia\n".as_bytes());

        assert!(brand < title && title < placa && placa < hora && hora < qr && qr < info);
        assert!(contains(&bytes, b"Tarifa base: $ 0.75\n"));
        assert!(contains(&bytes, &cmd::QR_PRINT));
        assert!(bytes.ends_with(&[cmd::FONT_NORMAL.as_slice(), b"\n\n\n".as_slice()].concat()));
    }

    #[test]
    fn test_exit_receipt_total_is_double_bold() {
        let branch = BranchInfo::default();
        let receipt = ExitReceipt {
            placa: "PBX-1234".to_string(),
            fecha: "2025-08-19".to_string(),
            hora_entrada: "08:00:00".to_string(),
            hora_salida: "09:01:00".to_string(),
            total: Money::from_cents(150),
            info: exit_info(&branch, VehicleType::Carro, Jornada::Dia, 2),
        };
        let bytes = receipt.render(&branch).unwrap();

        let mut total = Vec::new();
        total.extend_from_slice(&cmd::BOLD_ON);
        total.extend_from_slice(b"TOTAL:\n");
        total.extend_from_slice(&cmd::SIZE_DOUBLE);
        total.extend_from_slice(b"$ 1.50\n");
        assert!(contains(&bytes, &total));

        assert!(contains(&bytes, b"TICKET DE SALIDA\n"));
        assert!(contains(&bytes, b"Entrada: 08:00:00\n"));
        assert!(contains(&bytes, b"Salida: 09:01:00\n"));
        assert!(contains(&bytes, b"Horas cobradas: 2\n"));
        assert!(contains(&bytes, "¡Gracias por su visita!\n".as_bytes()));
        assert!(!contains(&bytes, b"PARKING CLUB"));
        assert!(!contains(&bytes, &cmd::QR_PRINT));
    }

    #[test]
    fn test_reprint_info_without_hours() {
        let branch = BranchInfo::default();
        let info = reprint_info(&branch, VehicleType::Moto, Jornada::Nocturno, None);
        assert_eq!(
            info,
            vec![
                "Tipo: Moto - Nocturno".to_string(),
                "telefono:0993403540".to_string(),
                "Reimpresion de recibo".to_string(),
            ]
        );

        let info = reprint_info(&branch, VehicleType::Moto, Jornada::Nocturno, Some(1));
        assert_eq!(info[1], "Horas cobradas: 1");
    }

    #[test]
    fn test_entry_info_skips_empty_footer() {
        let branch = BranchInfo {
            entry_footer: String::new(),
            ..Default::default()
        };
        let info = entry_info(&branch, VehicleType::Moto, Jornada::Noche, Money::from_cents(100));
        assert_eq!(info.len(), 3);
        assert_eq!(info[1], "Tarifa base: $ 1.00");
    }
}

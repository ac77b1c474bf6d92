//! Messages shown to the station operator.
//!
//! The operator works in Spanish; every user-facing outcome of a desk
//! workflow maps to one of these constants.
//!
//! # Usage
//!
//! ```
//! use parkclub_storage::messages::DisplayMessages;
//!
//! let message = DisplayMessages::TICKET_NOT_FOUND;
//! println!("{}", message);
//! ```

/// Operator-facing messages (Spanish).
///
/// # Message Format
///
/// - One short sentence, printable on a narrow terminal
/// - Spanish, accents allowed
pub struct DisplayMessages;

impl DisplayMessages {
    /// Scanned QR does not match an open entry.
    pub const TICKET_NOT_FOUND: &'static str = "Ticket no encontrado o ya procesado";

    /// Plate search found no open entry.
    pub const PLATE_NOT_FOUND: &'static str = "No se encontró un ingreso con esa placa";

    /// Plate search with nothing typed.
    pub const EMPTY_PLATE: &'static str = "Ingrese una placa";

    /// Plate text that is not a plate.
    pub const INVALID_PLATE: &'static str = "Placa inválida";

    /// Jornada that cannot be picked for a new entry.
    pub const INVALID_JORNADA: &'static str = "Jornada no disponible para ingresos";

    /// Recognised text did not contain a plate.
    pub const NO_PLATE_DETECTED: &'static str = "No se detectó una placa en el texto";

    /// Entry ticket printed and entry stored.
    pub const ENTRY_REGISTERED: &'static str = "Ingreso registrado";

    /// Checkout completed.
    pub const PROCESSED: &'static str = "Salida procesada";

    /// Receipt printed but the collection could not be stored.
    pub const PRINTED_NOT_SAVED: &'static str = "Impreso, pero no se pudo guardar";

    /// Ticket or receipt reprinted.
    pub const REPRINTED: &'static str = "Reimpreso";

    /// Collections list is empty.
    pub const NO_COLLECTIONS_TODAY: &'static str = "No hay recaudaciones hoy";

    /// Collection id unknown for today.
    pub const COLLECTION_NOT_FOUND: &'static str = "Recaudación no encontrada";

    /// Today's collections deleted.
    pub const COLLECTIONS_CLEARED: &'static str = "Recaudaciones de hoy eliminadas";

    /// Entry id for a ticket reprint is not in this month's entries.
    pub const ENTRY_NOT_FOUND: &'static str = "Ingreso no encontrado";

    /// Local database could not be read or written.
    pub const STORAGE_ERROR: &'static str = "No se pudo acceder a los datos locales";

    /// No entries registered today.
    pub const NO_ENTRIES_TODAY: &'static str = "No hay ingresos hoy";

    /// Licence past its expiry date.
    pub const LICENSE_EXPIRED: &'static str =
        "La licencia de esta aplicación ha expirado. Contacte al proveedor.";
}

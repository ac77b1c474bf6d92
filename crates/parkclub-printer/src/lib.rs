//! # ParkClub Printer
//!
//! ESC/POS ticket rendering and delivery to thermal printers.
//!
//! ## Modules
//!
//! - [`escpos`]: byte-level ESC/POS command builder, including QR codes
//! - [`tickets`]: entry ticket and exit receipt layouts
//! - [`endpoint`]: printer addresses (TCP, serial/Bluetooth, device file)
//! - [`transport`]: connections to those addresses
//! - [`printer`]: the [`Printer`] trait and [`TicketPrinter`] with fallback
//! - [`mock`]: in-memory printer for tests
//!
//! ## Example
//!
//! ```no_run
//! use parkclub_printer::{Endpoint, Printer, PrinterConfig, TicketPrinter};
//! use parkclub_printer::tickets::{BranchInfo, EntryTicket};
//!
//! #[tokio::main]
//! async fn main() -> parkclub_printer::Result<()> {
//!     let config = PrinterConfig::default()
//!         .endpoint("serial:/dev/rfcomm0".parse()?)
//!         .endpoint(Endpoint::tcp("192.168.1.50:9100"));
//!     let printer = TicketPrinter::new(config);
//!
//!     let ticket = EntryTicket {
//!         placa: "ABC-1234".into(),
//!         fecha: "2025-08-19".into(),
//!         hora: "08:00:00".into(),
//!         qr_data: "20250819-080000-1234".into(),
//!         info: Vec::new(),
//!     };
//!     printer.print(&ticket.render(&BranchInfo::default())?).await
//! }
//! ```

pub mod endpoint;
pub mod error;
pub mod escpos;
pub mod mock;
pub mod printer;
pub mod tickets;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::{PrinterError, Result};
pub use escpos::EscPos;
pub use printer::{Printer, PrinterConfig, TicketPrinter};
pub use tickets::{BranchInfo, EntryTicket, ExitReceipt};

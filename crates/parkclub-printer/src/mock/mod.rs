//! Mock printer for tests and dry runs.

pub mod printer;

pub use printer::{MockPrinter, MockPrinterHandle};

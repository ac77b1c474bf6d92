//! In-memory printer that records every job.
//!
//! The printer and its handle share state, so a test can hand the printer to
//! the code under test and keep the handle to inspect jobs or inject
//! failures.

use crate::error::{PrinterError, Result};
use crate::printer::Printer;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    jobs: Vec<Vec<u8>>,
    fail_connect: bool,
    fail_write: bool,
}

/// Mock printer.
///
/// # Examples
///
/// ```
/// use parkclub_printer::Printer;
/// use parkclub_printer::mock::MockPrinter;
///
/// #[tokio::main]
/// async fn main() -> parkclub_printer::Result<()> {
///     let (printer, handle) = MockPrinter::new();
///
///     printer.print(b"hola").await?;
///     assert_eq!(handle.jobs().await, vec![b"hola".to_vec()]);
///
///     handle.fail_connect(true).await;
///     assert!(printer.print(b"x").await.is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockPrinter {
    state: Arc<Mutex<MockState>>,
}

impl MockPrinter {
    /// Create a printer and the handle that controls it.
    pub fn new() -> (Self, MockPrinterHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockPrinterHandle { state },
        )
    }
}

impl Default for MockPrinter {
    fn default() -> Self {
        Self::new().0
    }
}

impl Printer for MockPrinter {
    async fn print(&self, job: &[u8]) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.fail_connect {
            return Err(PrinterError::AllEndpointsFailed {
                attempts: vec!["mock: printer offline".to_string()],
            });
        }
        if state.fail_write {
            return Err(PrinterError::write_failed("mock", "paper jam"));
        }

        state.jobs.push(job.to_vec());
        Ok(())
    }
}

/// Handle for inspecting and controlling a [`MockPrinter`].
#[derive(Debug, Clone)]
pub struct MockPrinterHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockPrinterHandle {
    /// All jobs printed so far.
    pub async fn jobs(&self) -> Vec<Vec<u8>> {
        self.state.lock().await.jobs.clone()
    }

    pub async fn job_count(&self) -> usize {
        self.state.lock().await.jobs.len()
    }

    /// Most recent job, if any.
    pub async fn last_job(&self) -> Option<Vec<u8>> {
        self.state.lock().await.jobs.last().cloned()
    }

    /// Make subsequent jobs fail as if no endpoint were reachable.
    pub async fn fail_connect(&self, fail: bool) {
        self.state.lock().await.fail_connect = fail;
    }

    /// Make subsequent jobs fail during the write.
    pub async fn fail_write(&self, fail: bool) {
        self.state.lock().await.fail_write = fail;
    }

    pub async fn clear(&self) {
        self.state.lock().await.jobs.clear();
    }
}

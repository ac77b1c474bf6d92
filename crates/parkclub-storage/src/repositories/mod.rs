pub mod ingreso;
pub mod recaudacion;

pub use ingreso::{INGRESOS_STORE, IngresoRepository, SqliteIngresoRepository};
pub use recaudacion::{RECAUDS_STORE, RecaudacionRepository, SqliteRecaudacionRepository};

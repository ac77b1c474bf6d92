pub mod ingreso;
pub mod recaudacion;

pub use ingreso::Ingreso;
pub use recaudacion::Recaudacion;

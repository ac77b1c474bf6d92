//! Storage layer for the parking station.
//!
//! This crate persists entries and collections in a local SQLite database.
//! Records are kept as JSON lists in rotated buckets: one bucket per month
//! for entries, one per day for collections. When a store moves to a new
//! bucket the previous one is evicted, so the database only ever holds the
//! current month of entries and the current day of collections.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`bucket`] - Bucket load/save/rotate primitives over a connection
//! - [`IngresoRepository`], [`RecaudacionRepository`] - Data access traits
//! - [`DisplayMessages`] - Operator-facing messages
//!
//! Every mutation of a store runs in a single SQL transaction: read the last
//! bucket, evict, read the list, append, write, record the last bucket.
//!
//! # Examples
//!
//! ```no_run
//! use parkclub_storage::{Database, DatabaseConfig};
//! use parkclub_storage::repositories::{RecaudacionRepository, SqliteRecaudacionRepository};
//! use chrono::Local;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("parkclub.db")).await?;
//! let recauds = SqliteRecaudacionRepository::new(db.pool().clone());
//!
//! let today = Local::now().date_naive();
//! recauds.daily_housekeeping(today).await?;
//! println!("Total hoy: $ {}", recauds.total_today(today).await?);
//! # Ok(())
//! # }
//! ```

pub mod bucket;
pub mod connection;
pub mod error;
pub mod messages;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use messages::DisplayMessages;
pub use models::{Ingreso, Recaudacion};
pub use repositories::{
    IngresoRepository, RecaudacionRepository, SqliteIngresoRepository,
    SqliteRecaudacionRepository,
};

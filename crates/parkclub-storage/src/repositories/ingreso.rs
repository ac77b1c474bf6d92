#![allow(async_fn_in_trait)]

use crate::bucket;
use crate::error::StorageResult;
use crate::models::Ingreso;
use chrono::NaiveDate;
use parkclub_core::{format_record_date, month_key, parse_record_date};
use sqlx::SqlitePool;

/// Store name of the entry buckets.
pub const INGRESOS_STORE: &str = "ingresos";

/// Repository trait for vehicle entries.
///
/// Entries live in a monthly bucket. Every query takes the station's current
/// date and only looks at that month's bucket.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature).
pub trait IngresoRepository: Send + Sync {
    /// Append an entry to the bucket of its own month.
    ///
    /// The month comes from `record.fecha`, or from `today` when `fecha` is
    /// not a valid date. Moving to a new month evicts the previous bucket.
    async fn add(&self, record: &Ingreso, today: NaiveDate) -> StorageResult<()>;

    /// All entries of the current month, in insertion order.
    async fn list_this_month(&self, today: NaiveDate) -> StorageResult<Vec<Ingreso>>;

    /// Entries of the current month registered today.
    async fn list_today(&self, today: NaiveDate) -> StorageResult<Vec<Ingreso>>;

    /// Find an entry of the current month by ticket id.
    async fn find_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<Option<Ingreso>>;

    /// Most recent entry of the current month for a plate (case-insensitive).
    async fn find_latest_by_placa(
        &self,
        placa: &str,
        today: NaiveDate,
    ) -> StorageResult<Option<Ingreso>>;

    /// Remove an entry from the current month. Returns `true` if it was there.
    async fn remove_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<bool>;

    /// Evict the previous month's bucket if the month changed.
    ///
    /// Returns the evicted bucket key.
    async fn housekeeping(&self, today: NaiveDate) -> StorageResult<Option<String>>;
}

/// SQLite implementation of IngresoRepository
#[derive(Debug, Clone)]
pub struct SqliteIngresoRepository {
    pool: SqlitePool,
}

impl SqliteIngresoRepository {
    /// Create a new SQLite entry repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl IngresoRepository for SqliteIngresoRepository {
    async fn add(&self, record: &Ingreso, today: NaiveDate) -> StorageResult<()> {
        let month = parse_record_date(&record.fecha)
            .map(month_key)
            .unwrap_or_else(|_| month_key(today));

        let mut tx = bucket::begin_write(&self.pool).await?;

        bucket::rotate(&mut tx, INGRESOS_STORE, &month).await?;
        let mut list: Vec<Ingreso> = bucket::load(&mut tx, INGRESOS_STORE, &month).await?;
        list.push(record.clone());
        bucket::save(&mut tx, INGRESOS_STORE, &month, &list).await?;

        tx.commit().await?;

        tracing::debug!(id = %record.id, placa = %record.placa, month = %month, "entry stored");
        Ok(())
    }

    async fn list_this_month(&self, today: NaiveDate) -> StorageResult<Vec<Ingreso>> {
        let mut conn = self.pool.acquire().await?;
        bucket::load(&mut conn, INGRESOS_STORE, &month_key(today)).await
    }

    async fn list_today(&self, today: NaiveDate) -> StorageResult<Vec<Ingreso>> {
        let day = format_record_date(today);
        let list = self.list_this_month(today).await?;
        Ok(list.into_iter().filter(|r| r.fecha == day).collect())
    }

    async fn find_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<Option<Ingreso>> {
        let list = self.list_this_month(today).await?;
        Ok(list.into_iter().find(|r| r.id == id))
    }

    async fn find_latest_by_placa(
        &self,
        placa: &str,
        today: NaiveDate,
    ) -> StorageResult<Option<Ingreso>> {
        let list = self.list_this_month(today).await?;
        Ok(list
            .into_iter()
            .filter(|r| r.has_placa(placa))
            .max_by(|a, b| a.recency_key().cmp(&b.recency_key())))
    }

    async fn remove_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<bool> {
        let month = month_key(today);
        let mut tx = bucket::begin_write(&self.pool).await?;

        let mut list: Vec<Ingreso> = bucket::load(&mut tx, INGRESOS_STORE, &month).await?;
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() != before;

        bucket::save(&mut tx, INGRESOS_STORE, &month, &list).await?;
        bucket::set_last_bucket(&mut tx, INGRESOS_STORE, &month).await?;

        tx.commit().await?;

        tracing::debug!(id, removed, "entry removed");
        Ok(removed)
    }

    async fn housekeeping(&self, today: NaiveDate) -> StorageResult<Option<String>> {
        let mut tx = bucket::begin_write(&self.pool).await?;
        let evicted = bucket::rotate(&mut tx, INGRESOS_STORE, &month_key(today)).await?;
        tx.commit().await?;
        Ok(evicted)
    }
}

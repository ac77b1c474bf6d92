#![allow(async_fn_in_trait)]

use crate::bucket;
use crate::error::StorageResult;
use crate::models::Recaudacion;
use chrono::NaiveDate;
use parkclub_core::{Money, day_key, parse_record_date};
use sqlx::SqlitePool;

/// Store name of the collection buckets.
pub const RECAUDS_STORE: &str = "recauds";

/// Repository trait for collections.
///
/// Collections live in a daily bucket; only today's bucket is kept.
pub trait RecaudacionRepository: Send + Sync {
    /// Evict the previous day's bucket if the day changed.
    ///
    /// Returns the evicted bucket key.
    async fn daily_housekeeping(&self, today: NaiveDate) -> StorageResult<Option<String>>;

    /// Append a collection to the bucket of its own day.
    ///
    /// The day comes from `record.fecha`, or `today` when `fecha` is not a
    /// valid date. Moving to a new day evicts the previous bucket.
    async fn add(&self, record: &Recaudacion, today: NaiveDate) -> StorageResult<()>;

    /// Today's collections, in insertion order.
    async fn list_today(&self, today: NaiveDate) -> StorageResult<Vec<Recaudacion>>;

    /// Sum of today's collections.
    async fn total_today(&self, today: NaiveDate) -> StorageResult<Money>;

    /// Drop today's bucket.
    async fn clear_today(&self, today: NaiveDate) -> StorageResult<()>;

    /// Find one of today's collections by id.
    async fn find_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<Option<Recaudacion>>;
}

/// SQLite implementation of RecaudacionRepository
#[derive(Debug, Clone)]
pub struct SqliteRecaudacionRepository {
    pool: SqlitePool,
}

impl SqliteRecaudacionRepository {
    /// Create a new SQLite collection repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RecaudacionRepository for SqliteRecaudacionRepository {
    async fn daily_housekeeping(&self, today: NaiveDate) -> StorageResult<Option<String>> {
        let mut tx = bucket::begin_write(&self.pool).await?;
        let evicted = bucket::rotate(&mut tx, RECAUDS_STORE, &day_key(today)).await?;
        tx.commit().await?;
        Ok(evicted)
    }

    async fn add(&self, record: &Recaudacion, today: NaiveDate) -> StorageResult<()> {
        let day = parse_record_date(&record.fecha)
            .map(day_key)
            .unwrap_or_else(|_| day_key(today));

        let mut tx = bucket::begin_write(&self.pool).await?;

        bucket::rotate(&mut tx, RECAUDS_STORE, &day).await?;
        let mut list: Vec<Recaudacion> = bucket::load(&mut tx, RECAUDS_STORE, &day).await?;
        list.push(record.clone());
        bucket::save(&mut tx, RECAUDS_STORE, &day, &list).await?;

        tx.commit().await?;

        tracing::debug!(id = %record.id, monto = %record.monto, day = %day, "collection stored");
        Ok(())
    }

    async fn list_today(&self, today: NaiveDate) -> StorageResult<Vec<Recaudacion>> {
        let mut conn = self.pool.acquire().await?;
        bucket::load(&mut conn, RECAUDS_STORE, &day_key(today)).await
    }

    async fn total_today(&self, today: NaiveDate) -> StorageResult<Money> {
        let list = self.list_today(today).await?;
        Ok(list.iter().map(|r| r.monto).sum())
    }

    async fn clear_today(&self, today: NaiveDate) -> StorageResult<()> {
        let day = day_key(today);
        let mut tx = bucket::begin_write(&self.pool).await?;

        bucket::delete(&mut tx, RECAUDS_STORE, &day).await?;
        bucket::set_last_bucket(&mut tx, RECAUDS_STORE, &day).await?;

        tx.commit().await?;

        tracing::info!(day = %day, "collections cleared");
        Ok(())
    }

    async fn find_by_id(&self, id: &str, today: NaiveDate) -> StorageResult<Option<Recaudacion>> {
        let list = self.list_today(today).await?;
        Ok(list.into_iter().find(|r| r.id == id))
    }
}

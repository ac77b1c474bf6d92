//! Bucketed JSON blob storage.
//!
//! A store keeps its records as one JSON array per bucket key. Only the
//! current bucket is meant to survive: whenever a store moves to a new key,
//! the bucket recorded as its last one is deleted.
//!
//! These functions take a plain connection so they can run either on a pooled
//! connection (reads) or inside a write transaction opened with
//! [`begin_write`] (every mutation):
//!
//! ```no_run
//! use parkclub_storage::{Database, bucket};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::in_memory().await?;
//! let mut tx = bucket::begin_write(db.pool()).await?;
//!
//! bucket::rotate(&mut tx, "recauds", "2025-08-19").await?;
//! let mut list: Vec<String> = bucket::load(&mut tx, "recauds", "2025-08-19").await?;
//! list.push("record".to_string());
//! bucket::save(&mut tx, "recauds", "2025-08-19", &list).await?;
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{StorageError, StorageResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Open a transaction that takes the database write lock up front.
///
/// Mutations read a bucket and write it back, so the lock must be held from
/// the read on. Concurrent writers wait on `busy_timeout` here instead of
/// failing with `SQLITE_BUSY_SNAPSHOT` at their first write.
pub async fn begin_write(pool: &SqlitePool) -> StorageResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Read the records of one bucket; a missing bucket is an empty list.
pub async fn load<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    store: &str,
    bucket: &str,
) -> StorageResult<Vec<T>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT payload FROM buckets WHERE store = ? AND bucket = ?")
            .bind(store)
            .bind(bucket)
            .fetch_optional(&mut *conn)
            .await?;

    match row {
        Some((payload,)) => {
            serde_json::from_str(&payload).map_err(|source| StorageError::Payload {
                store: store.to_string(),
                bucket: bucket.to_string(),
                source,
            })
        }
        None => Ok(Vec::new()),
    }
}

/// Replace the records of one bucket.
pub async fn save<T: Serialize>(
    conn: &mut SqliteConnection,
    store: &str,
    bucket: &str,
    records: &[T],
) -> StorageResult<()> {
    let payload = serde_json::to_string(records).map_err(|source| StorageError::Payload {
        store: store.to_string(),
        bucket: bucket.to_string(),
        source,
    })?;

    sqlx::query(
        r#"
        INSERT INTO buckets (store, bucket, payload, updated_at)
        VALUES (?, ?, ?, datetime('now'))
        ON CONFLICT (store, bucket)
        DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
        "#,
    )
    .bind(store)
    .bind(bucket)
    .bind(payload)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Delete one bucket. Returns `true` if it existed.
pub async fn delete(conn: &mut SqliteConnection, store: &str, bucket: &str) -> StorageResult<bool> {
    let result = sqlx::query("DELETE FROM buckets WHERE store = ? AND bucket = ?")
        .bind(store)
        .bind(bucket)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Bucket key the store last wrote to, if any.
pub async fn last_bucket(conn: &mut SqliteConnection, store: &str) -> StorageResult<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT last_bucket FROM store_state WHERE store = ?")
            .bind(store)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.map(|(last,)| last))
}

/// Record `bucket` as the store's last bucket.
pub async fn set_last_bucket(
    conn: &mut SqliteConnection,
    store: &str,
    bucket: &str,
) -> StorageResult<()> {
    sqlx::query(
        r#"
        INSERT INTO store_state (store, last_bucket, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT (store)
        DO UPDATE SET last_bucket = excluded.last_bucket, updated_at = excluded.updated_at
        "#,
    )
    .bind(store)
    .bind(bucket)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Move the store to `current`, evicting the previous bucket if it differs.
///
/// Returns the key of the evicted bucket.
pub async fn rotate(
    conn: &mut SqliteConnection,
    store: &str,
    current: &str,
) -> StorageResult<Option<String>> {
    let evicted = match last_bucket(conn, store).await? {
        Some(last) if last != current => {
            delete(conn, store, &last).await?;
            tracing::info!(store, evicted = %last, current, "evicted previous bucket");
            Some(last)
        }
        _ => None,
    };

    set_last_bucket(conn, store, current).await?;
    Ok(evicted)
}

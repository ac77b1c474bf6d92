//! Integration tests for the station database.
//!
//! These tests exercise the repositories against both in-memory and on-disk
//! SQLite databases, including reopening a file and concurrent writers.
//!
//! Run with: cargo test --package parkclub-storage --test integration_database

use chrono::NaiveDate;
use parkclub_core::{Jornada, Money, VehicleType};
use parkclub_storage::{
    Database, DatabaseConfig, Ingreso, IngresoRepository, Recaudacion, RecaudacionRepository,
    SqliteIngresoRepository, SqliteRecaudacionRepository,
};
use std::sync::Arc;
use tokio::sync::Barrier;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 19).unwrap()
}

fn ingreso(id: &str) -> Ingreso {
    Ingreso {
        id: id.to_string(),
        placa: "PBX-1234".to_string(),
        tipo_vehiculo: VehicleType::Moto,
        jornada: Jornada::Diario,
        tarifa: Money::from_cents(500),
        fecha: "2025-08-19".to_string(),
        hora: "10:00:00".to_string(),
    }
}

fn recaudacion(id: &str, cents: i64) -> Recaudacion {
    Recaudacion {
        id: id.to_string(),
        id_ingreso: format!("ING-{id}"),
        placa: "PBX-1234".to_string(),
        tipo_vehiculo: VehicleType::Moto,
        jornada: Jornada::Diario,
        fecha: "2025-08-19".to_string(),
        hora_entrada: "10:00:00".to_string(),
        hora_salida: "18:00:00".to_string(),
        monto: Money::from_cents(cents),
        fecha_entrada: None,
        horas_cobradas: None,
    }
}

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().await.unwrap();
    db.health_check().await.unwrap();
    db.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let db = Database::in_memory().await.unwrap();

    db.migrate().await.unwrap();
    db.migrate().await.unwrap();

    let result: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='buckets'")
            .fetch_one(db.pool())
            .await
            .unwrap();

    assert_eq!(result.0, 1);

    db.close().await;
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("parkclub.db");
    let path = path.to_string_lossy().to_string();

    {
        let db = Database::new(DatabaseConfig::new(path.clone())).await.unwrap();
        let ingresos = SqliteIngresoRepository::new(db.pool().clone());
        let recauds = SqliteRecaudacionRepository::new(db.pool().clone());

        ingresos.add(&ingreso("T1"), today()).await.unwrap();
        recauds.add(&recaudacion("R1", 500), today()).await.unwrap();
        db.close().await;
    }

    let db = Database::new(DatabaseConfig::new(path)).await.unwrap();
    let ingresos = SqliteIngresoRepository::new(db.pool().clone());
    let recauds = SqliteRecaudacionRepository::new(db.pool().clone());

    assert!(ingresos.find_by_id("T1", today()).await.unwrap().is_some());
    assert_eq!(recauds.total_today(today()).await.unwrap().to_string(), "5.00");

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parkclub.db").to_string_lossy().to_string();
    let db = Database::new(DatabaseConfig::new(path).max_connections(8))
        .await
        .unwrap();
    let repo = Arc::new(SqliteRecaudacionRepository::new(db.pool().clone()));

    const NUM_CONCURRENT_TASKS: usize = 20;
    let barrier = Arc::new(Barrier::new(NUM_CONCURRENT_TASKS));

    let mut handles = vec![];

    for i in 0..NUM_CONCURRENT_TASKS {
        let repo = repo.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.add(&recaudacion(&format!("R{i}"), 100), today()).await
        }));
    }

    for result in futures::future::join_all(handles).await {
        result.unwrap().unwrap();
    }

    let list = repo.list_today(today()).await.unwrap();
    assert_eq!(list.len(), NUM_CONCURRENT_TASKS);
    assert_eq!(repo.total_today(today()).await.unwrap().to_string(), "20.00");

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_entry_adds_and_removes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parkclub.db").to_string_lossy().to_string();
    let db = Database::new(DatabaseConfig::new(path).max_connections(8))
        .await
        .unwrap();
    let repo = Arc::new(SqliteIngresoRepository::new(db.pool().clone()));

    for i in 0..5 {
        repo.add(&ingreso(&format!("OLD{i}")), today()).await.unwrap();
    }

    let barrier = Arc::new(Barrier::new(10));
    let mut handles = vec![];

    for i in 0..5 {
        let add_repo = repo.clone();
        let add_barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            add_barrier.wait().await;
            add_repo.add(&ingreso(&format!("NEW{i}")), today()).await.map(|_| true)
        }));

        let repo = repo.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.remove_by_id(&format!("OLD{i}"), today()).await
        }));
    }

    for result in futures::future::join_all(handles).await {
        assert!(result.unwrap().unwrap());
    }

    let mut ids: Vec<String> = repo
        .list_this_month(today())
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["NEW0", "NEW1", "NEW2", "NEW3", "NEW4"]);

    db.close().await;
}

#[tokio::test]
async fn test_stores_rotate_independently() {
    let db = Database::in_memory().await.unwrap();
    let ingresos = SqliteIngresoRepository::new(db.pool().clone());
    let recauds = SqliteRecaudacionRepository::new(db.pool().clone());

    ingresos.add(&ingreso("T1"), today()).await.unwrap();
    recauds.add(&recaudacion("R1", 500), today()).await.unwrap();

    // Next day: collections rotate, entries stay in the same month
    let tomorrow = today().succ_opt().unwrap();
    recauds.daily_housekeeping(tomorrow).await.unwrap();
    ingresos.housekeeping(tomorrow).await.unwrap();

    assert!(recauds.list_today(today()).await.unwrap().is_empty());
    assert_eq!(ingresos.list_this_month(tomorrow).await.unwrap().len(), 1);

    db.close().await;
}

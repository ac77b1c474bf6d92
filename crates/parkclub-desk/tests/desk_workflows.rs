//! Station workflows against an in-memory database and a mock printer.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use parkclub_core::{Clock, FixedClock, Jornada, Money, VehicleType};
use parkclub_desk::{DeskError, ParkingDesk};
use parkclub_printer::mock::{MockPrinter, MockPrinterHandle};
use parkclub_storage::{
    Database, DisplayMessages, Ingreso, IngresoRepository, Recaudacion, RecaudacionRepository,
    SqliteIngresoRepository, SqliteRecaudacionRepository, StorageError, StorageResult,
};
use rstest::rstest;
use std::sync::Arc;

type TestDesk = ParkingDesk<SqliteIngresoRepository, SqliteRecaudacionRepository, MockPrinter>;

struct Station {
    desk: TestDesk,
    printer: MockPrinterHandle,
    clock: Arc<FixedClock>,
    ingresos: SqliteIngresoRepository,
    recaudaciones: SqliteRecaudacionRepository,
    _db: Database,
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

async fn station_at(now: NaiveDateTime) -> Station {
    let db = Database::in_memory().await.unwrap();
    let ingresos = SqliteIngresoRepository::new(db.pool().clone());
    let recaudaciones = SqliteRecaudacionRepository::new(db.pool().clone());
    let (printer, handle) = MockPrinter::new();
    let clock = Arc::new(FixedClock::new(now));

    let desk = ParkingDesk::new(ingresos.clone(), recaudaciones.clone(), printer)
        .with_clock(clock.clone());

    Station {
        desk,
        printer: handle,
        clock,
        ingresos,
        recaudaciones,
        _db: db,
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}

// ============================================================================
// Entry
// ============================================================================

#[tokio::test]
async fn test_register_entry_prints_then_stores() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    let ingreso = st
        .desk
        .register_entry(" pbx-1234 ", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();

    assert_eq!(ingreso.placa, "PBX-1234");
    assert_eq!(ingreso.fecha, "2025-08-19");
    assert_eq!(ingreso.hora, "08:00:00");
    assert_eq!(ingreso.tarifa, Money::from_cents(75));
    assert!(ingreso.id.starts_with("20250819-080000-"));

    let job = st.printer.last_job().await.unwrap();
    assert!(contains(&job, "TICKET DE INGRESO"));
    assert!(contains(&job, "Placa: PBX-1234"));
    assert!(contains(&job, &ingreso.id));
    assert!(contains(&job, "Tarifa base: $ 0.75"));

    let today = st.clock.today();
    let stored = st.ingresos.find_by_id(&ingreso.id, today).await.unwrap();
    assert_eq!(stored, Some(ingreso));
}

#[tokio::test]
async fn test_register_entry_print_failure_stores_nothing() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    st.printer.fail_connect(true).await;

    let err = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap_err();

    assert!(matches!(err, DeskError::Printer(_)));
    assert!(err.is_clean_failure());
    let today = st.clock.today();
    assert!(st.ingresos.list_this_month(today).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_entry_rejects_bad_plates() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    let err = st
        .desk
        .register_entry("   ", VehicleType::Moto, Jornada::Noche)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::EmptyPlate));

    let err = st
        .desk
        .register_entry("PBX 1234!", VehicleType::Moto, Jornada::Noche)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Core(parkclub_core::Error::InvalidPlate(_))));

    assert_eq!(st.printer.job_count().await, 0);
}

#[tokio::test]
async fn test_register_entry_rejects_unselectable_jornada() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    let err = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Completo)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeskError::Core(parkclub_core::Error::UnknownJornada(ref name)) if name == "Completo"
    ));
    assert_eq!(err.user_message(), DisplayMessages::INVALID_JORNADA);

    let err = st
        .desk
        .register_entry_from_text("PBX-1234", VehicleType::Moto, Jornada::Completo)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Core(parkclub_core::Error::UnknownJornada(_))));

    assert_eq!(st.printer.job_count().await, 0);
    let today = st.clock.today();
    assert!(st.ingresos.list_today(today).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_entry_from_ocr_text() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    let ingreso = st
        .desk
        .register_entry_from_text("ECUADOR\nABC-1234\nGUAYAS", VehicleType::Carro, Jornada::Diario)
        .await
        .unwrap();
    assert_eq!(ingreso.placa, "ABC-1234");
    assert_eq!(ingreso.tarifa, Money::from_cents(500));

    let err = st
        .desk
        .register_entry_from_text("no plate here", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::NoPlateDetected));

    let err = st
        .desk
        .register_entry_from_text("ecuador abc-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::NoPlateDetected));
    assert_eq!(st.printer.job_count().await, 1);
}

#[rstest]
#[case(VehicleType::Carro, Jornada::Dia, "0.75")]
#[case(VehicleType::Carro, Jornada::Noche, "1.00")]
#[case(VehicleType::Moto, Jornada::Diario, "5.00")]
#[case(VehicleType::Moto, Jornada::Nocturno, "5.00")]
#[tokio::test]
async fn test_entry_ticket_shows_base_rate(
    #[case] vehicle: VehicleType,
    #[case] jornada: Jornada,
    #[case] base: &str,
) {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    let ingreso = st.desk.register_entry("PBX-1234", vehicle, jornada).await.unwrap();

    assert_eq!(ingreso.tarifa.to_string(), base);
    let job = st.printer.last_job().await.unwrap();
    assert!(contains(&job, &format!("Tarifa base: $ {base}")));
    assert!(contains(&job, &format!("Tipo: {vehicle}  ·  Jornada: {jornada}")));
}

// ============================================================================
// Exit
// ============================================================================

#[tokio::test]
async fn test_checkout_serializes_for_display() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Moto, Jornada::Noche)
        .await
        .unwrap();
    st.clock.advance(Duration::minutes(150));

    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    let json = serde_json::to_value(&checkout).unwrap();

    assert_eq!(json["ingreso"]["placa"], "PBX-1234");
    assert_eq!(json["fee"]["hours_charged"], 3);
    assert_eq!(json["fee"]["total"], "3.00");
    assert_eq!(json["fee"]["exit_time"], "10:30:00");
}

#[tokio::test]
async fn test_checkout_by_ticket_and_finalize() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();

    st.clock.advance(Duration::minutes(61));
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    assert_eq!(checkout.fee.minutes, 61);
    assert_eq!(checkout.fee.hours_charged, 2);
    assert_eq!(checkout.fee.total.to_string(), "1.50");
    assert_eq!(checkout.fee.exit_time, "09:01:00");

    let recaudacion = st.desk.finalize(&checkout, true).await.unwrap();
    assert_eq!(recaudacion.id_ingreso, ingreso.id);
    assert_eq!(recaudacion.monto, Money::from_cents(150));
    assert_eq!(recaudacion.fecha, "2025-08-19");
    assert_eq!(recaudacion.fecha_entrada.as_deref(), Some("2025-08-19"));
    assert_eq!(recaudacion.horas_cobradas, Some(2));

    let receipt = st.printer.last_job().await.unwrap();
    assert!(contains(&receipt, "TICKET DE SALIDA"));
    assert!(contains(&receipt, "Salida: 09:01:00"));
    assert!(contains(&receipt, "$ 1.50"));
    assert!(contains(&receipt, "Horas cobradas: 2"));

    // Entry is closed
    let err = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap_err();
    assert!(matches!(err, DeskError::TicketNotFound(_)));

    let today = st.clock.today();
    let collections = st.recaudaciones.list_today(today).await.unwrap();
    assert_eq!(collections, vec![recaudacion]);
}

#[tokio::test]
async fn test_checkout_unknown_or_garbage_ticket() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    for scanned in ["20250819-080000-1234", "", "not a ticket"] {
        let err = st.desk.checkout_by_ticket(scanned).await.unwrap_err();
        assert!(matches!(err, DeskError::TicketNotFound(_)), "{scanned:?}");
    }
}

#[tokio::test]
async fn test_checkout_by_plate_picks_latest() {
    let st = station_at(at(2025, 8, 18, 20, 0)).await;
    let older = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Noche)
        .await
        .unwrap();

    st.clock.set(at(2025, 8, 19, 7, 30));
    let newer = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();

    st.clock.set(at(2025, 8, 19, 8, 0));
    let checkout = st.desk.checkout_by_plate("pbx-1234").await.unwrap();
    assert_eq!(checkout.ingreso.id, newer.id);
    assert_ne!(checkout.ingreso.id, older.id);
    assert_eq!(checkout.fee.total.to_string(), "0.75");

    let err = st.desk.checkout_by_plate("  ").await.unwrap_err();
    assert!(matches!(err, DeskError::EmptyPlate));

    let err = st.desk.checkout_by_plate("ZZZ-999").await.unwrap_err();
    assert!(matches!(err, DeskError::PlateNotFound(_)));
}

#[tokio::test]
async fn test_finalize_print_failure_changes_nothing() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Moto, Jornada::Dia)
        .await
        .unwrap();
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();

    st.printer.fail_write(true).await;
    let err = st.desk.finalize(&checkout, true).await.unwrap_err();
    assert!(matches!(err, DeskError::Printer(_)));

    let today = st.clock.today();
    assert!(st.ingresos.find_by_id(&ingreso.id, today).await.unwrap().is_some());
    assert!(st.recaudaciones.list_today(today).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_finalize_without_printing() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    // Completo is only found on records written before it left the menu
    let ingreso = Ingreso {
        id: "20250819-080000-4321".to_string(),
        placa: "PBX-1234".to_string(),
        tipo_vehiculo: VehicleType::Carro,
        jornada: Jornada::Completo,
        tarifa: Money::from_cents(500),
        fecha: "2025-08-19".to_string(),
        hora: "08:00:00".to_string(),
    };
    st.ingresos.add(&ingreso, st.clock.today()).await.unwrap();
    let jobs_after_entry = st.printer.job_count().await;

    st.clock.advance(Duration::hours(10));
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    assert!(checkout.fee.flat);

    let recaudacion = st.desk.finalize(&checkout, false).await.unwrap();
    assert_eq!(recaudacion.monto.to_string(), "5.00");
    assert_eq!(recaudacion.horas_cobradas, Some(1));
    assert_eq!(st.printer.job_count().await, jobs_after_entry);
}

#[tokio::test]
async fn test_finalize_twice_records_one_collection() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();

    st.clock.advance(Duration::minutes(30));
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    st.desk.finalize(&checkout, true).await.unwrap();
    let jobs = st.printer.job_count().await;

    let err = st.desk.finalize(&checkout, true).await.unwrap_err();
    assert!(matches!(err, DeskError::EntryNotFound(ref id) if *id == ingreso.id));
    assert!(err.is_clean_failure());
    assert_eq!(st.printer.job_count().await, jobs);

    let today = st.clock.today();
    assert_eq!(st.recaudaciones.list_today(today).await.unwrap().len(), 1);
}

/// Collection store that always fails to write.
#[derive(Debug, Clone)]
struct BrokenRecaudaciones;

impl RecaudacionRepository for BrokenRecaudaciones {
    async fn daily_housekeeping(&self, _today: NaiveDate) -> StorageResult<Option<String>> {
        Ok(None)
    }

    async fn add(&self, _record: &Recaudacion, _today: NaiveDate) -> StorageResult<()> {
        Err(StorageError::Validation("disk full".to_string()))
    }

    async fn list_today(&self, _today: NaiveDate) -> StorageResult<Vec<Recaudacion>> {
        Ok(Vec::new())
    }

    async fn total_today(&self, _today: NaiveDate) -> StorageResult<Money> {
        Ok(Money::ZERO)
    }

    async fn clear_today(&self, _today: NaiveDate) -> StorageResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &str, _today: NaiveDate) -> StorageResult<Option<Recaudacion>> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_storage_failure_after_print_is_reported() {
    let db = Database::in_memory().await.unwrap();
    let ingresos = SqliteIngresoRepository::new(db.pool().clone());
    let (printer, handle) = MockPrinter::new();
    let clock = Arc::new(FixedClock::new(at(2025, 8, 19, 8, 0)));
    let desk = ParkingDesk::new(ingresos.clone(), BrokenRecaudaciones, printer)
        .with_clock(clock.clone());

    let ingreso = desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();
    let checkout = desk.checkout_by_ticket(&ingreso.id).await.unwrap();

    let err = desk.finalize(&checkout, true).await.unwrap_err();
    assert!(matches!(err, DeskError::PrintedNotSaved { .. }));
    assert_eq!(err.user_message(), "Impreso, pero no se pudo guardar");
    assert_eq!(handle.job_count().await, 2);

    // The entry stays open so the checkout can be repeated
    let today = clock.today();
    assert!(ingresos.find_by_id(&ingreso.id, today).await.unwrap().is_some());

    // Without printing it is a plain storage error
    let err = desk.finalize(&checkout, false).await.unwrap_err();
    assert!(matches!(err, DeskError::Storage(_)));
}

// ============================================================================
// Collections and control
// ============================================================================

#[tokio::test]
async fn test_collections_summary_and_clear() {
    let st = station_at(at(2025, 8, 19, 8, 0)).await;

    for (placa, jornada) in [("AAA-111", Jornada::Dia), ("BBB-222", Jornada::Diario)] {
        let ingreso = st
            .desk
            .register_entry(placa, VehicleType::Carro, jornada)
            .await
            .unwrap();
        let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
        st.desk.finalize(&checkout, false).await.unwrap();
    }

    let summary = st.desk.collections_today().await.unwrap();
    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.total.to_string(), "5.75");

    st.desk.clear_collections_today().await.unwrap();
    let summary = st.desk.collections_today().await.unwrap();
    assert!(summary.is_empty());
    assert_eq!(summary.total, Money::ZERO);
}

#[tokio::test]
async fn test_reprint_overnight_receipt_uses_entry_date() {
    let st = station_at(at(2025, 8, 19, 22, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Nocturno)
        .await
        .unwrap();

    st.clock.set(at(2025, 8, 20, 6, 0));
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    let recaudacion = st.desk.finalize(&checkout, true).await.unwrap();
    assert_eq!(recaudacion.fecha, "2025-08-20");

    let reprinted = st.desk.reprint_receipt(&recaudacion.id).await.unwrap();
    assert_eq!(reprinted, recaudacion);

    let job = st.printer.last_job().await.unwrap();
    assert!(contains(&job, "Fecha: 2025-08-19"));
    assert!(contains(&job, "Reimpresion de recibo"));
    assert!(contains(&job, "Horas cobradas: 1"));

    let err = st.desk.reprint_receipt("missing").await.unwrap_err();
    assert!(matches!(err, DeskError::CollectionNotFound(_)));
}

#[tokio::test]
async fn test_control_today_and_entry_reprint() {
    let st = station_at(at(2025, 8, 18, 18, 0)).await;
    st.desk
        .register_entry("OLD-001", VehicleType::Carro, Jornada::Noche)
        .await
        .unwrap();

    st.clock.set(at(2025, 8, 19, 8, 0));
    let first = st
        .desk
        .register_entry("AAA-111", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();
    st.desk
        .register_entry("BBB-222", VehicleType::Moto, Jornada::Dia)
        .await
        .unwrap();

    let control = st.desk.control_today().await.unwrap();
    assert_eq!(control.total, 2);
    assert_eq!(control.carros, 1);
    assert_eq!(control.motos, 1);

    st.printer.clear().await;
    let reprinted = st.desk.reprint_entry_ticket(&first.id).await.unwrap();
    assert_eq!(reprinted, first);
    let job = st.printer.last_job().await.unwrap();
    assert!(contains(&job, &first.id));

    let err = st.desk.reprint_entry_ticket("nope").await.unwrap_err();
    assert!(matches!(err, DeskError::EntryNotFound(_)));
}

#[tokio::test]
async fn test_startup_housekeeping_evicts_previous_buckets() {
    let st = station_at(at(2025, 7, 31, 20, 0)).await;
    let ingreso = st
        .desk
        .register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();
    let checkout = st.desk.checkout_by_ticket(&ingreso.id).await.unwrap();
    st.desk.finalize(&checkout, false).await.unwrap();
    st.desk
        .register_entry("PBX-5678", VehicleType::Carro, Jornada::Dia)
        .await
        .unwrap();

    let first = st.desk.startup_housekeeping().await.unwrap();
    assert_eq!(first.evicted_month, None);
    assert_eq!(first.evicted_day, None);

    st.clock.set(at(2025, 8, 1, 7, 0));
    let rotated = st.desk.startup_housekeeping().await.unwrap();
    assert_eq!(rotated.evicted_month.as_deref(), Some("2025-07"));
    assert_eq!(rotated.evicted_day.as_deref(), Some("2025-07-31"));

    assert!(st.desk.control_today().await.unwrap().entries.is_empty());
    assert!(st.desk.collections_today().await.unwrap().is_empty());
}

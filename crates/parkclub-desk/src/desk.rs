//! Station workflows.
//!
//! [`ParkingDesk`] ties the entry and collection stores to the printer. Each
//! workflow prints before it stores: a ticket that never reached the printer
//! leaves no record behind, and a record is never removed for a receipt the
//! customer did not get.

use crate::error::{DeskError, DeskResult};
use chrono::NaiveDateTime;
use parkclub_core::{
    Clock, FeeCalculation, Jornada, Money, Plate, SystemClock, TariffService, TicketId,
    VehicleType, extract_plate, format_record_date, format_record_time,
};
use parkclub_printer::Printer;
use parkclub_printer::tickets::{self, BranchInfo, EntryTicket, ExitReceipt};
use parkclub_storage::{Ingreso, IngresoRepository, Recaudacion, RecaudacionRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An open entry matched at the exit, with the amount owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkout {
    pub ingreso: Ingreso,
    pub fee: FeeCalculation,
}

/// Today's collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionsSummary {
    pub records: Vec<Recaudacion>,
    pub total: Money,
}

impl CollectionsSummary {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Today's entries with per-vehicle counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSummary {
    pub entries: Vec<Ingreso>,
    pub total: usize,
    pub carros: usize,
    pub motos: usize,
}

impl ControlSummary {
    fn from_entries(entries: Vec<Ingreso>) -> Self {
        let carros = entries
            .iter()
            .filter(|e| e.tipo_vehiculo == VehicleType::Carro)
            .count();
        let motos = entries
            .iter()
            .filter(|e| e.tipo_vehiculo == VehicleType::Moto)
            .count();

        Self {
            total: entries.len(),
            carros,
            motos,
            entries,
        }
    }
}

/// Buckets evicted by start-up housekeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Housekeeping {
    /// Entry month bucket that was dropped
    pub evicted_month: Option<String>,

    /// Collection day bucket that was dropped
    pub evicted_day: Option<String>,
}

/// The parking station.
///
/// # Examples
///
/// ```no_run
/// use parkclub_core::{Jornada, VehicleType};
/// use parkclub_desk::ParkingDesk;
/// use parkclub_printer::{Endpoint, PrinterConfig, TicketPrinter};
/// use parkclub_storage::{Database, SqliteIngresoRepository, SqliteRecaudacionRepository};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = Database::new(Default::default()).await?;
///     let printer = TicketPrinter::new(
///         PrinterConfig::default().endpoint(Endpoint::tcp("192.168.1.50:9100")),
///     );
///
///     let desk = ParkingDesk::new(
///         SqliteIngresoRepository::new(db.pool().clone()),
///         SqliteRecaudacionRepository::new(db.pool().clone()),
///         printer,
///     );
///
///     desk.startup_housekeeping().await?;
///     let ingreso = desk.register_entry("PBX-1234", VehicleType::Carro, Jornada::Dia).await?;
///
///     let checkout = desk.checkout_by_ticket(&ingreso.id).await?;
///     desk.finalize(&checkout, true).await?;
///     Ok(())
/// }
/// ```
pub struct ParkingDesk<I, R, P> {
    ingresos: I,
    recaudaciones: R,
    printer: P,
    clock: Arc<dyn Clock>,
    branch: BranchInfo,
    tariff: TariffService,
}

impl<I, R, P> ParkingDesk<I, R, P>
where
    I: IngresoRepository,
    R: RecaudacionRepository,
    P: Printer,
{
    /// Create a desk with the system clock, default branch and tariff.
    pub fn new(ingresos: I, recaudaciones: R, printer: P) -> Self {
        Self {
            ingresos,
            recaudaciones,
            printer,
            clock: Arc::new(SystemClock),
            branch: BranchInfo::default(),
            tariff: TariffService::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: BranchInfo) -> Self {
        self.branch = branch;
        self
    }

    #[must_use]
    pub fn with_tariff(mut self, tariff: TariffService) -> Self {
        self.tariff = tariff;
        self
    }

    pub fn branch(&self) -> &BranchInfo {
        &self.branch
    }

    pub fn tariff(&self) -> &TariffService {
        &self.tariff
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Entry
    // ------------------------------------------------------------------

    /// Register a vehicle entry and print its ticket.
    ///
    /// Only [`Jornada::SELECTABLE`] jornadas are accepted. The entry is
    /// stored only after the ticket printed.
    pub async fn register_entry(
        &self,
        placa: &str,
        vehicle: VehicleType,
        jornada: Jornada,
    ) -> DeskResult<Ingreso> {
        if placa.trim().is_empty() {
            return Err(DeskError::EmptyPlate);
        }
        let plate = Plate::new(placa)?;
        self.register_plate(plate, vehicle, jornada).await
    }

    /// Register an entry from OCR text, using the first plate found in it.
    pub async fn register_entry_from_text(
        &self,
        text: &str,
        vehicle: VehicleType,
        jornada: Jornada,
    ) -> DeskResult<Ingreso> {
        let plate = extract_plate(text).ok_or(DeskError::NoPlateDetected)?;
        debug!(plate = %plate, "plate recognised");
        self.register_plate(plate, vehicle, jornada).await
    }

    async fn register_plate(
        &self,
        plate: Plate,
        vehicle: VehicleType,
        jornada: Jornada,
    ) -> DeskResult<Ingreso> {
        if !jornada.is_selectable() {
            return Err(parkclub_core::Error::UnknownJornada(jornada.to_string()).into());
        }

        let now = self.clock.now();
        let ingreso = Ingreso {
            id: TicketId::generate(now).into(),
            placa: plate.as_str().to_string(),
            tipo_vehiculo: vehicle,
            jornada,
            tarifa: self.tariff.base_rate(vehicle, jornada),
            fecha: format_record_date(now.date()),
            hora: format_record_time(now.time()),
        };

        let job = self.entry_ticket(&ingreso).render(&self.branch)?;
        self.printer.print(&job).await?;

        self.ingresos
            .add(&ingreso, now.date())
            .await
            .map_err(|source| DeskError::PrintedNotSaved { source })?;

        info!(
            id = %ingreso.id,
            placa = %ingreso.placa,
            tipo = %vehicle,
            jornada = %jornada,
            "entry registered"
        );
        Ok(ingreso)
    }

    /// Reprint the ticket of an entry registered this month.
    pub async fn reprint_entry_ticket(&self, ingreso_id: &str) -> DeskResult<Ingreso> {
        let today = self.clock.today();
        let ingreso = self
            .ingresos
            .find_by_id(ingreso_id.trim(), today)
            .await?
            .ok_or_else(|| DeskError::EntryNotFound(ingreso_id.trim().to_string()))?;

        let job = self.entry_ticket(&ingreso).render(&self.branch)?;
        self.printer.print(&job).await?;

        info!(id = %ingreso.id, "entry ticket reprinted");
        Ok(ingreso)
    }

    fn entry_ticket(&self, ingreso: &Ingreso) -> EntryTicket {
        EntryTicket {
            placa: ingreso.placa.clone(),
            fecha: ingreso.fecha.clone(),
            hora: ingreso.hora.clone(),
            qr_data: ingreso.id.clone(),
            info: tickets::entry_info(
                &self.branch,
                ingreso.tipo_vehiculo,
                ingreso.jornada,
                ingreso.tarifa,
            ),
        }
    }

    // ------------------------------------------------------------------
    // Exit
    // ------------------------------------------------------------------

    /// Look up an open entry by the scanned QR value.
    pub async fn checkout_by_ticket(&self, ticket: &str) -> DeskResult<Checkout> {
        let id = TicketId::parse(ticket)
            .map_err(|_| DeskError::TicketNotFound(ticket.trim().to_string()))?;
        let now = self.clock.now();

        let ingreso = self
            .ingresos
            .find_by_id(id.as_str(), now.date())
            .await?
            .ok_or_else(|| DeskError::TicketNotFound(id.to_string()))?;

        Ok(self.checkout(ingreso, now))
    }

    /// Look up the latest open entry for a plate.
    pub async fn checkout_by_plate(&self, placa: &str) -> DeskResult<Checkout> {
        let placa = placa.trim();
        if placa.is_empty() {
            return Err(DeskError::EmptyPlate);
        }
        let now = self.clock.now();

        let ingreso = self
            .ingresos
            .find_latest_by_placa(placa, now.date())
            .await?
            .ok_or_else(|| DeskError::PlateNotFound(placa.to_uppercase()))?;

        Ok(self.checkout(ingreso, now))
    }

    fn checkout(&self, ingreso: Ingreso, now: NaiveDateTime) -> Checkout {
        let fee = self.tariff.calculate(
            ingreso.tipo_vehiculo,
            ingreso.jornada,
            ingreso.entered_at(),
            now,
        );
        debug!(
            id = %ingreso.id,
            minutes = fee.minutes,
            hours = fee.hours_charged,
            total = %fee.total,
            "checkout priced"
        );
        Checkout { ingreso, fee }
    }

    /// Complete a checkout: print the receipt, record the collection and
    /// close the entry.
    ///
    /// The entry must still be open: finalizing the same checkout twice
    /// fails with [`DeskError::EntryNotFound`] and records nothing. With
    /// `print` set, a printer failure aborts before anything is stored. A
    /// storage failure after a successful print is reported as
    /// [`DeskError::PrintedNotSaved`].
    pub async fn finalize(&self, checkout: &Checkout, print: bool) -> DeskResult<Recaudacion> {
        let Checkout { ingreso, fee } = checkout;
        let today = self.clock.today();

        if self.ingresos.find_by_id(&ingreso.id, today).await?.is_none() {
            return Err(DeskError::EntryNotFound(ingreso.id.clone()));
        }

        if print {
            let receipt = ExitReceipt {
                placa: ingreso.placa.clone(),
                fecha: ingreso.fecha.clone(),
                hora_entrada: ingreso.hora.clone(),
                hora_salida: fee.exit_time.clone(),
                total: fee.total,
                info: tickets::exit_info(
                    &self.branch,
                    ingreso.tipo_vehiculo,
                    ingreso.jornada,
                    fee.hours_charged,
                ),
            };
            self.printer.print(&receipt.render(&self.branch)?).await?;
        }

        let recaudacion = Recaudacion {
            id: Uuid::new_v4().to_string(),
            id_ingreso: ingreso.id.clone(),
            placa: ingreso.placa.clone(),
            tipo_vehiculo: ingreso.tipo_vehiculo,
            jornada: ingreso.jornada,
            fecha: format_record_date(today),
            hora_entrada: ingreso.hora.clone(),
            hora_salida: fee.exit_time.clone(),
            monto: fee.total,
            fecha_entrada: Some(ingreso.fecha.clone()),
            horas_cobradas: Some(fee.hours_charged),
        };

        let stored = async {
            self.recaudaciones.add(&recaudacion, today).await?;
            self.ingresos.remove_by_id(&ingreso.id, today).await
        }
        .await;

        match stored {
            Ok(removed) => {
                if !removed {
                    warn!(id = %ingreso.id, "entry closed while finalizing");
                }
                info!(
                    id = %ingreso.id,
                    placa = %ingreso.placa,
                    monto = %recaudacion.monto,
                    printed = print,
                    "checkout finalized"
                );
                Ok(recaudacion)
            }
            Err(source) if print => Err(DeskError::PrintedNotSaved { source }),
            Err(source) => Err(source.into()),
        }
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    pub async fn collections_today(&self) -> DeskResult<CollectionsSummary> {
        let records = self.recaudaciones.list_today(self.clock.today()).await?;
        let total = records.iter().map(|r| r.monto).sum();
        Ok(CollectionsSummary { records, total })
    }

    pub async fn clear_collections_today(&self) -> DeskResult<()> {
        self.recaudaciones.clear_today(self.clock.today()).await?;
        info!("today's collections cleared");
        Ok(())
    }

    /// Reprint the receipt of one of today's collections.
    pub async fn reprint_receipt(&self, recaudacion_id: &str) -> DeskResult<Recaudacion> {
        let id = recaudacion_id.trim();
        let recaudacion = self
            .recaudaciones
            .find_by_id(id, self.clock.today())
            .await?
            .ok_or_else(|| DeskError::CollectionNotFound(id.to_string()))?;

        let receipt = ExitReceipt {
            placa: recaudacion.placa.clone(),
            fecha: recaudacion.receipt_date().to_string(),
            hora_entrada: recaudacion.hora_entrada.clone(),
            hora_salida: recaudacion.hora_salida.clone(),
            total: recaudacion.monto,
            info: tickets::reprint_info(
                &self.branch,
                recaudacion.tipo_vehiculo,
                recaudacion.jornada,
                recaudacion.horas_cobradas,
            ),
        };
        self.printer.print(&receipt.render(&self.branch)?).await?;

        info!(id = %recaudacion.id, "receipt reprinted");
        Ok(recaudacion)
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    pub async fn control_today(&self) -> DeskResult<ControlSummary> {
        let entries = self.ingresos.list_today(self.clock.today()).await?;
        Ok(ControlSummary::from_entries(entries))
    }

    /// Evict stale buckets in both stores.
    pub async fn startup_housekeeping(&self) -> DeskResult<Housekeeping> {
        let today = self.clock.today();
        let evicted_month = self.ingresos.housekeeping(today).await?;
        let evicted_day = self.recaudaciones.daily_housekeeping(today).await?;

        debug!(?evicted_month, ?evicted_day, "housekeeping done");
        Ok(Housekeeping {
            evicted_month,
            evicted_day,
        })
    }
}

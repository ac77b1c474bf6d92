//! Command execution and console output.

use crate::config::AppConfig;
use crate::{Cli, Command, EntryArgs, ExitArgs};
use anyhow::{Context, Result};
use chrono::Utc;
use parkclub_core::extract_plate;
use parkclub_desk::{Checkout, CollectionsSummary, ControlSummary, ParkingDesk};
use parkclub_printer::TicketPrinter;
use parkclub_storage::{
    Database, DisplayMessages, Ingreso, Recaudacion, SqliteIngresoRepository,
    SqliteRecaudacionRepository,
};
use serde::Serialize;
use tracing::{debug, info};

type Desk = ParkingDesk<SqliteIngresoRepository, SqliteRecaudacionRepository, TicketPrinter>;

pub async fn run(cli: Cli) -> Result<()> {
    let (config, source) = AppConfig::load(cli.config.as_deref())?;
    match &source {
        Some(path) => debug!(path = %path.display(), "configuration loaded"),
        None => debug!("no configuration file, using defaults"),
    }

    config.license_gate().check(Utc::now())?;

    let db = Database::new(config.database_config())
        .await
        .with_context(|| format!("cannot open database {}", config.database.path.display()))?;

    let desk = ParkingDesk::new(
        SqliteIngresoRepository::new(db.pool().clone()),
        SqliteRecaudacionRepository::new(db.pool().clone()),
        TicketPrinter::new(config.printer.clone()),
    )
    .with_branch(config.branch.clone())
    .with_tariff(config.tariff_service());

    let housekeeping = desk.startup_housekeeping().await?;

    let output = Output { json: cli.json };
    let result = match cli.command {
        Command::Entry(args) => entry(&desk, &output, args).await,
        Command::Exit(args) => exit(&desk, &output, args).await,
        Command::Collections { clear } => collections(&desk, &output, clear).await,
        Command::ReprintReceipt { id } => {
            let recaudacion = desk.reprint_receipt(&id).await?;
            output.collection_reprinted(&recaudacion)
        }
        Command::Control => {
            let control = desk.control_today().await?;
            output.control(&control)
        }
        Command::ReprintEntry { id } => {
            let ingreso = desk.reprint_entry_ticket(&id).await?;
            output.entry(&ingreso, DisplayMessages::REPRINTED)
        }
        Command::Plate { text } => {
            let plate = extract_plate(&text).ok_or(parkclub_desk::DeskError::NoPlateDetected)?;
            output.line_or_json(plate.as_str(), &plate.as_str())
        }
        Command::Housekeeping => output.housekeeping(&housekeeping),
    };

    db.close().await;
    result
}

async fn entry(desk: &Desk, output: &Output, args: EntryArgs) -> Result<()> {
    let ingreso = match (args.source.plate, args.source.ocr_text) {
        (Some(plate), _) => desk.register_entry(&plate, args.vehicle, args.jornada).await?,
        (None, Some(text)) => {
            desk.register_entry_from_text(&text, args.vehicle, args.jornada)
                .await?
        }
        (None, None) => return Err(parkclub_desk::DeskError::EmptyPlate.into()),
    };
    output.entry(&ingreso, DisplayMessages::ENTRY_REGISTERED)
}

async fn exit(desk: &Desk, output: &Output, args: ExitArgs) -> Result<()> {
    let checkout = match (args.lookup.ticket, args.lookup.plate) {
        (Some(ticket), _) => desk.checkout_by_ticket(&ticket).await?,
        (None, Some(plate)) => desk.checkout_by_plate(&plate).await?,
        (None, None) => return Err(parkclub_desk::DeskError::EmptyPlate.into()),
    };

    if !args.confirm {
        return output.checkout(&checkout);
    }

    let recaudacion = desk.finalize(&checkout, !args.no_print).await?;
    info!(id = %recaudacion.id, "payment recorded");
    output.collection(&recaudacion, DisplayMessages::PROCESSED)
}

async fn collections(desk: &Desk, output: &Output, clear: bool) -> Result<()> {
    if clear {
        desk.clear_collections_today().await?;
        return output.line_or_json(DisplayMessages::COLLECTIONS_CLEARED, &true);
    }
    let summary = desk.collections_today().await?;
    output.collections(&summary)
}

/// Console rendering, plain text or JSON.
struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn line_or_json<T: Serialize>(&self, line: &str, value: &T) -> Result<()> {
        if self.json {
            return self.print_json(value);
        }
        println!("{line}");
        Ok(())
    }

    fn entry(&self, ingreso: &Ingreso, message: &str) -> Result<()> {
        if self.json {
            return self.print_json(ingreso);
        }
        println!("{message}");
        println!("  Ticket:  {}", ingreso.id);
        println!("  Placa:   {}", ingreso.placa);
        println!("  Tipo:    {} - {}", ingreso.tipo_vehiculo, ingreso.jornada);
        println!("  Fecha:   {} {}", ingreso.fecha, ingreso.hora);
        println!("  Tarifa:  $ {}", ingreso.tarifa);
        Ok(())
    }

    fn checkout(&self, checkout: &Checkout) -> Result<()> {
        if self.json {
            return self.print_json(checkout);
        }
        let Checkout { ingreso, fee } = checkout;
        println!("Placa:          {}", ingreso.placa);
        println!("Tipo:           {} - {}", ingreso.tipo_vehiculo, ingreso.jornada);
        println!("Entrada:        {} {}", ingreso.fecha, ingreso.hora);
        println!("Salida:         {}", fee.exit_time);
        println!("Minutos:        {}", fee.minutes);
        println!("Horas cobradas: {}", fee.hours_charged);
        println!("Total:          $ {}", fee.total);
        println!();
        println!("Use --confirm para registrar el pago.");
        Ok(())
    }

    fn collection(&self, recaudacion: &Recaudacion, message: &str) -> Result<()> {
        if self.json {
            return self.print_json(recaudacion);
        }
        println!("{message}");
        println!("  Recaudación: {}", recaudacion.id);
        println!("  Placa:       {}", recaudacion.placa);
        println!(
            "  Horario:     {} - {}",
            recaudacion.hora_entrada, recaudacion.hora_salida
        );
        println!("  Monto:       $ {}", recaudacion.monto);
        Ok(())
    }

    fn collection_reprinted(&self, recaudacion: &Recaudacion) -> Result<()> {
        self.collection(recaudacion, DisplayMessages::REPRINTED)
    }

    fn collections(&self, summary: &CollectionsSummary) -> Result<()> {
        if self.json {
            return self.print_json(summary);
        }
        if summary.is_empty() {
            println!("{}", DisplayMessages::NO_COLLECTIONS_TODAY);
            return Ok(());
        }
        for r in &summary.records {
            println!(
                "{}  {:<10} {:<5} {:<8} {} - {}  $ {:>7}",
                r.id,
                r.placa,
                r.tipo_vehiculo,
                r.jornada,
                r.hora_entrada,
                r.hora_salida,
                r.monto.to_string()
            );
        }
        println!("Total del día: $ {}", summary.total);
        Ok(())
    }

    fn control(&self, control: &ControlSummary) -> Result<()> {
        if self.json {
            return self.print_json(control);
        }
        if control.entries.is_empty() {
            println!("{}", DisplayMessages::NO_ENTRIES_TODAY);
            return Ok(());
        }
        for e in &control.entries {
            println!(
                "{}  {:<10} {:<5} {:<8} {}",
                e.id, e.placa, e.tipo_vehiculo, e.jornada, e.hora
            );
        }
        println!(
            "Total: {}  Carros: {}  Motos: {}",
            control.total, control.carros, control.motos
        );
        Ok(())
    }

    fn housekeeping(&self, housekeeping: &parkclub_desk::Housekeeping) -> Result<()> {
        if self.json {
            return self.print_json(housekeeping);
        }
        match &housekeeping.evicted_month {
            Some(month) => println!("Ingresos de {month} eliminados"),
            None => println!("Ingresos al día"),
        }
        match &housekeeping.evicted_day {
            Some(day) => println!("Recaudaciones de {day} eliminadas"),
            None => println!("Recaudaciones al día"),
        }
        Ok(())
    }
}

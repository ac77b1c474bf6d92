//! `parkclub`: the parking station from the command line.

use clap::{Args, Parser, Subcommand};
use parkclub_core::{Jornada, VehicleType};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PARKCLUB_LOG";

#[derive(Debug, Parser)]
#[command(name = "parkclub", author, version, about = "Parking station: entries, exits and daily collections")]
struct Cli {
    /// Config file (default: $PARKCLUB_CONFIG, then ./parkclub.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a vehicle entry and print its ticket
    Entry(EntryArgs),

    /// Price an exit by ticket or plate; finalise with --confirm
    Exit(ExitArgs),

    /// Show today's collections
    Collections {
        /// Delete today's collections
        #[arg(long)]
        clear: bool,
    },

    /// Reprint the receipt of one of today's collections
    ReprintReceipt { id: String },

    /// List today's entries
    Control,

    /// Reprint the ticket of an entry registered this month
    ReprintEntry { id: String },

    /// Extract a plate from recognised text
    Plate { text: String },

    /// Evict stale entry and collection buckets
    Housekeeping,
}

#[derive(Debug, Args)]
#[group(id = "source", required = true, multiple = false)]
struct EntrySource {
    /// Plate as typed
    #[arg(long)]
    plate: Option<String>,

    /// Text recognised from a photo of the plate
    #[arg(long = "ocr-text")]
    ocr_text: Option<String>,
}

#[derive(Debug, Args)]
struct EntryArgs {
    #[command(flatten)]
    source: EntrySource,

    /// Carro or Moto
    #[arg(long = "vehicle", default_value = "Carro")]
    vehicle: VehicleType,

    /// Dia, Noche, Diario or Nocturno
    #[arg(long, default_value = "Dia", value_parser = selectable_jornada)]
    jornada: Jornada,
}

fn selectable_jornada(value: &str) -> Result<Jornada, String> {
    let jornada: Jornada = value.parse().map_err(|e: parkclub_core::Error| e.to_string())?;
    if !jornada.is_selectable() {
        let choices: Vec<&str> = Jornada::SELECTABLE.iter().map(|j| j.display_name()).collect();
        return Err(format!("expected one of {}", choices.join(", ")));
    }
    Ok(jornada)
}

#[derive(Debug, Args)]
#[group(id = "lookup", required = true, multiple = false)]
struct ExitLookup {
    /// Scanned QR value
    #[arg(long)]
    ticket: Option<String>,

    /// Plate of the vehicle leaving
    #[arg(long)]
    plate: Option<String>,
}

#[derive(Debug, Args)]
struct ExitArgs {
    #[command(flatten)]
    lookup: ExitLookup,

    /// Record the payment
    #[arg(long)]
    confirm: bool,

    /// Record without printing a receipt
    #[arg(long = "no-print", requires = "confirm")]
    no_print: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(err) = commands::run(cli).await {
        match err.downcast_ref::<parkclub_desk::DeskError>() {
            Some(desk) => eprintln!("{}", desk.user_message()),
            None => eprintln!("Error: {err:#}"),
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
}

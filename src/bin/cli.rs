//! scan-map CLI - desktop preview of a scan history store
//!
//! Usage:
//!   scan-map-cli show <db>
//!   scan-map-cli export <db> --output <file> [--filter <code>]
//!   scan-map-cli import <db> <history.json>
//!
//! The store is the same SQLite key-value file the mobile app writes, so a
//! copied database can be inspected and rendered without the app.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scan_map::{
    group_scan_history, load_scan_history, parse_scan_history, render_html, save_scan_history,
    tracking_lines, LineStyle, RecordingSurface, Result, ScanMapError, ScanMapScreen, SqliteStore,
};

#[derive(Parser)]
#[command(name = "scan-map-cli")]
#[command(about = "Inspect and preview scan history stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List codes, marker counts and tracking line length
    Show {
        /// SQLite store path
        db: PathBuf,
    },

    /// Write a standalone Leaflet page
    Export {
        /// SQLite store path
        db: PathBuf,

        /// Output HTML file
        #[arg(short, long)]
        output: PathBuf,

        /// Initially selected code ("all" shows everything)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Page title
        #[arg(long, default_value = "Scan history")]
        title: String,
    },

    /// Replace the stored history with a JSON array of scan records
    Import {
        /// SQLite store path
        db: PathBuf,

        /// JSON file holding the scan records
        history: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_store(db: &Path) -> Result<SqliteStore> {
    let path = db.to_str().ok_or_else(|| ScanMapError::Config {
        message: format!("store path {} is not valid UTF-8", db.display()),
    })?;
    SqliteStore::new(path)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Show { db } => {
            let history = load_scan_history(&open_store(&db)?)?;
            let grouping = group_scan_history(&history);

            if grouping.codes.is_empty() {
                println!("No scans stored");
                return Ok(());
            }
            let lines = tracking_lines(&grouping.markers, &LineStyle::default());
            let total_km: f64 = lines.iter().map(|l| l.length_meters()).sum::<f64>() / 1000.0;
            println!(
                "{} markers, {} tracking lines over {:.2} km",
                grouping.markers.len(),
                lines.len(),
                total_km
            );
            for code in &grouping.codes {
                let markers: Vec<_> = grouping.markers_for(code).collect();
                let first = markers.first();
                let date = first.and_then(|m| m.date.as_deref()).unwrap_or("-");
                let time = first.and_then(|m| m.time.as_deref()).unwrap_or("-");
                println!(
                    "  {:<40} {:>4} scans  first seen {} {}",
                    code,
                    markers.len(),
                    date,
                    time
                );
            }
        }

        Commands::Export {
            db,
            output,
            filter,
            title,
        } => {
            let mut screen = ScanMapScreen::new(open_store(&db)?);
            let mut surface = RecordingSurface::new();
            screen.on_enter(&mut surface)?;

            // Taken under "all" so the page can show every pin
            let mut scene = screen.scene(&surface);
            let visible = screen.select_filter(&filter, &mut surface)?.markers_rendered;
            scene.selected_filter = screen.selection().to_string();

            let html = render_html(&scene, &title)?;
            fs::write(&output, html).map_err(|e| ScanMapError::Storage {
                message: format!("writing {}: {}", output.display(), e),
            })?;
            println!(
                "Wrote {} pins ({} visible) to {}",
                scene.pins.len(),
                visible,
                output.display()
            );
        }

        Commands::Import { db, history } => {
            let json = fs::read_to_string(&history).map_err(|e| ScanMapError::Storage {
                message: format!("reading {}: {}", history.display(), e),
            })?;
            let records = parse_scan_history(&history.display().to_string(), &json)?;

            let mut store = open_store(&db)?;
            save_scan_history(&mut store, &records)?;
            let stored = load_scan_history(&store)?;
            println!("Imported {} scan records into {}", stored.len(), db.display());
        }
    }
    Ok(())
}

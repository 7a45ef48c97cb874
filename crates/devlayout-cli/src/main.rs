//! `devlayout` — command line tool for device layout archives.
//!
//! A thin operator tool over `devlayout-core`: it inspects, queries, checks and
//! creates the JSON layout archives that describe illuminated peripherals.
//!
//! # Usage
//!
//! ```text
//! devlayout [--config <FILE>] <COMMAND>
//!
//! Commands:
//!   show  <ARCHIVE>                       Print metadata and a per-view summary
//!   query <ARCHIVE> <COMPONENT> [--all]   Print positions of views holding a component
//!   check <ARCHIVE>                       List elements outside the LED matrix
//!   new   --name <N> --device-type <T> [--matrix <ROWSxCOLS>] --out <FILE>
//! ```
//!
//! `<ARCHIVE>` may be a path or a bare name looked up in the configured
//! `layouts_dir` (see [`config`]).
//!
//! # Exit status
//!
//! `check` exits with status 1 when any element is out of bounds.  Every other
//! command exits with 0 on success, including a `query` that matched nothing.

mod commands;
mod config;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use devlayout_core::{ComponentType, DeviceType};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{parse_component, parse_device_type, MatrixSize};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and create device layout archives.
#[derive(Debug, Parser)]
#[command(name = "devlayout", about = "Inspect and create device layout archives", version)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "DEVLAYOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print layout metadata and a summary of every view.
    Show {
        /// Archive path or name inside `layouts_dir`.
        archive: PathBuf,
    },

    /// Print the position of the first view containing a component type.
    Query {
        /// Archive path or name inside `layouts_dir`.
        archive: PathBuf,

        /// LED, KEY, MATRIX_CELL or AREA (case-insensitive).
        #[arg(value_parser = parse_component)]
        component: ComponentType,

        /// Print every matching view instead of only the first.
        #[arg(long)]
        all: bool,
    },

    /// List elements whose matrix coordinates are outside the declared matrix.
    Check {
        /// Archive path or name inside `layouts_dir`.
        archive: PathBuf,
    },

    /// Write an empty layout for a device.
    New {
        /// Device name stored in the layout.
        #[arg(long)]
        name: String,

        /// Device class, e.g. KEYBOARD or MOUSE (case-insensitive).
        #[arg(long, value_parser = parse_device_type)]
        device_type: DeviceType,

        /// LED matrix size as ROWSxCOLS; omit for devices without a matrix.
        #[arg(long)]
        matrix: Option<MatrixSize>,

        /// Output archive path.
        #[arg(long)]
        out: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 2. The tool config is loaded (see [`config::load_config`]).
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins over the
///    configured `log_level`.
/// 4. The subcommand runs and its report is written to stdout.
fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref()).context("failed to load config")?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let status = match cli.command {
        Command::Show { archive } => {
            let layout = commands::open(&archive, &config)?;
            commands::show(&layout, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Query {
            archive,
            component,
            all,
        } => {
            let layout = commands::open(&archive, &config)?;
            let found = commands::query(&layout, component, all, &mut out)?;
            debug!(found, %component, "query finished");
            ExitCode::SUCCESS
        }
        Command::Check { archive } => {
            let layout = commands::open(&archive, &config)?;
            if commands::check(&layout, &mut out)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::New {
            name,
            device_type,
            matrix,
            out: path,
        } => {
            commands::create(&name, device_type, matrix, &path, config.pretty)?;
            writeln!(out, "wrote {}", path.display())?;
            ExitCode::SUCCESS
        }
    };

    out.flush()?;
    Ok(status)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

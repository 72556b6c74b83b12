//! mmstack: read Micro-Manager acquisitions.
//!
//! Micro-Manager writes each stage position of an acquisition as a folder of
//! TIFF planes plus a `metadata.txt` describing them. mmstack recovers the
//! acquisition's structure from that metadata (axis lengths, channels,
//! camera settings, timing, per-plane provenance) and maps every logical
//! (Z, channel, time) plane to its image file on disk. Both the 1.4-era and
//! the 2.x metadata dialects are supported.
//!
//! # Modules
//!
//! - [`meta`]: Acquisition model and the metadata parsing engine
//! - [`index`]: Image file lists and plane lookups
//! - [`reader`]: Position discovery and acquisition loading
//! - [`inspect`]: Acquisition summary reports
//! - [`error`]: Error types for mmstack operations
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mmstack::reader::{read_acquisition, ReadOptions};
//!
//! let acquisition = read_acquisition(Path::new("data/Pos_0"), &ReadOptions::default())?;
//! for position in &acquisition.positions {
//!     println!("{}: {} planes", position.name, position.plane_count());
//!     if let Some(file) = position.location(0) {
//!         println!("  first plane in {}", file.display());
//!     }
//! }
//! # Ok::<(), mmstack::MmStackError>(())
//! ```

pub mod error;
pub mod index;
pub mod inspect;
pub mod meta;
pub mod reader;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::MmStackError;

/// The mmstack CLI application.
#[derive(Parser)]
#[command(name = "mmstack")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize an acquisition's positions, dimensions and files.
    Inspect(InspectArgs),
    /// List every plane with its coordinate and image file as CSV.
    Planes(PlanesArgs),
}

/// Options shared by every command that reads an acquisition.
#[derive(clap::Args)]
struct ReadArgs {
    /// Keep Z and time as declared, even when fewer frames than slices are
    /// declared.
    #[arg(long, env = "MMSTACK_NO_SWAP_Z_T")]
    no_swap_z_t: bool,

    /// Refuse metadata files larger than this many bytes.
    #[arg(long, env = "MMSTACK_MAX_METADATA_BYTES", default_value_t = i32::MAX as u64)]
    max_metadata_bytes: u64,

    /// Ignore Acqusition.xml sidecars.
    #[arg(long)]
    no_sidecar: bool,
}

impl ReadArgs {
    fn options(&self) -> reader::ReadOptions {
        reader::ReadOptions {
            swap_z_and_time: !self.no_swap_z_t,
            max_metadata_bytes: self.max_metadata_bytes,
            read_sidecar: !self.no_sidecar,
        }
    }
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// metadata.txt, a file beside it, or the acquisition directory.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Skip checking which image files exist on disk.
    #[arg(long)]
    no_file_check: bool,

    #[command(flatten)]
    read: ReadArgs,
}

/// Arguments for the planes subcommand.
#[derive(clap::Args)]
struct PlanesArgs {
    /// metadata.txt, a file beside it, or the acquisition directory.
    input: PathBuf,

    /// Only list planes of this position (0-based).
    #[arg(long)]
    position: Option<usize>,

    #[command(flatten)]
    read: ReadArgs,
}

/// One row of `mmstack planes` output.
#[derive(Serialize)]
struct PlaneRow {
    position: usize,
    plane: usize,
    z: usize,
    c: usize,
    t: usize,
    file: String,
    exists: bool,
}

/// Run the mmstack CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), MmStackError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Planes(args)) => run_planes(args),
        None => {
            println!("mmstack {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Micro-Manager acquisition metadata reader.");
            println!();
            println!("Run 'mmstack --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), MmStackError> {
    if !matches!(args.output.as_str(), "text" | "json") {
        return Err(MmStackError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            args.output
        )));
    }

    let acquisition = reader::read_acquisition(&args.input, &args.read.options())?;
    let opts = inspect::InspectOptions {
        check_files: !args.no_file_check,
    };
    let report = inspect::inspect_acquisition(&acquisition, &opts);

    if args.output == "json" {
        let json = serde_json::to_string_pretty(&report).map_err(MmStackError::JsonWrite)?;
        println!("{json}");
    } else {
        print!("{report}");
    }
    Ok(())
}

/// Execute the planes subcommand.
fn run_planes(args: PlanesArgs) -> Result<(), MmStackError> {
    let acquisition = reader::read_acquisition(&args.input, &args.read.options())?;

    let selected: Vec<&meta::Position> = match args.position {
        Some(index) => {
            let position =
                acquisition
                    .positions
                    .get(index)
                    .ok_or(MmStackError::PositionOutOfRange {
                        index,
                        count: acquisition.image_count(),
                    })?;
            vec![position]
        }
        None => acquisition.positions.iter().collect(),
    };

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for position in selected {
        for plane in 0..position.plane_count() {
            let Some(coord) = position.plane_coord(plane) else {
                continue;
            };
            let file = position.location(plane);
            writer.serialize(PlaneRow {
                position: position.ordinal,
                plane,
                z: coord.z,
                c: coord.c,
                t: coord.t,
                file: file.map(|path| path.display().to_string()).unwrap_or_default(),
                exists: file.is_some_and(|path| path.is_file()),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

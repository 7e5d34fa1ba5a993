//! oistats: statistics for Open Images manifests and a YFCC100M join.
//!
//! Open Images distributes its labels and image lists as per-subset CSV
//! files. This crate counts classes and images in those files, totals the
//! download size, and joins the image lists to the YFCC100M metadata that
//! the photos originally came from.
//!
//! # Modules
//!
//! - [`stats`]: class counts, image counts, download size
//! - [`join`]: the YFCC100M join
//! - [`ident`]: Flickr id extraction used as the join key
//! - [`layout`]: subsets and file names
//! - [`table`]: CSV/TSV loading, streaming and writing
//! - [`error`]: Error types for oistats operations

pub mod error;
pub mod ident;
pub mod join;
pub mod layout;
pub mod logging;
mod progress;
pub mod stats;
pub mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::OistatsError;

use layout::Annotations;

/// The oistats CLI application.
#[derive(Parser)]
#[command(name = "oistats")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Count label rows per class and subset.
    ClassCounts(ClassCountsArgs),
    /// Count images, in total or per subset.
    Images(ImagesArgs),
    /// Total bytes needed to download every original image.
    DownloadSize(DownloadSizeArgs),
    /// Join the image manifests to YFCC100M metadata.
    JoinYfcc(JoinArgs),
}

/// Arguments shared by the statistics subcommands.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Directory holding the Open Images CSV files.
    #[arg(env = "OISTATS_ROOT")]
    root: PathBuf,

    /// Read the bounding-box files instead of the image-level label files.
    #[arg(long)]
    boxes: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

impl DatasetArgs {
    fn annotations(&self) -> Annotations {
        if self.boxes {
            Annotations::Boxes
        } else {
            Annotations::ImageLevel
        }
    }
}

/// Arguments for the class-counts subcommand.
#[derive(clap::Args)]
struct ClassCountsArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Keep label codes (e.g. /m/01g317) instead of human-readable names.
    #[arg(long)]
    codes: bool,

    /// Number of classes to show in the text report.
    #[arg(long, default_value_t = 20)]
    top: usize,
}

/// Arguments for the images subcommand.
#[derive(clap::Args)]
struct ImagesArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Report each subset separately.
    #[arg(long)]
    per_subset: bool,
}

/// Arguments for the download-size subcommand.
#[derive(clap::Args)]
struct DownloadSizeArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
}

/// Arguments for the join-yfcc subcommand.
#[derive(clap::Args)]
struct JoinArgs {
    /// Directory holding the Open Images image manifests.
    #[arg(env = "OISTATS_LABELS_DIR")]
    labels_dir: PathBuf,

    /// Directory holding yfcc100m_dataset and yfcc100m_places.
    #[arg(env = "OISTATS_YFCC_DIR")]
    yfcc_dir: PathBuf,

    /// Skip the yfcc100m_dataset file.
    #[arg(long)]
    no_dataset: bool,

    /// Skip the yfcc100m_places file.
    #[arg(long)]
    no_places: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the oistats CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), OistatsError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ClassCounts(args)) => run_class_counts(args),
        Some(Commands::Images(args)) => run_images(args),
        Some(Commands::DownloadSize(args)) => run_download_size(args),
        Some(Commands::JoinYfcc(args)) => run_join(args),
        None => {
            println!("oistats {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Open Images statistics and YFCC100M join.");
            println!();
            println!("Run 'oistats --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the class-counts subcommand.
fn run_class_counts(args: ClassCountsArgs) -> Result<(), OistatsError> {
    check_output_format(&args.dataset.output)?;
    let opts = stats::StatsOptions {
        human_readable: !args.codes,
        annotations: args.dataset.annotations(),
        ..Default::default()
    };

    let counts = stats::class_counts(&args.dataset.root, &opts)?;
    let report = stats::ClassCountsReport::new(&counts, opts.human_readable).with_top_n(args.top);
    emit(&report, &args.dataset.output)
}

/// Execute the images subcommand.
fn run_images(args: ImagesArgs) -> Result<(), OistatsError> {
    check_output_format(&args.dataset.output)?;
    let opts = stats::StatsOptions {
        per_subset: args.per_subset,
        annotations: args.dataset.annotations(),
        ..Default::default()
    };

    let counts = stats::image_counts(&args.dataset.root, &opts)?;
    emit(&stats::ImageCountsReport::new(&counts), &args.dataset.output)
}

/// Execute the download-size subcommand.
fn run_download_size(args: DownloadSizeArgs) -> Result<(), OistatsError> {
    check_output_format(&args.dataset.output)?;
    let opts = stats::StatsOptions {
        annotations: args.dataset.annotations(),
        ..Default::default()
    };

    let bytes = stats::download_size(&args.dataset.root, &opts)?;
    emit(&stats::DownloadSizeReport::new(bytes), &args.dataset.output)
}

/// Execute the join-yfcc subcommand.
fn run_join(args: JoinArgs) -> Result<(), OistatsError> {
    check_output_format(&args.output)?;
    let opts = join::JoinOptions {
        dataset: !args.no_dataset,
        places: !args.no_places,
    };

    let report = join::join_yfcc(&args.labels_dir, &args.yfcc_dir, &opts)?;
    emit(&report, &args.output)
}

/// Reject unknown report formats before doing any work.
fn check_output_format(output: &str) -> Result<(), OistatsError> {
    match output {
        "text" | "json" => Ok(()),
        other => Err(OistatsError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

/// Print a report as text or pretty JSON.
fn emit<R>(report: &R, output: &str) -> Result<(), OistatsError>
where
    R: Serialize + std::fmt::Display,
{
    match output {
        "json" => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| OistatsError::Io(std::io::Error::other(e)))?;
            println!("{}", json);
        }
        _ => print!("{}", report),
    }
    Ok(())
}

//! Command-line interface for sketch_sorter

use clap::{Parser, Subcommand};
use sketch_sorter::{
    detect_objects, extract_directory, sort_directory, ExtractionConfig, FolderOutcome,
    SortConfig, TrailingFolderPolicy,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crop the drawn rectangles of every scanned page into one folder
    Extract {
        /// Folder of scanned pages
        input: PathBuf,
        /// Folder receiving the crops
        output: PathBuf,
        /// JSON extraction configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Crop every object of a single image
    Detect {
        /// Image to process
        image: PathBuf,
        /// Folder receiving the crops
        output: PathBuf,
        /// JSON extraction configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Extract and sort sketches into participant and catalog folders
    Sort {
        /// Folder of scanned pages
        input: PathBuf,
        /// Folder receiving catalog, participant and unsorted folders
        output: PathBuf,
        /// JSON sorting configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Label or shelve the last participant folder instead of leaving it
        #[arg(long)]
        close_trailing: bool,
    },
    /// Write the default sorting configuration as JSON
    Config {
        /// Destination file
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn run(command: Command) -> sketch_sorter::Result<()> {
    match command {
        Command::Extract {
            input,
            output,
            config,
        } => {
            let config = load_extraction(config.as_deref(), ExtractionConfig::sketch)?;
            let report = extract_directory(&input, &output, &config)?;

            eprintln!();
            eprintln!("Extraction complete:");
            eprintln!("  Pages: {}", report.pages.len());
            eprintln!("  Sketches: {}", report.roi_count());
            eprintln!("  Saved to: {}", output.display());
        }
        Command::Detect {
            image,
            output,
            config,
        } => {
            let config = load_extraction(config.as_deref(), ExtractionConfig::object_detection)?;
            let report = detect_objects(&image, &output, &config)?;

            eprintln!("Detected {} objects in {}", report.roi_count(), image.display());
        }
        Command::Sort {
            input,
            output,
            config,
            close_trailing,
        } => {
            let mut config = match config {
                Some(path) => SortConfig::from_json_file(&path)?,
                None => SortConfig::default(),
            };
            if close_trailing {
                config.trailing_folder = TrailingFolderPolicy::Close;
            }

            let report = sort_directory(&input, &output, config)?;

            eprintln!();
            eprintln!("Sorting complete:");
            eprintln!("  Pages: {}", report.pages);
            eprintln!("  Participants: {}", report.consent_forms);
            eprintln!("  Sketches: {}", report.rois);
            eprintln!("  Labeled folders: {}", report.labeled);
            eprintln!("  Unsorted folders: {}", report.unsorted);
            if let Some(FolderOutcome::Pending(folder)) = &report.trailing {
                eprintln!("  Left open: {}", folder.display());
            }
        }
        Command::Config { path } => {
            SortConfig::default().to_json_file(&path)?;
            eprintln!("Default configuration written to {}", path.display());
        }
    }

    Ok(())
}

fn load_extraction(
    path: Option<&Path>,
    preset: fn() -> ExtractionConfig,
) -> sketch_sorter::Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::from_json_file(path),
        None => Ok(preset()),
    }
}

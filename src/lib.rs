//! # Sketch Sorter
//!
//! A Rust crate for building a dataset of hand-drawn UI component sketches
//! from scanned paper forms.
//!
//! This library:
//! - Traces drawn rectangles with edge detection and contour analysis
//! - Crops each rectangle without its outline and writes it as a JPEG
//! - Detects consent-form pages that separate one participant from the next
//! - Sorts complete participant folders into one folder per UI component
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_sorter::{extract_directory, ExtractionConfig};
//! use std::path::Path;
//!
//! let report = extract_directory(
//!     Path::new("scans"),
//!     Path::new("output"),
//!     &ExtractionConfig::sketch(),
//! )?;
//! println!("{} sketches from {} pages", report.roi_count(), report.pages.len());
//! # Ok::<(), sketch_sorter::ExtractError>(())
//! ```

use std::fs;
use std::path::Path;

pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod sorting;

pub use config::{ExtractionConfig, SortConfig, TrailingFolderPolicy};
pub use detection::{PageReport, RoiExtractor};
pub use error::{ExtractError, Result};
pub use sorting::{FolderOutcome, SketchSorter, SortReport, CATALOG};

/// Per-page results of a flat extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One report per page, in processing order
    pub pages: Vec<PageReport>,
}

impl BatchReport {
    /// Total crops written
    pub fn roi_count(&self) -> usize {
        self.pages.iter().map(PageReport::roi_count).sum()
    }
}

/// Extract sketches from every page of `input_dir` into `output_dir`
///
/// Pages are processed in natural file-name order and all crops land flat in
/// `output_dir`, which is created if needed.
///
/// # Errors
///
/// Returns `ExtractError` if the input cannot be listed, a page cannot be
/// loaded or a crop cannot be written. The first failure ends the run.
pub fn extract_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<BatchReport> {
    fs::create_dir_all(output_dir).map_err(|e| {
        ExtractError::io(format!("Failed to create {}", output_dir.display()), e)
    })?;

    let files = image_loader::find_image_files(input_dir, |p| config.accepts(p))?;
    let extractor = RoiExtractor::new(config.clone());

    let mut report = BatchReport::default();
    for path in &files {
        report.pages.push(extractor.extract_file(path, output_dir)?);
    }

    Ok(report)
}

/// Crop every object found on a single image into `output_dir`
///
/// Uses whatever `config` says; [`ExtractionConfig::object_detection`] is the
/// usual choice.
pub fn detect_objects(
    image_path: &Path,
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<PageReport> {
    fs::create_dir_all(output_dir).map_err(|e| {
        ExtractError::io(format!("Failed to create {}", output_dir.display()), e)
    })?;

    RoiExtractor::new(config.clone()).extract_file(image_path, output_dir)
}

/// Run a stateful sorting batch over `input_dir`
///
/// Creates the catalog and unsorted folders under `output_dir`, sorts every
/// page and applies `config.trailing_folder` to the folder still open at the
/// end.
///
/// # Errors
///
/// Returns `ExtractError` if a folder cannot be created, listed or moved, a
/// page cannot be loaded or a crop cannot be written. Labeling a complete
/// folder fails with `ExtractError::Io` instead of overwriting a file already
/// in a catalog folder. The first failure ends the run.
pub fn sort_directory(input_dir: &Path, output_dir: &Path, config: SortConfig) -> Result<SortReport> {
    SketchSorter::new(output_dir, config)?.run(input_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_batch_report_totals() {
        let report = BatchReport {
            pages: vec![
                PageReport {
                    source: PathBuf::from("a.jpg"),
                    contour_count: 3,
                    written: vec![PathBuf::from("a-0.jpg"), PathBuf::from("a-1.jpg")],
                    skipped: 0,
                },
                PageReport {
                    source: PathBuf::from("b.jpg"),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(report.roi_count(), 2);
    }

    #[test]
    fn test_extract_empty_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let out_dir = output.path().join("crops");

        let report =
            extract_directory(input.path(), &out_dir, &ExtractionConfig::sketch()).unwrap();

        assert!(report.pages.is_empty());
        assert!(out_dir.is_dir());
    }

    #[test]
    fn test_extract_missing_input_directory() {
        let output = TempDir::new().unwrap();
        let result = extract_directory(
            Path::new("no/such/scans"),
            output.path(),
            &ExtractionConfig::sketch(),
        );
        assert!(matches!(result, Err(ExtractError::Io { .. })));
    }
}

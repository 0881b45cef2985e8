//! Configuration structures for the sketch extraction pipeline.
//!
//! Every extraction mode runs the same contour pipeline; only the parameters
//! below differ between them.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or taken from a preset:
//!
//! ```no_run
//! use sketch_sorter::ExtractionConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = ExtractionConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use a preset
//! let config = ExtractionConfig::object_detection();
//! # Ok::<(), sketch_sorter::ExtractError>(())
//! ```
//!
//! # Presets
//!
//! - [`ExtractionConfig::sketch`]: right half of the page, quadrilaterals only,
//!   50 px outline inset
//! - [`ExtractionConfig::object_detection`]: whole image, 60x60 closing kernel,
//!   any shape, no inset

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{edges, morphology, regions, sorting};
use crate::error::{ExtractError, Result};

/// Parameters of the contour extraction and ROI cropping pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Gaussian blur kernel size (must be odd)
    pub gaussian_kernel_size: i32,

    /// Canny edge detection low threshold
    pub canny_low_threshold: f64,

    /// Canny edge detection high threshold
    pub canny_high_threshold: f64,

    /// Rectangular closing kernel size
    pub closing_kernel_size: i32,

    /// Polygon approximation epsilon as fraction of perimeter
    pub poly_approx_epsilon: f64,

    /// Keep only contours approximating to four vertices
    pub require_quadrilateral: bool,

    /// Minimum bounding rectangle width
    pub min_width: i32,

    /// Minimum bounding rectangle height
    pub min_height: i32,

    /// Pixels removed from every side of an accepted rectangle
    pub outline_inset: i32,

    /// Columns left of the page centre kept in the working region.
    /// `None` processes the whole page.
    pub crop_offset: Option<i32>,

    /// File extensions (case-insensitive) treated as scanned pages
    #[serde(default = "default_input_extensions")]
    pub input_extensions: Vec<String>,
}

fn default_input_extensions() -> Vec<String> {
    vec!["jpg".to_string()]
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::sketch()
    }
}

impl ExtractionConfig {
    /// Preset for sketch sheets: drawn rectangles on the right half of a page
    pub fn sketch() -> Self {
        Self {
            gaussian_kernel_size: edges::GAUSSIAN_KERNEL_SIZE,
            canny_low_threshold: edges::CANNY_LOW_THRESHOLD,
            canny_high_threshold: edges::CANNY_HIGH_THRESHOLD,
            closing_kernel_size: morphology::SKETCH_CLOSING_KERNEL,
            poly_approx_epsilon: regions::POLY_APPROX_EPSILON,
            require_quadrilateral: true,
            min_width: regions::MIN_REGION_WIDTH,
            min_height: regions::MIN_REGION_HEIGHT,
            outline_inset: regions::SKETCH_OUTLINE_INSET,
            crop_offset: Some(regions::WORKING_REGION_OFFSET),
            input_extensions: default_input_extensions(),
        }
    }

    /// Preset for whole-object boxes on a single image
    pub fn object_detection() -> Self {
        Self {
            closing_kernel_size: morphology::OBJECT_CLOSING_KERNEL,
            require_quadrilateral: false,
            outline_inset: 0,
            crop_offset: None,
            ..Self::sketch()
        }
    }

    /// Check whether a path has one of the configured input extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.input_extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }
}

/// What happens to the folder still open when a sorting batch ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingFolderPolicy {
    /// Leave it in place and warn
    #[default]
    Keep,
    /// Label or move to Unsorted, as a following consent page would
    Close,
}

/// Configuration of the stateful sorting batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Extraction parameters for content pages
    pub extraction: ExtractionConfig,

    /// Pages with more contours than this open a new user folder
    pub consent_contour_threshold: usize,

    /// Name of the folder collecting incomplete user folders
    pub unsorted_folder_name: String,

    /// Handling of the last open user folder
    #[serde(default)]
    pub trailing_folder: TrailingFolderPolicy,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::sketch(),
            consent_contour_threshold: sorting::CONSENT_CONTOUR_THRESHOLD,
            unsorted_folder_name: sorting::UNSORTED_FOLDER.to_string(),
            trailing_folder: TrailingFolderPolicy::Keep,
        }
    }
}

impl SortConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExtractError::config(format!("Failed to read {}", path.display()), e)
    })?;
    serde_json::from_str(&content)
        .map_err(|e| ExtractError::config(format!("Failed to parse {}", path.display()), e))
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ExtractError::config("Failed to serialize configuration", e))?;
    std::fs::write(path, json)
        .map_err(|e| ExtractError::io(format!("Failed to write {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sketch_preset() {
        let config = ExtractionConfig::sketch();
        assert_eq!(config.closing_kernel_size, 3);
        assert_eq!(config.outline_inset, 50);
        assert_eq!(config.crop_offset, Some(200));
        assert!(config.require_quadrilateral);
        assert_eq!(config, ExtractionConfig::default());
    }

    #[test]
    fn test_object_detection_preset() {
        let config = ExtractionConfig::object_detection();
        assert_eq!(config.closing_kernel_size, 60);
        assert_eq!(config.outline_inset, 0);
        assert_eq!(config.crop_offset, None);
        assert!(!config.require_quadrilateral);
        assert_eq!(config.canny_low_threshold, 10.0);
        assert_eq!(config.canny_high_threshold, 250.0);
    }

    #[test]
    fn test_accepts_extension_case_insensitive() {
        let config = ExtractionConfig::sketch();
        assert!(config.accepts(Path::new("scans/page01.jpg")));
        assert!(config.accepts(Path::new("scans/page01.JPG")));
        assert!(!config.accepts(Path::new("scans/page01.png")));
        assert!(!config.accepts(Path::new("scans/README")));
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sort.json");

        let mut config = SortConfig::default();
        config.trailing_folder = TrailingFolderPolicy::Close;
        config.extraction.input_extensions = vec!["png".into()];
        config.to_json_file(&path).unwrap();

        let loaded = SortConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{
            "extraction": {
                "gaussian_kernel_size": 3,
                "canny_low_threshold": 10.0,
                "canny_high_threshold": 250.0,
                "closing_kernel_size": 3,
                "poly_approx_epsilon": 0.02,
                "require_quadrilateral": true,
                "min_width": 50,
                "min_height": 50,
                "outline_inset": 50,
                "crop_offset": 200
            },
            "consent_contour_threshold": 700,
            "unsorted_folder_name": "Unsorted"
        }"#;

        let config: SortConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, SortConfig::default());
    }

    #[test]
    fn test_unreadable_config_is_config_error() {
        let result = ExtractionConfig::from_json_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(ExtractError::Config { .. })));
    }
}

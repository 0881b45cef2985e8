//! Region-of-interest filtering and cropping
//!
//! Every contour is approximated as a polygon, optionally required to be a
//! quadrilateral, size-checked on its bounding rectangle and cropped with the
//! drawn outline inset away. Accepted crops are written as
//! `{stem}-{n}.jpg`, `n` counting from 0 per page.

use opencv::{
    core::{Mat, Rect},
    imgproc::{approx_poly_dp, arc_length, bounding_rect},
    prelude::*,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::contours::{working_region, ContourExtractor, Contours, VectorOfPoint};
use crate::config::ExtractionConfig;
use crate::constants::regions::{OUTPUT_EXTENSION, QUADRILATERAL_VERTICES};
use crate::error::{ExtractError, Result};
use crate::image_loader::{load_image, page_stem, save_image};

/// Result of processing one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReport {
    /// Page that was processed
    pub source: PathBuf,
    /// External contours traced on the working region
    pub contour_count: usize,
    /// Crops written, in sequence-number order
    pub written: Vec<PathBuf>,
    /// Accepted rectangles dropped because the inset left nothing
    pub skipped: usize,
}

impl PageReport {
    /// Number of ROIs written for this page
    pub fn roi_count(&self) -> usize {
        self.written.len()
    }
}

/// Shrink a rectangle by `inset` pixels on every side
///
/// # Errors
///
/// Returns `ExtractError::InvalidRegion` when the result would have zero or
/// negative width or height.
pub fn inset_rect(rect: Rect, inset: i32) -> Result<Rect> {
    let width = rect.width - 2 * inset;
    let height = rect.height - 2 * inset;

    if width <= 0 || height <= 0 {
        return Err(ExtractError::InvalidRegion {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            inset,
        });
    }

    Ok(Rect::new(rect.x + inset, rect.y + inset, width, height))
}

/// Output file name of the `index`-th crop of a page
pub fn roi_file_name(stem: &str, index: usize) -> String {
    format!("{}-{}.{}", stem, index, OUTPUT_EXTENSION)
}

/// Contour filter and cropper shared by every extraction mode
pub struct RoiExtractor {
    config: ExtractionConfig,
    contours: ContourExtractor,
}

impl Default for RoiExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::sketch())
    }
}

impl RoiExtractor {
    /// Create an extractor for the given configuration
    pub fn new(config: ExtractionConfig) -> Self {
        let contours = ContourExtractor::from_config(&config);
        Self { config, contours }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Crop a loaded page to the region searched for sketches
    pub fn working_region(&self, page: &Mat) -> Result<Mat> {
        working_region(page, self.config.crop_offset)
    }

    /// Trace the external contours of a working region
    pub fn find_contours(&self, region: &Mat) -> Result<Contours> {
        self.contours.find_contours(region)
    }

    /// Bounding rectangle of a contour if it passes the shape and size filters
    pub fn accept_contour(&self, contour: &VectorOfPoint) -> Result<Option<Rect>> {
        if self.config.require_quadrilateral {
            let perimeter = arc_length(contour, true)
                .map_err(|e| ExtractError::opencv("Perimeter calculation", e))?;

            let mut approx = VectorOfPoint::new();
            approx_poly_dp(
                contour,
                &mut approx,
                self.config.poly_approx_epsilon * perimeter,
                true,
            )
            .map_err(|e| ExtractError::opencv("Polygon approximation", e))?;

            if approx.len() != QUADRILATERAL_VERTICES {
                return Ok(None);
            }
        }

        let rect = bounding_rect(contour)
            .map_err(|e| ExtractError::opencv("Bounding rectangle", e))?;

        if rect.width < self.config.min_width || rect.height < self.config.min_height {
            debug!(
                width = rect.width,
                height = rect.height,
                "rejected region below size threshold"
            );
            return Ok(None);
        }

        Ok(Some(rect))
    }

    /// Crop rectangles for every accepted contour, in trace order
    ///
    /// Rectangles the inset would empty are logged and counted in the second
    /// tuple element instead of failing the page.
    pub fn select_regions(&self, contours: &Contours) -> Result<(Vec<Rect>, usize)> {
        let mut regions = Vec::new();
        let mut skipped = 0;

        for contour in contours.iter() {
            let Some(rect) = self.accept_contour(&contour)? else {
                continue;
            };

            match inset_rect(rect, self.config.outline_inset) {
                Ok(crop) => regions.push(crop),
                Err(err) if err.is_recoverable() => {
                    warn!("Skipping region: {}", err);
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok((regions, skipped))
    }

    /// Write each crop of `region` to `output_dir` as `{stem}-{n}.jpg`
    pub fn write_regions(
        &self,
        stem: &str,
        region: &Mat,
        crops: &[Rect],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(crops.len());

        for (index, crop) in crops.iter().enumerate() {
            let roi = Mat::roi(region, *crop)
                .and_then(|view| view.try_clone())
                .map_err(|e| ExtractError::opencv("ROI crop", e))?;

            let path = output_dir.join(roi_file_name(stem, index));
            save_image(&path, &roi)?;
            written.push(path);
        }

        Ok(written)
    }

    /// Extract every ROI of an already loaded page
    pub fn process_page(&self, source: &Path, page: &Mat, output_dir: &Path) -> Result<PageReport> {
        let region = self.working_region(page)?;
        let contours = self.find_contours(&region)?;
        self.process_region(source, &region, &contours, output_dir)
    }

    /// Crop and write the ROIs of a working region whose contours are known
    pub fn process_region(
        &self,
        source: &Path,
        region: &Mat,
        contours: &Contours,
        output_dir: &Path,
    ) -> Result<PageReport> {
        let stem = page_stem(source);
        let (crops, skipped) = self.select_regions(contours)?;
        let written = self.write_regions(&stem, region, &crops, output_dir)?;

        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());
        info!("Found {} elements in file {}", written.len(), filename);

        Ok(PageReport {
            source: source.to_path_buf(),
            contour_count: contours.len(),
            written,
            skipped,
        })
    }

    /// Load a page from disk and extract its ROIs
    pub fn extract_file(&self, path: &Path, output_dir: &Path) -> Result<PageReport> {
        let page = load_image(path)?;
        self.process_page(path, &page, output_dir)
    }
}

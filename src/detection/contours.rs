//! External contour extraction from scanned pages
//!
//! Pipeline:
//! - Grayscale conversion and 3x3 Gaussian blur against scan noise
//! - Canny edge detection
//! - Morphological closing so broken pen strokes form closed loops
//! - External contour tracing with collinear points compressed

use opencv::{
    core::{AlgorithmHint, Mat, Point, Rect, Size, Vector, BORDER_CONSTANT, BORDER_DEFAULT},
    imgproc::{
        canny, cvt_color, find_contours, gaussian_blur, get_structuring_element,
        morphology_default_border_value, morphology_ex, CHAIN_APPROX_SIMPLE, COLOR_BGR2GRAY,
        MORPH_CLOSE, MORPH_RECT, RETR_EXTERNAL,
    },
    prelude::*,
};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::constants::edges::{CANNY_APERTURE, GAUSSIAN_SIGMA};
use crate::error::{ExtractError, Result};

/// A traced contour
pub type VectorOfPoint = Vector<Point>;

/// All contours traced on one page
pub type Contours = Vector<VectorOfPoint>;

/// Edge-based contour extractor
pub struct ContourExtractor {
    blur_kernel: i32,
    canny_low: f64,
    canny_high: f64,
    closing_kernel: i32,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::sketch())
    }
}

impl ContourExtractor {
    /// Create an extractor from the edge and morphology settings of `config`
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            blur_kernel: config.gaussian_kernel_size,
            canny_low: config.canny_low_threshold,
            canny_high: config.canny_high_threshold,
            closing_kernel: config.closing_kernel_size,
        }
    }

    /// Trace the external contours of a BGR image
    ///
    /// No ordering is guaranteed beyond the order OpenCV traces them in.
    pub fn find_contours(&self, image: &Mat) -> Result<Contours> {
        // Step 1: Grayscale and blur
        let gray = self.preprocess(image)?;

        // Step 2: Edge detection
        let edges = self.detect_edges(&gray)?;

        // Step 3: Close gaps between edge fragments
        let closed = self.close_edges(&edges)?;

        // Step 4: Trace outer boundaries
        let mut contours = Contours::new();
        find_contours(
            &closed,
            &mut contours,
            RETR_EXTERNAL,
            CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .map_err(|e| ExtractError::opencv("Contour detection", e))?;

        debug!(count = contours.len(), "traced external contours");
        Ok(contours)
    }

    fn preprocess(&self, image: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        cvt_color(
            image,
            &mut gray,
            COLOR_BGR2GRAY,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| ExtractError::opencv("Grayscale conversion", e))?;

        let mut blurred = Mat::default();
        gaussian_blur(
            &gray,
            &mut blurred,
            Size::new(self.blur_kernel, self.blur_kernel),
            GAUSSIAN_SIGMA,
            GAUSSIAN_SIGMA,
            BORDER_DEFAULT,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| ExtractError::opencv("Gaussian blur", e))?;

        Ok(blurred)
    }

    fn detect_edges(&self, gray: &Mat) -> Result<Mat> {
        let mut edges = Mat::default();
        canny(
            gray,
            &mut edges,
            self.canny_low,
            self.canny_high,
            CANNY_APERTURE,
            false,
        )
        .map_err(|e| ExtractError::opencv("Canny edge detection", e))?;
        Ok(edges)
    }

    fn close_edges(&self, edges: &Mat) -> Result<Mat> {
        let kernel = get_structuring_element(
            MORPH_RECT,
            Size::new(self.closing_kernel, self.closing_kernel),
            Point::new(-1, -1),
        )
        .map_err(|e| ExtractError::opencv("Structuring element creation", e))?;

        let border_value = morphology_default_border_value()
            .map_err(|e| ExtractError::opencv("Morphology border value", e))?;

        let mut closed = Mat::default();
        morphology_ex(
            edges,
            &mut closed,
            MORPH_CLOSE,
            &kernel,
            Point::new(-1, -1),
            1,
            BORDER_CONSTANT,
            border_value,
        )
        .map_err(|e| ExtractError::opencv("Closing operation", e))?;

        Ok(closed)
    }
}

/// Crop the part of a page holding the sketches
///
/// Keeps every row and the columns from `width / 2 - offset` to the right
/// edge. `None` keeps the whole page.
pub fn working_region(page: &Mat, offset: Option<i32>) -> Result<Mat> {
    let Some(offset) = offset else {
        return page
            .try_clone()
            .map_err(|e| ExtractError::opencv("Page copy", e));
    };

    let width = page.cols();
    let height = page.rows();
    let x0 = (width / 2 - offset).clamp(0, width);

    let region = Mat::roi(page, Rect::new(x0, 0, width - x0, height))
        .map_err(|e| ExtractError::opencv("Working region crop", e))?;
    region
        .try_clone()
        .map_err(|e| ExtractError::opencv("Working region copy", e))
}

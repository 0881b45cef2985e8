//! Detection thresholds and sorting constants
//!
//! Values tuned for A4 sketch sheets scanned at 200-300 DPI, where the right
//! half of every page holds a grid of hand-drawn rectangles.

/// Edge detection settings shared by every extraction mode
pub mod edges {
    /// Gaussian blur kernel size (must be odd)
    pub const GAUSSIAN_KERNEL_SIZE: i32 = 3;

    /// Gaussian sigma; 0 lets OpenCV derive it from the kernel size
    pub const GAUSSIAN_SIGMA: f64 = 0.0;

    /// Canny hysteresis low threshold
    pub const CANNY_LOW_THRESHOLD: f64 = 10.0;

    /// Canny hysteresis high threshold
    pub const CANNY_HIGH_THRESHOLD: f64 = 250.0;

    /// Sobel aperture used by Canny
    pub const CANNY_APERTURE: i32 = 3;
}

/// Morphological closing kernels
pub mod morphology {
    /// Closing kernel for sketch sheets (keeps fine detail)
    pub const SKETCH_CLOSING_KERNEL: i32 = 3;

    /// Closing kernel for object detection (merges whole objects)
    pub const OBJECT_CLOSING_KERNEL: i32 = 60;
}

/// Region filtering and cropping
pub mod regions {
    /// Polygon approximation epsilon as fraction of perimeter (2%)
    pub const POLY_APPROX_EPSILON: f64 = 0.02;

    /// Vertex count of a drawn rectangle after approximation
    pub const QUADRILATERAL_VERTICES: usize = 4;

    /// Minimum bounding rectangle width in pixels
    pub const MIN_REGION_WIDTH: i32 = 50;

    /// Minimum bounding rectangle height in pixels
    pub const MIN_REGION_HEIGHT: i32 = 50;

    /// Inset removing the hand-drawn outline from sketch crops
    pub const SKETCH_OUTLINE_INSET: i32 = 50;

    /// Columns left of the page centre still kept in the working region
    pub const WORKING_REGION_OFFSET: i32 = 200;

    /// Extension of every written crop
    pub const OUTPUT_EXTENSION: &str = "jpg";
}

/// Batch sorting
pub mod sorting {
    /// Pages with more contours than this are consent forms
    pub const CONSENT_CONTOUR_THRESHOLD: usize = 700;

    /// Folder receiving incomplete user folders
    pub const UNSORTED_FOLDER: &str = "Unsorted";
}

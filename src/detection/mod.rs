//! Contour detection and region-of-interest extraction
//!
//! This module traces external contours on scanned pages and turns the
//! accepted ones into cropped image files.

pub mod contours;
pub mod roi;

pub use contours::{working_region, ContourExtractor, Contours};
pub use roi::{inset_rect, PageReport, RoiExtractor};

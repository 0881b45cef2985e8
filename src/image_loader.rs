//! Page loading, crop writing and input discovery
//!
//! Pages are decoded with the `image` crate and converted to OpenCV Mat in
//! BGR order so the detection code never sees anything else. Crops are
//! written back through `imgcodecs`, which picks the encoder from the file
//! extension.
//!
//! ## Supported Formats
//!
//! JPEG, PNG, GIF (first frame), WebP, TIFF and BMP.

use crate::error::{ExtractError, Result};
use crate::sorting::catalog::natural_cmp;
use opencv::{
    core::{Mat, Vec3b, Vector, CV_8UC3},
    imgcodecs,
    prelude::*,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Load a scanned page from disk as an OpenCV Mat (BGR format)
///
/// # Errors
///
/// Returns `ExtractError::UnsupportedFormat` for unknown extensions and
/// `ExtractError::ImageLoadError` if the file cannot be opened or decoded.
///
/// # Example
///
/// ```rust,no_run
/// use sketch_sorter::image_loader::load_image;
/// use opencv::prelude::*;
/// use std::path::Path;
///
/// let page = load_image(Path::new("scans/page01.jpg"))?;
/// println!("Loaded page: {}x{}", page.cols(), page.rows());
/// # Ok::<(), sketch_sorter::ExtractError>(())
/// ```
pub fn load_image(path: &Path) -> Result<Mat> {
    if ImageFormat::from_extension(path).is_none() {
        return Err(ExtractError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let reader = image::ImageReader::open(path).map_err(|e| {
        ExtractError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let img = reader.decode().map_err(|e| {
        ExtractError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    rgb_to_bgr_mat(&rgb_img.into_raw(), width as i32, height as i32)
}

/// Convert RGB byte buffer to OpenCV BGR Mat
fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    let mut mat = Mat::zeros(height, width, CV_8UC3)
        .map_err(|e| ExtractError::opencv("Mat allocation", e))?
        .to_mat()
        .map_err(|e| ExtractError::opencv("Mat conversion", e))?;

    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;

            let pixel = mat
                .at_2d_mut::<Vec3b>(y, x)
                .map_err(|e| ExtractError::opencv("Pixel access", e))?;
            pixel[0] = rgb_data[idx + 2];
            pixel[1] = rgb_data[idx + 1];
            pixel[2] = rgb_data[idx];
        }
    }

    Ok(mat)
}

/// Write an image; the encoder is chosen from the path extension
pub fn save_image(path: &Path, image: &Mat) -> Result<()> {
    let filename = path.to_str().ok_or_else(|| ExtractError::ImageWriteError {
        path: path.to_path_buf(),
    })?;

    let written = imgcodecs::imwrite(filename, image, &Vector::new())
        .map_err(|e| ExtractError::opencv(format!("imwrite {}", path.display()), e))?;

    if !written {
        return Err(ExtractError::ImageWriteError {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// List the files of `dir` accepted by `accepts`, in natural name order
///
/// Directory listing order is filesystem dependent, so the result is always
/// sorted before it drives page numbering or folder state. Digit runs compare
/// by value: `scan2.jpg` comes before `scan10.jpg`.
pub fn find_image_files<F>(dir: &Path, accepts: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let entries = fs::read_dir(dir)
        .map_err(|e| ExtractError::io(format!("Failed to list {}", dir.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| ExtractError::io(format!("Failed to list {}", dir.display()), e))?;
        let path = entry.path();

        if path.is_file() && accepts(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(files)
}

/// File name of `path` as text, empty when there is none
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// File stem used to name crops and user folders
pub fn page_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string())
}

//! File-facing collaborators: label files, detection reports, images.

pub mod labels;
pub mod render;
pub mod report;

use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use labels::{format_labels, parse_label_bytes, parse_labels, read_labels, write_labels};
pub use render::{draw_detections, save_visualization};
pub use report::{format_report, write_report};

/// Load and decode an image file
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    ImageReader::open(path)
        .map_err(|e| Error::io(path, e))?
        .decode()
        .map_err(|source| Error::ImageRead {
            path: path.to_path_buf(),
            source,
        })
}

/// `<dir>/<stem><suffix>` for an input image, where `dir` defaults to the
/// image's own directory
pub fn output_path(image_path: &Path, out_dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| image_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{}{}", stem, suffix))
}

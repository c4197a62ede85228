//! Directory mode: every image in a folder, scored against its sibling label
//! file when one exists.
//!
//! Images are independent, so each one runs on the blocking pool while the
//! detector and evaluator are shared read-only. A semaphore bounds how many
//! images are in memory at once. Reports come back in file name order
//! whatever the completion order was.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::detection::CircleDetector;
use crate::error::{Error, Result};
use crate::evaluation::Evaluator;
use crate::models::EvalResult;
use crate::pipeline::{self, ImageReport, OutputOptions};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const OUTPUT_SUFFIX: &str = "_detected";

/// Result of a directory run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<ImageReport>,
    /// Counts summed over images that had ground truth
    pub totals: EvalResult,
    pub evaluated: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn print(&self) {
        if self.evaluated == 0 {
            return;
        }
        println!("\nBatch evaluation ({} images):", self.evaluated);
        println!(
            "Precision={} Recall={} F1={}",
            self.totals.precision(),
            self.totals.recall(),
            self.totals.f1()
        );
    }
}

/// Input images of a directory, sorted by path.
///
/// Only regular files with an image extension qualify; files this tool wrote
/// itself (stem ending in `_detected`) are skipped.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        let is_output = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with(OUTPUT_SUFFIX));
        if is_image && !is_output {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Label file expected for an image: same stem, `.txt` extension
pub fn ground_truth_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

/// Images processed at once by `run_batch`: one per available core
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Process every image in `dir`. A failing image is logged and counted, the
/// rest of the batch still runs.
pub async fn run_batch(
    dir: &Path,
    detector: Arc<CircleDetector>,
    evaluator: Arc<Evaluator>,
    options: OutputOptions,
) -> Result<BatchSummary> {
    run_batch_with_limit(dir, detector, evaluator, options, default_parallelism()).await
}

/// `run_batch` with at most `max_in_flight` images decoded at any time
pub async fn run_batch_with_limit(
    dir: &Path,
    detector: Arc<CircleDetector>,
    evaluator: Arc<Evaluator>,
    options: OutputOptions,
    max_in_flight: usize,
) -> Result<BatchSummary> {
    let images = collect_images(dir)?;
    let max_in_flight = max_in_flight.max(1);
    log::info!(
        "{} images in {}, {} at a time",
        images.len(),
        dir.display(),
        max_in_flight
    );

    let options = Arc::new(options);
    let permits = Arc::new(Semaphore::new(max_in_flight));
    let mut summary = BatchSummary::default();
    let mut handles = Vec::with_capacity(images.len());
    for image_path in images {
        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                log::error!("skipping {}: {}", image_path.display(), e);
                summary.failed += 1;
                continue;
            }
        };
        let detector = detector.clone();
        let evaluator = evaluator.clone();
        let options = options.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let gt_path = ground_truth_path(&image_path);
            let gt = gt_path.exists().then_some(gt_path.as_path());
            let result = pipeline::process_image(&detector, &evaluator, &image_path, gt, &options);
            (image_path, result)
        });
        handles.push(handle);
    }

    for handle in handles {
        match handle.await {
            Ok((_, Ok(report))) => {
                if let Some(res) = report.eval {
                    summary.totals += res;
                    summary.evaluated += 1;
                }
                summary.reports.push(report);
            }
            Ok((path, Err(e))) => {
                log::error!("skipping {}: {}", path.display(), e);
                summary.failed += 1;
            }
            Err(e) => {
                log::error!("image task failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_truth_path() {
        assert_eq!(
            ground_truth_path(Path::new("/x/coins_3.jpg")),
            PathBuf::from("/x/coins_3.txt")
        );
    }

    #[test]
    fn test_collect_images_filters() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["b.png", "a.JPG", "c.jpeg", "a_detected.png", "a.txt", "notes.md"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let images = collect_images(dir.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
    }

    #[test]
    fn test_collect_images_not_a_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            collect_images(file.path()),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_default_parallelism_is_positive() {
        assert!(default_parallelism() >= 1);
    }
}

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::detection::{preprocessing, CircleDetector, DetectionTrace};
use crate::error::{Error, Result};
use crate::evaluation::Evaluator;
use crate::io;
use crate::models::{Circle, EvalResult};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Use `output_dir` for debug images.
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries =
                std::fs::read_dir(&output_dir).map_err(|e| Error::io(&output_dir, e))?;
            if entries.next().is_some() {
                return Err(Error::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| Error::io(&output_dir, e))?;
        }

        Ok(Self { output_dir })
    }

    /// Save the input and every intermediate image of one run, one directory
    /// per stage (e.g. `01_gaussian_blur/coins_jpg.png` for `coins.jpg`)
    fn save(&self, image_path: &Path, input: &DynamicImage, trace: &DetectionTrace) -> Result<()> {
        let file_name = debug_file_name(image_path);
        let stages: [(&str, DynamicImage); 3] = [
            ("00_input", input.clone()),
            ("01_gaussian_blur", DynamicImage::ImageLuma8(trace.smoothed.clone())),
            ("02_edge_detection", DynamicImage::ImageLuma8(trace.edges.clone())),
        ];

        for (stage, img) in stages {
            let stage_dir = self.output_dir.join(stage);
            std::fs::create_dir_all(&stage_dir).map_err(|e| Error::io(&stage_dir, e))?;
            let path = stage_dir.join(&file_name);
            img.save(&path).map_err(|source| Error::ImageWrite {
                path: path.clone(),
                source,
            })?;
            log::debug!("debug: saved {}", path.display());
        }
        Ok(())
    }
}

/// Debug image name for an input: `<stem>_<ext>.png`, so inputs sharing a
/// stem in one directory never overwrite each other
fn debug_file_name(image_path: &Path) -> String {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match image_path.extension() {
        Some(ext) => format!("{}_{}.png", stem, ext.to_string_lossy()),
        None => format!("{}.png", stem),
    }
}

/// What to write next to (or instead of next to) each processed image
#[derive(Clone, Debug)]
pub struct OutputOptions {
    /// Directory for outputs; `None` writes beside the input image
    pub out_dir: Option<PathBuf>,
    pub write_report: bool,
    pub write_visualization: bool,
    /// Also write detections as a label file at this path
    pub labels_out: Option<PathBuf>,
    pub debug: Option<DebugConfig>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            write_report: true,
            write_visualization: true,
            labels_out: None,
            debug: None,
        }
    }
}

impl OutputOptions {
    /// Outputs switched off; only the returned report is produced
    pub fn none() -> Self {
        Self {
            write_report: false,
            write_visualization: false,
            ..Self::default()
        }
    }
}

/// Everything known about one processed image
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub image_path: PathBuf,
    pub circles: Vec<Circle>,
    /// Present when a ground-truth file was found
    pub eval: Option<EvalResult>,
    pub elapsed: Duration,
    pub report_path: Option<PathBuf>,
    pub visualization_path: Option<PathBuf>,
}

impl ImageReport {
    /// Console summary of this image
    pub fn print(&self) {
        println!("\nImage: {}", self.image_path.display());
        print!("{}", io::format_report(&self.circles, None));
        println!("Detection time (ms): {:.3}", self.elapsed.as_secs_f64() * 1000.0);

        if let Some(res) = &self.eval {
            println!("TP={} FP={} FN={}", res.tp, res.fp, res.fn_);
            println!(
                "Precision={} Recall={} F1={}",
                res.precision(),
                res.recall(),
                res.f1()
            );
        }
        if let Some(path) = &self.report_path {
            println!("Saved detections to {}", path.display());
        }
        if let Some(path) = &self.visualization_path {
            println!("Saved visualization to {}", path.display());
        }
    }
}

/// Detect circles in one image, score them against `gt_path` when that file
/// exists, and write the requested outputs.
pub fn process_image(
    detector: &CircleDetector,
    evaluator: &Evaluator,
    image_path: &Path,
    gt_path: Option<&Path>,
    options: &OutputOptions,
) -> Result<ImageReport> {
    let img = io::load_image(image_path)?;
    log::debug!("loaded {} ({}x{})", image_path.display(), img.width(), img.height());
    let gray = preprocessing::to_grayscale(&img);

    let start = Instant::now();
    let (circles, trace) = if options.debug.is_some() {
        let (circles, trace) = detector.detect_with_trace(&gray);
        (circles, Some(trace))
    } else {
        (detector.detect(&gray), None)
    };
    let elapsed = start.elapsed();

    let eval = match gt_path {
        Some(path) if path.exists() => {
            let gts = io::read_labels(path)?;
            Some(evaluator.evaluate(&circles, &gts))
        }
        _ => None,
    };

    log::info!(
        "{}: {} circles in {:.1} ms",
        image_path.display(),
        circles.len(),
        elapsed.as_secs_f64() * 1000.0
    );

    if let (Some(debug), Some(trace)) = (&options.debug, &trace) {
        debug.save(image_path, &img, trace)?;
    }

    let out_dir = options.out_dir.as_deref();
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let report_path = if options.write_report {
        let path = io::output_path(image_path, out_dir, "_detected.txt");
        io::write_report(&path, &circles, eval.as_ref())?;
        Some(path)
    } else {
        None
    };

    let visualization_path = if options.write_visualization {
        let path = io::output_path(image_path, out_dir, "_detected.png");
        io::save_visualization(&path, &img, &circles)?;
        Some(path)
    } else {
        None
    };

    if let Some(path) = &options.labels_out {
        io::write_labels(path, &circles)?;
    }

    Ok(ImageReport {
        image_path: image_path.to_path_buf(),
        circles,
        eval,
        elapsed,
        report_path,
        visualization_path,
    })
}

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use coindetect::batch;
use coindetect::{AppConfig, CircleDetector, DebugConfig, Evaluator, OutputOptions};

#[derive(Parser)]
#[command(name = "coindetect")]
#[command(about = "Detect coins in images and score them against labeled circles")]
struct Cli {
    /// Input image, or a directory with --batch
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Ground-truth label file (cx cy r per line)
    #[arg(value_name = "GT_FILE", conflicts_with = "batch")]
    gt_file: Option<PathBuf>,

    /// Process every image in the INPUT directory
    #[arg(long)]
    batch: bool,

    /// JSON file with "detector" and "matcher" settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write reports and visualizations here instead of beside the images
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Also write detections as a label file
    #[arg(long, value_name = "FILE", conflicts_with = "batch")]
    labels_out: Option<PathBuf>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Skip writing the annotated image
    #[arg(long)]
    no_visualization: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(flatten)]
    tuning: Tuning,
}

/// Per-field overrides of the configuration
#[derive(clap::Args)]
struct Tuning {
    /// Gaussian kernel size (rounded up to odd, at least 3)
    #[arg(long)]
    kernel_size: Option<u32>,
    /// Gaussian sigma
    #[arg(long)]
    sigma: Option<f32>,
    #[arg(long)]
    canny_low: Option<f32>,
    #[arg(long)]
    canny_high: Option<f32>,
    /// Inverse accumulator resolution
    #[arg(long)]
    dp: Option<f32>,
    /// Minimum distance between circle centers
    #[arg(long)]
    min_dist: Option<f32>,
    /// High edge threshold of the circle search
    #[arg(long)]
    param1: Option<f32>,
    /// Accumulator vote threshold
    #[arg(long)]
    param2: Option<u32>,
    #[arg(long)]
    min_radius: Option<u32>,
    #[arg(long)]
    max_radius: Option<u32>,
    /// Match tolerance in pixels
    #[arg(long)]
    match_tol: Option<f32>,
    /// Relative radius tolerance
    #[arg(long)]
    radius_tol: Option<f32>,
}

impl Tuning {
    fn apply(&self, config: &mut AppConfig) {
        let det = &mut config.detector;
        if let Some(v) = self.kernel_size {
            det.gauss_kernel = v;
        }
        if let Some(v) = self.sigma {
            det.gauss_sigma = v;
        }
        if let Some(v) = self.canny_low {
            det.canny_low = v;
        }
        if let Some(v) = self.canny_high {
            det.canny_high = v;
        }
        if let Some(v) = self.dp {
            det.hough_dp = v;
        }
        if let Some(v) = self.min_dist {
            det.hough_min_dist = v;
        }
        if let Some(v) = self.param1 {
            det.hough_param1 = v;
        }
        if let Some(v) = self.param2 {
            det.hough_param2 = v;
        }
        if let Some(v) = self.min_radius {
            det.min_radius = v;
        }
        if let Some(v) = self.max_radius {
            det.max_radius = v;
        }
        if let Some(v) = self.match_tol {
            config.matcher.match_tol = v;
        }
        if let Some(v) = self.radius_tol {
            config.matcher.radius_tol = v;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    args.tuning.apply(&mut config);
    log::debug!("{:?}", config);

    let debug = args
        .debug_out
        .map(DebugConfig::new)
        .transpose()
        .context("Failed to prepare debug directory")?;

    let options = OutputOptions {
        out_dir: args.out_dir,
        write_report: true,
        write_visualization: !args.no_visualization,
        labels_out: args.labels_out,
        debug,
    };

    let detector = CircleDetector::new(config.detector);
    let evaluator = Evaluator::new(config.matcher);

    if args.batch {
        let detector = Arc::new(detector);
        let evaluator = Arc::new(evaluator);
        let summary = batch::run_batch(&args.input, detector, evaluator, options)
            .await
            .with_context(|| format!("Batch run over {} failed", args.input.display()))?;
        for report in &summary.reports {
            report.print();
        }
        summary.print();
        if summary.failed > 0 {
            log::warn!("{} images could not be processed", summary.failed);
        }
    } else {
        let report = coindetect::process_image(
            &detector,
            &evaluator,
            &args.input,
            args.gt_file.as_deref(),
            &options,
        )
        .with_context(|| format!("Failed to process {}", args.input.display()))?;
        report.print();

        if let Some(path) = &options.labels_out {
            print!("{}", coindetect::io::format_labels(&report.circles));
            println!("Saved labels to {}", path.display());
        }
        if args.gt_file.as_deref().is_some_and(|p| !p.exists()) {
            log::warn!("ground-truth file not found, skipping evaluation");
        }
    }

    Ok(())
}

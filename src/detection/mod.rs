pub mod preprocessing;
pub mod hough;
pub mod circles;

use image::{DynamicImage, GrayImage};

use crate::config::DetectorConfig;
use crate::models::Circle;
use hough::Candidate;

/// Intermediate products of one detector run, for debugging
#[derive(Debug, Clone)]
pub struct DetectionTrace {
    pub smoothed: GrayImage,
    /// Canny map with the configured `canny_low`/`canny_high` thresholds
    pub edges: GrayImage,
    /// Raw search output before duplicate suppression
    pub candidates: Vec<Candidate>,
}

/// Circle detector: Gaussian smoothing, gradient circle search, duplicate
/// suppression.
///
/// Holds only its configuration, so one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Default)]
pub struct CircleDetector {
    config: DetectorConfig,
}

impl CircleDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect circles in a grayscale image
    pub fn detect(&self, gray: &GrayImage) -> Vec<Circle> {
        if gray.width() == 0 || gray.height() == 0 {
            return Vec::new();
        }
        let smoothed = self.smooth(gray);
        let candidates = hough::find_circles(&smoothed, &self.config);
        self.finish(&candidates)
    }

    /// Detect circles and keep the intermediate images
    pub fn detect_with_trace(&self, gray: &GrayImage) -> (Vec<Circle>, DetectionTrace) {
        if gray.width() == 0 || gray.height() == 0 {
            let trace = DetectionTrace {
                smoothed: gray.clone(),
                edges: gray.clone(),
                candidates: Vec::new(),
            };
            return (Vec::new(), trace);
        }

        let smoothed = self.smooth(gray);
        let edges =
            preprocessing::detect_edges(&smoothed, self.config.canny_low, self.config.canny_high);
        let candidates = hough::find_circles(&smoothed, &self.config);
        let circles = self.finish(&candidates);

        let trace = DetectionTrace {
            smoothed,
            edges,
            candidates,
        };
        (circles, trace)
    }

    /// Convert a color image to grayscale, then detect
    pub fn detect_dynamic(&self, img: &DynamicImage) -> Vec<Circle> {
        self.detect(&preprocessing::to_grayscale(img))
    }

    fn smooth(&self, gray: &GrayImage) -> GrayImage {
        preprocessing::apply_blur(gray, self.config.kernel_size(), self.config.gauss_sigma)
    }

    fn finish(&self, candidates: &[Candidate]) -> Vec<Circle> {
        let circles = circles::suppress_duplicates(circles::to_circles(candidates));
        log::debug!(
            "{} candidates, {} circles after duplicate suppression",
            candidates.len(),
            circles.len()
        );
        circles
    }
}

//! Tuning parameters for detection and matching.
//!
//! Both configs are plain values: a detector or evaluator takes one by value at
//! construction and never changes it, so differently tuned instances can live
//! side by side. Every field has a default and a JSON file may override any
//! subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Parameters of the smoothing and circle search stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Gaussian kernel size, normalised to an odd value of at least 3
    pub gauss_kernel: u32,
    pub gauss_sigma: f32,
    /// Canny thresholds used for the debug edge map
    pub canny_low: f32,
    pub canny_high: f32,
    /// Inverse accumulator resolution (1.0 = same as the image)
    pub hough_dp: f32,
    /// Minimum distance between detected centers
    pub hough_min_dist: f32,
    /// High Canny threshold for the edge map the search votes from
    pub hough_param1: f32,
    /// Accumulator vote threshold
    pub hough_param2: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            gauss_kernel: 9,
            gauss_sigma: 2.0,
            canny_low: 100.0,
            canny_high: 200.0,
            hough_dp: 1.0,
            hough_min_dist: 47.0,
            hough_param1: 200.0,
            hough_param2: 32,
            min_radius: 10,
            max_radius: 200,
        }
    }
}

impl DetectorConfig {
    /// Kernel size actually used by the blur: odd and at least 3
    pub fn kernel_size(&self) -> u32 {
        (self.gauss_kernel | 1).max(3)
    }
}

/// Tolerances for crediting a detection against a ground-truth circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum center distance in pixels
    pub match_tol: f32,
    /// Maximum relative radius error, `|r_det - r_gt| / r_gt`
    pub radius_tol: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_tol: 20.0,
            radius_tol: 0.4,
        }
    }
}

impl MatchConfig {
    /// Tolerances used by the command line front end
    pub fn cli_default() -> Self {
        Self {
            match_tol: 25.0,
            radius_tol: 0.5,
        }
    }
}

/// Layout of a configuration file.
///
/// An absent `matcher` table means the command line tolerances; fields missing
/// from a present table take the `MatchConfig` defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub matcher: MatchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            matcher: MatchConfig::cli_default(),
        }
    }
}

impl AppConfig {
    /// Load a JSON config file; missing fields keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_size_forced_odd() {
        let mut cfg = DetectorConfig::default();
        for (given, used) in [(0, 3), (1, 3), (2, 3), (3, 3), (4, 5), (8, 9), (9, 9), (10, 11)] {
            cfg.gauss_kernel = given;
            assert_eq!(cfg.kernel_size(), used, "kernel {}", given);
        }
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "detector": { "min_radius": 15 }, "matcher": { "match_tol": 12.5 } }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.detector.min_radius, 15);
        assert_eq!(cfg.detector.max_radius, 200);
        assert_eq!(cfg.detector.gauss_kernel, 9);
        assert_eq!(cfg.matcher.match_tol, 12.5);
        // a present but partial table falls back to the library defaults
        assert_eq!(cfg.matcher.radius_tol, 0.4);

        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.matcher, MatchConfig::cli_default());
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(Error::Config { .. })));
    }
}

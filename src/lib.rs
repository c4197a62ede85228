pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod pipeline;

pub use config::{AppConfig, DetectorConfig, MatchConfig};
pub use detection::{CircleDetector, DetectionTrace};
pub use error::{Error, Result};
pub use evaluation::{evaluate, Evaluator};
pub use models::{Circle, EvalResult};
pub use pipeline::{process_image, DebugConfig, ImageReport, OutputOptions};

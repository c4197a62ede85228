mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from coindetect for tests
pub use coindetect::{
    Circle, CircleDetector, DetectorConfig, EvalResult, Evaluator, MatchConfig, OutputOptions,
};

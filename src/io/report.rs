//! Human-readable detection reports.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Circle, EvalResult};

/// Render the report: detection count, one line per circle, then the
/// evaluation block when ground truth was available.
pub fn format_report(circles: &[Circle], eval: Option<&EvalResult>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Detected circles: {}", circles.len());
    for (i, c) in circles.iter().enumerate() {
        let _ = writeln!(out, "{}: cx={} cy={} r={}", i, c.x, c.y, c.radius);
    }

    if let Some(res) = eval {
        let _ = writeln!(out);
        let _ = writeln!(out, "=== Evaluation ===");
        let _ = writeln!(out, "TP={}", res.tp);
        let _ = writeln!(out, "FP={}", res.fp);
        let _ = writeln!(out, "FN={}", res.fn_);
        let _ = writeln!(out, "Precision={}", res.precision());
        let _ = writeln!(out, "Recall={}", res.recall());
        let _ = writeln!(out, "F1={}", res.f1());
    }
    out
}

pub fn write_report(
    path: impl AsRef<Path>,
    circles: &[Circle],
    eval: Option<&EvalResult>,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, format_report(circles, eval)).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_without_eval() {
        let circles = [Circle::new(10.0, 20.5, 7.0), Circle::new(1.0, 2.0, 3.0)];
        let report = format_report(&circles, None);
        assert_eq!(
            report,
            "Detected circles: 2\n0: cx=10 cy=20.5 r=7\n1: cx=1 cy=2 r=3\n"
        );
    }

    #[test]
    fn test_report_with_eval() {
        let res = EvalResult { tp: 1, fp: 1, fn_: 0 };
        let report = format_report(&[], Some(&res));
        assert_eq!(
            report,
            "Detected circles: 0\n\n=== Evaluation ===\nTP=1\nFP=1\nFN=0\n\
             Precision=0.5\nRecall=1\nF1=0.6666666666666666\n"
        );
    }
}

//! Scoring detections against ground truth.
//!
//! Matching is greedy and order dependent: detections are visited in the
//! order given and each one claims the nearest still-unused ground-truth
//! circle within tolerance. This is not a minimum-cost assignment and can
//! credit fewer matches in ambiguous layouts; results must stay identical to
//! earlier runs, so the greedy rule is kept.

use crate::config::MatchConfig;
use crate::models::{Circle, EvalResult};

/// Match `detections` against `ground_truths`.
///
/// A ground-truth circle is eligible for a detection when the centers are at
/// most `match_tol` pixels apart and `|r_det - r_gt| / r_gt <= radius_tol`.
/// Ground truth with a non-positive radius is never eligible and ends up as a
/// false negative.
pub fn evaluate(
    detections: &[Circle],
    ground_truths: &[Circle],
    match_tol: f32,
    radius_tol: f32,
) -> EvalResult {
    let mut res = EvalResult::default();
    let mut gt_used = vec![false; ground_truths.len()];

    for det in detections {
        let mut best: Option<(usize, f32)> = None;

        for (i, gt) in ground_truths.iter().enumerate() {
            if gt_used[i] || !gt.has_valid_radius() {
                continue;
            }
            let dist = det.center_distance(gt);
            let radius_err = (det.radius - gt.radius).abs() / gt.radius;
            if !(dist <= match_tol && radius_err <= radius_tol) {
                continue;
            }
            // strict: the first of equally near circles wins
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((i, dist));
            }
        }

        match best {
            Some((i, _)) => {
                gt_used[i] = true;
                res.tp += 1;
            }
            None => res.fp += 1,
        }
    }

    res.fn_ = gt_used.iter().filter(|used| !**used).count();
    res
}

/// Evaluator bound to one set of tolerances
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: MatchConfig,
}

impl Evaluator {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn evaluate(&self, detections: &[Circle], ground_truths: &[Circle]) -> EvalResult {
        evaluate(
            detections,
            ground_truths,
            self.config.match_tol,
            self.config.radius_tol,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f32, y: f32, r: f32) -> Circle {
        Circle::new(x, y, r)
    }

    #[test]
    fn test_nearest_unused_is_claimed() {
        let dets = [c(10.0, 0.0, 10.0)];
        let gts = [c(0.0, 0.0, 10.0), c(12.0, 0.0, 10.0)];
        let res = evaluate(&dets, &gts, 20.0, 0.4);
        assert_eq!(res, EvalResult { tp: 1, fp: 0, fn_: 1 });

        // the second detection takes the remaining one
        let dets = [c(10.0, 0.0, 10.0), c(10.0, 0.0, 10.0)];
        let res = evaluate(&dets, &gts, 20.0, 0.4);
        assert_eq!(res, EvalResult { tp: 2, fp: 0, fn_: 0 });
    }

    #[test]
    fn test_greedy_order_dependence() {
        // det1 reaches both and is nearer A; det2 only reaches A
        let gts = [c(0.0, 0.0, 10.0), c(15.0, 0.0, 10.0)];
        let det1 = c(6.0, 0.0, 10.0);
        let det2 = c(-12.0, 0.0, 10.0);

        let res = evaluate(&[det1, det2], &gts, 14.0, 0.4);
        assert_eq!(res, EvalResult { tp: 1, fp: 1, fn_: 1 });

        let res = evaluate(&[det2, det1], &gts, 14.0, 0.4);
        assert_eq!(res, EvalResult { tp: 2, fp: 0, fn_: 0 });
    }

    #[test]
    fn test_equal_distance_takes_first_gt() {
        let gts = [c(-5.0, 0.0, 10.0), c(5.0, 0.0, 10.0)];
        let dets = [c(0.0, 0.0, 10.0), c(-5.0, 0.0, 10.0)];
        // det 0 claims gt 0, so det 1 falls back to gt 1 at distance 10
        let res = evaluate(&dets, &gts, 10.0, 0.4);
        assert_eq!(res, EvalResult { tp: 2, fp: 0, fn_: 0 });

        let res = evaluate(&dets, &gts, 9.0, 0.4);
        assert_eq!(res, EvalResult { tp: 1, fp: 1, fn_: 1 });
    }

    #[test]
    fn test_radius_tolerance_is_relative_to_gt() {
        let gts = [c(0.0, 0.0, 10.0)];
        assert_eq!(evaluate(&[c(0.0, 0.0, 14.0)], &gts, 20.0, 0.4).tp, 1);
        assert_eq!(evaluate(&[c(0.0, 0.0, 14.5)], &gts, 20.0, 0.4).tp, 0);
        assert_eq!(evaluate(&[c(0.0, 0.0, 6.0)], &gts, 20.0, 0.4).tp, 1);
    }

    #[test]
    fn test_degenerate_gt_radius() {
        let gts = [c(0.0, 0.0, 0.0), c(50.0, 50.0, -4.0), c(90.0, 90.0, f32::NAN)];
        let dets = [c(0.0, 0.0, 0.0), c(50.0, 50.0, 4.0), c(90.0, 90.0, 3.0)];
        let res = evaluate(&dets, &gts, 20.0, 0.4);
        assert_eq!(res, EvalResult { tp: 0, fp: 3, fn_: 3 });
        assert!(!res.precision().is_nan());
    }

    #[test]
    fn test_evaluator_uses_config() {
        let eval = Evaluator::new(MatchConfig {
            match_tol: 5.0,
            radius_tol: 0.1,
        });
        let res = eval.evaluate(&[c(0.0, 6.0, 10.0)], &[c(0.0, 0.0, 10.0)]);
        assert_eq!(res, EvalResult { tp: 0, fp: 1, fn_: 1 });

        let res = Evaluator::default().evaluate(&[c(0.0, 6.0, 10.0)], &[c(0.0, 0.0, 10.0)]);
        assert_eq!(res, EvalResult { tp: 1, fp: 0, fn_: 0 });
    }
}

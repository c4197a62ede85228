use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// A detected or labeled disc in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Confidence. The circle search exposes no calibrated votes, so this is 1.0
    pub score: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            radius,
            score: 1.0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Euclidean distance between the two centers
    pub fn center_distance(&self, other: &Circle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Two circles overlap when their centers are closer than half the smaller radius
    pub fn overlaps(&self, other: &Circle) -> bool {
        self.center_distance(other) < 0.5 * self.radius.min(other.radius)
    }

    /// Whether this circle can take part in matching at all
    pub fn has_valid_radius(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0
    }
}

/// Outcome of matching one detection list against one ground-truth list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl EvalResult {
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Add for EvalResult {
    type Output = EvalResult;

    fn add(self, rhs: EvalResult) -> EvalResult {
        EvalResult {
            tp: self.tp + rhs.tp,
            fp: self.fp + rhs.fp,
            fn_: self.fn_ + rhs.fn_,
        }
    }
}

impl AddAssign for EvalResult {
    fn add_assign(&mut self, rhs: EvalResult) {
        *self = *self + rhs;
    }
}

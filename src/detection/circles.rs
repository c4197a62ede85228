use crate::detection::hough::Candidate;
use crate::models::Circle;

/// Turn search candidates into circles. The search has no calibrated
/// confidence, so every circle gets the placeholder score.
pub fn to_circles(candidates: &[Candidate]) -> Vec<Circle> {
    candidates
        .iter()
        .map(|c| Circle::new(c.x, c.y, c.radius))
        .collect()
}

/// Drop circles that sit inside another one.
///
/// For each pair whose centers are closer than half the smaller radius the
/// smaller circle is discarded; on equal radii the earlier one stays. Survivors
/// keep their input order.
pub fn suppress_duplicates(circles: Vec<Circle>) -> Vec<Circle> {
    let mut keep = vec![true; circles.len()];

    for i in 0..circles.len() {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..circles.len() {
            if !keep[j] {
                continue;
            }
            if circles[i].overlaps(&circles[j]) {
                if circles[i].radius >= circles[j].radius {
                    keep[j] = false;
                } else {
                    keep[i] = false;
                }
            }
        }
    }

    circles
        .into_iter()
        .enumerate()
        .filter_map(|(index, circle)| keep[index].then_some(circle))
        .collect()
}

//! Gradient-voting circle search.
//!
//! Every edge pixel votes along both directions of its intensity gradient for
//! each radius in `[min_radius, max_radius]`. Boundary gradients of a disc all
//! point through its center, so centers show up as accumulator peaks. Peaks are
//! visited strongest first; each accepted center gets the radius best supported
//! by the edge pixels around it.

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::config::DetectorConfig;
use crate::detection::preprocessing;

/// A center/radius hypothesis together with its evidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Accumulator count at the center cell
    pub votes: u32,
    /// Edge pixels lying on the chosen radius
    pub support: u32,
}

/// Search parameters resolved from a `DetectorConfig`
#[derive(Debug, Clone, Copy)]
struct SearchParams {
    dp: f32,
    min_dist_sq: f32,
    canny_low: f32,
    canny_high: f32,
    vote_threshold: u32,
    min_radius: u32,
    max_radius: u32,
}

impl SearchParams {
    fn from_config(config: &DetectorConfig) -> Self {
        let dp = if config.hough_dp.is_finite() && config.hough_dp >= 1.0 {
            config.hough_dp
        } else {
            1.0
        };
        let canny_high = config.hough_param1.max(1.0);
        let min_dist = config.hough_min_dist.max(0.0);
        Self {
            dp,
            min_dist_sq: min_dist * min_dist,
            canny_low: (canny_high / 2.0).max(1.0),
            canny_high,
            vote_threshold: config.hough_param2.max(1),
            min_radius: config.min_radius.max(1),
            max_radius: config.max_radius,
        }
    }
}

/// Center accumulator, padded by one cell on every side so peak tests need no
/// bounds checks.
struct Accumulator {
    cells: Vec<u32>,
    stride: usize,
    width: usize,
    height: usize,
}

impl Accumulator {
    fn new(width: usize, height: usize) -> Self {
        let stride = width + 2;
        Self {
            cells: vec![0; stride * (height + 2)],
            stride,
            width,
            height,
        }
    }

    fn index(&self, x: f32, y: f32) -> Option<usize> {
        let ix = x.round();
        let iy = y.round();
        if ix < 0.0 || iy < 0.0 || ix >= self.width as f32 || iy >= self.height as f32 {
            return None;
        }
        Some((iy as usize + 1) * self.stride + ix as usize + 1)
    }

    /// Cell coordinates of an index, without padding
    fn position(&self, idx: usize) -> (usize, usize) {
        (idx % self.stride - 1, idx / self.stride - 1)
    }

    /// Cells above `threshold` that are local maxima, strongest first.
    /// Equal counts keep raster order.
    fn peaks(&self, threshold: u32) -> Vec<(usize, u32)> {
        let s = self.stride;
        let mut peaks = Vec::new();
        for y in 1..=self.height {
            for x in 1..=self.width {
                let idx = y * s + x;
                let v = self.cells[idx];
                if v > threshold
                    && v > self.cells[idx - 1]
                    && v >= self.cells[idx + 1]
                    && v > self.cells[idx - s]
                    && v >= self.cells[idx + s]
                {
                    peaks.push((idx, v));
                }
            }
        }
        peaks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        peaks
    }
}

/// Run the circle search over a smoothed grayscale image.
///
/// Candidates come back in acceptance order (strongest center first); no two
/// centers are closer than `hough_min_dist`.
pub fn find_circles(smoothed: &GrayImage, config: &DetectorConfig) -> Vec<Candidate> {
    let mut params = SearchParams::from_config(config);
    let (w, h) = smoothed.dimensions();
    // no circle of interest is wider than the image
    params.max_radius = params.max_radius.min(w.max(h));
    if w < 3 || h < 3 || params.max_radius < params.min_radius {
        return Vec::new();
    }

    let edges = preprocessing::detect_edges(smoothed, params.canny_low, params.canny_high);
    let gx = horizontal_sobel(smoothed);
    let gy = vertical_sobel(smoothed);

    let acc_w = (w as f32 / params.dp).ceil() as usize;
    let acc_h = (h as f32 / params.dp).ceil() as usize;
    let mut accum = Accumulator::new(acc_w, acc_h);
    let inv_dp = 1.0 / params.dp;
    let mut edge_points = Vec::new();

    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }
        let vx = gx.get_pixel(x, y)[0] as f32;
        let vy = gy.get_pixel(x, y)[0] as f32;
        let mag = (vx * vx + vy * vy).sqrt();
        if mag < 1.0 {
            continue;
        }

        let xf = x as f32;
        let yf = y as f32;
        edge_points.push((xf, yf));
        let ux = vx / mag;
        let uy = vy / mag;

        for sign in [1.0f32, -1.0] {
            let mut last = usize::MAX;
            for r in params.min_radius..=params.max_radius {
                let r = r as f32 * sign;
                let cx = (xf + ux * r) * inv_dp;
                let cy = (yf + uy * r) * inv_dp;
                // The ray never re-enters the image once it has left it
                let Some(idx) = accum.index(cx, cy) else {
                    break;
                };
                if idx != last {
                    accum.cells[idx] += 1;
                    last = idx;
                }
            }
        }
    }

    let peaks = accum.peaks(params.vote_threshold);
    log::debug!(
        "circle search: {} edge pixels, {} center peaks above {} votes",
        edge_points.len(),
        peaks.len(),
        params.vote_threshold
    );

    let mut accepted: Vec<Candidate> = Vec::new();
    let mut histogram = vec![0u32; params.max_radius as usize + 2];

    for (idx, votes) in peaks {
        let (ax, ay) = accum.position(idx);
        let cx = ax as f32 * params.dp;
        let cy = ay as f32 * params.dp;

        let too_close = accepted.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            dx * dx + dy * dy < params.min_dist_sq
        });
        if too_close {
            continue;
        }

        let estimate = estimate_radius(cx, cy, &edge_points, &params, &mut histogram);
        if let Some((radius, support)) = estimate {
            accepted.push(Candidate {
                x: cx,
                y: cy,
                radius,
                votes,
                support,
            });
        }
    }

    accepted
}

/// Pick the radius whose ring of edge pixels is densest.
///
/// Support at radius `r` counts edge pixels at rounded distance `r - 1..=r + 1`
/// and is compared per unit radius, since a ring's length grows with `r`.
/// Returns `None` when no radius reaches the vote threshold.
fn estimate_radius(
    cx: f32,
    cy: f32,
    edge_points: &[(f32, f32)],
    params: &SearchParams,
    histogram: &mut [u32],
) -> Option<(f32, u32)> {
    histogram.fill(0);
    let lo = params.min_radius.saturating_sub(1) as f32;
    let hi = (params.max_radius + 1) as f32;
    let (lo_sq, hi_sq) = (lo * lo, hi * hi);

    for &(x, y) in edge_points {
        let dx = x - cx;
        let dy = y - cy;
        let d_sq = dx * dx + dy * dy;
        if d_sq < lo_sq || d_sq > hi_sq {
            continue;
        }
        let bin = d_sq.sqrt().round() as usize;
        if bin < histogram.len() {
            histogram[bin] += 1;
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for r in params.min_radius..=params.max_radius {
        let r_idx = r as usize;
        let support = histogram[r_idx - 1] + histogram[r_idx] + histogram[r_idx + 1];
        if support <= params.vote_threshold {
            continue;
        }
        // support / r > best_support / best_r, without division
        let better = match best {
            None => true,
            Some((best_r, best_support)) => {
                support as u64 * best_r as u64 > best_support as u64 * r as u64
            }
        };
        if better {
            best = Some((r, support));
        }
    }

    best.map(|(r, support)| (r as f32, support))
}

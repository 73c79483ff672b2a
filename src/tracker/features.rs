//! Shi-Tomasi corner detection.
//!
//! Finds the strongest corners in a float intensity grid, optionally
//! restricted to a rectangular mask. Corner strength is the minimum
//! eigenvalue of the 2x2 structure tensor built from Sobel gradients;
//! candidates below `quality_level` times the strongest response are
//! rejected, and accepted corners are kept at least `min_distance` pixels
//! apart, strongest first.

use ndarray::Array2;

use crate::tracker::rect::{Point, Rect};

/// Shi-Tomasi corner detector bounded by a count cap, a relative quality
/// threshold and a minimum inter-corner spacing.
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    /// Maximum number of corners returned.
    pub max_features: usize,
    /// Minimum accepted corner strength, relative to the strongest response.
    pub quality_level: f32,
    /// Minimum pixel spacing enforced between returned corners.
    pub min_distance: f32,
}

impl FeatureDetector {
    pub fn new(max_features: usize, quality_level: f32, min_distance: f32) -> Self {
        Self {
            max_features,
            quality_level,
            min_distance,
        }
    }

    /// Detect corners in `image`, restricted to `mask` when given.
    ///
    /// Returns at most `max_features` points sorted by strength descending.
    /// A featureless (e.g. uniform) image yields an empty vector.
    pub fn detect(&self, image: &Array2<f32>, mask: Option<&Rect>) -> Vec<Point> {
        let response = min_eigenvalue_response(image);
        let (h, w) = response.dim();

        // Strongest masked response sets the absolute quality threshold.
        let mut max_response = 0.0f32;
        for y in 0..h {
            for x in 0..w {
                if in_mask(mask, x, y) {
                    max_response = max_response.max(response[[y, x]]);
                }
            }
        }
        if max_response <= 0.0 {
            return Vec::new();
        }
        let threshold = self.quality_level * max_response;

        let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let r = response[[y, x]];
                if r >= threshold && in_mask(mask, x, y) {
                    candidates.push((r, x, y));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        // Greedy spacing suppression, strongest first.
        let min_dist_sq = self.min_distance * self.min_distance;
        let mut corners: Vec<Point> = Vec::new();
        for (_, x, y) in candidates {
            let p = Point::new(x as f32, y as f32);
            let too_close = corners.iter().any(|c| {
                let dx = c.x - p.x;
                let dy = c.y - p.y;
                dx * dx + dy * dy < min_dist_sq
            });
            if !too_close {
                corners.push(p);
                if corners.len() >= self.max_features {
                    break;
                }
            }
        }
        corners
    }
}

#[inline]
fn in_mask(mask: Option<&Rect>, x: usize, y: usize) -> bool {
    match mask {
        Some(rect) => rect.contains(&Point::new(x as f32, y as f32)),
        None => true,
    }
}

/// Minimum eigenvalue of the gradient structure tensor at every pixel.
///
/// Gradients are 3x3 Sobel with replicated borders; the tensor is summed
/// over a 3x3 block. The smaller eigenvalue of
/// `[[Sxx, Sxy], [Sxy, Syy]]` is large only where the intensity varies in
/// two directions, i.e. at a corner.
fn min_eigenvalue_response(image: &Array2<f32>) -> Array2<f32> {
    let (h, w) = image.dim();
    let (ix, iy) = sobel_gradients(image);

    let mut response = Array2::zeros((h, w));
    for y in 0..h {
        for x in 0..w {
            let mut sxx = 0.0f32;
            let mut syy = 0.0f32;
            let mut sxy = 0.0f32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let sx = clamp_index(x as i64 + dx, w);
                    let sy = clamp_index(y as i64 + dy, h);
                    let gx = ix[[sy, sx]];
                    let gy = iy[[sy, sx]];
                    sxx += gx * gx;
                    syy += gy * gy;
                    sxy += gx * gy;
                }
            }
            let half_trace = (sxx + syy) * 0.5;
            let det_term = ((sxx - syy) * 0.5).hypot(sxy);
            response[[y, x]] = half_trace - det_term;
        }
    }
    response
}

/// 3x3 Sobel x/y gradients with replicated borders.
pub(crate) fn sobel_gradients(image: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = image.dim();
    let mut ix = Array2::zeros((h, w));
    let mut iy = Array2::zeros((h, w));

    let at = |x: i64, y: i64| image[[clamp_index(y, h), clamp_index(x, w)]];

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = (at(x + 1, y - 1) - at(x - 1, y - 1))
                + 2.0 * (at(x + 1, y) - at(x - 1, y))
                + (at(x + 1, y + 1) - at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) - at(x - 1, y - 1))
                + 2.0 * (at(x, y + 1) - at(x, y - 1))
                + (at(x + 1, y + 1) - at(x + 1, y - 1));
            ix[[y as usize, x as usize]] = gx;
            iy[[y as usize, x as usize]] = gy;
        }
    }
    (ix, iy)
}

#[inline]
pub(crate) fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

//! Sparse feature tracker based on iterative Lucas-Kanade optical flow.
//!
//! Shi-Tomasi corners are detected once inside the seed ROI. Every frame,
//! each point is advanced independently: the local brightness-constancy
//! system `[Ix Iy] * v = -It` over a small window is solved for the
//! displacement `v` via an SVD pseudo-inverse, repeated until the position
//! stops changing or the iteration cap is hit. The reported ROI is the tight
//! bounding box of the current points.

use ndarray::{Array2, s};

use crate::tracker::contract::Tracker;
use crate::tracker::features::{FeatureDetector, clamp_index};
use crate::tracker::frame::Frame;
use crate::tracker::rect::{Point, Rect};

/// Configuration for the Lucas-Kanade tracker, fixed at construction.
#[derive(Debug, Clone)]
pub struct LucasKanadeParams {
    /// Maximum number of features detected at initialization.
    pub n_features: usize,
    /// Minimum relative corner strength accepted by the detector.
    pub quality_level: f32,
    /// Minimum pixel spacing enforced between detected features.
    pub min_distance: f32,
    /// Weight window pixels by a centered Gaussian in the least-squares fit.
    pub use_gauss: bool,
    /// Spread of the Gaussian weighting kernel.
    pub gauss_sigma: f32,
    /// Cap on refinement iterations per feature per frame.
    pub max_iterations: usize,
    /// Odd pixel width of the local window.
    pub window_size: usize,
    /// Per-axis displacement threshold that stops the refinement early.
    pub iteration_eps: f32,
}

impl Default for LucasKanadeParams {
    fn default() -> Self {
        Self {
            n_features: 30,
            quality_level: 0.15,
            min_distance: 5.0,
            use_gauss: false,
            gauss_sigma: 2.0,
            max_iterations: 40,
            window_size: 21,
            iteration_eps: 0.05,
        }
    }
}

/// Lucas-Kanade feature tracker.
///
/// Lazily initialized: the first `track` call seeds the feature set from the
/// given ROI; if no corners are found the tracker silently stays
/// uninitialized and retries on the next call. Once tracking, the previous
/// grayscale frame and the feature positions are carried forward by mutation
/// every frame.
pub struct LucasKanadeTracker {
    params: LucasKanadeParams,
    initialized: bool,
    features: Vec<Point>,
    prev_image: Array2<f32>,
    n_initial_points: usize,
}

impl LucasKanadeTracker {
    pub fn new(params: LucasKanadeParams) -> Self {
        Self {
            params,
            initialized: false,
            features: Vec::new(),
            prev_image: Array2::zeros((0, 0)),
            n_initial_points: 0,
        }
    }

    /// Current feature positions, for rendering diagnostics. Read-only:
    /// display passes must not mutate tracker state.
    pub fn features(&self) -> &[Point] {
        &self.features
    }

    fn initialize(&mut self, frame: &Frame, roi: &Rect) {
        let gray = frame.to_gray();

        let mask = if roi.is_empty() { None } else { Some(roi) };
        let detector = FeatureDetector::new(
            self.params.n_features,
            self.params.quality_level,
            self.params.min_distance,
        );
        let corners = detector.detect(&gray, mask);

        // The previous-frame buffer is stored even when detection fails;
        // only the initialized flag gates the next call.
        self.prev_image = gray;

        if corners.is_empty() {
            log::debug!("no corners found in seed region, staying uninitialized");
            return;
        }
        log::debug!("initialized with {} features", corners.len());
        self.n_initial_points = corners.len();
        self.features = corners;
        self.initialized = true;
    }

    /// Tight axis-aligned bounding box of the current features.
    ///
    /// Deliberately not clamped to frame bounds, unlike the Meanshift ROI:
    /// features that drift past the frame edge produce a box extending
    /// outside it. The asymmetry is part of the tracker's contract.
    fn bounding_roi(&self) -> Rect {
        let (h, w) = self.prev_image.dim();
        let mut min_x = w as f32;
        let mut min_y = h as f32;
        let mut max_x = 0.0f32;
        let mut max_y = 0.0f32;
        for feature in &self.features {
            min_x = min_x.min(feature.x);
            min_y = min_y.min(feature.y);
            max_x = max_x.max(feature.x);
            max_y = max_y.max(feature.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

impl Tracker for LucasKanadeTracker {
    fn track(&mut self, frame: &Frame, roi: &mut Rect) {
        if !self.initialized {
            self.initialize(frame, roi);
            return;
        }

        let current = frame.to_gray();
        let (frame_h, frame_w) = self.prev_image.dim();
        let w = (self.params.window_size / 2) as f32;

        // Spatial derivatives of the whole previous frame.
        let (deriv_x, deriv_y) = scharr_derivatives(&self.prev_image);

        for feature in &mut self.features {
            let window = build_window(feature, w, frame_w, frame_h);

            // A window clipped below 2 pixels in either dimension skips the
            // feature for this frame. The per-iteration check below uses a
            // looser < 1 threshold; the mismatch is intentional.
            if window.width() < 2 || window.height() < 2 {
                continue;
            }

            // These stay fixed for the whole refinement; only the
            // current-frame window is rebuilt per iteration.
            let dx_win = window.extract(&deriv_x);
            let dy_win = window.extract(&deriv_y);
            let prev_win = window.extract(&self.prev_image);

            let mut prev_x = 0.0f32;
            let mut prev_y = 0.0f32;
            for _ in 0..self.params.max_iterations {
                let window = build_window(feature, w, frame_w, frame_h);
                if window.width() < 1 || window.height() < 1 {
                    continue;
                }

                let curr_win = window.extract(&current);
                let curr_win = resize_bilinear(&curr_win, prev_win.dim());

                // Temporal derivative by elementwise difference; the resize
                // above aligns shapes, not true pixel correspondence.
                let mut a1: Vec<f32> = dx_win.iter().copied().collect();
                let mut a2: Vec<f32> = dy_win.iter().copied().collect();
                let mut b: Vec<f32> = curr_win
                    .iter()
                    .zip(prev_win.iter())
                    .map(|(c, p)| -(c - p))
                    .collect();

                if self.params.use_gauss {
                    let weights = gaussian_weights(
                        dx_win.dim().1,
                        self.params.gauss_sigma,
                        prev_win.dim(),
                    );
                    for ((x, y), g) in a1.iter_mut().zip(a2.iter_mut()).zip(&weights) {
                        *x *= g;
                        *y *= g;
                    }
                    for (v, g) in b.iter_mut().zip(&weights) {
                        *v *= g;
                    }
                }

                let (dx, dy) = solve_displacement(&a1, &a2, &b);
                feature.x += dx;
                feature.y += dy;

                // Converged once the position stops moving between
                // iterations.
                if (prev_x - feature.x).abs() < self.params.iteration_eps
                    && (prev_y - feature.y).abs() < self.params.iteration_eps
                {
                    break;
                }
                prev_x = feature.x;
                prev_y = feature.y;
            }
        }

        self.prev_image = current;
        *roi = self.bounding_roi();
    }

    fn reset(&mut self) {
        self.initialized = false;
    }

    fn evaluate(&self, _roi: &Rect, ground_truth_roi: &Rect) -> f32 {
        let inside = self
            .features
            .iter()
            .filter(|p| ground_truth_roi.contains(p))
            .count();
        inside as f32 / self.n_initial_points as f32
    }

    fn classname(&self) -> &'static str {
        "LucasKanadeTracker"
    }
}

/// Square window around a feature, clipped to `[0, frame_w] x [0, frame_h]`.
///
/// Edges are kept signed so that a feature far outside the frame yields a
/// negative width/height, which the degeneracy checks treat as too small.
#[derive(Debug, Clone, Copy)]
struct Window {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl Window {
    #[inline]
    fn width(&self) -> i64 {
        self.right - self.left
    }

    #[inline]
    fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Copy out the sub-window. Caller must have checked that both
    /// dimensions are positive.
    fn extract(&self, image: &Array2<f32>) -> Array2<f32> {
        image
            .slice(s![
                self.top as usize..self.bottom as usize,
                self.left as usize..self.right as usize
            ])
            .to_owned()
    }
}

fn build_window(feature: &Point, w: f32, frame_w: usize, frame_h: usize) -> Window {
    let left = (feature.x - w).max(0.0).floor() as i64;
    let top = (feature.y - w).max(0.0).floor() as i64;
    let right = (feature.x + w).min(frame_w as f32).ceil() as i64;
    let bottom = (feature.y + w).min(frame_h as f32).ceil() as i64;
    Window {
        left,
        top,
        right,
        bottom,
    }
}

/// Scharr x/y derivatives with replicated borders, scaled by 0.25.
fn scharr_derivatives(image: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = image.dim();
    let mut dx = Array2::zeros((h, w));
    let mut dy = Array2::zeros((h, w));

    let at = |x: i64, y: i64| image[[clamp_index(y, h), clamp_index(x, w)]];

    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let gx = 3.0 * (at(x + 1, y - 1) - at(x - 1, y - 1))
                + 10.0 * (at(x + 1, y) - at(x - 1, y))
                + 3.0 * (at(x + 1, y + 1) - at(x - 1, y + 1));
            let gy = 3.0 * (at(x - 1, y + 1) - at(x - 1, y - 1))
                + 10.0 * (at(x, y + 1) - at(x, y - 1))
                + 3.0 * (at(x + 1, y + 1) - at(x + 1, y - 1));
            dx[[y as usize, x as usize]] = gx * 0.25;
            dy[[y as usize, x as usize]] = gy * 0.25;
        }
    }
    (dx, dy)
}

/// Bilinear resize to the given `(height, width)`.
fn resize_bilinear(src: &Array2<f32>, dst_dim: (usize, usize)) -> Array2<f32> {
    let (sh, sw) = src.dim();
    let (dh, dw) = dst_dim;
    if (sh, sw) == (dh, dw) {
        return src.clone();
    }

    let scale_y = sh as f32 / dh as f32;
    let scale_x = sw as f32 / dw as f32;
    let mut dst = Array2::zeros((dh, dw));
    for y in 0..dh {
        let sy = ((y as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let y0 = (sy.floor() as usize).min(sh - 1);
        let y1 = (y0 + 1).min(sh - 1);
        let fy = sy - y0 as f32;
        for x in 0..dw {
            let sx = ((x as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let x0 = (sx.floor() as usize).min(sw - 1);
            let x1 = (x0 + 1).min(sw - 1);
            let fx = sx - x0 as f32;

            let top = src[[y0, x0]] * (1.0 - fx) + src[[y0, x1]] * fx;
            let bottom = src[[y1, x0]] * (1.0 - fx) + src[[y1, x1]] * fx;
            dst[[y, x]] = top * (1.0 - fy) + bottom * fy;
        }
    }
    dst
}

/// Normalized 1-D Gaussian kernel of the given length.
fn gaussian_kernel_1d(len: usize, sigma: f32) -> Vec<f32> {
    let center = (len as f32 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..len)
        .map(|i| (-(i as f32 - center).powi(2) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Center-weighting mask for the least-squares fit: the outer product of a
/// 1-D Gaussian of length `kernel_len` with itself, resized to the window's
/// pixel dimensions and flattened row-major to match the column vectors.
fn gaussian_weights(kernel_len: usize, sigma: f32, win_dim: (usize, usize)) -> Vec<f32> {
    let k = gaussian_kernel_1d(kernel_len, sigma);
    let mut grid = Array2::zeros((kernel_len, kernel_len));
    for y in 0..kernel_len {
        for x in 0..kernel_len {
            grid[[y, x]] = k[y] * k[x];
        }
    }
    resize_bilinear(&grid, win_dim).iter().copied().collect()
}

/// Solve the over-determined system `[a1 a2] * v = b` for the 2-vector `v`
/// with an SVD pseudo-inverse. Near-singular systems (e.g. a window on a
/// flat or purely edge-like patch) resolve to a small or zero displacement
/// instead of failing; there is no error path in the middle of a track step.
fn solve_displacement(a1: &[f32], a2: &[f32], b: &[f32]) -> (f32, f32) {
    let n = b.len();
    let mut a = nalgebra::DMatrix::<f32>::zeros(n, 2);
    for i in 0..n {
        a[(i, 0)] = a1[i];
        a[(i, 1)] = a2[i];
    }
    let rhs = nalgebra::DVector::<f32>::from_column_slice(b);

    let svd = a.svd(true, true);
    match svd.solve(&rhs, 1.0e-6) {
        Ok(v) => (v[(0, 0)], v[(1, 0)]),
        Err(_) => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark frame with a bright square at (x, y).
    fn square_frame(size: usize, x: usize, y: usize, sq: usize) -> Frame {
        let mut frame = Frame::new(size, size);
        for py in 0..size {
            for px in 0..size {
                frame.set_pixel(px, py, [20, 20, 20]);
            }
        }
        for py in y..y + sq {
            for px in x..x + sq {
                frame.set_pixel(px, py, [220, 220, 220]);
            }
        }
        frame
    }

    #[test]
    fn test_uniform_frame_stays_uninitialized() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let frame = Frame::new(80, 80);
        let mut roi = Rect::new(10.0, 10.0, 40.0, 40.0);
        tracker.track(&frame, &mut roi);
        assert!(!tracker.initialized);
        assert!(tracker.features().is_empty());
        // Seed ROI left untouched.
        assert_eq!(roi.x, 10.0);
        assert_eq!(roi.width, 40.0);
    }

    #[test]
    fn test_retries_initialization_next_call() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let mut roi = Rect::new(30.0, 30.0, 40.0, 40.0);
        tracker.track(&Frame::new(100, 100), &mut roi);
        assert!(!tracker.initialized);
        tracker.track(&square_frame(100, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);
    }

    #[test]
    fn test_static_scene_leaves_features_in_place() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let frame = square_frame(100, 40, 40, 20);
        let mut roi = Rect::new(30.0, 30.0, 40.0, 40.0);

        tracker.track(&frame, &mut roi);
        assert!(tracker.initialized);
        let before = tracker.features().to_vec();

        tracker.track(&frame, &mut roi);
        for (a, b) in before.iter().zip(tracker.features()) {
            assert!((a.x - b.x).abs() < 0.5, "feature drifted on static scene");
            assert!((a.y - b.y).abs() < 0.5, "feature drifted on static scene");
        }
    }

    #[test]
    fn test_tracks_translating_square() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let mut roi = Rect::new(35.0, 35.0, 30.0, 30.0);

        tracker.track(&square_frame(120, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);

        // Translate by (2, 1) per frame.
        for step in 1..=5usize {
            let frame = square_frame(120, 40 + 2 * step, 40 + step, 20);
            tracker.track(&frame, &mut roi);

            let (cx, cy) = roi.center();
            let gt_cx = (40 + 2 * step) as f32 + 10.0;
            let gt_cy = (40 + step) as f32 + 10.0;
            assert!(
                (cx - gt_cx).abs() < 6.0 && (cy - gt_cy).abs() < 6.0,
                "step {}: roi center ({}, {}) vs ground truth ({}, {})",
                step,
                cx,
                cy,
                gt_cx,
                gt_cy
            );
        }
    }

    #[test]
    fn test_gaussian_weighting_still_tracks() {
        let params = LucasKanadeParams {
            use_gauss: true,
            ..Default::default()
        };
        let mut tracker = LucasKanadeTracker::new(params);
        let mut roi = Rect::new(35.0, 35.0, 30.0, 30.0);

        tracker.track(&square_frame(120, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);
        tracker.track(&square_frame(120, 42, 41, 20), &mut roi);

        let (cx, cy) = roi.center();
        assert!((cx - 52.0).abs() < 6.0 && (cy - 51.0).abs() < 6.0);
    }

    #[test]
    fn test_evaluate_all_features_inside() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let mut roi = Rect::new(30.0, 30.0, 40.0, 40.0);
        tracker.track(&square_frame(100, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);

        let covering = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!((tracker.evaluate(&roi, &covering) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_no_features_inside() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let mut roi = Rect::new(30.0, 30.0, 40.0, 40.0);
        tracker.track(&square_frame(100, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);

        let elsewhere = Rect::new(90.0, 90.0, 5.0, 5.0);
        assert_eq!(tracker.evaluate(&roi, &elsewhere), 0.0);
    }

    #[test]
    fn test_reset_discards_state() {
        let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        let mut roi = Rect::new(30.0, 30.0, 40.0, 40.0);
        tracker.track(&square_frame(100, 40, 40, 20), &mut roi);
        assert!(tracker.initialized);

        tracker.reset();
        assert!(!tracker.initialized);

        // Re-seed on a square in a different corner; the new feature set
        // must belong to the new region, not the old one.
        let mut roi2 = Rect::new(5.0, 5.0, 30.0, 30.0);
        tracker.track(&square_frame(100, 10, 10, 15), &mut roi2);
        assert!(tracker.initialized);
        for p in tracker.features() {
            assert!(p.x < 35.0 && p.y < 35.0);
        }
    }

    #[test]
    fn test_window_clipped_to_frame_bounds() {
        let p = Point::new(3.0, 97.0);
        let win = build_window(&p, 10.0, 100, 100);
        assert!(win.left >= 0 && win.top >= 0);
        assert!(win.right <= 100 && win.bottom <= 100);
    }

    #[test]
    fn test_window_outside_frame_is_degenerate() {
        let p = Point::new(-40.0, 50.0);
        let win = build_window(&p, 10.0, 100, 100);
        assert!(win.width() < 2);
    }

    #[test]
    fn test_solve_recovers_known_shift() {
        // 1-D ramp: prev = 3x, curr shifted by +2 => It = -6, Ix = 3.
        let a1 = vec![3.0f32; 25];
        let a2 = vec![0.0f32; 25];
        let b = vec![6.0f32; 25];
        let (dx, dy) = solve_displacement(&a1, &a2, &b);
        assert!((dx - 2.0).abs() < 1e-4);
        assert!(dy.abs() < 1e-4);
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let k = gaussian_kernel_1d(21, 2.0);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Symmetric and peaked at the center.
        assert!((k[0] - k[20]).abs() < 1e-6);
        assert!(k[10] > k[0]);
    }

    #[test]
    fn test_classname() {
        let tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
        assert_eq!(tracker.classname(), "LucasKanadeTracker");
    }
}

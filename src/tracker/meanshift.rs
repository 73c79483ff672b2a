//! Dense color-density tracker based on Meanshift mode seeking.
//!
//! A joint 3-D color histogram of the seed ROI is computed once and never
//! updated. Every frame, the whole frame is back-projected through that
//! histogram into a probability-like score map, and the ROI is shifted
//! toward the centroid of the scores under it until the shift magnitude
//! drops below a threshold or the iteration cap is hit.

use ndarray::{Array2, Array3};

use crate::tracker::contract::Tracker;
use crate::tracker::frame::Frame;
use crate::tracker::rect::Rect;

/// Shift magnitude below which mode seeking stops.
const CONVERGENCE_EPS: f32 = 0.2;

/// Configuration for the Meanshift tracker, fixed at construction.
#[derive(Debug, Clone)]
pub struct MeanshiftParams {
    /// Cap on mode-seeking iterations per frame.
    pub max_iterations: usize,
    /// Histogram bins per color channel.
    pub n_bins: usize,
}

impl Default for MeanshiftParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            n_bins: 32,
        }
    }
}

/// Meanshift region tracker.
///
/// Unlike the Lucas-Kanade variant, the ROI is clamped to frame bounds on
/// every call, before anything else, so the reported region always lies
/// fully inside the frame.
pub struct MeanshiftTracker {
    params: MeanshiftParams,
    initialized: bool,
    target_hist: Array3<f32>,
}

impl MeanshiftTracker {
    pub fn new(params: MeanshiftParams) -> Self {
        let n_bins = params.n_bins;
        Self {
            params,
            initialized: false,
            target_hist: Array3::zeros((n_bins, n_bins, n_bins)),
        }
    }

    fn initialize(&mut self, frame: &Frame, roi: &Rect) {
        self.target_hist = self.histogram(frame, roi);
        self.initialized = true;
        log::debug!(
            "initialized target histogram from roi ({}, {}, {}x{})",
            roi.x,
            roi.y,
            roi.width,
            roi.height
        );
    }

    /// Joint 3-D color histogram of the pixels inside `roi`, min-max
    /// normalized to [0, 255].
    fn histogram(&self, frame: &Frame, roi: &Rect) -> Array3<f32> {
        let n_bins = self.params.n_bins;
        let (x0, y0, x1, y1) = integer_window(roi, frame.width(), frame.height());

        let mut hist = Array3::<f32>::zeros((n_bins, n_bins, n_bins));
        for y in y0..y1 {
            for x in x0..x1 {
                let [r, g, b] = frame.pixel(x, y);
                hist[[bin_index(r, n_bins), bin_index(g, n_bins), bin_index(b, n_bins)]] += 1.0;
            }
        }

        // NORM_MINMAX-style rescale to [0, 255].
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in hist.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        if max > min {
            let scale = 255.0 / (max - min);
            hist.mapv_inplace(|v| (v - min) * scale);
        }
        hist
    }

    /// Score every frame pixel by its color's value in the target histogram.
    fn back_project(&self, frame: &Frame) -> Array2<f32> {
        let n_bins = self.params.n_bins;
        let (h, w) = (frame.height(), frame.width());
        let mut back = Array2::zeros((h, w));
        for y in 0..h {
            for x in 0..w {
                let [r, g, b] = frame.pixel(x, y);
                back[[y, x]] = self.target_hist[[
                    bin_index(r, n_bins),
                    bin_index(g, n_bins),
                    bin_index(b, n_bins),
                ]];
            }
        }
        back
    }
}

impl Tracker for MeanshiftTracker {
    fn track(&mut self, frame: &Frame, roi: &mut Rect) {
        // Always clamp first, even on the initializing call.
        roi.clamp_to(frame.width(), frame.height());

        if !self.initialized {
            self.initialize(frame, roi);
            // No early return: the first call proceeds straight to mode
            // seeking with the freshly built histogram.
        }

        let back = self.back_project(frame);

        for _ in 0..self.params.max_iterations {
            let (x0, y0, x1, y1) = integer_window(roi, frame.width(), frame.height());

            // Zeroth and first raw moments of the scores under the ROI.
            let mut m00 = 0.0f64;
            let mut m10 = 0.0f64;
            let mut m01 = 0.0f64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let v = back[[y, x]] as f64;
                    m00 += v;
                    m10 += (x - x0) as f64 * v;
                    m01 += (y - y0) as f64 * v;
                }
            }

            // Centroid in window-local coordinates. A zero-mass window
            // divides to NaN; the division is deliberately unguarded.
            let centroid_x = (m10 / m00) as f32;
            let centroid_y = (m01 / m00) as f32;

            let dx = centroid_x - roi.width * 0.5;
            let dy = centroid_y - roi.height * 0.5;

            roi.x += dx;
            roi.y += dy;
            roi.clamp_to(frame.width(), frame.height());

            if dx.hypot(dy) < CONVERGENCE_EPS {
                break;
            }
        }
    }

    fn reset(&mut self) {
        self.initialized = false;
    }

    /// Intersection over Union of the two rectangles.
    ///
    /// NaN when the union area is zero (both rectangles degenerate); the
    /// caller guards, not this function.
    fn evaluate(&self, roi: &Rect, ground_truth_roi: &Rect) -> f32 {
        roi.iou(ground_truth_roi)
    }

    fn classname(&self) -> &'static str {
        "MeanshiftTracker"
    }
}

/// Round the float ROI to an integer pixel window clipped to the frame.
fn integer_window(roi: &Rect, frame_w: usize, frame_h: usize) -> (usize, usize, usize, usize) {
    let x0 = (roi.x.round().max(0.0) as usize).min(frame_w);
    let y0 = (roi.y.round().max(0.0) as usize).min(frame_h);
    let x1 = ((roi.x + roi.width).round().max(0.0) as usize).min(frame_w);
    let y1 = ((roi.y + roi.height).round().max(0.0) as usize).min(frame_h);
    (x0, y0, x1.max(x0), y1.max(y0))
}

#[inline]
fn bin_index(value: u8, n_bins: usize) -> usize {
    value as usize * n_bins / 256
}

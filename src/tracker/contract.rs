use crate::tracker::frame::Frame;
use crate::tracker::rect::Rect;

/// Capability contract shared by both tracking variants.
///
/// A driver owns exactly one active tracker (typically behind
/// `Box<dyn Tracker>`), feeds it `(frame, roi)` every cycle, and receives the
/// updated ROI by mutation. Calls are strictly frame-sequential: the state
/// carried from frame N-1 is the sole input besides the current pixels.
pub trait Tracker {
    /// Advance one frame. On the first call with a non-degenerate seed ROI
    /// the tracker initializes its internal state; afterwards it overwrites
    /// `roi` with the new estimate. An empty seed falls back to the whole
    /// frame. Initialization may silently fail (e.g. no corners found), in
    /// which case the tracker stays uninitialized and retries next call.
    fn track(&mut self, frame: &Frame, roi: &mut Rect);

    /// Force the tracker back to the uninitialized state. Configured
    /// parameters are kept; only the per-stream state is discarded.
    fn reset(&mut self);

    /// Score a predicted region against ground truth. Pure: no state is
    /// mutated. The result may be NaN for degenerate inputs (see the
    /// individual trackers); callers must guard against that.
    fn evaluate(&self, roi: &Rect, ground_truth_roi: &Rect) -> f32;

    /// Stable identifier for logging and score files. Never empty.
    fn classname(&self) -> &'static str;
}

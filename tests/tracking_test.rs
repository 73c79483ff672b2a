use roitrack_rs::{
    Frame, LucasKanadeParams, LucasKanadeTracker, MeanshiftParams, MeanshiftTracker, Rect, Tracker,
};

/// Dark frame with a bright square at (x, y) — the canonical scenario:
/// high-contrast corners for the Lucas-Kanade tracker, a distinct color
/// distribution for the Meanshift tracker.
fn square_frame(size: usize, x: usize, y: usize, sq: usize) -> Frame {
    let mut frame = Frame::new(size, size);
    for py in 0..size {
        for px in 0..size {
            frame.set_pixel(px, py, [15, 15, 15]);
        }
    }
    for py in y..y + sq {
        for px in x..x + sq {
            frame.set_pixel(px, py, [230, 60, 60]);
        }
    }
    frame
}

fn assert_center_near(roi: &Rect, cx: f32, cy: f32, tol: f32, label: &str) {
    let (rx, ry) = roi.center();
    assert!(
        (rx - cx).abs() < tol && (ry - cy).abs() < tol,
        "{}: roi center ({}, {}) vs expected ({}, {})",
        label,
        rx,
        ry,
        cx,
        cy
    );
}

/// Both trackers follow a square translated by a fixed vector each frame.
#[test]
fn test_both_trackers_follow_translating_square() {
    let trackers: Vec<Box<dyn Tracker>> = vec![
        Box::new(LucasKanadeTracker::new(LucasKanadeParams::default())),
        Box::new(MeanshiftTracker::new(MeanshiftParams::default())),
    ];

    for mut tracker in trackers {
        let name = tracker.classname();
        let mut roi = Rect::new(38.0, 38.0, 24.0, 24.0);

        // Seed frame. The LK variant consumes this call for initialization;
        // the Meanshift variant initializes and tracks in one go.
        tracker.track(&square_frame(140, 40, 40, 20), &mut roi);

        for step in 1..=6usize {
            let gt_x = 40 + 2 * step;
            let gt_y = 40 + step;
            tracker.track(&square_frame(140, gt_x, gt_y, 20), &mut roi);
            assert_center_near(
                &roi,
                gt_x as f32 + 10.0,
                gt_y as f32 + 10.0,
                6.0,
                name,
            );
        }

        // On the final frame the predicted region should overlap ground
        // truth well and score accordingly.
        let gt = Rect::new(52.0, 46.0, 20.0, 20.0);
        let score = tracker.evaluate(&roi, &gt);
        assert!(
            score > 0.3,
            "{}: expected a decent score against ground truth, got {}",
            name,
            score
        );
    }
}

/// A featureless frame must not initialize the LK tracker, must not fail,
/// and must leave the ROI untouched.
#[test]
fn test_featureless_frame_leaves_lk_uninitialized() {
    let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
    let uniform = Frame::new(100, 100);
    let mut roi = Rect::new(20.0, 20.0, 40.0, 40.0);

    tracker.track(&uniform, &mut roi);
    tracker.track(&uniform, &mut roi);

    assert!(tracker.features().is_empty());
    assert_eq!(roi.x, 20.0);
    assert_eq!(roi.y, 20.0);
    assert_eq!(roi.width, 40.0);
    assert_eq!(roi.height, 40.0);
}

/// An empty seed ROI falls back to detecting over the whole frame.
#[test]
fn test_empty_seed_roi_uses_whole_frame() {
    let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
    let mut roi = Rect::default();
    tracker.track(&square_frame(100, 70, 70, 20), &mut roi);

    // The square sits far from the empty seed; whole-frame detection still
    // finds its corners.
    assert!(!tracker.features().is_empty());
    for p in tracker.features() {
        assert!(p.x >= 65.0 && p.y >= 65.0);
    }
}

/// Reset mid-stream, then re-seed on a different region: no state carryover.
#[test]
fn test_reset_and_reseed_discards_state() {
    let mut tracker = LucasKanadeTracker::new(LucasKanadeParams::default());
    let mut roi = Rect::new(35.0, 35.0, 30.0, 30.0);
    tracker.track(&square_frame(140, 40, 40, 20), &mut roi);
    tracker.track(&square_frame(140, 42, 41, 20), &mut roi);
    assert!(!tracker.features().is_empty());

    tracker.reset();

    // New seed around a square in the opposite corner.
    let mut roi2 = Rect::new(95.0, 95.0, 30.0, 30.0);
    tracker.track(&square_frame(140, 100, 100, 20), &mut roi2);
    for p in tracker.features() {
        assert!(
            p.x >= 90.0 && p.y >= 90.0,
            "stale feature at ({}, {}) after reset",
            p.x,
            p.y
        );
    }
}

/// The Meanshift ROI stays inside the frame for every frame of a stream,
/// even when the seed starts out of bounds.
#[test]
fn test_meanshift_roi_always_in_bounds() {
    let mut tracker = MeanshiftTracker::new(MeanshiftParams::default());
    let mut roi = Rect::new(-20.0, 130.0, 40.0, 40.0);

    for step in 0..6usize {
        let frame = square_frame(140, 10 + step, 90, 20);
        tracker.track(&frame, &mut roi);
        assert!(roi.x >= 0.0, "x out of bounds: {}", roi.x);
        assert!(roi.y >= 0.0, "y out of bounds: {}", roi.y);
        assert!(roi.x + roi.width <= 140.0);
        assert!(roi.y + roi.height <= 140.0);
    }
}

/// Switching the active variant mid-stream goes through reset, after which
/// the new tracker seeds from the current ROI.
#[test]
fn test_switching_trackers_via_reset() {
    let mut lk: Box<dyn Tracker> = Box::new(LucasKanadeTracker::new(LucasKanadeParams::default()));
    let mut roi = Rect::new(38.0, 38.0, 24.0, 24.0);
    lk.track(&square_frame(140, 40, 40, 20), &mut roi);
    lk.track(&square_frame(140, 42, 41, 20), &mut roi);

    let mut ms: Box<dyn Tracker> = Box::new(MeanshiftTracker::new(MeanshiftParams::default()));
    ms.reset();
    ms.track(&square_frame(140, 44, 42, 20), &mut roi);
    assert_center_near(&roi, 54.0, 52.0, 4.0, "MeanshiftTracker after switch");
}

//! Single-region visual tracking.
//!
//! Two interchangeable trackers estimate the motion of one rectangular
//! region of interest across a frame sequence:
//!
//! - [`LucasKanadeTracker`]: sparse feature tracking. Shi-Tomasi corners are
//!   detected once inside the seed ROI, then each point is advanced per frame
//!   by iteratively solving a local optical-flow least-squares system.
//! - [`MeanshiftTracker`]: dense color tracking. A joint color histogram of
//!   the seed ROI is back-projected onto each frame and the ROI is shifted
//!   toward the centroid of the resulting score field until convergence.
//!
//! Both implement the [`Tracker`] trait, so a driver can hold the active
//! tracker behind `Box<dyn Tracker>` and switch variants at runtime:
//!
//! ```
//! use roitrack_rs::{Frame, LucasKanadeParams, LucasKanadeTracker, Rect, Tracker};
//!
//! let mut tracker: Box<dyn Tracker> =
//!     Box::new(LucasKanadeTracker::new(LucasKanadeParams::default()));
//! let frame = Frame::new(64, 48);
//! let mut roi = Rect::new(10.0, 10.0, 20.0, 20.0);
//! tracker.track(&frame, &mut roi);
//! ```
//!
//! Trackers are single-stream and strictly frame-sequential: frame N depends
//! on state carried from frame N-1. Switching trackers mid-stream requires
//! an explicit `reset()`.

pub mod io;
pub mod tracker;

pub use tracker::{
    Frame, LucasKanadeParams, LucasKanadeTracker, MeanshiftParams, MeanshiftTracker, Point, Rect,
    Tracker,
};

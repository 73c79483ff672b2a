//! Boundary formats consumed by the tracking driver's collaborators.
//!
//! The core trackers never touch the filesystem; these parsers cover the
//! two plain-text formats a driver feeds them from: per-frame ground-truth
//! rectangles and a `key=value` run configuration. A missing or unreadable
//! file surfaces as an error here and is expected to be non-fatal upstream
//! (the feature depending on it is disabled for the run).

mod ground_truth;
mod run_config;

pub use ground_truth::{GroundTruthError, load_ground_truth, parse_rect_line};
pub use run_config::{RunConfig, RunConfigError, TrackerKind};

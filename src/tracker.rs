mod contract;
mod features;
mod frame;
mod lucas_kanade;
mod meanshift;
mod rect;

pub use contract::Tracker;
pub use features::FeatureDetector;
pub use frame::Frame;
pub use lucas_kanade::{LucasKanadeParams, LucasKanadeTracker};
pub use meanshift::{MeanshiftParams, MeanshiftTracker};
pub use rect::{Point, Rect};

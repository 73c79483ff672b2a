//! `key=value` run configuration files: one assignment per line, lines
//! starting with `#` ignored, unknown keys skipped.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read configuration file")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid value {value:?} for key {key}")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
}

/// Which tracking algorithm the driver should own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackerKind {
    #[default]
    LucasKanade,
    Meanshift,
}

impl TrackerKind {
    fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::LucasKanade),
            1 => Some(Self::Meanshift),
            _ => None,
        }
    }
}

/// Parsed run configuration.
///
/// Key names mirror the on-disk format (`videoPath=...`). An empty
/// `video_path` means "use the camera"; `use_ground_truth` and
/// `write_error_to_file` gate the scoring pass.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub video_path: String,
    pub ground_truth_file_name: String,
    pub error_file_name: String,
    pub use_ground_truth: bool,
    pub write_error_to_file: bool,
    pub tracker: TrackerKind,
}

impl RunConfig {
    /// Parse a configuration from its text content.
    pub fn parse(content: &str) -> Result<Self, RunConfigError> {
        let mut config = Self::default();
        for (i, line) in content.lines().enumerate() {
            let line_no = i + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key {
                "videoPath" => config.video_path = value.to_string(),
                "groundTruthFileName" => config.ground_truth_file_name = value.to_string(),
                "errorFileName" => config.error_file_name = value.to_string(),
                // Flag values other than "true" mean false.
                "bUseGroundTruth" => config.use_ground_truth = value == "true",
                "bWriteErrorToFile" => config.write_error_to_file = value == "true",
                "currentTracker" => {
                    config.tracker = value
                        .parse::<u32>()
                        .ok()
                        .and_then(TrackerKind::from_index)
                        .ok_or_else(|| RunConfigError::InvalidValue {
                            line: line_no,
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Load and parse a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RunConfigError> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

//! Output resolutions understood by the streaming side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Named output resolution
///
/// Maps a resolution identifier to concrete pixel dimensions. `Native` is
/// the full sensor resolution of the target camera module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Full sensor resolution
    Native,
    /// 1920x1080
    FullHd,
    /// 1280x720
    Hd,
    /// 640x480
    #[default]
    Sd,
}

impl Resolution {
    /// (height, width) in pixels
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Native => (3040, 4056),
            Resolution::FullHd => (1080, 1920),
            Resolution::Hd => (720, 1280),
            Resolution::Sd => (480, 640),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Native => "native",
            Resolution::FullHd => "full_hd",
            Resolution::Hd => "hd",
            Resolution::Sd => "sd",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Resolution {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Resolution::Native),
            "full_hd" | "1080p" => Ok(Resolution::FullHd),
            "hd" | "720p" => Ok(Resolution::Hd),
            "sd" | "480p" => Ok(Resolution::Sd),
            other => Err(PipelineError::config_validation(
                "resolution",
                format!("unknown resolution '{other}'"),
            )),
        }
    }
}

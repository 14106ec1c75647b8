use std::collections::HashSet;

use thiserror::Error;

use crate::shared::color::{self, Rgb};
use crate::shared::constants::{DEFAULT_MAX_REGION_COUNT, DEFAULT_MIN_AREA, MAX_AREA_DIVISOR};

use super::hsv_range::{HsvChannel, HsvRange};
use super::region_selector::SelectionThresholds;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("class '{class}': {channel} min {min} exceeds max {max}")]
    InvertedBound {
        class: String,
        channel: HsvChannel,
        min: u8,
        max: u8,
    },
    #[error("class '{class}': hue bound {value} is outside 0-180")]
    HueOutOfRange { class: String, value: u8 },
    #[error("minArea ({min_area}) must be smaller than maxArea ({max_area})")]
    EmptyAreaBand { min_area: u64, max_area: u64 },
    #[error("maxRegionCount must be at least 1")]
    ZeroRegionCeiling,
    #[error("color class names must not be empty")]
    UnnamedClass,
    #[error("duplicate color class '{0}'")]
    DuplicateClass(String),
}

/// One tracked color: its HSV window and the color its marker is drawn in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorClass {
    pub name: String,
    pub range: HsvRange,
    pub marker_color: Rgb,
}

impl ColorClass {
    pub fn new(name: impl Into<String>, range: HsvRange, marker_color: Rgb) -> Self {
        Self {
            name: name.into(),
            range,
            marker_color,
        }
    }

    pub fn warm_yellow() -> Self {
        Self::new(
            "warm-yellow",
            HsvRange::new((23, 38), (170, 255), (170, 255)),
            color::YELLOW,
        )
    }

    pub fn red() -> Self {
        Self::new(
            "red",
            HsvRange::new((160, 180), (170, 255), (170, 255)),
            color::RED,
        )
    }
}

/// Global selection limits.
///
/// `max_area` of `None` derives the bound from each frame's size
/// (`width * height / 1.5`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub min_area: u64,
    pub max_area: Option<u64>,
    pub max_region_count: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: None,
            max_region_count: DEFAULT_MAX_REGION_COUNT,
        }
    }
}

/// Validated, immutable detection settings.
///
/// Construction is the only place configuration is checked; once built,
/// every per-pixel comparison is known to be satisfiable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectionConfig {
    classes: Vec<ColorClass>,
    thresholds: Thresholds,
}

impl DetectionConfig {
    pub fn new(classes: Vec<ColorClass>, thresholds: Thresholds) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for class in &classes {
            if class.name.trim().is_empty() {
                return Err(ConfigError::UnnamedClass);
            }
            if !seen.insert(class.name.as_str()) {
                return Err(ConfigError::DuplicateClass(class.name.clone()));
            }
            class.range.validate(&class.name)?;
        }
        if let Some(max_area) = thresholds.max_area {
            if thresholds.min_area >= max_area {
                return Err(ConfigError::EmptyAreaBand {
                    min_area: thresholds.min_area,
                    max_area,
                });
            }
        }
        if thresholds.max_region_count == 0 {
            return Err(ConfigError::ZeroRegionCeiling);
        }
        Ok(Self {
            classes,
            thresholds,
        })
    }

    pub fn classes(&self) -> &[ColorClass] {
        &self.classes
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Resolves the thresholds for a frame of the given size.
    pub fn selection_thresholds(&self, width: u32, height: u32) -> SelectionThresholds {
        let max_area = self.thresholds.max_area.unwrap_or_else(|| {
            ((width as u64 * height as u64) as f64 / MAX_AREA_DIVISOR) as u64
        });
        SelectionThresholds {
            min_area: self.thresholds.min_area,
            max_area,
            max_region_count: self.thresholds.max_region_count,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            classes: vec![ColorClass::warm_yellow(), ColorClass::red()],
            thresholds: Thresholds::default(),
        }
    }
}

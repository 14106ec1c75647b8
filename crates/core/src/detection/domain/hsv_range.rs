use std::fmt;

use crate::shared::constants::HUE_LIMIT;

use super::detection_config::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HsvChannel {
    Hue,
    Saturation,
    Value,
}

impl fmt::Display for HsvChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HsvChannel::Hue => write!(f, "hue"),
            HsvChannel::Saturation => write!(f, "saturation"),
            HsvChannel::Value => write!(f, "value"),
        }
    }
}

/// Inclusive HSV window selecting one color class.
///
/// Hue uses the 8-bit half-degree convention (0-179); saturation and value
/// span the full 0-255 range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HsvRange {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

impl HsvRange {
    pub const fn new(hue: (u8, u8), sat: (u8, u8), val: (u8, u8)) -> Self {
        Self {
            hue_min: hue.0,
            hue_max: hue.1,
            sat_min: sat.0,
            sat_max: sat.1,
            val_min: val.0,
            val_max: val.1,
        }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        let [h, s, v] = hsv;
        (self.hue_min..=self.hue_max).contains(&h)
            && (self.sat_min..=self.sat_max).contains(&s)
            && (self.val_min..=self.val_max).contains(&v)
    }

    /// Rejects windows that could never match anything.
    pub fn validate(&self, class: &str) -> Result<(), ConfigError> {
        for value in [self.hue_min, self.hue_max] {
            if value > HUE_LIMIT {
                return Err(ConfigError::HueOutOfRange {
                    class: class.to_string(),
                    value,
                });
            }
        }
        let bounds = [
            (HsvChannel::Hue, self.hue_min, self.hue_max),
            (HsvChannel::Saturation, self.sat_min, self.sat_max),
            (HsvChannel::Value, self.val_min, self.val_max),
        ];
        for (channel, min, max) in bounds {
            if min > max {
                return Err(ConfigError::InvertedBound {
                    class: class.to_string(),
                    channel,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::shared::color::Rgb;

/// Outcome of region selection for one color class in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionResult {
    Found { x: u32, y: u32, area: u64 },
    NotFound,
    /// The mask held too many candidate regions to be trusted.
    TooNoisy { region_count: usize },
}

impl DetectionResult {
    pub fn position(&self) -> Option<(u32, u32)> {
        match *self {
            DetectionResult::Found { x, y, .. } => Some((x, y)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetection {
    pub class: String,
    pub marker_color: Rgb,
    pub result: DetectionResult,
}

/// Detections for every configured class, in configuration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDetections {
    pub frame_index: usize,
    pub classes: Vec<ClassDetection>,
}

impl FrameDetections {
    pub fn get(&self, class: &str) -> Option<&DetectionResult> {
        self.classes
            .iter()
            .find(|d| d.class == class)
            .map(|d| &d.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_only_for_found() {
        assert_eq!(
            DetectionResult::Found { x: 3, y: 4, area: 500 }.position(),
            Some((3, 4))
        );
        assert_eq!(DetectionResult::NotFound.position(), None);
        assert_eq!(DetectionResult::TooNoisy { region_count: 60 }.position(), None);
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_string(&DetectionResult::Found { x: 1, y: 2, area: 401 }).unwrap();
        assert_eq!(json, r#"{"status":"found","x":1,"y":2,"area":401}"#);
        let json = serde_json::to_string(&DetectionResult::NotFound).unwrap();
        assert_eq!(json, r#"{"status":"not_found"}"#);
    }

    #[test]
    fn test_lookup_by_class_name() {
        let detections = FrameDetections {
            frame_index: 0,
            classes: vec![ClassDetection {
                class: "red".to_string(),
                marker_color: [255, 0, 0],
                result: DetectionResult::NotFound,
            }],
        };
        assert_eq!(detections.get("red"), Some(&DetectionResult::NotFound));
        assert_eq!(detections.get("blue"), None);
    }
}

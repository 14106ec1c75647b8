use std::fmt;

use serde::Serialize;

use crate::detection::domain::detection_config::ColorClass;
use crate::detection::domain::detection_result::{DetectionResult, FrameDetections};

/// Outcome counts for one color class over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTally {
    pub class: String,
    pub found: usize,
    pub not_found: usize,
    pub too_noisy: usize,
}

impl ClassTally {
    fn add(&mut self, result: &DetectionResult) {
        match result {
            DetectionResult::Found { .. } => self.found += 1,
            DetectionResult::NotFound => self.not_found += 1,
            DetectionResult::TooNoisy { .. } => self.too_noisy += 1,
        }
    }
}

/// What a tracking run did, returned to the caller when the stream ends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSummary {
    pub frames_processed: usize,
    pub frames_skipped: usize,
    pub cancelled: bool,
    pub classes: Vec<ClassTally>,
}

impl TrackingSummary {
    pub fn new(classes: &[ColorClass]) -> Self {
        Self {
            classes: classes
                .iter()
                .map(|c| ClassTally {
                    class: c.name.clone(),
                    ..ClassTally::default()
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, detections: &FrameDetections) {
        self.frames_processed += 1;
        for detection in &detections.classes {
            // Classes added by a live config change get their own row.
            let index = match self.classes.iter().position(|t| t.class == detection.class) {
                Some(i) => i,
                None => {
                    self.classes.push(ClassTally {
                        class: detection.class.clone(),
                        ..ClassTally::default()
                    });
                    self.classes.len() - 1
                }
            };
            self.classes[index].add(&detection.result);
        }
    }

    pub fn record_skip(&mut self) {
        self.frames_skipped += 1;
    }

    pub fn tally(&self, class: &str) -> Option<&ClassTally> {
        self.classes.iter().find(|t| t.class == class)
    }
}

impl fmt::Display for TrackingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames processed, {} skipped",
            self.frames_processed, self.frames_skipped
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        for t in &self.classes {
            write!(
                f,
                "\n  {}: found {}, not found {}, too noisy {}",
                t.class, t.found, t.not_found, t.too_noisy
            )?;
        }
        Ok(())
    }
}

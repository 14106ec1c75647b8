use crate::detection::domain::detection_result::FrameDetections;

/// Sink for per-frame detection results, consumed by whatever acts on the
/// tracked positions downstream.
pub trait DetectionWriter: Send {
    fn write(&mut self, detections: &FrameDetections) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes any buffered records.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

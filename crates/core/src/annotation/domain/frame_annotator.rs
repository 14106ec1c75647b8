use crate::detection::domain::detection_result::ClassDetection;
use crate::shared::frame::Frame;

/// Domain interface for drawing one class's detection onto an output frame.
///
/// Implementations modify the frame in-place. Callers annotate classes in
/// configuration order so later classes draw on top of earlier ones.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        detection: &ClassDetection,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

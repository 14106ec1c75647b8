use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sink for a stream of annotated frames.
pub trait VideoWriter: Send {
    /// Prepares the output using the source's size and frame rate.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes buffered frames and finalises the container.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

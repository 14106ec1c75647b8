use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Frame source port: a video file, a capture device or a single image.
///
/// Frames come out as RGB [`Frame`]s in capture order. A failed decode is
/// reported as an `Err` item for that frame; the iterator may keep yielding
/// afterwards and callers decide whether to skip or stop.
pub trait VideoReader: Send {
    /// Opens the source and reports its geometry and rate.
    ///
    /// Live sources report `total_frames == 0`.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the source. Safe to call more than once.
    fn close(&mut self);
}

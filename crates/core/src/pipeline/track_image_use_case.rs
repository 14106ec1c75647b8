use std::path::{Path, PathBuf};

use crate::detection::domain::detection_result::FrameDetections;
use crate::reporting::domain::detection_writer::DetectionWriter;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::frame_pipeline::FramePipeline;

/// Single-image tracking: read → detect → annotate → write.
///
/// Unlike the stream loop, a malformed image is an error: there is no next
/// frame to fall back to.
pub struct TrackImageUseCase {
    reader: Box<dyn VideoReader>,
    pipeline: FramePipeline,
    image_sink: Option<(Box<dyn ImageWriter>, PathBuf)>,
    detection_writer: Option<Box<dyn DetectionWriter>>,
}

impl TrackImageUseCase {
    pub fn new(reader: Box<dyn VideoReader>, pipeline: FramePipeline) -> Self {
        Self {
            reader,
            pipeline,
            image_sink: None,
            detection_writer: None,
        }
    }

    pub fn with_image_writer(mut self, writer: Box<dyn ImageWriter>, path: &Path) -> Self {
        self.image_sink = Some((writer, path.to_path_buf()));
        self
    }

    pub fn with_detection_writer(mut self, writer: Box<dyn DetectionWriter>) -> Self {
        self.detection_writer = Some(writer);
        self
    }

    pub fn execute(&mut self, input: &Path) -> Result<FrameDetections, Box<dyn std::error::Error>> {
        self.reader.open(input)?;
        let frame = self.reader.frames().next().ok_or("No frames in image");
        self.reader.close();
        let mut frame = frame??;

        let detections = self.pipeline.detect(&frame)?;
        for d in &detections.classes {
            log::info!("{}: {:?}", d.class, d.result);
        }

        if let Some((writer, path)) = self.image_sink.as_ref() {
            self.pipeline.annotate(&mut frame, &detections)?;
            writer.write(path, &frame)?;
        }

        if let Some(writer) = self.detection_writer.as_mut() {
            writer.write(&detections)?;
            writer.close()?;
        }

        Ok(detections)
    }
}

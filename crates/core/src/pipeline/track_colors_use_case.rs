use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Receiver;

use crate::detection::domain::detection_config::DetectionConfig;
use crate::reporting::domain::detection_writer::DetectionWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_pipeline::FramePipeline;
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::tracking_summary::TrackingSummary;

/// Consecutive unreadable frames tolerated before the source is considered dead.
const MAX_CONSECUTIVE_FAILURES: usize = 30;

type ProgressCallback = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Stream tracking loop: read → detect → annotate → write, one frame at a time.
///
/// Frames that fail to decode or validate are skipped with a warning.
/// Configurations sent on the update channel replace the pipeline's config
/// before the next frame is detected. The loop stops at the end of the source, after `max_frames`, when the
/// cancellation flag is raised, or when the progress callback returns
/// `false`.
pub struct TrackColorsUseCase {
    reader: Box<dyn VideoReader>,
    pipeline: FramePipeline,
    video_sink: Option<(Box<dyn VideoWriter>, PathBuf)>,
    detection_writer: Option<Box<dyn DetectionWriter>>,
    logger: Box<dyn PipelineLogger>,
    max_frames: Option<usize>,
    on_progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
    config_updates: Option<Receiver<DetectionConfig>>,
}

impl TrackColorsUseCase {
    pub fn new(reader: Box<dyn VideoReader>, pipeline: FramePipeline) -> Self {
        Self {
            reader,
            pipeline,
            video_sink: None,
            detection_writer: None,
            logger: Box::new(NullPipelineLogger),
            max_frames: None,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            config_updates: None,
        }
    }

    /// Annotated frames are encoded to `path`.
    pub fn with_video_writer(mut self, writer: Box<dyn VideoWriter>, path: &Path) -> Self {
        self.video_sink = Some((writer, path.to_path_buf()));
        self
    }

    pub fn with_detection_writer(mut self, writer: Box<dyn DetectionWriter>) -> Self {
        self.detection_writer = Some(writer);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Called after every processed frame with `(processed, total)`;
    /// returning `false` stops the run.
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Live re-tuning: the latest config received is applied between frames.
    pub fn with_config_updates(mut self, updates: Receiver<DetectionConfig>) -> Self {
        self.config_updates = Some(updates);
        self
    }

    /// Re-tuning between runs.
    pub fn pipeline_mut(&mut self) -> &mut FramePipeline {
        &mut self.pipeline
    }

    pub fn execute(&mut self, input: &Path) -> Result<TrackingSummary, Box<dyn std::error::Error>> {
        let metadata = self.reader.open(input)?;
        log::info!(
            "Tracking {} ({}x{}, {:.2} fps, {})",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            if metadata.is_live() {
                "live".to_string()
            } else {
                format!("{} frames", metadata.total_frames)
            }
        );

        if let Some((writer, path)) = self.video_sink.as_mut() {
            if let Err(e) = writer.open(path, &metadata) {
                self.reader.close();
                return Err(e);
            }
        }

        let mut summary = TrackingSummary::new(self.pipeline.config().classes());
        let run = self.run_frames(metadata.total_frames, &mut summary);
        self.reader.close();
        let closed = self.close_sinks();
        run?;
        closed?;

        self.logger.summary();
        log::info!("{summary}");
        Ok(summary)
    }

    fn run_frames(
        &mut self,
        total: usize,
        summary: &mut TrackingSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Self {
            reader,
            pipeline,
            video_sink,
            detection_writer,
            logger,
            max_frames,
            on_progress,
            cancelled,
            config_updates,
        } = self;

        let total = match *max_frames {
            Some(max) if total == 0 || max < total => max,
            _ => total,
        };
        let mut frames = reader.frames();
        let mut failures = 0;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                log::info!("Cancelled after {} frames", summary.frames_processed);
                summary.cancelled = true;
                break;
            }
            if max_frames.is_some_and(|max| summary.frames_processed >= max) {
                break;
            }
            let Some(item) = frames.next() else {
                break;
            };
            let position = summary.frames_processed + summary.frames_skipped;
            if let Some(config) = config_updates.as_ref().and_then(|rx| rx.try_iter().last()) {
                pipeline.set_config(config);
            }

            let frame = match item {
                Ok(frame) => frame,
                Err(e) => {
                    logger.skipped(position, &e.to_string());
                    summary.record_skip();
                    failures += 1;
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(format!(
                            "source failed {failures} times in a row, last error: {e}"
                        )
                        .into());
                    }
                    continue;
                }
            };

            let start = Instant::now();
            let detections = match pipeline.detect(&frame) {
                Ok(detections) => detections,
                Err(e) => {
                    logger.skipped(position, &e.to_string());
                    summary.record_skip();
                    failures += 1;
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(e.into());
                    }
                    continue;
                }
            };
            failures = 0;
            logger.timing("detect", elapsed_ms(start));

            if let Some((writer, _)) = video_sink.as_mut() {
                let start = Instant::now();
                let mut annotated = frame;
                pipeline.annotate(&mut annotated, &detections)?;
                logger.timing("annotate", elapsed_ms(start));

                let start = Instant::now();
                writer.write(&annotated)?;
                logger.timing("write", elapsed_ms(start));
            }

            if let Some(writer) = detection_writer.as_mut() {
                writer.write(&detections)?;
            }

            summary.record(&detections);
            logger.progress(summary.frames_processed, total);

            if let Some(callback) = on_progress.as_ref() {
                if !callback(summary.frames_processed, total) {
                    cancelled.store(true, Ordering::Relaxed);
                }
            }
        }
        Ok(())
    }

    fn close_sinks(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let video = match self.video_sink.as_mut() {
            Some((writer, _)) => writer.close(),
            None => Ok(()),
        };
        let detections = match self.detection_writer.as_mut() {
            Some(writer) => writer.close(),
            None => Ok(()),
        };
        video.and(detections)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

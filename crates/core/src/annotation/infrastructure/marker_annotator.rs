use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::domain::marker_geometry::{
    coordinate_label, crosshair, label_origin, Segment,
};
use crate::detection::domain::detection_result::{ClassDetection, DetectionResult};
use crate::shared::color::{self, Rgb as RgbColor};
use crate::shared::constants::{
    MARKER_RADIUS, MARKER_THICKNESS, NOISE_MESSAGE, STATUS_ORIGIN, TRACKING_MESSAGE,
};
use crate::shared::frame::Frame;

use super::bitmap_font::draw_text;

type FrameCanvas<'a> = ImageBuffer<Rgb<u8>, &'a mut [u8]>;

/// Draws a circle and crosshair over each found object, plus a status line.
///
/// - `Found`: "Tracking Object" status, a circle and crosshair in the
///   class marker color, and an "x,y" label under the marker.
/// - `TooNoisy`: a red warning in the status area, no marker.
/// - `NotFound`: nothing.
pub struct MarkerAnnotator {
    label_scale: u32,
    status_scale: u32,
}

impl MarkerAnnotator {
    pub fn new(label_scale: u32, status_scale: u32) -> Self {
        Self {
            label_scale: label_scale.max(1),
            status_scale: status_scale.max(1),
        }
    }

    fn draw_marker(&self, canvas: &mut FrameCanvas<'_>, x: u32, y: u32, marker: RgbColor) {
        let (width, height) = canvas.dimensions();
        let (cx, cy) = (x as i32, y as i32);
        let ink = Rgb(marker);

        for offset in thickness_offsets() {
            draw_hollow_circle_mut(canvas, (cx, cy), MARKER_RADIUS + offset, ink);
        }

        let arms = crosshair(cx, cy, width, height);
        for segment in arms.segments() {
            draw_thick_segment(canvas, segment, ink);
        }

        let label = coordinate_label(x, y);
        draw_text(
            canvas,
            &label,
            label_origin(cx, cy),
            self.label_scale,
            Rgb(color::GREEN),
        );
    }
}

impl Default for MarkerAnnotator {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl FrameAnnotator for MarkerAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        detection: &ClassDetection,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if detection.result == DetectionResult::NotFound {
            return Ok(());
        }
        frame.validate()?;
        let (width, height) = (frame.width(), frame.height());
        let mut canvas: FrameCanvas<'_> = ImageBuffer::from_raw(width, height, frame.data_mut())
            .ok_or("frame buffer does not match its dimensions")?;

        match detection.result {
            DetectionResult::Found { x, y, .. } => {
                draw_text(
                    &mut canvas,
                    TRACKING_MESSAGE,
                    STATUS_ORIGIN,
                    self.status_scale,
                    Rgb(color::GREEN),
                );
                self.draw_marker(&mut canvas, x, y, detection.marker_color);
            }
            DetectionResult::TooNoisy { .. } => {
                draw_text(
                    &mut canvas,
                    NOISE_MESSAGE,
                    STATUS_ORIGIN,
                    self.status_scale,
                    Rgb(color::RED),
                );
            }
            DetectionResult::NotFound => {}
        }
        Ok(())
    }
}

/// Offsets that widen a 1 px stroke to `MARKER_THICKNESS`, e.g. `[-1, 0]`.
fn thickness_offsets() -> impl Iterator<Item = i32> {
    (0..MARKER_THICKNESS).map(|i| i - MARKER_THICKNESS / 2)
}

fn draw_thick_segment(canvas: &mut FrameCanvas<'_>, segment: Segment, ink: Rgb<u8>) {
    let vertical = segment.start.0 == segment.end.0;
    for offset in thickness_offsets() {
        let (dx, dy) = if vertical { (offset, 0) } else { (0, offset) };
        draw_line_segment_mut(
            canvas,
            ((segment.start.0 + dx) as f32, (segment.start.1 + dy) as f32),
            ((segment.end.0 + dx) as f32, (segment.end.1 + dy) as f32),
            ink,
        );
    }
}

use std::path::Path;

use crate::shared::frame::{Frame, RGB_CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Frame rate used when the source does not report one (capture devices).
const FALLBACK_FPS: i32 = 30;

/// Encodes annotated frames to MPEG-4 via ffmpeg-next.
///
/// The container is chosen from the output path's extension.
pub struct FfmpegWriter {
    session: Option<EncodeSession>,
    frame_count: usize,
}

struct EncodeSession {
    output: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    encoder_time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    width: u32,
    height: u32,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            session: None,
            frame_count: 0,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer encoder rate for `fps`, falling back when the source reports none.
fn encoder_rate(fps: f64) -> i32 {
    let rounded = fps.round() as i32;
    if rounded <= 0 {
        FALLBACK_FPS
    } else {
        rounded
    }
}

impl EncodeSession {
    fn drain(&mut self) -> Result<(), ffmpeg_next::Error> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.encoder_time_base, self.stream_time_base);
            encoded.write_interleaved(&mut self.output)?;
        }
        Ok(())
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut output = ffmpeg_next::format::output(path)?;
        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;
        let mut stream = output.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);

        let rate = encoder_rate(metadata.fps);
        let encoder_time_base = ffmpeg_next::Rational(1, rate);
        encoder_ctx.set_time_base(encoder_time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(rate, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        stream.set_parameters(&encoder);

        output.write_header()?;
        // The muxer may adjust the stream time base while writing the header.
        let stream_time_base = output.stream(0).ok_or("output stream missing")?.time_base();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Writing {}x{} @ {rate} fps to {}",
            metadata.width,
            metadata.height,
            path.display()
        );

        self.session = Some(EncodeSession {
            output,
            encoder,
            scaler,
            encoder_time_base,
            stream_time_base,
            width: metadata.width,
            height: metadata.height,
        });
        self.frame_count = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let session = self.session.as_mut().ok_or("FfmpegWriter: not opened")?;
        frame.validate()?;
        if frame.width() != session.width || frame.height() != session.height {
            return Err(format!(
                "frame {} is {}x{}, output is {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                session.width,
                session.height
            )
            .into());
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            session.width,
            session.height,
        );
        let stride = rgb.stride(0);
        let row_bytes = session.width as usize * RGB_CHANNELS as usize;
        let dst = rgb.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_bytes).enumerate() {
            dst[row * stride..row * stride + row_bytes].copy_from_slice(src);
        }

        let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
        session.scaler.run(&rgb, &mut yuv)?;
        yuv.set_pts(Some(self.frame_count as i64));

        session.encoder.send_frame(&yuv)?;
        session.drain()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        session.encoder.send_eof()?;
        session.drain()?;
        session.output.write_trailer()?;
        log::info!("Encoded {} frames", self.frame_count);
        Ok(())
    }
}

use std::path::Path;

use crate::shared::frame::{Frame, RGB_CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Decodes frames via ffmpeg-next from a video file or a capture device.
///
/// With a device format (e.g. `v4l2` on Linux, `avfoundation` on macOS) the
/// path names the device, such as `/dev/video0`. Every decoded frame is
/// converted to RGB24.
pub struct FfmpegReader {
    device_format: Option<String>,
    session: Option<DecodeSession>,
}

struct DecodeSession {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    /// Reader for video files; the container format is probed.
    pub fn new() -> Self {
        Self {
            device_format: None,
            session: None,
        }
    }

    /// Reader for a capture device opened through the named ffmpeg input
    /// device format.
    pub fn with_device_format(format: impl Into<String>) -> Self {
        Self {
            device_format: Some(format.into()),
            session: None,
        }
    }

    fn open_input(
        &self,
        path: &Path,
    ) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
        let Some(name) = self.device_format.as_deref() else {
            return Ok(ffmpeg_next::format::input(path)?);
        };
        ffmpeg_next::device::register_all();
        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == name)
            .ok_or_else(|| format!("capture device format '{name}' is not available"))?;
        log::info!("Opening {} through {name}", path.display());
        let context =
            ffmpeg_next::format::open_with(path, &format, ffmpeg_next::Dictionary::new())?;
        Ok(context.input())
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        self.close();

        let input = self.open_input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = stream.frames().max(0) as usize;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let (width, height) = (decoder.width(), decoder.height());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.session = Some(DecodeSession {
            input,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.session.as_mut() {
            Some(session) => Box::new(FfmpegFrameIter {
                session,
                frame_index: 0,
                flushing: false,
                done: false,
            }),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.session = None;
    }
}

/// Pulls packets on demand so only the current frame is held in memory.
struct FfmpegFrameIter<'a> {
    session: &'a mut DecodeSession,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let session = &mut *self.session;
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        session.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        let index = self.frame_index;
        self.frame_index += 1;
        if let Err(e) = session.scaler.run(&decoded, &mut rgb) {
            return Some(Err(format!("frame {index}: {e}").into()));
        }
        let pixels = extract_rgb_pixels(&rgb, session.width, session.height);
        Some(Ok(Frame::new(
            pixels,
            session.width,
            session.height,
            RGB_CHANNELS,
            index,
        )))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(result) = self.try_receive() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.session.input.packets().next() else {
                let _ = self.session.decoder.send_eof();
                self.flushing = true;
                let result = self.try_receive();
                self.done = result.is_none();
                return result;
            };

            if stream.index() != self.session.stream_index {
                continue;
            }

            if let Err(e) = self.session.decoder.send_packet(&packet) {
                // Corrupt packet: report it and let the caller move on.
                let message = format!("decode failed after frame {}: {e}", self.frame_index);
                return Some(Err(message.into()));
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row padding ffmpeg may add (stride > width * 3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * RGB_CHANNELS as usize;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

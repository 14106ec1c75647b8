use ndarray::ArrayView3;
use thiserror::Error;

/// Number of interleaved channels the detection pipeline understands (RGB).
pub const RGB_CHANNELS: u8 = 3;

/// Reasons a frame cannot be fed to the pipeline.
///
/// These are recoverable: the caller skips the frame and carries on with
/// the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame {index} has zero size ({width}x{height})")]
    Empty { index: usize, width: u32, height: u32 },
    #[error("frame {index} has {channels} channels, expected 3 (RGB)")]
    UnsupportedChannels { index: usize, channels: u8 },
    #[error("frame {index} holds {actual} bytes, expected {expected}")]
    BufferSize {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion (BGR camera buffers, YUV video) happens at I/O
/// boundaries only; the detection layer always sees RGB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Builds an RGB frame filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(data, width, height, RGB_CHANNELS, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Checks that the frame can be segmented: non-empty, 3-channel RGB, and
    /// backed by exactly `width * height * 3` bytes.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::Empty {
                index: self.index,
                width: self.width,
                height: self.height,
            });
        }
        if self.channels != RGB_CHANNELS {
            return Err(FrameError::UnsupportedChannels {
                index: self.index,
                channels: self.channels,
            });
        }
        let (height, width, channels) = self.shape();
        let expected = height * width * channels;
        if self.data.len() != expected {
            return Err(FrameError::BufferSize {
                index: self.index,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Returns the RGB triple at column `x`, row `y`.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// Overwrites the RGB triple at column `x`, row `y`.
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let offset = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        self.data[offset..offset + 3].copy_from_slice(&rgb);
    }

    /// Panics unless [`Frame::validate`] has passed.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_filled_repeats_color() {
        let frame = Frame::filled(3, 2, [10, 20, 30], 0);
        assert_eq!(frame.data().len(), 18);
        assert_eq!(frame.rgb_at(0, 0), [10, 20, 30]);
        assert_eq!(frame.rgb_at(2, 1), [10, 20, 30]);
    }

    #[test]
    fn test_set_rgb_touches_single_pixel() {
        let mut frame = Frame::filled(2, 2, [0, 0, 0], 0);
        frame.set_rgb(1, 0, [255, 128, 1]);
        assert_eq!(frame.rgb_at(1, 0), [255, 128, 1]);
        assert_eq!(frame.rgb_at(0, 0), [0, 0, 0]);
        assert_eq!(frame.rgb_at(1, 1), [0, 0, 0]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::filled(2, 2, [100, 100, 100], 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    fn test_validate_accepts_rgb() {
        assert!(Frame::filled(4, 4, [1, 2, 3], 0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let frame = Frame::new(Vec::new(), 0, 480, 3, 7);
        assert_eq!(
            frame.validate(),
            Err(FrameError::Empty {
                index: 7,
                width: 0,
                height: 480
            })
        );
    }

    #[test]
    fn test_validate_rejects_grayscale() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 3);
        assert_eq!(
            frame.validate(),
            Err(FrameError::UnsupportedChannels {
                index: 3,
                channels: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_truncated_buffer() {
        let frame = Frame::new(vec![0u8; 40], 4, 4, 3, 7);
        assert_eq!(
            frame.validate(),
            Err(FrameError::BufferSize {
                index: 7,
                expected: 48,
                actual: 40
            })
        );
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]); // (height, width, channels)
    }
}

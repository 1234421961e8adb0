//! Frame reduction
//!
//! Collapses an interleaved 8-bit pixel buffer into the single luminance sample
//! the rPPG pipeline tracks: the mean of the green channel. Green carries the
//! strongest hemoglobin absorption signal, so red and blue are ignored.

use crate::error::SignalError;

/// Index of the green channel inside an interleaved pixel.
const GREEN: usize = 1;

/// Borrowed view over a captured camera frame.
///
/// Pixels are row-major and interleaved, one byte per channel (RGB or RGBA).
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    channels: usize,
}

impl<'a> FrameView<'a> {
    /// Wrap a raw pixel buffer, validating its size against the declared layout.
    pub fn new(data: &'a [u8], width: u32, height: u32, channels: usize) -> Result<Self, SignalError> {
        if channels <= GREEN {
            return Err(SignalError::UnsupportedChannels(channels));
        }
        if data.is_empty() || width == 0 || height == 0 {
            return Err(SignalError::EmptyFrame);
        }

        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(SignalError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// RGBA8 frame, the layout browser canvases and most mobile camera APIs hand out.
    pub fn rgba(data: &'a [u8], width: u32, height: u32) -> Result<Self, SignalError> {
        Self::new(data, width, height, 4)
    }

    /// Packed RGB8 frame.
    pub fn rgb(data: &'a [u8], width: u32, height: u32) -> Result<Self, SignalError> {
        Self::new(data, width, height, 3)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Mean green value sampled every `pixel_stride` pixels.
    ///
    /// A stride above 1 trades a little noise for speed; the result is always in [0, 255].
    pub fn green_mean(&self, pixel_stride: usize) -> f32 {
        green_channel_mean(self.data, self.channels, pixel_stride)
    }
}

/// Mean of the green channel over an interleaved buffer, visiting every
/// `pixel_stride`-th pixel. A stride of zero is treated as one.
///
/// Trailing bytes that do not form a whole pixel are ignored. Returns 0.0 when
/// the buffer holds no complete pixel.
pub fn green_channel_mean(data: &[u8], channels: usize, pixel_stride: usize) -> f32 {
    if channels <= GREEN {
        return 0.0;
    }

    let mut sum = 0u64;
    let mut count = 0u64;

    for px in data.chunks_exact(channels).step_by(pixel_stride.max(1)) {
        sum += px[GREEN] as u64;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    (sum as f64 / count as f64) as f32
}

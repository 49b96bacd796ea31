//! Video frames handed to renderers by the media pipeline

use crate::surface::{PixelFormat, TextureHandle};

/// A decoded frame borrowed from the pipeline for the duration of a write
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per row, at least `width * bytes_per_pixel`
    pub stride: u32,
    /// Pixel layout
    pub format: PixelFormat,
    /// Pixel rows, `stride * height` bytes
    pub data: &'a [u8],
}

impl<'a> VideoFrame<'a> {
    /// Describe a tightly packed frame.
    ///
    /// A width too large for a `u32` stride saturates, and [`validate`](Self::validate)
    /// reports it as an invalid stride.
    pub fn packed(width: u32, height: u32, format: PixelFormat, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            stride: width.saturating_mul(format.bytes_per_pixel()),
            format,
            data,
        }
    }

    /// Check the frame's geometry against its data
    pub fn validate(&self) -> Result<(), RenderError> {
        let min_stride = self.width as usize * self.format.bytes_per_pixel() as usize;
        if (self.stride as usize) < min_stride {
            return Err(RenderError::InvalidStride {
                stride: self.stride,
                width: self.width,
            });
        }

        let expected = (self.stride as usize).saturating_mul(self.height as usize);
        if self.data.len() < expected {
            return Err(RenderError::TruncatedFrame {
                expected,
                actual: self.data.len(),
            });
        }

        Ok(())
    }

    /// Bytes of the pixel at (x, y)
    pub(crate) fn pixel(&self, x: u32, y: u32) -> &'a [u8] {
        let bpp = self.format.bytes_per_pixel() as usize;
        let offset = y as usize * self.stride as usize + x as usize * bpp;
        &self.data[offset..offset + bpp]
    }
}

/// Frame write errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Renderer {0} has been released")]
    Released(TextureHandle),
    #[error("Frame format {frame:?} does not match surface format {surface:?}")]
    FormatMismatch {
        frame: PixelFormat,
        surface: PixelFormat,
    },
    #[error("Invalid stride {stride} for width {width}")]
    InvalidStride { stride: u32, width: u32 },
    #[error("Frame data truncated: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_frame() {
        let data = vec![0u8; 16 * 8 * 4];
        let frame = VideoFrame::packed(16, 8, PixelFormat::Bgra8888, &data);
        assert_eq!(frame.stride, 64);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_invalid_stride() {
        let data = vec![0u8; 1024];
        let frame = VideoFrame {
            width: 16,
            height: 4,
            stride: 32,
            format: PixelFormat::Bgra8888,
            data: &data,
        };
        assert_eq!(
            frame.validate(),
            Err(RenderError::InvalidStride {
                stride: 32,
                width: 16
            })
        );
    }

    #[test]
    fn test_truncated_frame() {
        let data = vec![0u8; 100];
        let frame = VideoFrame::packed(16, 4, PixelFormat::Rgba8888, &data);
        assert_eq!(
            frame.validate(),
            Err(RenderError::TruncatedFrame {
                expected: 256,
                actual: 100
            })
        );
    }

    #[test]
    fn test_packed_wide_frame_reports_stride() {
        let width = (1 << 30) + 1;
        let frame = VideoFrame::packed(width, 1, PixelFormat::Bgra8888, &[]);
        assert_eq!(frame.stride, u32::MAX);
        assert_eq!(
            frame.validate(),
            Err(RenderError::InvalidStride {
                stride: u32::MAX,
                width
            })
        );
    }

    #[test]
    fn test_pixel_offset() {
        let data: Vec<u8> = (0..32).collect();
        let frame = VideoFrame {
            width: 2,
            height: 2,
            stride: 16,
            format: PixelFormat::Bgra8888,
            data: &data,
        };
        assert_eq!(frame.pixel(1, 1), &[20, 21, 22, 23]);
    }
}

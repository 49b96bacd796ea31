//! Pixel surfaces
//!
//! A pixel surface is the drawable a renderer writes into. Its storage is
//! an anonymous memory mapping sized for the current dimensions.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use memmap2::MmapMut;

/// Opaque identifier shared by a surface and the renderer bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    /// Draw the next handle. Handles are never reused within a process.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        TextureHandle(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw integer value, as handed to the UI side
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TextureHandle {
    fn from(raw: u64) -> Self {
        TextureHandle(raw)
    }
}

/// Supported pixel layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 32-bit BGRA, blue in the lowest byte
    #[default]
    Bgra8888,
    /// 32-bit RGBA, red in the lowest byte
    Rgba8888,
}

impl PixelFormat {
    /// Get bytes per pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Bgra8888 | PixelFormat::Rgba8888 => 4,
        }
    }
}

/// A drawable surface backed by anonymous shared memory
#[derive(Debug)]
pub struct PixelSurface {
    /// Handle assigned at allocation
    handle: TextureHandle,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel layout
    format: PixelFormat,
    /// Largest accepted width or height
    max_dimension: u32,
    /// Backing storage, at least one pixel even for empty dimensions
    buffer: MmapMut,
}

impl PixelSurface {
    /// Map a new surface of the given size
    pub(crate) fn map(
        handle: TextureHandle,
        width: u32,
        height: u32,
        format: PixelFormat,
        max_dimension: u32,
    ) -> io::Result<Self> {
        let len = Self::backing_len(width, height, format, max_dimension)?;
        let buffer = MmapMut::map_anon(len)?;

        debug!(
            "Mapped surface {} ({}x{}, {:?}, {} bytes)",
            handle,
            width,
            height,
            format,
            buffer.len()
        );

        Ok(Self {
            handle,
            width,
            height,
            format,
            max_dimension,
            buffer,
        })
    }

    fn backing_len(
        width: u32,
        height: u32,
        format: PixelFormat,
        max_dimension: u32,
    ) -> io::Result<usize> {
        if width > max_dimension || height > max_dimension {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "surface size {}x{} exceeds the {} pixel limit",
                    width, height, max_dimension
                ),
            ));
        }

        (width.max(1) as usize)
            .checked_mul(height.max(1) as usize)
            .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel() as usize))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("surface size {}x{} overflows", width, height),
                )
            })
    }

    /// Handle of this surface
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Largest width or height accepted by [`resize`](Self::resize)
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel() as usize
    }

    /// Pixel data for the current dimensions
    pub fn pixels(&self) -> &[u8] {
        let len = self.stride() * self.height as usize;
        &self.buffer[..len]
    }

    /// Mutable pixel data for the current dimensions
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        let len = self.stride() * self.height as usize;
        &mut self.buffer[..len]
    }

    /// Remap the surface for new dimensions.
    ///
    /// Contents are not preserved. Sizes beyond the surface's limit are
    /// rejected with `InvalidInput`. On failure the surface keeps its
    /// previous size and storage.
    pub fn resize(&mut self, width: u32, height: u32) -> io::Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let len = Self::backing_len(width, height, self.format, self.max_dimension)?;
        if len != self.buffer.len() {
            self.buffer = MmapMut::map_anon(len)?;
        } else {
            self.buffer.fill(0);
        }

        debug!(
            "Resized surface {} from {}x{} to {}x{}",
            self.handle, self.width, self.height, width, height
        );

        self.width = width;
        self.height = height;
        Ok(())
    }
}

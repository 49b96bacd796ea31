//! Surface allocation
//!
//! Plays the part of the UI framework's texture registry: hands out
//! surfaces with fresh handles, validated against the configured limits.

use log::debug;

use super::pixel::{PixelFormat, PixelSurface, TextureHandle};

/// Default upper bound for either surface dimension
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Options applied to every surface an allocator hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Pixel layout of allocated surfaces
    pub format: PixelFormat,
    /// Largest accepted width or height
    pub max_dimension: u32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            format: PixelFormat::default(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Surface allocation errors
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Surface size {width}x{height} exceeds the {max} pixel limit")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("Failed to map surface memory: {0}")]
    Map(#[from] std::io::Error),
}

/// Allocator for pixel surfaces
#[derive(Debug, Clone, Default)]
pub struct SurfaceAllocator {
    options: SurfaceOptions,
}

impl SurfaceAllocator {
    /// Create an allocator with the given options
    pub fn new(options: SurfaceOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    /// Allocate a surface with a fresh handle
    pub fn allocate(&self, width: u32, height: u32) -> Result<PixelSurface, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }

        let max = self.options.max_dimension;
        if width > max || height > max {
            return Err(SurfaceError::TooLarge { width, height, max });
        }

        let surface = PixelSurface::map(
            TextureHandle::next(),
            width,
            height,
            self.options.format,
            max,
        )?;
        debug!("Allocated surface {}", surface.handle());
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate() {
        let allocator = SurfaceAllocator::default();
        let a = allocator.allocate(640, 480).unwrap();
        let b = allocator.allocate(640, 480).unwrap();
        assert_ne!(a.handle(), b.handle());
        assert_eq!(a.format(), PixelFormat::Bgra8888);
        assert_eq!((a.width(), a.height()), (640, 480));
    }

    #[test]
    fn test_allocate_rejects_empty() {
        let allocator = SurfaceAllocator::default();
        assert!(matches!(
            allocator.allocate(0, 480),
            Err(SurfaceError::InvalidSize { width: 0, height: 480 })
        ));
    }

    #[test]
    fn test_allocate_rejects_oversize() {
        let allocator = SurfaceAllocator::new(SurfaceOptions {
            format: PixelFormat::Rgba8888,
            max_dimension: 256,
        });
        assert!(matches!(
            allocator.allocate(257, 16),
            Err(SurfaceError::TooLarge { max: 256, .. })
        ));
        let surface = allocator.allocate(256, 16).unwrap();
        assert_eq!(surface.format(), PixelFormat::Rgba8888);
    }
}

//! Software texture renderer
//!
//! Copies 32-bit frames into a memory-mapped surface, scaling them to the
//! view size with nearest-neighbour sampling.

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::surface::{PixelSurface, TextureHandle};

use super::{FrameSink, RenderError, TextureRenderer, VideoFrame};

/// Renderer writing frames into a [`PixelSurface`]
#[derive(Debug)]
pub struct SoftwareTextureRenderer {
    /// Handle adopted from the surface
    handle: TextureHandle,
    /// View size, surface and counters
    state: Mutex<RenderState>,
}

#[derive(Debug)]
struct RenderState {
    view_width: u32,
    view_height: u32,
    /// `None` once released
    surface: Option<PixelSurface>,
    frames_rendered: u64,
}

impl SoftwareTextureRenderer {
    /// Number of frames written since creation
    pub fn frames_rendered(&self) -> u64 {
        self.state.lock().frames_rendered
    }

    /// Whether the surface has been released
    pub fn is_released(&self) -> bool {
        self.state.lock().surface.is_none()
    }

    /// Copy of the current surface pixels, `None` after release
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.state
            .lock()
            .surface
            .as_ref()
            .map(|surface| surface.pixels().to_vec())
    }
}

impl TextureRenderer for SoftwareTextureRenderer {
    type Surface = PixelSurface;

    fn create(mut surface: PixelSurface, width: u32, height: u32) -> Self {
        let handle = surface.handle();

        if let Err(e) = surface.resize(width, height) {
            error!(
                "Failed to size surface {} to {}x{}: {}",
                handle, width, height, e
            );
        }

        let (view_width, view_height) = (surface.width(), surface.height());
        debug!("Created renderer {} ({}x{})", handle, view_width, view_height);

        Self {
            handle,
            state: Mutex::new(RenderState {
                view_width,
                view_height,
                surface: Some(surface),
                frames_rendered: 0,
            }),
        }
    }

    fn handle(&self) -> TextureHandle {
        self.handle
    }

    fn size(&self) -> (u32, u32) {
        let state = self.state.lock();
        (state.view_width, state.view_height)
    }

    fn resize(&self, width: u32, height: u32) {
        let mut state = self.state.lock();

        let resized = match state.surface.as_mut() {
            Some(surface) => surface.resize(width, height),
            None => {
                warn!("Resize of released renderer {}", self.handle);
                Ok(())
            }
        };

        // The view keeps the surface's size when the resize is rejected.
        if let Err(e) = resized {
            error!(
                "Failed to resize surface {} to {}x{}: {}",
                self.handle, width, height, e
            );
            return;
        }

        state.view_width = width;
        state.view_height = height;
        debug!("Resized renderer {} to {}x{}", self.handle, width, height);
    }

    fn release(&self) {
        let surface = self.state.lock().surface.take();
        match surface {
            Some(surface) => {
                drop(surface);
                debug!("Released renderer {}", self.handle);
            }
            None => warn!("Renderer {} released more than once", self.handle),
        }
    }
}

impl FrameSink for SoftwareTextureRenderer {
    fn write_frame(&self, frame: &VideoFrame<'_>) -> Result<(), RenderError> {
        frame.validate()?;

        let mut state = self.state.lock();
        let surface = state
            .surface
            .as_mut()
            .ok_or(RenderError::Released(self.handle))?;

        if frame.format != surface.format() {
            return Err(RenderError::FormatMismatch {
                frame: frame.format,
                surface: surface.format(),
            });
        }

        let (dst_width, dst_height) = (surface.width(), surface.height());
        if frame.width > 0 && frame.height > 0 {
            let bpp = surface.format().bytes_per_pixel() as usize;
            let stride = surface.stride();
            let pixels = surface.pixels_mut();

            for y in 0..dst_height {
                let src_y = (y as u64 * frame.height as u64 / dst_height as u64) as u32;
                let row = &mut pixels[y as usize * stride..(y as usize + 1) * stride];
                for x in 0..dst_width {
                    let src_x = (x as u64 * frame.width as u64 / dst_width as u64) as u32;
                    let offset = x as usize * bpp;
                    row[offset..offset + bpp].copy_from_slice(frame.pixel(src_x, src_y));
                }
            }
        }

        state.frames_rendered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use crate::registry::RendererRegistry;
    use crate::surface::{PixelFormat, SurfaceAllocator, SurfaceOptions};

    fn renderer(width: u32, height: u32) -> SoftwareTextureRenderer {
        let surface = SurfaceAllocator::default().allocate(width, height).unwrap();
        SoftwareTextureRenderer::create(surface, width, height)
    }

    #[test]
    fn test_create_adopts_surface_handle() {
        let surface = SurfaceAllocator::default().allocate(32, 32).unwrap();
        let handle = surface.handle();
        let renderer = SoftwareTextureRenderer::create(surface, 64, 48);
        assert_eq!(renderer.handle(), handle);
        assert_eq!(renderer.size(), (64, 48));
        assert_eq!(renderer.snapshot().unwrap().len(), 64 * 48 * 4);
    }

    #[test]
    fn test_resize() {
        let renderer = renderer(640, 480);
        renderer.resize(1280, 720);
        assert_eq!(renderer.size(), (1280, 720));
        assert_eq!(renderer.snapshot().unwrap().len(), 1280 * 720 * 4);
    }

    #[test]
    fn test_write_frame_same_size() {
        let renderer = renderer(2, 2);
        let data: Vec<u8> = (0..16).collect();
        let frame = VideoFrame::packed(2, 2, PixelFormat::Bgra8888, &data);
        renderer.write_frame(&frame).unwrap();
        assert_eq!(renderer.snapshot().unwrap(), data);
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn test_write_frame_upscales() {
        let renderer = renderer(4, 2);
        let data = [1, 1, 1, 1, 2, 2, 2, 2];
        let frame = VideoFrame::packed(2, 1, PixelFormat::Bgra8888, &data);
        renderer.write_frame(&frame).unwrap();

        let pixels = renderer.snapshot().unwrap();
        let firsts: Vec<u8> = pixels.chunks(4).map(|px| px[0]).collect();
        assert_eq!(firsts, vec![1, 1, 2, 2, 1, 1, 2, 2]);
    }

    #[test]
    fn test_write_frame_format_mismatch() {
        let renderer = renderer(2, 2);
        let data = [0u8; 16];
        let frame = VideoFrame::packed(2, 2, PixelFormat::Rgba8888, &data);
        assert_eq!(
            renderer.write_frame(&frame),
            Err(RenderError::FormatMismatch {
                frame: PixelFormat::Rgba8888,
                surface: PixelFormat::Bgra8888,
            })
        );
        assert_eq!(renderer.frames_rendered(), 0);
    }

    #[test]
    fn test_write_after_release() {
        let renderer = renderer(2, 2);
        renderer.release();
        assert!(renderer.is_released());
        assert!(renderer.snapshot().is_none());

        let data = [0u8; 16];
        let frame = VideoFrame::packed(2, 2, PixelFormat::Bgra8888, &data);
        assert_eq!(
            renderer.write_frame(&frame),
            Err(RenderError::Released(renderer.handle()))
        );
    }

    #[test]
    fn test_resize_to_zero_accepts_frames() {
        let renderer = renderer(8, 8);
        renderer.resize(0, 0);
        let data = [0u8; 16];
        let frame = VideoFrame::packed(2, 2, PixelFormat::Bgra8888, &data);
        assert!(renderer.write_frame(&frame).is_ok());
        assert_eq!(renderer.snapshot().unwrap().len(), 0);
    }

    #[test]
    fn test_resize_overflow_keeps_surface() {
        let renderer = renderer(640, 480);
        renderer.resize(u32::MAX, u32::MAX);
        assert_eq!(renderer.size(), (640, 480));
        assert_eq!(renderer.snapshot().unwrap().len(), 640 * 480 * 4);
    }

    #[test]
    fn test_update_beyond_limit_keeps_surface() {
        let registry = RendererRegistry::<SoftwareTextureRenderer>::new();
        let surface = SurfaceAllocator::default().allocate(64, 64).unwrap();
        let handle = registry.create(surface, 64, 64);

        registry.update(handle, 20000, 20000);
        let renderer = registry.get(handle).unwrap();
        assert_eq!(renderer.size(), (64, 64));
        assert_eq!(renderer.snapshot().unwrap().len(), 64 * 64 * 4);
    }

    #[test]
    fn test_create_beyond_limit_keeps_surface_size() {
        let allocator = SurfaceAllocator::new(SurfaceOptions {
            max_dimension: 128,
            ..SurfaceOptions::default()
        });
        let surface = allocator.allocate(32, 32).unwrap();
        let renderer = SoftwareTextureRenderer::create(surface, 256, 256);
        assert_eq!(renderer.size(), (32, 32));
        assert_eq!(renderer.snapshot().unwrap().len(), 32 * 32 * 4);
    }

    #[test]
    fn test_resize_while_writing_frames() {
        let registry = Arc::new(RendererRegistry::<SoftwareTextureRenderer>::new());
        let surface = SurfaceAllocator::default().allocate(64, 64).unwrap();
        let handle = registry.create(surface, 64, 64);
        let sizes: Vec<(u32, u32)> = (1..=40).map(|n| (n * 8, 40 + n * 3)).collect();
        let last = *sizes.last().unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let registry = registry.clone();
            let done = done.clone();
            thread::spawn(move || {
                let data = vec![0x5au8; 16 * 16 * 4];
                let frame = VideoFrame::packed(16, 16, PixelFormat::Bgra8888, &data);
                let mut writes = 0u64;
                while !done.load(Ordering::SeqCst) || writes == 0 {
                    let renderer = registry.get(handle).unwrap();
                    renderer.write_frame(&frame).unwrap();
                    writes += 1;
                }
                writes
            })
        };

        for (width, height) in sizes {
            registry.update(handle, width, height);
            thread::yield_now();
        }
        done.store(true, Ordering::SeqCst);

        let writes = writer.join().unwrap();
        let renderer = registry.get(handle).unwrap();
        assert_eq!(renderer.frames_rendered(), writes);
        assert_eq!(renderer.size(), last);
        assert_eq!(
            renderer.snapshot().unwrap().len(),
            (last.0 * last.1 * 4) as usize
        );
    }
}

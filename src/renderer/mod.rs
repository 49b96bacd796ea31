//! Rendering module
//!
//! Renderers own a surface and accept decoded video frames. The registry
//! only relies on the lifecycle contract in [`TextureRenderer`]; frame
//! writes go through [`FrameSink`].

pub mod frame;
pub mod software;

pub use frame::{RenderError, VideoFrame};
pub use software::SoftwareTextureRenderer;

use crate::surface::TextureHandle;

/// Lifecycle contract of a renderer bound to a surface
pub trait TextureRenderer: Send + Sync + 'static {
    /// Surface the renderer is constructed from
    type Surface: Send;

    /// Bind a renderer to `surface` with an initial view size.
    ///
    /// The renderer adopts the surface's handle.
    fn create(surface: Self::Surface, width: u32, height: u32) -> Self;

    /// Handle the renderer is registered under
    fn handle(&self) -> TextureHandle;

    /// Current view size
    fn size(&self) -> (u32, u32);

    /// Update the view size, reallocating buffers as needed
    fn resize(&self, width: u32, height: u32);

    /// Free the surface and any native resources.
    ///
    /// Not idempotent: callers must invoke this at most once.
    fn release(&self);
}

/// A renderer that the media pipeline can push frames into
pub trait FrameSink {
    /// Write one frame, scaled to the current view size
    fn write_frame(&self, frame: &VideoFrame<'_>) -> Result<(), RenderError>;
}

//! Surface provisioning
//!
//! Surfaces are the drawables renderers are bound to. The allocator
//! assigns each surface a handle that the renderer and the registry
//! adopt as their key.

pub mod allocator;
pub mod pixel;

pub use allocator::{SurfaceAllocator, SurfaceError, SurfaceOptions, DEFAULT_MAX_DIMENSION};
pub use pixel::{PixelFormat, PixelSurface, TextureHandle};

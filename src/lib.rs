//! Vidtex - a registry of texture renderers for video playback
//!
//! Vidtex mediates between a UI layer that owns display surfaces and a
//! media pipeline that writes decoded frames into them. Every renderer
//! lives in one registry, keyed by the handle of the surface it is bound
//! to, so no writer ever sees a renderer that is half built or already
//! released.
//!
//! # Architecture
//!
//! - **Surfaces**: memory-mapped pixel buffers handed out with fresh handles
//! - **Renderers**: the [`TextureRenderer`](renderer::TextureRenderer)
//!   lifecycle contract and a software implementation
//! - **Registry**: the handle table, plus a process-wide instance
//! - **Dispatch**: a calloop command loop applying UI lifecycle requests
//!
//! # Example
//!
//! ```
//! use vidtex::registry::RendererRegistry;
//! use vidtex::renderer::{SoftwareTextureRenderer, TextureRenderer};
//! use vidtex::surface::SurfaceAllocator;
//!
//! let registry = RendererRegistry::<SoftwareTextureRenderer>::new();
//! let surface = SurfaceAllocator::default().allocate(640, 480).unwrap();
//!
//! let handle = registry.create(surface, 640, 480);
//! registry.update(handle, 1280, 720);
//! assert_eq!(registry.get(handle).unwrap().size(), (1280, 720));
//!
//! registry.destroy(handle);
//! assert!(registry.get(handle).is_none());
//! ```

pub mod dispatch;
pub mod registry;
pub mod renderer;
pub mod surface;

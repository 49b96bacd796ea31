//! Renderer table
//!
//! Maps texture handles to the renderers that own them. Every lifecycle
//! transition goes through one coarse lock over the whole table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::{debug, error};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::renderer::TextureRenderer;
use crate::surface::TextureHandle;

/// Scoped borrow of a registered renderer.
///
/// Destruction of any renderer waits until every outstanding guard is
/// dropped. Do not call back into the registry while holding one.
///
/// That includes a second [`get`](RendererRegistry::get) on the same
/// thread: once a `create`, `destroy` or `clear` is waiting for the write
/// lock, new readers queue behind it, so the nested lookup never returns
/// and the writer never gets the lock. Drop the first guard, or use
/// [`with_renderer`](RendererRegistry::with_renderer) per renderer.
pub type RendererRef<'a, R> = MappedRwLockReadGuard<'a, R>;

/// Thread-safe registry of texture renderers keyed by handle
pub struct RendererRegistry<R: TextureRenderer> {
    renderers: RwLock<HashMap<TextureHandle, R>>,
}

impl<R: TextureRenderer> RendererRegistry<R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            renderers: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a renderer to `surface` and register it under its handle
    pub fn create(&self, surface: R::Surface, width: u32, height: u32) -> TextureHandle {
        let renderer = R::create(surface, width, height);
        let handle = renderer.handle();

        let displaced = match self.renderers.write().entry(handle) {
            Entry::Vacant(slot) => {
                slot.insert(renderer);
                None
            }
            Entry::Occupied(mut slot) => Some(slot.insert(renderer)),
        };

        if let Some(old) = displaced {
            error!("Handle {} was already registered, releasing the old renderer", handle);
            old.release();
        }

        debug!("Registered renderer {} ({}x{})", handle, width, height);
        handle
    }

    /// Resize a renderer. Unknown handles are ignored.
    pub fn update(&self, handle: TextureHandle, width: u32, height: u32) {
        let renderers = self.renderers.read();
        let Some(renderer) = renderers.get(&handle) else {
            debug!("Update of unknown renderer {}", handle);
            return;
        };

        renderer.resize(width, height);
    }

    /// Unregister and release a renderer. Unknown handles are ignored.
    pub fn destroy(&self, handle: TextureHandle) {
        let removed = self.renderers.write().remove(&handle);
        let Some(renderer) = removed else {
            debug!("Destroy of unknown renderer {}", handle);
            return;
        };

        renderer.release();
        debug!("Destroyed renderer {}", handle);
    }

    /// Borrow a renderer for the duration of a frame write
    pub fn get(&self, handle: TextureHandle) -> Option<RendererRef<'_, R>> {
        RwLockReadGuard::try_map(self.renderers.read(), |renderers| renderers.get(&handle)).ok()
    }

    /// Run `f` against a renderer, if registered
    pub fn with_renderer<T>(&self, handle: TextureHandle, f: impl FnOnce(&R) -> T) -> Option<T> {
        self.renderers.read().get(&handle).map(f)
    }

    /// Whether a handle is registered
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.renderers.read().contains_key(&handle)
    }

    /// Handles of all registered renderers
    pub fn handles(&self) -> Vec<TextureHandle> {
        self.renderers.read().keys().copied().collect()
    }

    /// Get count of renderers
    pub fn len(&self) -> usize {
        self.renderers.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.renderers.read().is_empty()
    }

    /// Unregister and release every renderer, returning how many there were
    pub fn clear(&self) -> usize {
        let drained: Vec<(TextureHandle, R)> = self.renderers.write().drain().collect();
        let count = drained.len();

        for (handle, renderer) in drained {
            renderer.release();
            debug!("Released renderer {} during teardown", handle);
        }

        count
    }
}

impl<R: TextureRenderer> Default for RendererRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TextureRenderer> std::fmt::Debug for RendererRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.handles())
            .finish()
    }
}

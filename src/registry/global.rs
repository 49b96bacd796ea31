//! Process-wide renderer registry
//!
//! The UI side and the media pipeline share one registry of software
//! renderers. It is created on first access and lives for the rest of
//! the process; [`shutdown_global`] empties it without tearing it down.

use std::sync::OnceLock;

use log::info;

use crate::renderer::SoftwareTextureRenderer;

use super::RendererRegistry;

/// Registry type behind [`global`]
pub type GlobalRegistry = RendererRegistry<SoftwareTextureRenderer>;

static GLOBAL_REGISTRY: OnceLock<GlobalRegistry> = OnceLock::new();

/// Get the process-wide registry, creating it on first use
pub fn global() -> &'static GlobalRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        info!("Initializing global renderer registry");
        RendererRegistry::new()
    })
}

/// Release every renderer in the process-wide registry.
///
/// Returns the number of renderers released. Does nothing if the registry
/// was never initialized.
pub fn shutdown_global() -> usize {
    let Some(registry) = GLOBAL_REGISTRY.get() else {
        return 0;
    };

    let released = registry.clear();
    info!("Global renderer registry shut down, released {} renderers", released);
    released
}

//! Renderer registry
//!
//! This module holds the table that owns every live renderer:
//! - Creation, resize and destruction requested by the UI side
//! - Scoped lookups for the media pipeline writing frames
//! - The process-wide instance shared by both

pub mod global;
pub mod table;

pub use global::{global, shutdown_global, GlobalRegistry};
pub use table::{RendererRef, RendererRegistry};

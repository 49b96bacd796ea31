//! Command dispatch
//!
//! The UI side does not call the registry directly. It sends lifecycle
//! commands over a channel to a [`CommandLoop`], which allocates surfaces
//! and applies the commands in order.

pub mod command;
pub mod event_loop;

pub use command::{CommandSender, DispatchError, RendererCommand};
pub use event_loop::CommandLoop;

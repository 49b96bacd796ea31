//! Lifecycle commands sent from the UI side

use std::sync::mpsc;

use calloop::channel::Sender;

use crate::surface::{SurfaceError, TextureHandle};

/// A renderer lifecycle request
#[derive(Debug)]
pub enum RendererCommand {
    /// Allocate a surface and register a renderer for it
    Create {
        width: u32,
        height: u32,
        reply: mpsc::Sender<Result<TextureHandle, SurfaceError>>,
    },
    /// The UI view changed size
    Update {
        handle: TextureHandle,
        width: u32,
        height: u32,
    },
    /// The UI view was torn down
    Destroy { handle: TextureHandle },
    /// Stop the command loop
    Shutdown,
}

/// Dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Command loop is no longer running")]
    Disconnected,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Cloneable handle for sending commands to a [`CommandLoop`](super::CommandLoop)
#[derive(Clone)]
pub struct CommandSender {
    sender: Sender<RendererCommand>,
}

impl CommandSender {
    pub(crate) fn new(sender: Sender<RendererCommand>) -> Self {
        Self { sender }
    }

    /// Send a raw command
    pub fn send(&self, command: RendererCommand) -> Result<(), DispatchError> {
        self.sender
            .send(command)
            .map_err(|_| DispatchError::Disconnected)
    }

    /// Request a renderer and wait for its handle.
    ///
    /// Blocks until the loop has processed the request, so it must not be
    /// called from the thread running the loop.
    pub fn create(&self, width: u32, height: u32) -> Result<TextureHandle, DispatchError> {
        let (reply, response) = mpsc::channel();
        self.send(RendererCommand::Create {
            width,
            height,
            reply,
        })?;

        let handle = response.recv().map_err(|_| DispatchError::Disconnected)??;
        Ok(handle)
    }

    /// Request a resize
    pub fn update(
        &self,
        handle: TextureHandle,
        width: u32,
        height: u32,
    ) -> Result<(), DispatchError> {
        self.send(RendererCommand::Update {
            handle,
            width,
            height,
        })
    }

    /// Request destruction
    pub fn destroy(&self, handle: TextureHandle) -> Result<(), DispatchError> {
        self.send(RendererCommand::Destroy { handle })
    }

    /// Ask the loop to stop
    pub fn shutdown(&self) -> Result<(), DispatchError> {
        self.send(RendererCommand::Shutdown)
    }
}

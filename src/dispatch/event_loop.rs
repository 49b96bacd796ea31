//! Command loop
//!
//! Runs renderer lifecycle commands on a calloop event loop, so every
//! create/update/destroy issued by the UI side is applied in order on one
//! thread while the media pipeline reads the registry from others.

use std::time::Duration;

use calloop::channel::{self, Event};
use calloop::{EventLoop as CalLoop, LoopSignal};
use log::{debug, error, warn};

use crate::registry::GlobalRegistry;
use crate::surface::SurfaceAllocator;

use super::{CommandSender, RendererCommand};

/// State the command callbacks operate on
struct DispatchState {
    registry: &'static GlobalRegistry,
    allocator: SurfaceAllocator,
    running: bool,
}

impl DispatchState {
    fn handle(&mut self, command: RendererCommand) {
        match command {
            RendererCommand::Create {
                width,
                height,
                reply,
            } => {
                let result = self
                    .allocator
                    .allocate(width, height)
                    .map(|surface| self.registry.create(surface, width, height));

                match &result {
                    Ok(handle) => debug!("Created renderer {} for UI", handle),
                    Err(e) => warn!("Failed to allocate {}x{} surface: {}", width, height, e),
                }

                // Nobody is left to learn the handle, so nobody would destroy it.
                if let Err(unclaimed) = reply.send(result) {
                    if let Ok(handle) = unclaimed.0 {
                        warn!("Create request for {} was abandoned", handle);
                        self.registry.destroy(handle);
                    }
                }
            }
            RendererCommand::Update {
                handle,
                width,
                height,
            } => {
                debug!("Update renderer {} to {}x{}", handle, width, height);
                self.registry.update(handle, width, height);
            }
            RendererCommand::Destroy { handle } => {
                debug!("Destroy renderer {}", handle);
                self.registry.destroy(handle);
            }
            RendererCommand::Shutdown => {
                debug!("Command loop shutdown requested");
                self.running = false;
            }
        }
    }
}

/// Event loop applying renderer commands to a registry
pub struct CommandLoop {
    /// Calloop event loop
    event_loop: CalLoop<'static, DispatchState>,
    /// Callback state
    state: DispatchState,
    /// Loop signal for waking
    signal: LoopSignal,
}

impl CommandLoop {
    /// Create a command loop over `registry` and the sender that feeds it
    pub fn new(
        registry: &'static GlobalRegistry,
        allocator: SurfaceAllocator,
    ) -> anyhow::Result<(Self, CommandSender)> {
        let event_loop = CalLoop::try_new()?;
        let signal = event_loop.get_signal();

        let (sender, commands) = channel::channel();
        event_loop
            .handle()
            .insert_source(commands, |event, _, state: &mut DispatchState| match event {
                Event::Msg(command) => state.handle(command),
                Event::Closed => {
                    debug!("All command senders dropped");
                    state.running = false;
                }
            })
            .map_err(|e| anyhow::anyhow!("Failed to register command channel: {}", e.error))?;

        let state = DispatchState {
            registry,
            allocator,
            running: true,
        };

        Ok((
            Self {
                event_loop,
                state,
                signal,
            },
            CommandSender::new(sender),
        ))
    }

    /// Whether the loop will keep accepting commands
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Get the loop signal for waking from another thread
    pub fn signal(&self) -> LoopSignal {
        self.signal.clone()
    }

    /// Run one iteration of the event loop
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> anyhow::Result<()> {
        self.event_loop.dispatch(timeout, &mut self.state)?;
        Ok(())
    }

    /// Run until a shutdown command arrives or every sender is dropped
    pub fn run(&mut self) -> anyhow::Result<()> {
        debug!("Starting command loop");

        while self.state.running {
            if let Err(e) = self.dispatch(None) {
                error!("Command loop error: {}", e);
                return Err(e);
            }
        }

        debug!("Command loop stopped");
        Ok(())
    }

    /// Stop the loop after the current iteration
    pub fn stop(&mut self) {
        self.state.running = false;
        self.signal.wakeup();
    }
}

//! Vidtex demo driver
//!
//! Runs the command loop on the main thread while a scripted UI thread
//! creates, resizes and destroys renderers and a pipeline thread pushes
//! synthetic frames into them.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use vidtex::dispatch::{CommandLoop, CommandSender};
use vidtex::registry::{global, shutdown_global};
use vidtex::renderer::{FrameSink, SoftwareTextureRenderer, VideoFrame};
use vidtex::surface::{PixelFormat, SurfaceAllocator, TextureHandle};

const DEFAULT_FRAMES: u32 = 30;

/// Messages from the UI thread to the pipeline thread
#[derive(Debug)]
enum PipelineEvent {
    StartStream(TextureHandle),
    StopStream(TextureHandle),
}

fn run_ui(sender: CommandSender, pipeline: mpsc::Sender<PipelineEvent>) -> anyhow::Result<()> {
    let preview = sender.create(640, 480)?;
    let remote = sender.create(320, 240)?;
    info!("UI created renderers {} and {}", preview, remote);

    for handle in [preview, remote] {
        pipeline.send(PipelineEvent::StartStream(handle))?;
    }

    thread::sleep(Duration::from_millis(50));
    sender.update(preview, 1280, 720)?;

    thread::sleep(Duration::from_millis(50));
    pipeline.send(PipelineEvent::StopStream(remote))?;
    sender.destroy(remote)?;

    thread::sleep(Duration::from_millis(50));
    sender.shutdown()?;
    Ok(())
}

fn run_pipeline(events: mpsc::Receiver<PipelineEvent>, frames: u32) {
    let (width, height) = (160, 120);
    let mut streams: Vec<TextureHandle> = Vec::new();
    let mut data = vec![0u8; (width * height * 4) as usize];

    for n in 0..frames {
        while let Ok(event) = events.try_recv() {
            match event {
                PipelineEvent::StartStream(handle) => streams.push(handle),
                PipelineEvent::StopStream(handle) => streams.retain(|h| *h != handle),
            }
        }

        data.fill((n % 256) as u8);
        let frame = VideoFrame::packed(width, height, PixelFormat::Bgra8888, &data);

        for handle in &streams {
            let written = global().with_renderer(*handle, |renderer: &SoftwareTextureRenderer| {
                renderer.write_frame(&frame)
            });
            match written {
                Some(Ok(())) => {}
                Some(Err(e)) => warn!("Frame write to {} failed: {}", handle, e),
                None => debug!("Renderer {} is gone, dropping frame", handle),
            }
        }

        thread::sleep(Duration::from_millis(5));
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => DEFAULT_FRAMES,
    };

    info!("Starting vidtex demo with {} frames", frames);

    let (mut command_loop, sender) = CommandLoop::new(global(), SurfaceAllocator::default())?;
    let (pipeline_tx, pipeline_rx) = mpsc::channel();

    let pipeline = thread::spawn(move || run_pipeline(pipeline_rx, frames));
    let ui = thread::spawn(move || run_ui(sender, pipeline_tx));

    command_loop.run()?;

    ui.join()
        .map_err(|_| anyhow::anyhow!("UI thread panicked"))??;
    pipeline
        .join()
        .map_err(|_| anyhow::anyhow!("Pipeline thread panicked"))?;

    for handle in global().handles() {
        if let Some(frames) = global().with_renderer(handle, |r| r.frames_rendered()) {
            info!("Renderer {} rendered {} frames", handle, frames);
        }
    }

    let released = shutdown_global();
    info!("Released {} renderers at exit", released);

    Ok(())
}

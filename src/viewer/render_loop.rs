//! # Render Loop
//!
//! Fixed-rate redraw on the main task:
//!
//! 1. wait for the next tick (ticks sit on a fixed grid, a slow frame does
//!    not shift the ones after it)
//! 2. drain every buffered message into `Renderer::update`, in arrival order
//! 3. `Renderer::draw` once, then present the canvas
//!
//! Updates and the draw happen under one renderer lock, so a frame never
//! shows a state half-way through a key press.

use crate::viewer::canvas::Canvas;
use crate::viewer::io::RenderStream;
use crate::viewer::renderers::SharedRenderer;
use crate::viewer::transport::Subscription;
use anyhow::Result;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Frame period for a rate in Hz, zero treated as 1 Hz
pub fn frame_period(frame_rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)))
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub messages: usize,
}

pub struct RenderLoop<RS: RenderStream> {
    renderer: SharedRenderer,
    subscription: Subscription,
    canvas: Canvas,
    out: RS,
    period: Duration,
    frames: u64,
}

impl<RS: RenderStream> RenderLoop<RS> {
    pub fn new(
        renderer: SharedRenderer,
        subscription: Subscription,
        canvas: Canvas,
        out: RS,
        frame_rate: u32,
    ) -> Self {
        Self {
            renderer,
            subscription,
            canvas,
            out,
            period: frame_period(frame_rate),
            frames: 0,
        }
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn render_stream(&mut self) -> &mut RS {
        &mut self.out
    }

    /// One iteration without the wait: drain, update, draw, present
    pub fn tick(&mut self) -> Result<TickStats> {
        let messages = self.subscription.drain();
        let (width, height) = self.out.get_size()?;
        self.canvas.resize(width, height);

        {
            let mut renderer = self.renderer.lock();
            for message in &messages {
                renderer.update(message);
            }
            renderer.draw(&mut self.canvas);
        }

        self.canvas.present(&mut self.out)?;
        self.frames += 1;

        if !messages.is_empty() {
            tracing::trace!(messages = messages.len(), frame = self.frames, "frame drawn");
        }
        Ok(TickStats {
            messages: messages.len(),
        })
    }

    /// Tick at the configured rate until `cancel` fires
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(
            stream = self.subscription.stream(),
            period_ms = self.period.as_millis() as u64,
            "render loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick()?;
                }
            }
        }

        tracing::debug!(frames = self.frames, "render loop stopped");
        Ok(())
    }
}

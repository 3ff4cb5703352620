//! # Viewer Controller
//!
//! Orchestrates one viewing session. Startup is strictly ordered:
//!
//! ```text
//! discovery wait ─▶ dispatch (renderer built) ─▶ subscribe ─▶ terminal setup
//!                                                                  │
//!                  ┌───────────────────────────────────────────────┤
//!                  ▼                                               ▼
//!        InputPump (own thread)                       RenderLoop (this task)
//!                  └──────────── shared CancellationToken ─────────┘
//!                                        │
//!                                        ▼
//!                        join pump, restore terminal, return
//! ```

use crate::cmd_args::CommandLineArgs;
use crate::config;
use crate::viewer::canvas::{Canvas, CanvasMode, ColorSupport};
use crate::viewer::dispatch::DispatchResolver;
use crate::viewer::input::{InputPump, PumpExit};
use crate::viewer::io::{ByteStream, RenderStream};
use crate::viewer::render_loop::RenderLoop;
use crate::viewer::renderers::share;
use crate::viewer::transport::{SchemaId, Transport};
use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Settings of one viewing session
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub stream: String,
    pub canvas_mode: CanvasMode,
    pub color_support: ColorSupport,
    pub frame_rate: u32,
    pub discovery_wait: Duration,
}

impl ViewerOptions {
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            canvas_mode: CanvasMode::Unicode,
            color_support: ColorSupport::AutoDetect,
            frame_rate: config::DEFAULT_FRAME_RATE,
            discovery_wait: config::DEFAULT_DISCOVERY_WAIT,
        }
    }

    /// Options for `stream` from parsed command line arguments
    pub fn from_args(stream: &str, args: &CommandLineArgs) -> Self {
        Self {
            stream: stream.to_string(),
            canvas_mode: args.canvas_mode(),
            color_support: args.color_support(),
            frame_rate: args.frame_rate(),
            discovery_wait: args.discovery_wait(),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub schema: SchemaId,
    pub frames: u64,
    pub pump_exit: Option<PumpExit>,
}

pub struct ViewerController<T: Transport> {
    options: ViewerOptions,
    transport: T,
    resolver: DispatchResolver,
}

impl<T: Transport> ViewerController<T> {
    pub fn new(options: ViewerOptions, transport: T) -> Self {
        Self::with_resolver(options, transport, DispatchResolver::default())
    }

    pub fn with_resolver(options: ViewerOptions, transport: T, resolver: DispatchResolver) -> Self {
        Self {
            options,
            transport,
            resolver,
        }
    }

    /// Run a session until `cancel` fires or the keyboard sends Ctrl+C.
    ///
    /// Dispatch failures come back as [`DispatchError`](crate::viewer::dispatch::DispatchError)
    /// inside the `anyhow::Error`, before the terminal is touched.
    pub async fn run<BS, RS>(
        &self,
        input: BS,
        mut out: RS,
        cancel: CancellationToken,
    ) -> Result<SessionReport>
    where
        BS: ByteStream + 'static,
        RS: RenderStream,
    {
        let stream = self.options.stream.as_str();

        if !self.options.discovery_wait.is_zero() {
            tracing::debug!(
                wait_ms = self.options.discovery_wait.as_millis() as u64,
                "waiting for topic discovery"
            );
            tokio::time::sleep(self.options.discovery_wait).await;
        }

        let canvas = Canvas::new(self.options.canvas_mode, self.options.color_support);
        let resolution = self.resolver.resolve(stream, &self.transport, &canvas)?;
        let subscription = self
            .transport
            .subscribe(stream, &resolution.schema)
            .with_context(|| format!("cannot subscribe to {stream}"))?;
        let renderer = share(resolution.renderer);

        if let Err(e) = enter_terminal(&mut out) {
            leave_terminal(&mut out);
            return Err(e.context("cannot set up the terminal"));
        }

        let pump = match InputPump::new(input, renderer.clone(), cancel.clone()).spawn() {
            Ok(pump) => pump,
            Err(e) => {
                leave_terminal(&mut out);
                return Err(e);
            }
        };

        let mut render_loop = RenderLoop::new(
            renderer,
            subscription,
            canvas,
            out,
            self.options.frame_rate,
        );
        let loop_result = render_loop.run(cancel.clone()).await;
        if let Err(e) = &loop_result {
            tracing::error!(error = %e, "render loop failed");
        }

        // The pump re-checks the token at least every poll interval.
        cancel.cancel();
        let pump_exit = match tokio::task::spawn_blocking(move || pump.join()).await {
            Ok(Ok(Ok(exit))) => Some(exit),
            Ok(Ok(Err(e))) => {
                tracing::error!(error = %e, "input pump failed");
                None
            }
            Ok(Err(_)) | Err(_) => {
                tracing::error!("input pump panicked");
                None
            }
        };

        leave_terminal(render_loop.render_stream());
        loop_result?;

        Ok(SessionReport {
            schema: resolution.schema,
            frames: render_loop.frames(),
            pump_exit,
        })
    }
}

fn enter_terminal<RS: RenderStream>(out: &mut RS) -> Result<()> {
    out.enable_raw_mode()?;
    out.enter_alternate_screen()?;
    out.hide_cursor()?;
    out.clear_screen()?;
    Ok(())
}

/// Best effort: every step is attempted even if an earlier one fails
fn leave_terminal<RS: RenderStream>(out: &mut RS) {
    let steps = [
        out.set_foreground(None),
        out.show_cursor(),
        out.leave_alternate_screen(),
        out.disable_raw_mode(),
    ];
    for step in steps {
        if let Err(e) = step {
            tracing::warn!(error = %e, "terminal restore step failed");
        }
    }
}

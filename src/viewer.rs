//! # Viewer Module
//!
//! Everything needed to show one live stream in the terminal:
//!
//! - **Dispatch**: pick a renderer from the stream's published schema
//! - **Render loop**: drain buffered messages and redraw at a fixed rate
//! - **Input pump**: decode keyboard bytes on their own thread
//!
//! ## Architecture Overview
//!
//! ```text
//!  Transport ──▶ Subscription ──▶ RenderLoop ──▶ Canvas ──▶ RenderStream
//!                                     │
//!                              SharedRenderer (Mutex)
//!                                     ▲
//!  ByteStream ──▶ KeyDecoder ──▶ InputPump
//! ```

pub mod canvas;
pub mod controller;
pub mod dispatch;
pub mod input;
pub mod io;
pub mod render_loop;
pub mod renderers;
pub mod transport;

pub use canvas::{Canvas, CanvasMode, ColorSupport};
pub use controller::{SessionReport, ViewerController, ViewerOptions};
pub use dispatch::{DispatchError, DispatchResolver, RendererRegistry};
pub use input::{InputPump, KeyDecoder, KeyEvent, PumpExit};
pub use render_loop::RenderLoop;
pub use renderers::{KeyInput, Renderer, SharedRenderer};
pub use transport::{Bus, JsonLinesFeed, Message, SchemaId, Subscription, Transport};

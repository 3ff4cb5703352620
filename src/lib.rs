//! # rosshow - Live Topic Viewer for the Terminal
//!
//! Point it at a stream name; it waits briefly for publishers, picks a
//! renderer for the stream's message type and redraws it at a fixed rate
//! until Ctrl+C.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   messages   ┌──────────────┐    draw     ┌──────────┐
//! │  Transport  │─────────────▶│  RenderLoop  │────────────▶│  Canvas  │
//! │  (Bus)      │              │  (main task) │             │          │
//! └─────────────┘              └──────────────┘             └──────────┘
//!                                     ▲                          │
//!                                     │ shared renderer          │ present
//!                              ┌──────────────┐           ┌──────────────┐
//!                              │  InputPump   │           │ RenderStream │
//!                              │  (thread)    │           │  (terminal)  │
//!                              └──────────────┘           └──────────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod viewer;

// Re-export main types for easy access
pub use viewer::*;

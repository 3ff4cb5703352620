//! # I/O Abstraction Layer
//!
//! Trait seams for terminal input and output so the viewer can be driven
//! headlessly in tests.
//!
//! ## Design Principles
//!
//! - **ByteStream**: raw keyboard bytes, decoded later by the key decoder
//! - **RenderStream**: cursor, colors, screen and terminal-mode control
//! - **Clean Separation**: all crossterm and stdin code lives in `terminal.rs`
//!
//! ## Architecture
//!
//! ```text
//! Production:  InputPump  ──▶ StdinByteStream     ──▶ reader thread ──▶ stdin
//!              RenderLoop ──▶ TerminalRenderStream ──▶ crossterm::execute!()
//!
//! Testing:     InputPump  ──▶ MockByteStream      ──▶ VecDeque<u8>
//!              RenderLoop ──▶ MockRenderStream    ──▶ Vec<RenderCommand>
//! ```

use anyhow::Result;
use crossterm::style::Color;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use mock::{MockByteStream, MockRenderStream, RenderCommand};
pub use terminal::{StdinByteStream, TerminalRenderStream};

/// Type alias for terminal size (width, height)
pub type TerminalSize = (u16, u16);

/// Raw keyboard byte source
pub trait ByteStream: Send {
    /// Wait up to `timeout` for input to become readable.
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read available bytes into `buf`.
    ///
    /// Returns 0 once the source is closed and will never produce more.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Output render stream abstraction
pub trait RenderStream: Write + Send {
    /// Clear the entire screen
    fn clear_screen(&mut self) -> Result<()>;

    /// Move cursor to specific position (column, row)
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    /// Set the foreground color for subsequent writes, `None` resets it
    fn set_foreground(&mut self, color: Option<Color>) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    /// Get terminal size as (width, height)
    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;
}

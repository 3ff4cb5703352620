//! # Mock I/O Implementations for Testing
//!
//! Provides mock implementations of ByteStream and RenderStream traits
//! for testing without terminal dependencies.

use super::{ByteStream, RenderStream, TerminalSize};
use anyhow::Result;
use crossterm::style::Color;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Mock byte stream for testing
///
/// Every queued chunk is returned by exactly one `read`, which lets tests
/// control how bytes are split across reads.
pub struct MockByteStream {
    chunks: VecDeque<Vec<u8>>,
    keep_open: bool,
}

impl MockByteStream {
    /// Stream delivering `bytes` in a single read, then end of input
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_chunks(vec![bytes.into()])
    }

    /// Stream delivering each chunk in its own read, then end of input
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
            keep_open: false,
        }
    }

    /// Once drained, report "no input yet" forever instead of closing.
    ///
    /// Mimics an idle keyboard.
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }
}

impl ByteStream for MockByteStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        if self.chunks.is_empty() && self.keep_open {
            std::thread::sleep(timeout);
            return Ok(false);
        }
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            chunk.drain(..n);
            self.chunks.push_front(chunk);
        }
        Ok(n)
    }
}

/// Recorded render command for verification
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    ClearScreen,
    MoveCursor(u16, u16),
    SetForeground(Option<Color>),
    HideCursor,
    ShowCursor,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    Write(Vec<u8>),
    Flush,
}

/// Type alias for command history
pub type CommandHistory = Arc<Mutex<Vec<RenderCommand>>>;

/// Mock render stream for testing
///
/// Records all rendering commands for verification in tests. The history
/// is shared, so it stays readable after the stream moves into a loop.
pub struct MockRenderStream {
    commands: CommandHistory,
    terminal_size: TerminalSize,
    fail_on: Option<RenderCommand>,
}

impl MockRenderStream {
    /// Create a new mock render stream
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    /// Create a mock render stream with specific terminal size
    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            terminal_size: size,
            fail_on: None,
        }
    }

    /// Make `command` fail instead of being recorded
    pub fn fail_on(mut self, command: RenderCommand) -> Self {
        self.fail_on = Some(command);
        self
    }

    /// Shared handle to the recorded commands
    pub fn history(&self) -> CommandHistory {
        Arc::clone(&self.commands)
    }

    /// Get recorded commands for verification
    pub fn get_commands(&self) -> Vec<RenderCommand> {
        self.commands.lock().clone()
    }

    /// All text written so far, concatenated
    pub fn written_text(&self) -> String {
        written_text(&self.commands)
    }

    fn record(&self, command: RenderCommand) -> Result<()> {
        if self.fail_on.as_ref() == Some(&command) {
            anyhow::bail!("mock terminal refused {command:?}");
        }
        self.commands.lock().push(command);
        Ok(())
    }
}

/// Concatenate every `Write` command of a history
pub fn written_text(history: &CommandHistory) -> String {
    let bytes: Vec<u8> = history
        .lock()
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Write(data) => Some(data.as_slice()),
            _ => None,
        })
        .flatten()
        .copied()
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.record(RenderCommand::Write(buf.to_vec()))
            .map_err(std::io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush).map_err(std::io::Error::other)
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::ClearScreen)
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        self.record(RenderCommand::MoveCursor(x, y))
    }

    fn set_foreground(&mut self, color: Option<Color>) -> Result<()> {
        self.record(RenderCommand::SetForeground(color))
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::HideCursor)
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::ShowCursor)
    }

    fn get_size(&self) -> Result<TerminalSize> {
        Ok(self.terminal_size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::EnterAlternateScreen)
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::LeaveAlternateScreen)
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableRawMode)
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableRawMode)
    }
}

//! # Terminal I/O Implementations
//!
//! Production implementations of I/O abstractions.
//! All crossterm and stdin handling is isolated to this module.

use super::{ByteStream, RenderStream};
use anyhow::Result;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// What the reader thread saw
enum StdinChunk {
    Data(Vec<u8>),
    Closed,
    Failed(io::Error),
}

/// Keyboard bytes from stdin.
///
/// A dedicated reader thread blocks on `read` and forwards every chunk over
/// a channel, which gives `poll` a timeout without touching the file
/// descriptor. The thread is detached: it may be parked in `read` when the
/// viewer stops and goes away with the process.
pub struct StdinByteStream {
    chunks: Receiver<StdinChunk>,
    pending: VecDeque<u8>,
    closed: bool,
}

impl StdinByteStream {
    pub fn new() -> Result<Self> {
        Self::from_reader(io::stdin())
    }

    /// Stream the bytes of any blocking reader
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || read_loop(reader, tx))?;
        Ok(Self {
            chunks: rx,
            pending: VecDeque::new(),
            closed: false,
        })
    }

    fn accept(&mut self, chunk: StdinChunk) -> Result<()> {
        match chunk {
            StdinChunk::Data(data) => self.pending.extend(data),
            StdinChunk::Closed => self.closed = true,
            StdinChunk::Failed(e) => {
                self.closed = true;
                return Err(anyhow::Error::from(e).context("cannot read keyboard input"));
            }
        }
        Ok(())
    }
}

fn read_loop<R: Read>(mut reader: R, tx: Sender<StdinChunk>) {
    let mut buf = [0u8; 256];
    loop {
        let chunk = match reader.read(&mut buf) {
            Ok(0) => StdinChunk::Closed,
            Ok(n) => StdinChunk::Data(buf[..n].to_vec()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => StdinChunk::Failed(e),
        };
        let last = !matches!(chunk, StdinChunk::Data(_));
        if tx.send(chunk).is_err() || last {
            break;
        }
    }
}

impl ByteStream for StdinByteStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        if !self.pending.is_empty() || self.closed {
            return Ok(true);
        }
        match self.chunks.recv_timeout(timeout) {
            Ok(chunk) => self.accept(chunk)?,
            Err(RecvTimeoutError::Timeout) => return Ok(false),
            Err(RecvTimeoutError::Disconnected) => self.closed = true,
        }
        Ok(true)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        while self.pending.is_empty() && !self.closed {
            match self.chunks.recv() {
                Ok(chunk) => self.accept(chunk)?,
                Err(_) => self.closed = true,
            }
        }

        let n = self.pending.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Terminal-based render stream using crossterm
///
/// Commands are queued and only hit the terminal on `flush`, so one frame
/// is written in a single burst.
pub struct TerminalRenderStream<W: Write> {
    writer: W,
}

impl TerminalRenderStream<io::Stdout> {
    /// Create a new terminal render stream using stdout
    pub fn new() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> TerminalRenderStream<W> {
    /// Create a terminal render stream with custom writer
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Write for TerminalRenderStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<W: Write + Send> RenderStream for TerminalRenderStream<W> {
    fn clear_screen(&mut self) -> Result<()> {
        queue!(self.writer, terminal::Clear(terminal::ClearType::All)).map_err(anyhow::Error::from)
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        queue!(self.writer, cursor::MoveTo(x, y)).map_err(anyhow::Error::from)
    }

    fn set_foreground(&mut self, color: Option<Color>) -> Result<()> {
        match color {
            Some(color) => queue!(self.writer, SetForegroundColor(color)),
            None => queue!(self.writer, ResetColor),
        }
        .map_err(anyhow::Error::from)
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.writer, cursor::Hide).map_err(anyhow::Error::from)
    }

    fn show_cursor(&mut self) -> Result<()> {
        execute!(self.writer, cursor::Show).map_err(anyhow::Error::from)
    }

    fn get_size(&self) -> Result<super::TerminalSize> {
        terminal::size().map_err(anyhow::Error::from)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        execute!(self.writer, EnterAlternateScreen).map_err(anyhow::Error::from)
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        execute!(self.writer, LeaveAlternateScreen).map_err(anyhow::Error::from)
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        terminal::enable_raw_mode().map_err(anyhow::Error::from)
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        terminal::disable_raw_mode().map_err(anyhow::Error::from)
    }
}

impl Default for TerminalRenderStream<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_stream_should_queue_until_flush() {
        let mut stream = TerminalRenderStream::with_writer(Vec::new());
        stream.move_cursor(2, 3).unwrap();
        stream.set_foreground(Some(Color::Red)).unwrap();
        stream.write_all(b"hi").unwrap();
        stream.set_foreground(None).unwrap();
        stream.flush().unwrap();

        let out = String::from_utf8(stream.writer.clone()).unwrap();
        assert!(out.starts_with("\x1b[4;3H"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn byte_stream_should_forward_reader_bytes_then_close() {
        let source = io::Cursor::new(b"ab\x1b[D".to_vec());
        let mut stream = StdinByteStream::from_reader(source).unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 2];

        loop {
            assert!(stream.poll(Duration::from_secs(5)).unwrap());
            match stream.read(&mut buf).unwrap() {
                0 => break,
                n => received.extend_from_slice(&buf[..n]),
            }
        }

        assert_eq!(received, b"ab\x1b[D");
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("EIO"))
        }
    }

    #[test]
    fn byte_stream_should_surface_read_errors() {
        let mut stream = StdinByteStream::from_reader(BrokenReader).unwrap();
        assert!(stream.poll(Duration::from_secs(5)).is_err());
    }
}

//! # Input Pump
//!
//! Dedicated thread reading raw keyboard bytes, decoding them and handing
//! key events to the active renderer.
//!
//! Ctrl+C cancels the shared token no matter which renderer is active; every
//! other key is delivered only if the renderer has the key-input capability.
//! A closed or failing byte source cancels the token too.

use super::key_decoder::{KeyDecoder, KeyEvent};
use crate::viewer::io::ByteStream;
use crate::viewer::renderers::SharedRenderer;
use anyhow::Result;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long one `poll` waits before re-checking for cancellation
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

const READ_BUFFER: usize = 64;

/// Why the pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// Ctrl+C was read; the token has been cancelled
    Interrupted,
    /// Someone else cancelled the token
    Cancelled,
    /// The byte source closed; the session ends with it
    EndOfInput,
}

pub struct InputPump<BS: ByteStream> {
    stream: BS,
    decoder: KeyDecoder,
    renderer: SharedRenderer,
    cancel: CancellationToken,
    delivered: usize,
}

impl<BS: ByteStream + 'static> InputPump<BS> {
    pub fn new(stream: BS, renderer: SharedRenderer, cancel: CancellationToken) -> Self {
        Self {
            stream,
            decoder: KeyDecoder::new(),
            renderer,
            cancel,
            delivered: 0,
        }
    }

    /// Run the pump on its own thread
    pub fn spawn(self) -> Result<JoinHandle<Result<PumpExit>>> {
        let handle = thread::Builder::new()
            .name("input-pump".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Blocking read loop.
    ///
    /// However the pump stops, the token is cancelled on the way out: once
    /// the keyboard is gone Ctrl+C can no longer reach the session.
    pub fn run(mut self) -> Result<PumpExit> {
        tracing::debug!("input pump started");
        let result = self.pump();
        self.cancel.cancel();

        match &result {
            Ok(exit) => tracing::debug!(?exit, delivered = self.delivered, "input pump stopped"),
            Err(e) => tracing::error!(error = %e, "input pump failed, ending session"),
        }
        result
    }

    fn pump(&mut self) -> Result<PumpExit> {
        let mut buf = [0u8; READ_BUFFER];
        loop {
            if self.cancel.is_cancelled() {
                return Ok(PumpExit::Cancelled);
            }
            if !self.stream.poll(POLL_INTERVAL)? {
                continue;
            }

            let n = self.stream.read(&mut buf)?;
            if n == 0 {
                return Ok(PumpExit::EndOfInput);
            }
            if self.process(&buf[..n]) {
                return Ok(PumpExit::Interrupted);
            }
        }
    }

    /// Decode one read; returns true once an interrupt was seen
    fn process(&mut self, bytes: &[u8]) -> bool {
        for &byte in bytes {
            match self.decoder.feed(byte) {
                Some(KeyEvent::Interrupt) => {
                    tracing::info!("interrupt received, shutting down");
                    self.cancel.cancel();
                    return true;
                }
                Some(key) => self.deliver(key),
                None => {}
            }
        }
        false
    }

    fn deliver(&mut self, key: KeyEvent) {
        let mut renderer = self.renderer.lock();
        match renderer.key_input() {
            Some(keys) => {
                keys.keypress(key);
                self.delivered += 1;
                tracing::trace!(?key, "key delivered");
            }
            None => tracing::trace!(?key, "renderer ignores keys"),
        }
    }
}

//! # Renderers
//!
//! A renderer turns the messages of one schema into canvas drawing calls.
//!
//! Every renderer implements [`Renderer`]. Reacting to the keyboard is an
//! optional capability: a renderer opts in by implementing [`KeyInput`] and
//! returning itself from [`Renderer::key_input`].

use crate::viewer::canvas::Canvas;
use crate::viewer::input::KeyEvent;
use crate::viewer::transport::Message;
use parking_lot::Mutex;
use std::sync::Arc;

pub mod imu;
pub mod plot;
pub mod summary;

pub use imu::ImuRenderer;
pub use plot::PlotRenderer;
pub use summary::SummaryRenderer;

/// Message-to-canvas converter for one schema
pub trait Renderer: Send {
    /// Fold one decoded message into the renderer state
    fn update(&mut self, message: &Message);

    /// Draw the current state
    fn draw(&mut self, canvas: &mut Canvas);

    /// Key-input capability query
    fn key_input(&mut self) -> Option<&mut dyn KeyInput> {
        None
    }
}

/// Optional keyboard capability of a renderer
pub trait KeyInput {
    fn keypress(&mut self, key: KeyEvent);
}

/// The one renderer instance, shared by the render loop and the input pump.
///
/// Every `update`, `draw` and `keypress` runs under this lock.
pub type SharedRenderer = Arc<Mutex<Box<dyn Renderer>>>;

pub fn share(renderer: Box<dyn Renderer>) -> SharedRenderer {
    Arc::new(Mutex::new(renderer))
}

/// Fixed construction options of a registry binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererOptions {
    entries: &'static [(&'static str, &'static str)],
}

impl RendererOptions {
    pub const EMPTY: RendererOptions = RendererOptions { entries: &[] };

    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}

/// Look up a dotted field path (`orientation.x`) in a message
pub fn field<'a>(message: &'a Message, path: &str) -> Option<&'a Message> {
    path.split('.')
        .try_fold(message, |value, key| value.get(key))
}

/// Numeric value of a field; booleans count as 0/1
pub fn number(message: &Message, path: &str) -> Option<f64> {
    let value = field(message, path)?;
    value
        .as_f64()
        .or_else(|| value.as_bool().map(|b| if b { 1.0 } else { 0.0 }))
}

//! # Dispatch
//!
//! Startup-time binding of a stream to a renderer: the closed
//! [`RendererRegistry`] catalog and the [`DispatchResolver`] policy on top.

pub mod error;
pub mod registry;
pub mod resolver;

pub use error::DispatchError;
pub use registry::{RendererBinding, RendererFactory, RendererRegistry, BUILTIN_BINDINGS};
pub use resolver::{DispatchResolver, Resolution};

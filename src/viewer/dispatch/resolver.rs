//! # Dispatch Resolver
//!
//! Binds a stream name to exactly one renderer, once, at startup.
//!
//! ```text
//! list_topics() ──▶ schemas on stream ──┬─ none      ──▶ StreamNotYetPublished
//!                                       ├─ two+      ──▶ AmbiguousSchema
//!                                       └─ exactly 1 ──▶ registry lookup
//!                                                          ├─ miss ──▶ UnsupportedSchema
//!                                                          └─ hit  ──▶ factory(canvas, stream, options)
//! ```

use super::error::DispatchError;
use super::registry::{RendererBinding, RendererRegistry};
use crate::viewer::canvas::Canvas;
use crate::viewer::renderers::Renderer;
use crate::viewer::transport::{SchemaId, Transport};

/// Outcome of a successful dispatch
pub struct Resolution {
    pub renderer: Box<dyn Renderer>,
    pub schema: SchemaId,
    pub binding: RendererBinding,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("schema", &self.schema)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchResolver {
    registry: RendererRegistry,
}

impl DispatchResolver {
    pub fn new(registry: RendererRegistry) -> Self {
        Self { registry }
    }

    /// Pick the schema and binding for `stream` without constructing anything
    pub fn select(
        &self,
        stream: &str,
        transport: &dyn Transport,
    ) -> Result<(SchemaId, RendererBinding), DispatchError> {
        let mut topics = transport.list_topics().map_err(DispatchError::Transport)?;
        let observed = topics.remove(stream).unwrap_or_default();

        let mut schemas = observed.into_iter();
        let schema = match (schemas.next(), schemas.next()) {
            (None, _) => {
                return Err(DispatchError::StreamNotYetPublished {
                    stream: stream.to_string(),
                })
            }
            (Some(first), Some(second)) => {
                let all = [first, second].into_iter().chain(schemas).collect();
                return Err(DispatchError::AmbiguousSchema {
                    stream: stream.to_string(),
                    schemas: all,
                });
            }
            (Some(only), None) => only,
        };

        let binding = self
            .registry
            .lookup(&schema)
            .copied()
            .ok_or_else(|| DispatchError::UnsupportedSchema {
                stream: stream.to_string(),
                schema: schema.clone(),
            })?;

        Ok((schema, binding))
    }

    /// Select a binding and construct its renderer, titled with the stream name
    pub fn resolve(
        &self,
        stream: &str,
        transport: &dyn Transport,
        canvas: &Canvas,
    ) -> Result<Resolution, DispatchError> {
        let (schema, binding) = self.select(stream, transport)?;
        tracing::info!(stream, schema = %schema, renderer = binding.name, "stream dispatched");

        Ok(Resolution {
            renderer: binding.instantiate(canvas, stream),
            schema,
            binding,
        })
    }
}

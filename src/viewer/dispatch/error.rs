use crate::viewer::transport::SchemaId;
use thiserror::Error;

/// Why a stream could not be bound to a renderer
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Topic {stream} does not appear to be published yet.")]
    StreamNotYetPublished { stream: String },

    #[error("Topic {stream} has multiple types ({}), this is currently not supported", join(.schemas))]
    AmbiguousSchema {
        stream: String,
        schemas: Vec<SchemaId>,
    },

    #[error("Unsupported message type {schema} on topic {stream}.")]
    UnsupportedSchema { stream: String, schema: SchemaId },

    #[error("Could not query the transport: {0:#}")]
    Transport(anyhow::Error),
}

fn join(schemas: &[SchemaId]) -> String {
    schemas
        .iter()
        .map(SchemaId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DispatchError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

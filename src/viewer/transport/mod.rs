//! # Transport
//!
//! The publish/subscribe collaborator the viewer reads from.
//!
//! The viewer only needs two things from a bus: which schemas are currently
//! published on each stream name, and a typed subscription to one of them.

use anyhow::Result;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tokio::sync::mpsc;

pub mod bus;
pub mod json_lines;

pub use bus::Bus;
pub use json_lines::{parse_record, BusRecord, JsonLinesFeed};

/// A decoded message
pub type Message = Value;

/// Stream name → schemas observed on it
pub type TopicMap = BTreeMap<String, BTreeSet<SchemaId>>;

/// Identifier of a message schema, e.g. `sensor_msgs/Imu`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source of topic metadata and subscriptions
pub trait Transport: Send + Sync {
    /// Snapshot of every stream currently known and its observed schemas
    fn list_topics(&self) -> Result<TopicMap>;

    /// Subscribe to the messages of `schema` published on `stream`
    fn subscribe(&self, stream: &str, schema: &SchemaId) -> Result<Subscription>;
}

/// Unbounded, non-restartable sequence of messages of one stream.
///
/// Dropping the subscription tears it down.
#[derive(Debug)]
pub struct Subscription {
    stream: String,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    pub fn new(stream: impl Into<String>, receiver: mpsc::UnboundedReceiver<Message>) -> Self {
        Self {
            stream: stream.into(),
            receiver,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Next buffered message, never blocks
    pub fn try_next(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Every buffered message, in arrival order
    pub fn drain(&mut self) -> Vec<Message> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

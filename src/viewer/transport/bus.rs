//! In-process message bus
//!
//! Keeps track of the schemas observed per stream and fans published
//! messages out to typed subscriptions.

use super::{Message, SchemaId, Subscription, TopicMap, Transport};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

struct Subscriber {
    stream: String,
    schema: SchemaId,
    sender: mpsc::UnboundedSender<Message>,
    warned_schema_change: bool,
}

#[derive(Default)]
struct BusState {
    topics: TopicMap,
    subscribers: Vec<Subscriber>,
}

/// Cloneable handle to a shared in-process bus
#[derive(Clone, Default)]
pub struct Bus {
    state: Arc<Mutex<BusState>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a publisher of `schema` on `stream` without sending anything
    pub fn advertise(&self, stream: &str, schema: &SchemaId) {
        let mut state = self.state.lock();
        if state
            .topics
            .entry(stream.to_string())
            .or_default()
            .insert(schema.clone())
        {
            tracing::debug!(stream, schema = %schema, "new publisher observed");
        }
    }

    /// Publish one message, returning how many subscriptions received it
    pub fn publish(&self, stream: &str, schema: &SchemaId, message: Message) -> usize {
        self.advertise(stream, schema);

        let mut state = self.state.lock();
        let mut delivered = 0;

        state.subscribers.retain_mut(|sub| {
            if sub.stream != stream {
                return true;
            }
            if sub.schema != *schema {
                if !sub.warned_schema_change {
                    tracing::warn!(
                        stream,
                        subscribed = %sub.schema,
                        published = %schema,
                        "schema changed after dispatch, dropping messages"
                    );
                    sub.warned_schema_change = true;
                }
                return true;
            }
            if sub.sender.send(message.clone()).is_err() {
                tracing::debug!(stream, "subscription dropped");
                return false;
            }
            delivered += 1;
            true
        });

        delivered
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

impl Transport for Bus {
    fn list_topics(&self) -> Result<TopicMap> {
        Ok(self.state.lock().topics.clone())
    }

    fn subscribe(&self, stream: &str, schema: &SchemaId) -> Result<Subscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(Subscriber {
            stream: stream.to_string(),
            schema: schema.clone(),
            sender,
            warned_schema_change: false,
        });
        tracing::debug!(stream, schema = %schema, "subscribed");
        Ok(Subscription::new(stream, receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_should_record_observed_schemas() {
        let bus = Bus::new();
        bus.publish("/mixed", &"std_msgs/Bool".into(), json!({"data": true}));
        bus.publish("/mixed", &"std_msgs/Int32".into(), json!({"data": 3}));
        bus.advertise("/imu", &"sensor_msgs/Imu".into());

        let topics = bus.list_topics().unwrap();
        assert_eq!(topics["/mixed"].len(), 2);
        assert!(topics["/imu"].contains(&SchemaId::from("sensor_msgs/Imu")));
    }

    #[test]
    fn subscription_should_receive_messages_in_order() {
        let bus = Bus::new();
        let schema = SchemaId::from("std_msgs/Int32");
        let mut sub = bus.subscribe("/count", &schema).unwrap();

        for i in 0..3 {
            assert_eq!(bus.publish("/count", &schema, json!({ "data": i })), 1);
        }
        bus.publish("/other", &schema, json!({"data": 99}));

        let data: Vec<_> = sub.drain().iter().map(|m| m["data"].clone()).collect();
        assert_eq!(data, vec![json!(0), json!(1), json!(2)]);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn mismatched_schema_should_not_be_delivered() {
        let bus = Bus::new();
        let mut sub = bus.subscribe("/value", &"std_msgs/Float32".into()).unwrap();

        assert_eq!(bus.publish("/value", &"std_msgs/Int8".into(), json!({"data": 1})), 0);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn dropped_subscription_should_be_pruned() {
        let bus = Bus::new();
        let schema = SchemaId::from("std_msgs/Bool");
        let sub = bus.subscribe("/flag", &schema).unwrap();
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        bus.publish("/flag", &schema, json!({"data": false}));
        assert_eq!(bus.subscriber_count(), 0);
    }
}

//! JSON-lines bus feed
//!
//! Follows a file or FIFO where every line is one published message:
//!
//! ```text
//! {"topic": "/imu", "type": "sensor_msgs/Imu", "msg": {"orientation": {...}}}
//! ```
//!
//! Each record is published onto a [`Bus`]. Like `tail -f`, the feed keeps
//! reading after end of file, so publishers can append while the viewer runs.

use super::{Bus, Message, SchemaId};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long the follower sleeps at end of file before reading again
const FOLLOW_INTERVAL: Duration = Duration::from_millis(20);

/// One line of the feed
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BusRecord {
    pub topic: String,
    #[serde(rename = "type")]
    pub schema: String,
    #[serde(default)]
    pub msg: Message,
}

/// Parse a single feed line
pub fn parse_record(line: &str) -> Result<BusRecord> {
    let record: BusRecord = serde_json::from_str(line).context("invalid bus record")?;
    if record.topic.is_empty() || record.schema.is_empty() {
        anyhow::bail!("bus record needs a non-empty topic and type");
    }
    Ok(record)
}

/// Publish every complete line of `reader` onto `bus`.
///
/// Malformed lines, including ones that are not UTF-8, are logged and
/// skipped. Returns the number of records published.
pub fn publish_lines<R: BufRead>(mut reader: R, bus: &Bus) -> Result<usize> {
    let mut published = 0;
    let mut line = Vec::new();
    let mut line_number = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_number += 1;
        if publish_bytes(&line, bus, line_number) {
            published += 1;
        }
    }
    Ok(published)
}

fn publish_bytes(bytes: &[u8], bus: &Bus, line_number: usize) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(line) => publish_line(line, bus, line_number),
        Err(e) => {
            tracing::warn!(line_number, error = %e, "skipping bus record that is not UTF-8");
            false
        }
    }
}

fn publish_line(line: &str, bus: &Bus, line_number: usize) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    match parse_record(line) {
        Ok(record) => {
            bus.publish(&record.topic, &SchemaId::new(record.schema), record.msg);
            true
        }
        Err(e) => {
            tracing::warn!(line_number, error = %e, "skipping malformed bus record");
            false
        }
    }
}

/// Background thread following a JSON-lines source.
///
/// Dropping the feed stops the follower at its next wake-up.
pub struct JsonLinesFeed {
    path: PathBuf,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl JsonLinesFeed {
    /// Open `path` and start publishing its records onto `bus`.
    ///
    /// Opening a FIFO blocks until a publisher opens its write end.
    pub fn spawn(path: impl AsRef<Path>, bus: Bus) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("cannot open bus source {}", path.display()))?;
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let thread_path = path.clone();
        let handle = thread::Builder::new()
            .name("bus-feed".to_string())
            .spawn(move || {
                if let Err(e) = follow(BufReader::new(file), &bus, &token) {
                    tracing::error!(path = %thread_path.display(), error = %e, "bus feed stopped");
                }
            })?;

        tracing::info!(path = %path.display(), "following bus source");
        Ok(Self {
            path,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop following and wait for the thread if it already wound down
    pub fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for JsonLinesFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn follow<R: BufRead>(mut reader: R, bus: &Bus, cancel: &CancellationToken) -> Result<()> {
    let mut pending = Vec::new();
    let mut line_number = 0;

    while !cancel.is_cancelled() {
        let n = reader.read_until(b'\n', &mut pending)?;
        if n == 0 || pending.last() != Some(&b'\n') {
            // End of input for now; a partial line stays pending.
            thread::sleep(FOLLOW_INTERVAL);
            continue;
        }
        line_number += 1;
        publish_bytes(&pending, bus, line_number);
        pending.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::transport::Transport;
    use serde_json::json;
    use std::io::{Cursor, Write};
    use std::time::Instant;

    #[test]
    fn parse_record_should_read_topic_type_and_msg() {
        let record =
            parse_record(r#"{"topic": "/imu", "type": "sensor_msgs/Imu", "msg": {"a": 1}}"#)
                .unwrap();
        assert_eq!(record.topic, "/imu");
        assert_eq!(record.schema, "sensor_msgs/Imu");
        assert_eq!(record.msg, json!({"a": 1}));
    }

    #[test]
    fn parse_record_should_reject_missing_type() {
        assert!(parse_record(r#"{"topic": "/imu"}"#).is_err());
        assert!(parse_record(r#"{"topic": "", "type": "x/Y"}"#).is_err());
        assert!(parse_record("not json").is_err());
    }

    #[test]
    fn publish_lines_should_skip_malformed_records() {
        let input = concat!(
            r#"{"topic": "/a", "type": "std_msgs/Int32", "msg": {"data": 1}}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"topic": "/b", "type": "std_msgs/Bool", "msg": {"data": true}}"#,
            "\n",
        );
        let bus = Bus::new();

        assert_eq!(publish_lines(Cursor::new(input), &bus).unwrap(), 2);
        let topics = bus.list_topics().unwrap();
        assert_eq!(topics.len(), 2);
    }

    #[test]
    fn feed_should_follow_appended_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bus = Bus::new();
        let schema = SchemaId::from("std_msgs/Int32");
        let mut sub = bus.subscribe("/count", &schema).unwrap();

        let feed = JsonLinesFeed::spawn(file.path(), bus.clone()).unwrap();
        writeln!(
            file,
            r#"{{"topic": "/count", "type": "std_msgs/Int32", "msg": {{"data": 7}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let message = loop {
            if let Some(m) = sub.try_next() {
                break m;
            }
            assert!(Instant::now() < deadline, "feed never delivered the record");
            thread::sleep(Duration::from_millis(10));
        };
        assert_eq!(message, json!({"data": 7}));
        feed.stop();
    }

    #[test]
    fn publish_lines_should_skip_non_utf8_line_and_continue() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            br#"{"topic": "/a", "type": "std_msgs/Int32", "msg": {"data": 1}}"#,
        );
        input.push(b'\n');
        let bus = Bus::new();

        assert_eq!(publish_lines(Cursor::new(input), &bus).unwrap(), 1);
        assert!(bus.list_topics().unwrap().contains_key("/a"));
    }

    #[test]
    fn feed_should_survive_non_utf8_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let bus = Bus::new();
        let schema = SchemaId::from("std_msgs/Int32");
        let mut sub = bus.subscribe("/count", &schema).unwrap();

        let feed = JsonLinesFeed::spawn(file.path(), bus.clone()).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        writeln!(
            file,
            r#"{{"topic": "/count", "type": "std_msgs/Int32", "msg": {{"data": 9}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let message = loop {
            if let Some(m) = sub.try_next() {
                break m;
            }
            assert!(
                Instant::now() < deadline,
                "record after a non-UTF-8 line was never published"
            );
            thread::sleep(Duration::from_millis(10));
        };
        assert_eq!(message, json!({"data": 9}));
        feed.stop();
    }
}

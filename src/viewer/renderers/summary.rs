//! Field table of the latest message.
//!
//! Used for schemas without a dedicated graphical renderer. Scalars are
//! printed, arrays are summarized by length; up/down scroll the table.

use super::{KeyInput, Renderer, RendererOptions};
use crate::viewer::canvas::{Canvas, Rgb};
use crate::viewer::input::KeyEvent;
use crate::viewer::transport::Message;
use serde_json::Value;

const INDENT: usize = 2;
const MAX_SCALAR_WIDTH: usize = 48;

pub struct SummaryRenderer {
    title: String,
    lines: Vec<String>,
    scroll: usize,
    count: u64,
}

impl SummaryRenderer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: Vec::new(),
            scroll: 0,
            count: 0,
        }
    }

    pub fn create(_canvas: &Canvas, title: &str, _options: RendererOptions) -> Box<dyn Renderer> {
        Box::new(Self::new(title))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }
}

/// Flatten a message into indented `key: value` lines
pub fn summarize(message: &Message) -> Vec<String> {
    let mut lines = Vec::new();
    summarize_into(message, 0, &mut lines);
    lines
}

fn summarize_into(value: &Value, depth: usize, lines: &mut Vec<String>) {
    let Value::Object(map) = value else {
        lines.push(format!("{:indent$}{}", "", scalar(value), indent = depth * INDENT));
        return;
    };

    for (key, child) in map {
        let pad = depth * INDENT;
        match child {
            Value::Object(_) => {
                lines.push(format!("{:pad$}{key}:", ""));
                summarize_into(child, depth + 1, lines);
            }
            other => lines.push(format!("{:pad$}{key}: {}", "", scalar(other))),
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        Value::String(s) if s.chars().count() > MAX_SCALAR_WIDTH => {
            let cut: String = s.chars().take(MAX_SCALAR_WIDTH).collect();
            format!("\"{cut}...\"")
        }
        other => other.to_string(),
    }
}

impl Renderer for SummaryRenderer {
    fn update(&mut self, message: &Message) {
        self.count += 1;
        self.lines = summarize(message);
        self.scroll = self.scroll.min(self.lines.len().saturating_sub(1));
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        canvas.clear();
        let header = format!("{}  ({} msgs)", self.title, self.count);
        canvas.text(0, 0, &header, Some(Rgb::WHITE));

        if self.lines.is_empty() {
            canvas.text(0, 2, "waiting for messages", Some(Rgb::GREY));
            return;
        }

        let rows = usize::from(canvas.height()).saturating_sub(2);
        for (row, line) in self.lines.iter().skip(self.scroll).take(rows).enumerate() {
            canvas.text(0, row as i32 + 2, line, None);
        }
    }

    fn key_input(&mut self) -> Option<&mut dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for SummaryRenderer {
    fn keypress(&mut self, key: KeyEvent) {
        match key {
            KeyEvent::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyEvent::Down => {
                if self.scroll + 1 < self.lines.len() {
                    self.scroll += 1;
                }
            }
            _ => {}
        }
    }
}

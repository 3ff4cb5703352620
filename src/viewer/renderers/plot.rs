//! Scalar time-series plot
//!
//! Plots one numeric field of every message (`data` unless the binding sets
//! a `data_field` option). Arrow keys zoom: up/down scale the vertical
//! range, left/right shrink/grow the time window; `r` resets both.

use super::{number, KeyInput, Renderer, RendererOptions};
use crate::viewer::canvas::{Canvas, Rgb};
use crate::viewer::input::KeyEvent;
use crate::viewer::transport::Message;
use std::collections::VecDeque;

const DEFAULT_FIELD: &str = "data";
const MAX_HISTORY: usize = 4096;
const DEFAULT_WINDOW: usize = 128;
const MIN_WINDOW: usize = 8;
const ZOOM_STEP: f64 = 1.25;
const LABEL_WIDTH: i32 = 11;

pub struct PlotRenderer {
    title: String,
    field: String,
    history: VecDeque<f64>,
    window: usize,
    zoom: f64,
}

impl PlotRenderer {
    pub fn new(title: &str, options: RendererOptions) -> Self {
        Self {
            title: title.to_string(),
            field: options.get("data_field").unwrap_or(DEFAULT_FIELD).to_string(),
            history: VecDeque::with_capacity(MAX_HISTORY),
            window: DEFAULT_WINDOW,
            zoom: 1.0,
        }
    }

    /// Registry factory
    pub fn create(_canvas: &Canvas, title: &str, options: RendererOptions) -> Box<dyn Renderer> {
        Box::new(Self::new(title, options))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn latest(&self) -> Option<f64> {
        self.history.back().copied()
    }

    fn visible(&self) -> impl Iterator<Item = f64> + '_ {
        let skip = self.history.len().saturating_sub(self.window);
        self.history.iter().skip(skip).copied()
    }

    /// Vertical range (low, high) of the visible samples after zoom
    fn range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .visible()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            return (-1.0, 1.0);
        }
        let mid = (lo + hi) / 2.0;
        let half = ((hi - lo) / 2.0).max(0.5) * 1.1 / self.zoom;
        (mid - half, mid + half)
    }
}

impl Renderer for PlotRenderer {
    fn update(&mut self, message: &Message) {
        let Some(value) = number(message, &self.field) else {
            tracing::debug!(field = %self.field, "message has no numeric field");
            return;
        };
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(value);
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        canvas.clear();
        let width = i32::from(canvas.width());
        let height = i32::from(canvas.height());
        if width <= LABEL_WIDTH + 2 || height < 4 {
            canvas.text(0, 0, &self.title, Some(Rgb::WHITE));
            return;
        }

        let title_x = (width - self.title.chars().count() as i32).max(0) / 2;
        canvas.text(title_x, 0, &self.title, Some(Rgb::WHITE));

        let top = 1;
        let bottom = height - 2;
        let left = LABEL_WIDTH;
        let cols = width - left;
        canvas.line((left - 1, top), (left - 1, bottom), Some(Rgb::GREY));

        let samples: Vec<f64> = self.visible().collect();
        let Some(latest) = samples.last().copied() else {
            let msg = "waiting for messages";
            canvas.text((width - msg.len() as i32) / 2, height / 2, msg, Some(Rgb::GREY));
            return;
        };

        let (lo, hi) = self.range();
        canvas.text(0, top, &format!("{hi:>10.3}"), Some(Rgb::GREY));
        canvas.text(0, bottom, &format!("{lo:>10.3}"), Some(Rgb::GREY));

        let rows = f64::from(bottom - top);
        let to_row = |v: f64| -> i32 {
            let t = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
            bottom - (t * rows).round() as i32
        };

        let n = samples.len();
        let mut previous: Option<(i32, i32)> = None;
        for col in 0..cols {
            let index = if n as i32 >= cols {
                n - cols as usize + col as usize
            } else if col < n as i32 {
                col as usize
            } else {
                break;
            };
            let point = (left + col, to_row(samples[index]));
            match previous {
                Some(prev) => canvas.line(prev, point, Some(Rgb::GREEN)),
                None => canvas.point(point.0, point.1, Some(Rgb::GREEN)),
            }
            previous = Some(point);
        }

        let status = format!(
            "{} = {latest:.4}   window {}   zoom {:.2}x",
            self.field, self.window, self.zoom
        );
        canvas.text(0, height - 1, &status, Some(Rgb::CYAN));
    }

    fn key_input(&mut self) -> Option<&mut dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for PlotRenderer {
    fn keypress(&mut self, key: KeyEvent) {
        match key {
            KeyEvent::Up => self.zoom *= ZOOM_STEP,
            KeyEvent::Down => self.zoom /= ZOOM_STEP,
            KeyEvent::Left => self.window = (self.window / 2).max(MIN_WINDOW),
            KeyEvent::Right => self.window = (self.window * 2).min(MAX_HISTORY),
            KeyEvent::Char('r') => {
                self.window = DEFAULT_WINDOW;
                self.zoom = 1.0;
            }
            _ => {}
        }
    }
}

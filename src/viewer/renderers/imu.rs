//! IMU read-out: orientation, angular velocity and linear acceleration of
//! the latest message, each axis with a centered bar gauge.

use super::{number, Renderer, RendererOptions};
use crate::viewer::canvas::{Canvas, Rgb};
use crate::viewer::transport::Message;

/// Full-scale values of the gauges
const ORIENTATION_SCALE: f64 = std::f64::consts::PI;
const ANGULAR_VELOCITY_SCALE: f64 = 5.0;
const LINEAR_ACCELERATION_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    fn from_message(message: &Message, prefix: &str) -> Option<Self> {
        Some(Self {
            x: number(message, &format!("{prefix}.x"))?,
            y: number(message, &format!("{prefix}.y"))?,
            z: number(message, &format!("{prefix}.z"))?,
        })
    }
}

/// Roll, pitch and yaw in radians of a quaternion (x, y, z, w)
pub fn euler_from_quaternion(x: f64, y: f64, z: f64, w: f64) -> Vector3 {
    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0).asin();
    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
    Vector3 {
        x: roll,
        y: pitch,
        z: yaw,
    }
}

pub struct ImuRenderer {
    title: String,
    orientation: Option<Vector3>,
    angular_velocity: Option<Vector3>,
    linear_acceleration: Option<Vector3>,
    count: u64,
}

impl ImuRenderer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            orientation: None,
            angular_velocity: None,
            linear_acceleration: None,
            count: 0,
        }
    }

    pub fn create(_canvas: &Canvas, title: &str, _options: RendererOptions) -> Box<dyn Renderer> {
        Box::new(Self::new(title))
    }

    /// Roll/pitch/yaw of the latest orientation
    pub fn orientation(&self) -> Option<Vector3> {
        self.orientation
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn draw_section(
        canvas: &mut Canvas,
        y: i32,
        label: &str,
        axes: [&str; 3],
        value: Option<Vector3>,
        scale: f64,
    ) -> i32 {
        canvas.text(0, y, label, Some(Rgb::YELLOW));
        let Some(v) = value else {
            canvas.text(2, y + 1, "(no data)", Some(Rgb::GREY));
            return y + 3;
        };

        let gauge_x = 18;
        let gauge_width = (i32::from(canvas.width()) - gauge_x - 1).max(0);
        for (row, (axis, component)) in axes.iter().zip([v.x, v.y, v.z]).enumerate() {
            let row_y = y + 1 + row as i32;
            canvas.text(2, row_y, &format!("{axis:<5} {component:>+9.3}"), None);
            draw_gauge(canvas, gauge_x, row_y, gauge_width, component / scale);
        }
        y + 5
    }
}

/// Bar growing from the gauge center towards `fraction` (-1..=1)
fn draw_gauge(canvas: &mut Canvas, x: i32, y: i32, width: i32, fraction: f64) {
    if width < 3 {
        return;
    }
    let center = x + width / 2;
    let reach = ((width / 2) as f64 * fraction.clamp(-1.0, 1.0)).round() as i32;
    let glyph = canvas.fill_glyph();
    let color = if fraction.abs() > 0.9 {
        Some(Rgb::RED)
    } else {
        Some(Rgb::BLUE)
    };

    let axis = canvas.vline_glyph();
    canvas.put(center, y, axis, Some(Rgb::GREY));
    let (from, to) = if reach < 0 {
        (center + reach, center - 1)
    } else {
        (center + 1, center + reach)
    };
    for gx in from..=to {
        canvas.put(gx, y, glyph, color);
    }
}

impl Renderer for ImuRenderer {
    fn update(&mut self, message: &Message) {
        self.count += 1;
        if let (Some(x), Some(y), Some(z), Some(w)) = (
            number(message, "orientation.x"),
            number(message, "orientation.y"),
            number(message, "orientation.z"),
            number(message, "orientation.w"),
        ) {
            self.orientation = Some(euler_from_quaternion(x, y, z, w));
        }
        if let Some(v) = Vector3::from_message(message, "angular_velocity") {
            self.angular_velocity = Some(v);
        }
        if let Some(v) = Vector3::from_message(message, "linear_acceleration") {
            self.linear_acceleration = Some(v);
        }
    }

    fn draw(&mut self, canvas: &mut Canvas) {
        canvas.clear();
        let header = format!("{}  ({} msgs)", self.title, self.count);
        canvas.text(0, 0, &header, Some(Rgb::WHITE));

        let mut y = 2;
        y = Self::draw_section(
            canvas,
            y,
            "orientation [rad]",
            ["roll", "pitch", "yaw"],
            self.orientation,
            ORIENTATION_SCALE,
        );
        y = Self::draw_section(
            canvas,
            y,
            "angular velocity [rad/s]",
            ["x", "y", "z"],
            self.angular_velocity,
            ANGULAR_VELOCITY_SCALE,
        );
        Self::draw_section(
            canvas,
            y,
            "linear acceleration [m/s^2]",
            ["x", "y", "z"],
            self.linear_acceleration,
            LINEAR_ACCELERATION_SCALE,
        );
    }
}

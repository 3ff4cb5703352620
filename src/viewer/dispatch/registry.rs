//! # Renderer Registry
//!
//! Closed catalog mapping message schemas to renderer factories.
//!
//! Every schema the viewer can show is listed in [`BUILTIN_BINDINGS`]; there
//! is no run-time discovery of renderers.

use crate::viewer::canvas::Canvas;
use crate::viewer::renderers::{
    ImuRenderer, PlotRenderer, Renderer, RendererOptions, SummaryRenderer,
};
use crate::viewer::transport::SchemaId;
use std::collections::HashMap;

/// Renderer constructor: canvas, display title, fixed options
pub type RendererFactory = fn(&Canvas, &str, RendererOptions) -> Box<dyn Renderer>;

/// Factory plus the fixed options it is constructed with
#[derive(Clone, Copy)]
pub struct RendererBinding {
    pub name: &'static str,
    pub factory: RendererFactory,
    pub options: RendererOptions,
}

impl RendererBinding {
    pub const fn new(name: &'static str, factory: RendererFactory) -> Self {
        Self {
            name,
            factory,
            options: RendererOptions::EMPTY,
        }
    }

    pub const fn with_options(mut self, options: &'static [(&'static str, &'static str)]) -> Self {
        self.options = RendererOptions::new(options);
        self
    }

    /// Construct a renderer titled `title`
    pub fn instantiate(&self, canvas: &Canvas, title: &str) -> Box<dyn Renderer> {
        (self.factory)(canvas, title, self.options)
    }
}

impl std::fmt::Debug for RendererBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererBinding")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish()
    }
}

impl PartialEq for RendererBinding {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.options == other.options
            && self.factory as usize == other.factory as usize
    }
}

const PLOT: RendererBinding = RendererBinding::new("plot", PlotRenderer::create);
const IMU: RendererBinding = RendererBinding::new("imu", ImuRenderer::create);
const SUMMARY: RendererBinding = RendererBinding::new("summary", SummaryRenderer::create);

/// Every schema the viewer knows how to render
pub const BUILTIN_BINDINGS: &[(&str, RendererBinding)] = &[
    ("std_msgs/Bool", PLOT),
    ("std_msgs/Float32", PLOT),
    ("std_msgs/Float64", PLOT),
    ("std_msgs/Int8", PLOT),
    ("std_msgs/Int16", PLOT),
    ("std_msgs/Int32", PLOT),
    ("std_msgs/Int64", PLOT),
    ("std_msgs/UInt8", PLOT),
    ("std_msgs/UInt16", PLOT),
    ("std_msgs/UInt32", PLOT),
    ("std_msgs/UInt64", PLOT),
    ("sensor_msgs/CompressedImage", SUMMARY),
    (
        "sensor_msgs/FluidPressure",
        PLOT.with_options(&[("data_field", "fluid_pressure")]),
    ),
    (
        "sensor_msgs/RelativeHumidity",
        PLOT.with_options(&[("data_field", "relative_humidity")]),
    ),
    (
        "sensor_msgs/Illuminance",
        PLOT.with_options(&[("data_field", "illuminance")]),
    ),
    ("sensor_msgs/Image", SUMMARY),
    ("sensor_msgs/Imu", IMU),
    ("sensor_msgs/LaserScan", SUMMARY),
    ("sensor_msgs/NavSatFix", SUMMARY),
    ("sensor_msgs/PointCloud2", SUMMARY),
    ("sensor_msgs/Range", PLOT.with_options(&[("data_field", "range")])),
    (
        "sensor_msgs/Temperature",
        PLOT.with_options(&[("data_field", "temperature")]),
    ),
];

/// Read-only schema → binding map
#[derive(Debug, Clone)]
pub struct RendererRegistry {
    bindings: HashMap<SchemaId, RendererBinding>,
}

impl RendererRegistry {
    /// The built-in catalog
    pub fn builtin() -> Self {
        Self::from_table(BUILTIN_BINDINGS.iter().copied())
    }

    pub fn from_table<'a>(table: impl IntoIterator<Item = (&'a str, RendererBinding)>) -> Self {
        Self {
            bindings: table
                .into_iter()
                .map(|(schema, binding)| (SchemaId::new(schema), binding))
                .collect(),
        }
    }

    pub fn lookup(&self, schema: &SchemaId) -> Option<&RendererBinding> {
        self.bindings.get(schema)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Supported schemas, sorted
    pub fn schemas(&self) -> Vec<&SchemaId> {
        let mut schemas: Vec<_> = self.bindings.keys().collect();
        schemas.sort();
        schemas
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config;
use crate::viewer::canvas::{CanvasMode, ColorSupport};
pub use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Topic to show
    /// Required. Without it the help text is printed.
    #[clap(value_name = "TOPIC", help = "topic to visualize")]
    stream: Option<String>,

    /// ASCII mode
    /// Optional. Draw with 7-bit characters only.
    #[clap(short = 'a', long, help = "Use ASCII only (no Unicode)")]
    ascii: bool,

    /// Color depth
    /// Optional. `-c1` monochrome, `-c4` 16 colors, `-c24` 24-bit color.
    /// Detected from the terminal when absent.
    #[clap(
        short = 'c',
        value_name = "DEPTH",
        value_parser = ["1", "4", "24"],
        help = "Force color depth: 1 (monochrome), 4 (16 colors) or 24 (24-bit)"
    )]
    color: Option<String>,

    /// Bus source
    /// Optional. JSON-lines file or FIFO the topics are read from.
    #[clap(long, value_name = "PATH", help = "JSON-lines bus source")]
    bus: Option<PathBuf>,

    /// Discovery window
    /// Optional. Milliseconds to wait for publishers before dispatching.
    #[clap(long = "discovery-ms", value_name = "MS", help = "Topic discovery wait in milliseconds")]
    discovery_ms: Option<u64>,

    /// Frame rate
    #[clap(long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(1..=120), help = "Redraw rate in Hz")]
    fps: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    stream: Option<String>,
    ascii: bool,
    color: Option<String>,
    bus: Option<PathBuf>,
    discovery_ms: Option<u64>,
    fps: Option<u32>,
}

impl From<ClapArgs> for CommandLineArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            stream: args.stream,
            ascii: args.ascii,
            color: args.color,
            bus: args.bus,
            discovery_ms: args.discovery_ms,
            fps: args.fps,
        }
    }
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::parse_from(itr).into()
    }

    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        ClapArgs::try_parse_from(itr).map(Into::into)
    }

    /// Rendered help text
    pub fn help() -> String {
        ClapArgs::command().render_help().to_string()
    }

    pub fn stream(&self) -> Option<&str> {
        self.stream.as_deref()
    }

    pub fn canvas_mode(&self) -> CanvasMode {
        if self.ascii {
            CanvasMode::Ascii
        } else {
            CanvasMode::Unicode
        }
    }

    pub fn color_support(&self) -> ColorSupport {
        match self.color.as_deref() {
            Some("1") => ColorSupport::Mono,
            Some("4") => ColorSupport::Ansi16,
            Some("24") => ColorSupport::TrueColor,
            _ => ColorSupport::AutoDetect,
        }
    }

    /// Bus source; the flag wins over the environment
    pub fn bus_path(&self) -> PathBuf {
        self.bus
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::get_bus_path()))
    }

    pub fn discovery_wait(&self) -> Duration {
        self.discovery_ms
            .map(Duration::from_millis)
            .unwrap_or(config::DEFAULT_DISCOVERY_WAIT)
    }

    pub fn frame_rate(&self) -> u32 {
        self.fps.unwrap_or(config::DEFAULT_FRAME_RATE)
    }
}

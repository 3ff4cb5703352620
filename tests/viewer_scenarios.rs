//! End-to-end viewer scenarios, driven headlessly through the mock
//! byte and render streams.

use parking_lot::Mutex;
use rosshow::viewer::canvas::{Canvas, CanvasMode, ColorSupport};
use rosshow::viewer::dispatch::{DispatchError, DispatchResolver};
use rosshow::viewer::input::{InputPump, KeyEvent, PumpExit};
use rosshow::viewer::io::mock::written_text;
use rosshow::viewer::io::{MockByteStream, MockRenderStream};
use rosshow::viewer::renderers::{share, KeyInput, Renderer};
use rosshow::viewer::transport::{Bus, Message, SchemaId, Transport};
use rosshow::viewer::{RenderLoop, ViewerController, ViewerOptions};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn canvas() -> Canvas {
    let mut canvas = Canvas::new(CanvasMode::Unicode, ColorSupport::Mono);
    canvas.resize(60, 20);
    canvas
}

fn options(stream: &str) -> ViewerOptions {
    ViewerOptions {
        discovery_wait: Duration::ZERO,
        color_support: ColorSupport::Mono,
        ..ViewerOptions::new(stream)
    }
}

#[test]
fn imu_stream_should_resolve_to_titled_imu_renderer() {
    let bus = Bus::new();
    bus.advertise("/imu", &"sensor_msgs/Imu".into());

    let mut canvas = canvas();
    let mut resolution = DispatchResolver::default()
        .resolve("/imu", &bus, &canvas)
        .unwrap();

    assert_eq!(resolution.schema, SchemaId::from("sensor_msgs/Imu"));
    assert_eq!(resolution.binding.name, "imu");

    resolution.renderer.draw(&mut canvas);
    assert!(canvas.row_text(0).starts_with("/imu"));
}

#[tokio::test]
async fn unpublished_stream_should_fail_with_exit_code_one() {
    let controller = ViewerController::new(options("/unknown"), Bus::new());

    let err = controller
        .run(
            MockByteStream::new(Vec::<u8>::new()),
            MockRenderStream::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let dispatch = err.downcast_ref::<DispatchError>().unwrap();
    assert_eq!(dispatch.exit_code(), 1);
    assert!(dispatch.to_string().contains("not appear to be published yet"));
}

#[tokio::test]
async fn stream_with_two_schemas_should_be_ambiguous() {
    let bus = Bus::new();
    bus.advertise("/mixed", &"std_msgs/Bool".into());
    bus.advertise("/mixed", &"std_msgs/Int32".into());
    let controller = ViewerController::new(options("/mixed"), bus);

    let err = controller
        .run(
            MockByteStream::new(Vec::<u8>::new()),
            MockRenderStream::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let dispatch = err.downcast_ref::<DispatchError>().unwrap();
    assert_eq!(dispatch.exit_code(), 1);
    match dispatch {
        DispatchError::AmbiguousSchema { schemas, .. } => assert_eq!(schemas.len(), 2),
        other => panic!("expected AmbiguousSchema, got {other:?}"),
    }
}

#[tokio::test]
async fn session_should_plot_published_values_until_cancelled() {
    let bus = Bus::new();
    let schema = SchemaId::from("sensor_msgs/Temperature");
    bus.advertise("/temp", &schema);
    let controller = ViewerController::new(options("/temp"), bus.clone());
    let out = MockRenderStream::with_size((60, 12));
    let history = out.history();
    let cancel = CancellationToken::new();

    let publisher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            for t in [20.5, 21.0, 21.5] {
                bus.publish("/temp", &schema, json!({ "temperature": t }));
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        })
    };

    let report = controller
        .run(MockByteStream::with_chunks(vec![]).keep_open(), out, cancel)
        .await
        .unwrap();
    publisher.await.unwrap();

    assert_eq!(report.pump_exit, Some(PumpExit::Cancelled));
    assert!(report.frames > 1);
    let text = written_text(&history);
    assert!(text.contains("/temp"));
    assert!(text.contains("temperature = 21.5000"));
}

type KeyLog = Arc<Mutex<Vec<KeyEvent>>>;

struct KeyRecorder {
    keys: KeyLog,
}

impl Renderer for KeyRecorder {
    fn update(&mut self, _message: &Message) {}
    fn draw(&mut self, _canvas: &mut Canvas) {}
    fn key_input(&mut self) -> Option<&mut dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for KeyRecorder {
    fn keypress(&mut self, key: KeyEvent) {
        self.keys.lock().push(key);
    }
}

/// Counts every call it receives
struct NoKeys {
    calls: Arc<AtomicUsize>,
}

impl Renderer for NoKeys {
    fn update(&mut self, _message: &Message) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
    fn draw(&mut self, _canvas: &mut Canvas) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn left_arrow_should_reach_only_key_capable_renderers() {
    let keys = KeyLog::default();
    let capable = share(Box::new(KeyRecorder {
        keys: Arc::clone(&keys),
    }));
    let bytes = vec![vec![0x1Bu8], vec![0x5B], vec![0x44]];

    let exit = InputPump::new(
        MockByteStream::with_chunks(bytes.clone()),
        capable,
        CancellationToken::new(),
    )
    .run()
    .unwrap();
    assert_eq!(exit, PumpExit::EndOfInput);
    assert_eq!(keys.lock().clone(), vec![KeyEvent::Left]);

    let calls = Arc::new(AtomicUsize::new(0));
    let deaf = share(Box::new(NoKeys {
        calls: Arc::clone(&calls),
    }));
    let exit = InputPump::new(
        MockByteStream::with_chunks(bytes),
        deaf,
        CancellationToken::new(),
    )
    .run()
    .unwrap();
    assert_eq!(exit, PumpExit::EndOfInput);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[derive(Default)]
struct CallStats {
    active: AtomicUsize,
    overlaps: AtomicUsize,
    keys: AtomicUsize,
    updates: AtomicUsize,
    draws: AtomicUsize,
}

/// Records an overlap whenever two of its methods run at the same time
struct ExclusiveRenderer {
    stats: Arc<CallStats>,
}

impl ExclusiveRenderer {
    fn enter(&self, counter: &AtomicUsize) {
        if self.stats.active.fetch_add(1, Ordering::SeqCst) != 0 {
            self.stats.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        counter.fetch_add(1, Ordering::SeqCst);
        thread::yield_now();
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Renderer for ExclusiveRenderer {
    fn update(&mut self, _message: &Message) {
        self.enter(&self.stats.updates);
    }
    fn draw(&mut self, _canvas: &mut Canvas) {
        self.enter(&self.stats.draws);
    }
    fn key_input(&mut self) -> Option<&mut dyn KeyInput> {
        Some(self)
    }
}

impl KeyInput for ExclusiveRenderer {
    fn keypress(&mut self, _key: KeyEvent) {
        self.enter(&self.stats.keys);
    }
}

#[test]
fn keys_during_frames_should_never_overlap_renderer_calls() {
    let stats = Arc::new(CallStats::default());
    let renderer = share(Box::new(ExclusiveRenderer {
        stats: Arc::clone(&stats),
    }));
    let bus = Bus::new();
    let schema = SchemaId::from("std_msgs/Int32");
    let mut render_loop = RenderLoop::new(
        Arc::clone(&renderer),
        bus.subscribe("/count", &schema).unwrap(),
        canvas(),
        MockRenderStream::with_size((20, 4)),
        15,
    );

    let chunks: Vec<Vec<u8>> = (0..2000).map(|_| vec![b'k']).collect();
    let pump = InputPump::new(
        MockByteStream::with_chunks(chunks),
        renderer,
        CancellationToken::new(),
    )
    .spawn()
    .unwrap();

    for i in 0..200 {
        bus.publish("/count", &schema, json!({ "data": i }));
        render_loop.tick().unwrap();
    }
    assert_eq!(pump.join().unwrap().unwrap(), PumpExit::EndOfInput);

    assert_eq!(stats.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(stats.keys.load(Ordering::SeqCst), 2000);
    assert_eq!(stats.updates.load(Ordering::SeqCst), 200);
    assert_eq!(stats.draws.load(Ordering::SeqCst), 200);
}

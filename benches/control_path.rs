//! Control Path Benchmarks
//!
//! Measures the per-frame cost of the detector callback: relay push, region
//! mapping, smoothing and pinch detection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use landmark_cursor::control::{ControlLoop, ControlLoopConfig, DetectionHandler, DetectionSink};
use landmark_cursor::cursor::{ScreenGeometry, SmoothingConfig, SmoothingMode};
use landmark_cursor::input::{LoggingMouseSink, MouseButton, MouseSink, Result as InputResult};
use landmark_cursor::landmarks::{
    DetectionEvent, HandLandmark, HandLandmarkSet, NormalizedPoint, RenderedFrame,
};
use landmark_cursor::relay::FrameRelay;

/// Sink that does nothing, so only pipeline cost is measured
struct NullSink;

impl MouseSink for NullSink {
    fn set_position(&mut self, _x: i32, _y: i32) -> InputResult<()> {
        Ok(())
    }
    fn press(&mut self, _button: MouseButton) -> InputResult<()> {
        Ok(())
    }
    fn release(&mut self, _button: MouseButton) -> InputResult<()> {
        Ok(())
    }
}

/// Hand following a circle, pinching on every fourth frame
fn generate_hands(count: usize) -> Vec<HandLandmarkSet> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * 0.05;
            let x = 0.6 + 0.2 * angle.cos();
            let y = 0.55 + 0.15 * angle.sin();
            let gap = if i % 4 == 0 { 0.02 } else { 0.2 };
            HandLandmarkSet::uniform(NormalizedPoint::new(x, y, 0.0)).with(
                HandLandmark::IndexFingerTip,
                NormalizedPoint::new(x + gap, y, 0.0),
            )
        })
        .collect()
}

fn control_loop(smoothing: SmoothingConfig) -> ControlLoop<NullSink> {
    let config = ControlLoopConfig {
        smoothing,
        ..ControlLoopConfig::default()
    };
    ControlLoop::with_geometry(config, ScreenGeometry::new(1920, 1080).ok(), Some(NullSink))
}

/// Benchmark ControlLoop::process per smoothing mode
fn bench_process(c: &mut Criterion) {
    let hands = generate_hands(256);
    let mut group = c.benchmark_group("control_process");

    for mode in [SmoothingMode::Fixed, SmoothingMode::Adaptive] {
        let smoothing = SmoothingConfig {
            mode,
            ..SmoothingConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", mode)),
            &hands,
            |b, hands| {
                let mut control = control_loop(smoothing);
                let mut i = 0usize;
                b.iter(|| {
                    let hand = &hands[i % hands.len()];
                    i += 1;
                    black_box(control.process(std::slice::from_ref(hand)))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the whole detector callback, including the relay push
fn bench_handler(c: &mut Criterion) {
    let hands = generate_hands(256);
    let relay = Arc::new(FrameRelay::new(2).unwrap());
    let frame = RenderedFrame::blank(320, 240, 0);

    c.bench_function("detection_handler", |b| {
        let control = ControlLoop::with_geometry(
            ControlLoopConfig::default(),
            ScreenGeometry::new(1920, 1080).ok(),
            Some(LoggingMouseSink::new()),
        );
        let mut handler = DetectionHandler::new(relay.clone(), control);
        let mut ts = 0u64;
        b.iter(|| {
            let hand = hands[ts as usize % hands.len()].clone();
            let rendered = RenderedFrame {
                timestamp_ms: ts,
                ..frame.clone()
            };
            ts += 1;
            handler.on_detection(DetectionEvent::new(vec![hand], rendered));
        });
    });
}

criterion_group!(benches, bench_process, bench_handler);
criterion_main!(benches);

//! Recorded detection replay
//!
//! Stands in for a live hand detector by reading detection results from a
//! JSON-lines file, one event per line:
//!
//! ```text
//! {"timestamp_ms": 0,  "hands": []}
//! {"timestamp_ms": 33, "frame_width": 320, "frame_height": 240,
//!  "hands": [[{"x": 0.51, "y": 0.48, "z": 0.0}, ... 21 points ...]]}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Malformed lines are
//! logged and skipped; I/O errors end the replay.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control::DetectionSink;
use crate::landmarks::{DetectionEvent, HandLandmarkSet, RenderedFrame};

/// Longest pause honoured between two recorded events in realtime mode
pub const MAX_REPLAY_GAP: Duration = Duration::from_secs(1);

/// Granularity of cancellation checks while pacing
const PACING_SLICE: Duration = Duration::from_millis(10);

/// Replay errors
#[derive(Error, Debug)]
pub enum ReplayError {
    /// Recording could not be opened or read
    #[error("Failed to read detection recording: {0}")]
    Io(#[from] std::io::Error),
}

/// One recorded detection, as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct RecordedDetection {
    /// Detector timestamp
    pub timestamp_ms: u64,
    /// Detected hands (21 points each)
    #[serde(default)]
    pub hands: Vec<HandLandmarkSet>,
    /// Width of the source frame
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    /// Height of the source frame
    #[serde(default = "default_frame_height")]
    pub frame_height: u32,
}

fn default_frame_width() -> u32 {
    320
}
fn default_frame_height() -> u32 {
    240
}

impl From<RecordedDetection> for DetectionEvent {
    fn from(recorded: RecordedDetection) -> Self {
        DetectionEvent::new(
            recorded.hands,
            RenderedFrame::blank(
                recorded.frame_width,
                recorded.frame_height,
                recorded.timestamp_ms,
            ),
        )
    }
}

/// Replay summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events delivered to the sink
    pub events: u64,
    /// Delivered events with at least one hand
    pub events_with_hands: u64,
    /// Lines that failed to parse
    pub skipped_lines: u64,
    /// Replay stopped early by cancellation
    pub cancelled: bool,
}

/// Source of detection events
pub trait Detector {
    /// Deliver events to `sink` until exhausted or cancelled
    fn run(
        &mut self,
        sink: &mut dyn DetectionSink,
        cancel: &CancellationToken,
    ) -> Result<ReplaySummary, ReplayError>;
}

/// Detector replaying a JSON-lines recording
pub struct ReplayDetector<R> {
    reader: R,
    realtime: bool,
}

impl ReplayDetector<BufReader<File>> {
    /// Open a recording file
    pub fn open(path: impl AsRef<Path>, realtime: bool) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("Replaying detections from {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), realtime))
    }
}

impl<R: BufRead> ReplayDetector<R> {
    /// Replay from any buffered reader
    pub fn from_reader(reader: R, realtime: bool) -> Self {
        Self { reader, realtime }
    }

    /// Sleep for the recorded gap; false if cancelled meanwhile
    fn pace(gap: Duration, cancel: &CancellationToken) -> bool {
        let mut remaining = gap.min(MAX_REPLAY_GAP);
        while !remaining.is_zero() {
            if cancel.is_cancelled() {
                return false;
            }
            let slice = remaining.min(PACING_SLICE);
            std::thread::sleep(slice);
            remaining -= slice;
        }
        !cancel.is_cancelled()
    }
}

impl<R: BufRead> Detector for ReplayDetector<R> {
    fn run(
        &mut self,
        sink: &mut dyn DetectionSink,
        cancel: &CancellationToken,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        let mut previous_ts: Option<u64> = None;
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(text) => text,
                Err(e) => {
                    summary.skipped_lines += 1;
                    warn!("Skipping non-UTF-8 line {}: {}", line_no, e);
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let recorded: RecordedDetection = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    summary.skipped_lines += 1;
                    warn!("Skipping malformed detection on line {}: {}", line_no, e);
                    continue;
                }
            };

            if self.realtime {
                if let Some(prev) = previous_ts {
                    let gap = Duration::from_millis(recorded.timestamp_ms.saturating_sub(prev));
                    if !Self::pace(gap, cancel) {
                        summary.cancelled = true;
                        break;
                    }
                }
            }
            previous_ts = Some(recorded.timestamp_ms);

            summary.events += 1;
            if !recorded.hands.is_empty() {
                summary.events_with_hands += 1;
            }
            sink.on_detection(recorded.into());
        }

        debug!("Replay finished: {:?}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{NormalizedPoint, LANDMARKS_PER_HAND};

    #[derive(Default)]
    struct CollectingSink {
        events: Vec<DetectionEvent>,
    }

    impl DetectionSink for CollectingSink {
        fn on_detection(&mut self, event: DetectionEvent) {
            self.events.push(event);
        }
    }

    fn hand_json(x: f64, y: f64) -> String {
        let point = serde_json::to_string(&NormalizedPoint::new(x, y, 0.0)).unwrap();
        format!("[{}]", vec![point; LANDMARKS_PER_HAND].join(","))
    }

    #[test]
    fn test_replay_delivers_events_in_order() {
        let input = format!(
            "# recorded session\n\
             {{\"timestamp_ms\": 0, \"hands\": []}}\n\
             \n\
             {{\"timestamp_ms\": 33, \"frame_width\": 64, \"frame_height\": 48, \"hands\": [{}]}}\n",
            hand_json(0.5, 0.5)
        );

        let mut detector = ReplayDetector::from_reader(input.as_bytes(), false);
        let mut sink = CollectingSink::default();
        let summary = detector.run(&mut sink, &CancellationToken::new()).unwrap();

        assert_eq!(summary.events, 2);
        assert_eq!(summary.events_with_hands, 1);
        assert!(!summary.cancelled);

        assert_eq!(sink.events[0].timestamp_ms, 0);
        assert!(sink.events[0].hands.is_empty());
        assert_eq!(sink.events[1].rendered_frame.width, 64);
        assert_eq!(sink.events[1].rendered_frame.timestamp_ms, 33);
        assert_eq!(sink.events[1].hands.len(), 1);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = "{\"timestamp_ms\": 0}\nnot json\n{\"timestamp_ms\": 5, \"hands\": [[]]}\n{\"timestamp_ms\": 9}\n";

        let mut detector = ReplayDetector::from_reader(input.as_bytes(), false);
        let mut sink = CollectingSink::default();
        let summary = detector.run(&mut sink, &CancellationToken::new()).unwrap();

        // Garbage and a hand with too few points
        assert_eq!(summary.skipped_lines, 2);
        assert_eq!(summary.events, 2);
        assert_eq!(sink.events[0].rendered_frame.width, 320);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut input = b"{\"timestamp_ms\": 0}\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"{\"timestamp_ms\": 5}\n{\"timestamp_ms\": 9}\n");

        let mut detector = ReplayDetector::from_reader(input.as_slice(), false);
        let mut sink = CollectingSink::default();
        let summary = detector.run(&mut sink, &CancellationToken::new()).unwrap();

        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.events, 3);
        assert_eq!(sink.events[2].timestamp_ms, 9);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut detector = ReplayDetector::from_reader("{\"timestamp_ms\": 0}\n".as_bytes(), true);
        let mut sink = CollectingSink::default();
        let summary = detector.run(&mut sink, &cancel).unwrap();

        assert!(summary.cancelled);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_realtime_pacing_follows_timestamps() {
        let input = "{\"timestamp_ms\": 0}\n{\"timestamp_ms\": 20}\n";
        let mut detector = ReplayDetector::from_reader(input.as_bytes(), true);
        let mut sink = CollectingSink::default();

        let start = std::time::Instant::now();
        detector.run(&mut sink, &CancellationToken::new()).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(sink.events.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let result = ReplayDetector::open("/nonexistent/recording.jsonl", false);
        assert!(matches!(result, Err(ReplayError::Io(_))));
    }
}

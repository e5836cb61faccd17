//! Detection events and rendered frames

use bytes::Bytes;

use super::hand::HandLandmarkSet;

/// Bytes per pixel of a rendered frame (packed RGB)
pub const RENDERED_FRAME_BPP: usize = 3;

/// Frame image handed from the detector to the display loop
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Detector timestamp of the source image
    pub timestamp_ms: u64,
    /// Packed RGB pixel data
    pub data: Bytes,
}

impl RenderedFrame {
    /// Wrap an existing RGB buffer
    pub fn new(width: u32, height: u32, timestamp_ms: u64, data: Bytes) -> Self {
        Self {
            width,
            height,
            timestamp_ms,
            data,
        }
    }

    /// Black frame of the given size
    pub fn blank(width: u32, height: u32, timestamp_ms: u64) -> Self {
        let len = width as usize * height as usize * RENDERED_FRAME_BPP;
        Self::new(width, height, timestamp_ms, Bytes::from(vec![0u8; len]))
    }

    /// Row stride in bytes
    pub fn stride(&self) -> usize {
        self.width as usize * RENDERED_FRAME_BPP
    }
}

/// One detector result: zero or more hands plus the frame they came from
#[derive(Debug, Clone)]
pub struct DetectionEvent {
    /// Detected hands, in detector order
    pub hands: Vec<HandLandmarkSet>,
    /// Frame to be shown by the display loop
    pub rendered_frame: RenderedFrame,
    /// Detector timestamp, non-decreasing across events
    pub timestamp_ms: u64,
}

impl DetectionEvent {
    /// Build an event; the frame carries the same timestamp
    pub fn new(hands: Vec<HandLandmarkSet>, rendered_frame: RenderedFrame) -> Self {
        let timestamp_ms = rendered_frame.timestamp_ms;
        Self {
            hands,
            rendered_frame,
            timestamp_ms,
        }
    }

    /// First detected hand, the only one used for control
    pub fn primary_hand(&self) -> Option<&HandLandmarkSet> {
        self.hands.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{HandLandmark, NormalizedPoint};

    #[test]
    fn test_blank_frame_size() {
        let frame = RenderedFrame::blank(320, 240, 7);
        assert_eq!(frame.data.len(), 320 * 240 * 3);
        assert_eq!(frame.stride(), 960);
        assert_eq!(frame.timestamp_ms, 7);
    }

    #[test]
    fn test_primary_hand_is_lowest_index() {
        let first = HandLandmarkSet::uniform(NormalizedPoint::new(0.1, 0.1, 0.0));
        let second = HandLandmarkSet::uniform(NormalizedPoint::new(0.9, 0.9, 0.0));
        let event = DetectionEvent::new(vec![first, second], RenderedFrame::blank(2, 2, 0));

        let primary = event.primary_hand().unwrap();
        assert_eq!(primary.get(HandLandmark::Wrist).x, 0.1);

        let empty = DetectionEvent::new(Vec::new(), RenderedFrame::blank(2, 2, 1));
        assert!(empty.primary_hand().is_none());
    }
}

//! Frame relay tests across threads
//!
//! One producer pushing as fast as it can, one consumer polling. The
//! consumer must only ever see frames in push order, and every pushed frame
//! must be either consumed or counted as dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use landmark_cursor::landmarks::RenderedFrame;
use landmark_cursor::relay::FrameRelay;

const FRAMES: u64 = 10_000;

#[test]
fn test_producer_consumer_order_and_accounting() {
    let relay = Arc::new(FrameRelay::new(2).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let relay = relay.clone();
        let done = done.clone();
        thread::spawn(move || {
            for ts in 0..FRAMES {
                relay.push(RenderedFrame::blank(4, 4, ts));
            }
            done.store(true, Ordering::Release);
        })
    };

    let consumer = {
        let relay = relay.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                assert!(relay.len() <= relay.capacity());
                match relay.try_pop() {
                    Some(frame) => seen.push(frame.timestamp_ms),
                    None if done.load(Ordering::Acquire) && relay.is_empty() => break,
                    None => thread::yield_now(),
                }
            }
            seen
        })
    };

    producer.join().unwrap();
    let seen = consumer.join().unwrap();

    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    // The newest frame always survives
    assert_eq!(seen.last(), Some(&(FRAMES - 1)));

    let stats = relay.stats();
    assert_eq!(stats.frames_pushed, FRAMES);
    assert_eq!(stats.frames_popped, seen.len() as u64);
    assert_eq!(stats.frames_popped + stats.frames_dropped, FRAMES);
}

#[test]
fn test_slow_consumer_only_sees_recent_frames() {
    let relay = Arc::new(FrameRelay::new(1).unwrap());

    let producer = {
        let relay = relay.clone();
        thread::spawn(move || {
            for ts in 0..100 {
                relay.push(RenderedFrame::blank(4, 4, ts));
            }
        })
    };
    producer.join().unwrap();

    assert_eq!(relay.len(), 1);
    assert_eq!(relay.try_pop().map(|f| f.timestamp_ms), Some(99));
    assert_eq!(relay.stats().frames_dropped, 99);
    assert!(relay.try_pop().is_none());
}

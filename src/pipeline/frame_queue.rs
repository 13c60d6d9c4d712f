//! Bounded hand-off queue between the capture callback and the processing loop.
//!
//! Single producer (the real-time audio callback), single consumer (the
//! processing thread). The queue is bounded; on overflow the *oldest*
//! unconsumed frame is dropped so the freshest audio always gets through and
//! the producer never blocks. Drops are counted and observable from both ends.

use crate::pipeline::types::AudioFrame;
use crossbeam_channel::{Receiver, RecvTimeoutError, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Creates a bounded frame queue, returning the producer and consumer halves.
///
/// # Panics
/// Panics if `capacity` is zero; a rendezvous channel would block the
/// real-time producer.
pub fn frame_queue(capacity: usize) -> (FrameProducer, FrameConsumer) {
    assert!(capacity > 0, "frame queue capacity must be nonzero");

    let (tx, rx) = bounded(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    let producer = FrameProducer {
        tx,
        // The producer holds its own receiver handle solely to evict the
        // oldest frame when the channel is full.
        evict_rx: rx.clone(),
        dropped: Arc::clone(&dropped),
    };
    let consumer = FrameConsumer {
        rx,
        dropped,
    };
    (producer, consumer)
}

/// Producer half of the frame queue. Lives in the audio callback.
pub struct FrameProducer {
    tx: crossbeam_channel::Sender<AudioFrame>,
    evict_rx: Receiver<AudioFrame>,
    dropped: Arc<AtomicU64>,
}

impl FrameProducer {
    /// Enqueues a frame without blocking.
    ///
    /// When the queue is full, the oldest unconsumed frame is discarded and
    /// the drop counter incremented, then the new frame is enqueued. If the
    /// consumer has disconnected the frame is silently discarded; the
    /// pipeline is shutting down.
    pub fn push(&self, frame: AudioFrame) {
        let mut frame = frame;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.evict_rx.try_recv().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    frame = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Total number of frames dropped due to overflow.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half of the frame queue. Lives in the processing thread.
pub struct FrameConsumer {
    rx: Receiver<AudioFrame>,
    dropped: Arc<AtomicU64>,
}

impl FrameConsumer {
    /// Blocks until a frame is available.
    ///
    /// Returns `None` when the producer has disconnected.
    pub fn pull(&self) -> Option<AudioFrame> {
        self.rx.recv().ok()
    }

    /// Waits up to `timeout` for a frame.
    ///
    /// Returns `Ok(None)` on timeout so callers can poll a shutdown flag,
    /// and `Err(())` when the producer has disconnected.
    pub fn pull_timeout(&self, timeout: Duration) -> std::result::Result<Option<AudioFrame>, ()> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(()),
        }
    }

    /// Total number of frames dropped due to overflow.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn frame(seq: u64) -> AudioFrame {
        AudioFrame::new(vec![seq as i16; 4], Instant::now(), seq)
    }

    #[test]
    fn test_fifo_order_preserved() {
        let (producer, consumer) = frame_queue(8);

        producer.push(frame(1));
        producer.push(frame(2));
        producer.push(frame(3));

        assert_eq!(consumer.pull().unwrap().sequence, 1);
        assert_eq!(consumer.pull().unwrap().sequence, 2);
        assert_eq!(consumer.pull().unwrap().sequence, 3);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let (producer, consumer) = frame_queue(3);

        for seq in 1..=5 {
            producer.push(frame(seq));
        }

        // Frames 1 and 2 were evicted; 3, 4, 5 remain in order.
        assert_eq!(consumer.pull().unwrap().sequence, 3);
        assert_eq!(consumer.pull().unwrap().sequence, 4);
        assert_eq!(consumer.pull().unwrap().sequence, 5);
    }

    #[test]
    fn test_drop_counter_matches_overflow_amount() {
        let (producer, consumer) = frame_queue(3);

        for seq in 1..=5 {
            producer.push(frame(seq));
        }

        assert_eq!(producer.dropped(), 2);
        assert_eq!(consumer.dropped(), 2);
    }

    #[test]
    fn test_no_drops_under_capacity() {
        let (producer, consumer) = frame_queue(4);

        producer.push(frame(1));
        producer.push(frame(2));

        assert_eq!(producer.dropped(), 0);
        assert_eq!(consumer.dropped(), 0);
    }

    #[test]
    fn test_pull_timeout_returns_none_when_empty() {
        let (_producer, consumer) = frame_queue(4);

        let result = consumer.pull_timeout(Duration::from_millis(10));
        assert_eq!(result.map(|f| f.map(|x| x.sequence)), Ok(None));
    }

    #[test]
    fn test_pull_timeout_disconnected() {
        let (producer, consumer) = frame_queue(4);
        drop(producer);

        let result = consumer.pull_timeout(Duration::from_millis(10));
        assert!(result.is_err());
    }

    #[test]
    fn test_pull_returns_none_after_producer_drop() {
        let (producer, consumer) = frame_queue(4);
        producer.push(frame(1));
        drop(producer);

        assert_eq!(consumer.pull().unwrap().sequence, 1);
        assert!(consumer.pull().is_none());
    }

    #[test]
    fn test_push_after_consumer_drop_does_not_block() {
        let (producer, consumer) = frame_queue(2);
        drop(consumer);

        // Must return promptly; the pipeline is shutting down.
        producer.push(frame(1));
        producer.push(frame(2));
        producer.push(frame(3));
    }

    #[test]
    fn test_spsc_order_under_concurrent_load() {
        let (producer, consumer) = frame_queue(64);

        let handle = std::thread::spawn(move || {
            for seq in 0..64 {
                producer.push(frame(seq));
            }
        });

        let mut last = None;
        let mut received = 0;
        while let Ok(Some(f)) = consumer.pull_timeout(Duration::from_millis(200)) {
            if let Some(prev) = last {
                assert!(f.sequence > prev, "frames reordered: {} after {}", f.sequence, prev);
            }
            last = Some(f.sequence);
            received += 1;
            if received == 64 {
                break;
            }
        }

        handle.join().unwrap();
        assert_eq!(received, 64);
    }

    #[test]
    #[should_panic(expected = "capacity must be nonzero")]
    fn test_zero_capacity_rejected() {
        let _ = frame_queue(0);
    }
}

//! Data types flowing through the pipeline.

use std::time::Instant;

/// A frame of raw audio samples with timing information.
///
/// Frames are produced by the capture callback in strict temporal order and
/// consumed exactly once by the recognizer.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// PCM samples (16-bit signed integers, mono).
    pub samples: Vec<i16>,
    /// Timestamp when this frame was captured.
    pub timestamp: Instant,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl AudioFrame {
    /// Creates a new audio frame.
    pub fn new(samples: Vec<i16>, timestamp: Instant, sequence: u64) -> Self {
        Self {
            samples,
            timestamp,
            sequence,
        }
    }
}

/// Recognized text for one completed utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// The recognized text.
    pub text: String,
    /// Whether the utterance was finalized by the decoder.
    pub is_final: bool,
}

impl Transcript {
    /// Creates a finalized transcript.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_frame_creation() {
        let samples = vec![100, 200, 300];
        let timestamp = Instant::now();

        let frame = AudioFrame::new(samples.clone(), timestamp, 42);

        assert_eq!(frame.samples, samples);
        assert_eq!(frame.timestamp, timestamp);
        assert_eq!(frame.sequence, 42);
    }

    #[test]
    fn test_transcript_finalized() {
        let transcript = Transcript::finalized("lights on");
        assert_eq!(transcript.text, "lights on");
        assert!(transcript.is_final);
    }
}

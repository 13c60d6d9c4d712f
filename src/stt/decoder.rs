//! Speech decoder seam for the pipeline.
//!
//! The pipeline owns only the call sequencing: feed each dequeued frame,
//! and when a frame finalizes an utterance, fetch the transcript exactly
//! once. Acoustic modeling lives behind this trait.

use crate::error::{Result, VoxlampError};
use crate::pipeline::types::{AudioFrame, Transcript};
use std::collections::VecDeque;

/// Trait for streaming speech recognition.
///
/// This trait allows swapping implementations (real Vosk vs mock).
pub trait SpeechDecoder: Send {
    /// Feed one audio frame to the decoder.
    ///
    /// Returns `true` when the frame completed an utterance; the caller must
    /// then fetch it with [`final_transcript`](Self::final_transcript).
    /// Any error is fatal: decoder state is not resumable.
    fn accept_frame(&mut self, frame: &AudioFrame) -> Result<bool>;

    /// In-progress text for the current utterance.
    ///
    /// Display-only; carries no pipeline effect.
    fn partial_text(&mut self) -> Result<String>;

    /// Fetch the completed utterance after `accept_frame` returned `true`.
    fn final_transcript(&mut self) -> Result<Transcript>;
}

/// Mock decoder for testing.
///
/// Finalizes scripted utterances after a configured number of frames each,
/// in order. Once the script is exhausted, every further frame keeps the
/// decoder running without finalizing.
#[derive(Debug, Default)]
pub struct MockDecoder {
    script: VecDeque<(usize, String)>,
    frames_seen: usize,
    pending: Option<String>,
    fail_on_frame: Option<usize>,
    total_frames: usize,
}

impl MockDecoder {
    /// Create an empty mock decoder that never finalizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an utterance that finalizes after `frames` accepted frames.
    pub fn with_utterance(mut self, frames: usize, text: &str) -> Self {
        self.script.push_back((frames, text.to_string()));
        self
    }

    /// Fail with a fatal recognition error on the nth accepted frame (1-based).
    pub fn with_failure_on_frame(mut self, frame: usize) -> Self {
        self.fail_on_frame = Some(frame);
        self
    }

    /// Total frames accepted so far.
    pub fn frames_accepted(&self) -> usize {
        self.total_frames
    }
}

impl SpeechDecoder for MockDecoder {
    fn accept_frame(&mut self, _frame: &AudioFrame) -> Result<bool> {
        self.total_frames += 1;
        if self.fail_on_frame == Some(self.total_frames) {
            return Err(VoxlampError::Recognition {
                message: "mock decoder failure".to_string(),
            });
        }

        let Some((frames, _)) = self.script.front() else {
            return Ok(false);
        };

        self.frames_seen += 1;
        if self.frames_seen >= *frames {
            let (_, text) = self.script.pop_front().unwrap_or_default();
            self.pending = Some(text);
            self.frames_seen = 0;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn partial_text(&mut self) -> Result<String> {
        Ok(self
            .script
            .front()
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }

    fn final_transcript(&mut self) -> Result<Transcript> {
        let text = self.pending.take().ok_or_else(|| VoxlampError::Recognition {
            message: "no finalized utterance pending".to_string(),
        })?;
        Ok(Transcript::finalized(text))
    }
}

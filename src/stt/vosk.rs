//! Vosk-based streaming speech recognition.
//!
//! Implements the [`SpeechDecoder`] trait over the Vosk Kaldi decoder. The
//! decoder runs incrementally: each accepted frame advances recognition, and
//! an utterance finalizes when the decoder detects end of speech.

use crate::error::{Result, VoxlampError};
use crate::pipeline::types::{AudioFrame, Transcript};
use crate::stt::decoder::SpeechDecoder;
use std::path::PathBuf;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

/// Configuration for the Vosk decoder.
#[derive(Debug, Clone)]
pub struct VoskConfig {
    /// Path to the unpacked Vosk model directory.
    pub model_path: PathBuf,
    /// Sample rate of the audio fed to the decoder.
    pub sample_rate: u32,
}

/// Streaming decoder backed by a Vosk model.
///
/// Holds the loaded model and one recognizer instance. The recognizer is
/// stateful across frames; a decoder-level failure leaves it in an undefined
/// state, so failures are fatal and never retried.
pub struct VoskDecoder {
    recognizer: Recognizer,
    // Keeps the model alive for the lifetime of the recognizer.
    _model: Model,
    model_name: String,
}

impl std::fmt::Debug for VoskDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoskDecoder")
            .field("model_name", &self.model_name)
            .field("recognizer", &"<Recognizer>")
            .finish()
    }
}

impl VoskDecoder {
    /// Load a model and create a recognizer for the given sample rate.
    ///
    /// # Errors
    /// Returns `VoxlampError::RecognitionModelNotFound` if the model
    /// directory is missing or unreadable, and `VoxlampError::Recognition`
    /// if the recognizer cannot be created.
    pub fn new(config: &VoskConfig) -> Result<Self> {
        if !config.model_path.is_dir() {
            return Err(VoxlampError::RecognitionModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = config
            .model_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let model = Model::new(config.model_path.to_string_lossy()).ok_or_else(|| {
            VoxlampError::RecognitionModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            }
        })?;

        let mut recognizer =
            Recognizer::new(&model, config.sample_rate as f32).ok_or_else(|| {
                VoxlampError::Recognition {
                    message: format!(
                        "failed to create recognizer for model '{}' at {}Hz",
                        model_name, config.sample_rate
                    ),
                }
            })?;
        recognizer.set_words(true);

        Ok(Self {
            recognizer,
            _model: model,
            model_name,
        })
    }

    /// Name of the loaded model directory.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl SpeechDecoder for VoskDecoder {
    fn accept_frame(&mut self, frame: &AudioFrame) -> Result<bool> {
        match self.recognizer.accept_waveform(&frame.samples) {
            Ok(DecodingState::Finalized) => Ok(true),
            Ok(DecodingState::Running) => Ok(false),
            Ok(DecodingState::Failed) => Err(VoxlampError::Recognition {
                message: format!("decoder failed on frame {}", frame.sequence),
            }),
            Err(e) => Err(VoxlampError::Recognition {
                message: format!("decoder rejected frame {}: {}", frame.sequence, e),
            }),
        }
    }

    fn partial_text(&mut self) -> Result<String> {
        Ok(self.recognizer.partial_result().partial.to_string())
    }

    fn final_transcript(&mut self) -> Result<Transcript> {
        match self.recognizer.result() {
            CompleteResult::Single(result) => Ok(Transcript::finalized(result.text.trim())),
            CompleteResult::Multiple(_) => Err(VoxlampError::Recognition {
                message: "unexpected n-best result; alternatives are disabled".to_string(),
            }),
        }
    }
}

//! Speech-to-text: the decoder seam and its Vosk implementation.

pub mod decoder;
pub mod vosk;

pub use decoder::{MockDecoder, SpeechDecoder};
pub use vosk::{VoskConfig, VoskDecoder};

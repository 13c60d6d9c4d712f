//! Default configuration constants for voxlamp.
//!
//! Shared constants used across configuration types to keep the audio,
//! recognition, and dispatch settings consistent.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and is the rate the
/// bundled Vosk models are trained at.
pub const SAMPLE_RATE: u32 = 16000;

/// Default audio block size in samples (~500ms at 16kHz).
///
/// One capture callback delivers roughly one block; the recognizer is fed
/// block by block, so larger blocks trade latency for fewer decoder calls.
pub const BLOCK_SIZE: u32 = 8000;

/// Default frame queue capacity in blocks.
///
/// At the default block size this buffers ~16s of audio. When the consumer
/// falls behind, the oldest frames are dropped first.
pub const QUEUE_CAPACITY: usize = 32;

/// Frame-pull timeout for the processing loop in milliseconds.
///
/// Bounds how long shutdown can lag behind the interrupt signal.
pub const PULL_TIMEOUT_MS: u64 = 200;

/// Default brightness adjustment per voice command.
///
/// Applied as a signed step: positive for "brightness up", negated for
/// "brightness down".
pub const BRIGHTNESS_STEP: i32 = 80;

/// Default brightness transition time in seconds.
pub const TRANSITION_SECS: u32 = 1;

/// Default actuation request timeout in seconds.
pub const ACTUATION_TIMEOUT_SECS: u64 = 5;

/// Default lighting bridge endpoint.
pub const BRIDGE_URL: &str = "http://127.0.0.1:8080";

/// Default device name prefix on the bridge (lamp1, lamp2, ...).
pub const DEVICE_PREFIX: &str = "lamp";

//! voxlamp - Voice-commanded lighting control
//!
//! Listens to the microphone, recognizes spoken phrases with Vosk, classifies
//! them against an ordered command table, and publishes per-device state
//! changes to a lighting bridge.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod actuate;
pub mod audio;
pub mod cli;
pub mod command;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod stt;

// Core seams (capture → recognize → classify → actuate)
pub use actuate::client::{ActionPayload, ActuationClient, HttpActuationClient, SwitchState};
pub use actuate::dispatcher::{ActionDispatcher, DispatchResult, SwitchMode};
pub use audio::capture::AudioCapture;
pub use command::matcher::{CommandMatcher, Intent};
pub use stt::decoder::SpeechDecoder;
pub use stt::vosk::VoskDecoder;

// Pipeline
pub use pipeline::frame_queue::frame_queue;
pub use pipeline::runner::{Pipeline, PipelineConfig, PipelineHandle};
pub use pipeline::types::{AudioFrame, Transcript};

// Error handling
pub use error::{Result, VoxlampError};

// Config
pub use config::Config;

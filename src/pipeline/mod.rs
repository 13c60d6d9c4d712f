//! Real-time pipeline: frame hand-off and the processing loop.
//!
//! The capture callback produces frames into a bounded queue; a single
//! processing thread consumes them, feeds the recognizer, classifies
//! finalized utterances, and dispatches device actions.

pub mod frame_queue;
pub mod runner;
pub mod types;

pub use frame_queue::{FrameConsumer, FrameProducer, frame_queue};
pub use runner::{Pipeline, PipelineConfig, PipelineHandle};
pub use types::{AudioFrame, Transcript};

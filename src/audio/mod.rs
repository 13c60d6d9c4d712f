//! Audio capture from the microphone device.

pub mod capture;

pub use capture::{AudioCapture, CaptureConfig, CaptureStatus, list_devices, suppress_audio_warnings};

//! Microphone capture using CPAL (Cross-Platform Audio Library).
//!
//! The capture callback runs in the audio subsystem's real-time context: it
//! only copies the incoming block into an [`AudioFrame`] and enqueues it.
//! Backpressure is the frame queue's concern; stream-level errors are
//! latched into a shared status slot for the processing loop to surface.

use crate::error::{Result, VoxlampError};
use crate::pipeline::frame_queue::FrameProducer;
use crate::pipeline::types::AudioFrame;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers when
/// probing audio backends.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA messages emitted during audio backend probing.
///
/// # Safety
/// Modifies environment variables; safe when called at startup before
/// spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns that are never useful for voice input.
const FILTERED_PATTERNS: &[&str] = &["surround", "front:", "rear:", "HDMI", "S/PDIF"];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List available audio input devices, filtered and with preferred devices
/// marked "\[recommended\]".
///
/// # Errors
/// Returns `VoxlampError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| VoxlampError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                names.push(format!("{} [recommended]", name));
            } else {
                names.push(name);
            }
        }
    }
    Ok(names)
}

/// Resolve an input device: by name if given, otherwise preferring
/// PipeWire/PulseAudio over the raw system default.
fn resolve_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Some(name) = device_name {
            let devices = host.input_devices().map_err(|e| VoxlampError::AudioCapture {
                message: format!("Failed to enumerate devices: {}", e),
            })?;
            for device in devices {
                if let Ok(dev_name) = device.name()
                    && dev_name == name
                {
                    return Ok(device);
                }
            }
            return Err(VoxlampError::AudioDeviceNotFound {
                device: name.to_string(),
            });
        }

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VoxlampError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Capture stream parameters.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Input device name; None selects the preferred default.
    pub device: Option<String>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Requested samples per capture block.
    pub block_size: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: crate::defaults::SAMPLE_RATE,
            block_size: crate::defaults::BLOCK_SIZE,
        }
    }
}

/// Latched stream-level error, shared between the cpal error callback and
/// the processing loop.
///
/// Stream errors are fatal to the pipeline; the loop polls this slot and
/// terminates when one appears.
#[derive(Debug, Default)]
pub struct CaptureStatus {
    error: Mutex<Option<String>>,
}

impl CaptureStatus {
    /// Latch a stream-level error. Only the first error is kept.
    pub fn record(&self, message: String) {
        if let Ok(mut slot) = self.error.lock()
            && slot.is_none()
        {
            *slot = Some(message);
        }
    }

    /// Take the latched error, if any.
    pub fn take_error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is only touched from the thread that owns
/// `AudioCapture`; it never crosses thread boundaries while live.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture driving frame production.
///
/// Captures 16-bit mono PCM at the configured rate. Prefers a native i16
/// stream; falls back to f32 with conversion in the callback.
pub struct AudioCapture {
    device: cpal::Device,
    config: CaptureConfig,
    status: Arc<CaptureStatus>,
    stream: Option<SendableStream>,
}

impl AudioCapture {
    /// Open the configured input device.
    ///
    /// # Errors
    /// Returns `VoxlampError::AudioDeviceNotFound` if the device cannot be
    /// resolved.
    pub fn new(config: CaptureConfig) -> Result<Self> {
        let device = resolve_device(config.device.as_deref())?;
        Ok(Self {
            device,
            config,
            status: Arc::new(CaptureStatus::default()),
            stream: None,
        })
    }

    /// Shared status slot for stream-level errors.
    pub fn status(&self) -> Arc<CaptureStatus> {
        Arc::clone(&self.status)
    }

    /// Start capturing, pushing one frame per callback into `producer`.
    ///
    /// # Errors
    /// Returns `VoxlampError::AudioCapture` if no supported stream format
    /// can be opened or the stream fails to start.
    pub fn start(&mut self, producer: FrameProducer) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = self.build_stream(Arc::new(producer))?;
        stream.play().map_err(|e| VoxlampError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    /// Stop capturing and release the stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| VoxlampError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
        }
        Ok(())
    }

    /// Build the input stream, trying i16 first and f32 second.
    fn build_stream(&self, producer: Arc<FrameProducer>) -> Result<cpal::Stream> {
        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: self.config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(self.config.block_size),
        };

        let sequence = Arc::new(AtomicU64::new(0));

        // i16 mono — PipeWire/PulseAudio convert transparently
        let status = Arc::clone(&self.status);
        let err_callback = move |err: cpal::StreamError| {
            status.record(err.to_string());
        };

        let push = Arc::clone(&producer);
        let seq = Arc::clone(&sequence);
        if let Ok(stream) = self.device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                push.push(AudioFrame::new(
                    data.to_vec(),
                    Instant::now(),
                    seq.fetch_add(1, Ordering::Relaxed),
                ));
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        // f32 mono — for devices that only expose float formats
        let push = Arc::clone(&producer);
        let seq = Arc::clone(&sequence);
        self.device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    push.push(AudioFrame::new(
                        samples,
                        Instant::now(),
                        seq.fetch_add(1, Ordering::Relaxed),
                    ));
                },
                err_callback,
                None,
            )
            .map_err(|e| VoxlampError::AudioCapture {
                message: format!(
                    "No supported input format at {}Hz mono: {}. \
                     Try specifying a device with --device.",
                    self.config.sample_rate, e
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("surround51"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(should_filter_device("HDMI Output"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("Built-in Audio"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PulseAudio"));
        assert!(!is_preferred_device("hw:0,0"));
        assert!(!is_preferred_device("default"));
    }

    #[test]
    fn test_capture_status_latches_first_error() {
        let status = CaptureStatus::default();
        status.record("device unplugged".to_string());
        status.record("second error".to_string());

        assert_eq!(status.take_error().as_deref(), Some("device unplugged"));
        assert_eq!(status.take_error(), None);
    }

    #[test]
    fn test_create_with_invalid_device_name() {
        let config = CaptureConfig {
            device: Some("NonExistentDevice12345".to_string()),
            ..CaptureConfig::default()
        };
        match AudioCapture::new(config) {
            Err(VoxlampError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "NonExistentDevice12345");
            }
            _ => panic!("Expected AudioDeviceNotFound error"),
        }
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_list_devices_returns_at_least_one_device() {
        let devices = list_devices().expect("Failed to list devices");
        assert!(!devices.is_empty(), "Expected at least one audio device");
    }

    #[test]
    #[ignore] // Requires audio hardware
    fn test_start_stop_pushes_frames() {
        use crate::pipeline::frame_queue::frame_queue;
        use std::time::Duration;

        let (producer, consumer) = frame_queue(32);
        let mut capture = AudioCapture::new(CaptureConfig::default())
            .expect("Failed to open default device");

        capture.start(producer).expect("Failed to start");
        let frame = consumer.pull_timeout(Duration::from_secs(2));
        capture.stop().expect("Failed to stop");

        assert!(matches!(frame, Ok(Some(_))), "Expected at least one frame");
    }
}

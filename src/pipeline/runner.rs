//! The processing loop: pull frames, recognize, classify, dispatch.
//!
//! Runs on a single dedicated thread. Each cycle walks Listening →
//! Transcribing → Dispatching and back; an interrupt moves the loop to
//! Shutdown within one frame-pull timeout. Capture and recognition errors
//! are fatal and bubble out of the thread; actuation failures are handled
//! per device inside the dispatcher and never end the loop.

use crate::actuate::client::ActuationClient;
use crate::actuate::dispatcher::ActionDispatcher;
use crate::audio::capture::CaptureStatus;
use crate::command::matcher::{CommandMatcher, Intent};
use crate::error::{Result, VoxlampError};
use crate::pipeline::frame_queue::FrameConsumer;
use crate::stt::decoder::SpeechDecoder;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration for the processing loop.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How long one pull waits before re-checking the shutdown flag.
    pub pull_timeout: Duration,
    /// Suppress status messages.
    pub quiet: bool,
    /// Stream partial recognition text.
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pull_timeout: Duration::from_millis(crate::defaults::PULL_TIMEOUT_MS),
            quiet: false,
            verbose: false,
        }
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl PipelineHandle {
    /// True once the processing thread has exited (normally or fatally).
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Signals shutdown and waits for the processing thread.
    ///
    /// Returns the thread's result: `Ok(())` after a clean shutdown, or the
    /// fatal error that ended the loop.
    pub fn stop(mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| VoxlampError::Other("pipeline thread panicked".to_string()))?,
            None => Ok(()),
        }
    }
}

/// The voice-to-action pipeline.
pub struct Pipeline<D, C>
where
    D: SpeechDecoder + 'static,
    C: ActuationClient + 'static,
{
    config: PipelineConfig,
    decoder: D,
    matcher: CommandMatcher,
    dispatcher: ActionDispatcher<C>,
}

impl<D, C> Pipeline<D, C>
where
    D: SpeechDecoder + 'static,
    C: ActuationClient + 'static,
{
    /// Assembles a pipeline from its stages.
    pub fn new(
        config: PipelineConfig,
        decoder: D,
        matcher: CommandMatcher,
        dispatcher: ActionDispatcher<C>,
    ) -> Self {
        Self {
            config,
            decoder,
            matcher,
            dispatcher,
        }
    }

    /// Starts the processing thread.
    ///
    /// # Arguments
    /// * `consumer` - Consumer half of the frame queue
    /// * `capture_status` - Shared slot where the capture stream latches
    ///   fatal errors
    pub fn start(self, consumer: FrameConsumer, capture_status: Arc<CaptureStatus>) -> PipelineHandle {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let thread = thread::spawn(move || {
            run_loop(
                self.config,
                self.decoder,
                self.matcher,
                self.dispatcher,
                consumer,
                capture_status,
                thread_running,
            )
        });

        PipelineHandle {
            running,
            thread: Some(thread),
        }
    }
}

fn run_loop<D, C>(
    config: PipelineConfig,
    mut decoder: D,
    matcher: CommandMatcher,
    dispatcher: ActionDispatcher<C>,
    consumer: FrameConsumer,
    capture_status: Arc<CaptureStatus>,
    running: Arc<AtomicBool>,
) -> Result<()>
where
    D: SpeechDecoder,
    C: ActuationClient,
{
    let mut reported_drops = 0u64;
    let mut last_partial = String::new();

    while running.load(Ordering::SeqCst) {
        if let Some(message) = capture_status.take_error() {
            return Err(VoxlampError::AudioCapture { message });
        }

        // Listening
        let frame = match consumer.pull_timeout(config.pull_timeout) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(()) => {
                if running.load(Ordering::SeqCst) {
                    return Err(VoxlampError::AudioCapture {
                        message: "audio stream terminated unexpectedly".to_string(),
                    });
                }
                break;
            }
        };

        let drops = consumer.dropped();
        if drops > reported_drops {
            if !config.quiet {
                eprintln!(
                    "voxlamp: {} audio frame(s) dropped under backpressure",
                    drops - reported_drops
                );
            }
            reported_drops = drops;
        }

        // Transcribing
        if decoder.accept_frame(&frame)? {
            last_partial.clear();
            let transcript = decoder.final_transcript()?;
            let text = transcript.text.trim();
            if text.is_empty() {
                continue;
            }
            if !config.quiet {
                eprintln!("Heard: {}", text);
            }

            let intent = matcher.match_text(text);
            if intent == Intent::Unknown {
                if !config.quiet {
                    eprintln!("No command matched");
                }
                continue;
            }

            // Dispatching
            if !config.quiet {
                eprintln!("-> {}", intent);
            }
            for result in dispatcher.dispatch(intent) {
                if let Err(e) = &result.result {
                    eprintln!("voxlamp: {}", e);
                }
            }
        } else if config.verbose {
            let partial = decoder.partial_text()?;
            if !partial.is_empty() && partial != last_partial {
                eprintln!("… {}", partial);
                last_partial = partial;
            }
        }
    }

    // Shutdown: no further frames are drained.
    Ok(())
}

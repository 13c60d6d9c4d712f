//! End-to-end pipeline tests: frames in, device actions out.
//!
//! Drives a live pipeline with a scripted decoder and a recording actuation
//! client, exercising the full capture-to-dispatch path without hardware.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use voxlamp::actuate::client::{ActionPayload, MockActuationClient, SwitchState};
use voxlamp::actuate::dispatcher::{ActionDispatcher, DispatchConfig};
use voxlamp::audio::capture::CaptureStatus;
use voxlamp::command::matcher::CommandMatcher;
use voxlamp::pipeline::frame_queue::{FrameProducer, frame_queue};
use voxlamp::pipeline::runner::{Pipeline, PipelineConfig, PipelineHandle};
use voxlamp::pipeline::types::AudioFrame;
use voxlamp::stt::decoder::MockDecoder;
use voxlamp::{Intent, VoxlampError};

fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        pull_timeout: Duration::from_millis(20),
        quiet: true,
        verbose: false,
    }
}

fn start(
    decoder: MockDecoder,
    client: Arc<MockActuationClient>,
    lights: Vec<u32>,
) -> (PipelineHandle, FrameProducer) {
    let (producer, consumer) = frame_queue(64);
    let dispatcher = ActionDispatcher::new(
        client,
        DispatchConfig {
            lights,
            ..DispatchConfig::default()
        },
    );
    let pipeline = Pipeline::new(
        pipeline_config(),
        decoder,
        CommandMatcher::with_default_table(),
        dispatcher,
    );
    let handle = pipeline.start(consumer, Arc::new(CaptureStatus::default()));
    (handle, producer)
}

fn push_frames(producer: &FrameProducer, count: u64) {
    for seq in 0..count {
        producer.push(AudioFrame::new(vec![0i16; 16], Instant::now(), seq));
    }
}

fn wait_until(deadline_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(deadline_ms);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn utterance_dispatches_one_batch_per_device_in_order() {
    let client = Arc::new(MockActuationClient::new());
    let decoder = MockDecoder::new().with_utterance(3, "turn the lights on");
    let (handle, producer) = start(decoder, Arc::clone(&client), vec![1, 2, 3]);

    push_frames(&producer, 3);
    assert!(wait_until(2000, || client.published().len() == 3));

    let published = client.published();
    let ids: Vec<u32> = published.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    for (_, payload) in published {
        assert_eq!(
            payload,
            ActionPayload::Switch {
                state: SwitchState::On
            }
        );
    }

    handle.stop().unwrap();
}

#[test]
fn utterances_dispatch_in_completion_order() {
    let client = Arc::new(MockActuationClient::new());
    let decoder = MockDecoder::new()
        .with_utterance(1, "lights on")
        .with_utterance(1, "brightness down")
        .with_utterance(1, "lights off");
    let (handle, producer) = start(decoder, Arc::clone(&client), vec![1]);

    push_frames(&producer, 3);
    assert!(wait_until(2000, || client.published().len() == 3));

    let payloads: Vec<ActionPayload> = client
        .published()
        .into_iter()
        .map(|(_, payload)| payload)
        .collect();
    assert_eq!(
        payloads,
        vec![
            ActionPayload::Switch {
                state: SwitchState::On
            },
            ActionPayload::Brightness {
                brightness_step: -80,
                transition: 1
            },
            ActionPayload::Switch {
                state: SwitchState::Off
            },
        ]
    );

    handle.stop().unwrap();
}

#[test]
fn device_failure_does_not_stall_the_batch_or_the_pipeline() {
    let client = Arc::new(MockActuationClient::new().with_failing_devices(&[2]));
    let decoder = MockDecoder::new()
        .with_utterance(1, "lights on")
        .with_utterance(1, "lights off");
    let (handle, producer) = start(decoder, Arc::clone(&client), vec![1, 2, 3]);

    // First utterance: device 2 fails, 1 and 3 still actuate.
    push_frames(&producer, 1);
    assert!(wait_until(2000, || client.published().len() == 3));

    // Pipeline stays live: the next utterance produces a second full batch.
    push_frames(&producer, 1);
    assert!(wait_until(2000, || client.published().len() == 6));

    let ids: Vec<u32> = client.published().iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 2, 3, 1, 2, 3]);

    handle.stop().unwrap();
}

#[test]
fn repeated_intent_is_not_debounced() {
    let client = Arc::new(MockActuationClient::new());
    let decoder = MockDecoder::new()
        .with_utterance(1, "lights off")
        .with_utterance(1, "lights off");
    let (handle, producer) = start(decoder, Arc::clone(&client), vec![1, 2, 3]);

    push_frames(&producer, 2);
    assert!(wait_until(2000, || client.published().len() == 6));

    for (_, payload) in client.published() {
        assert_eq!(
            payload,
            ActionPayload::Switch {
                state: SwitchState::Off
            }
        );
    }

    handle.stop().unwrap();
}

#[test]
fn unmatched_utterance_actuates_nothing() {
    let client = Arc::new(MockActuationClient::new());
    let decoder = MockDecoder::new().with_utterance(1, "good morning");
    let (handle, producer) = start(decoder, Arc::clone(&client), vec![1, 2, 3]);

    push_frames(&producer, 1);

    // Give the loop time to process, then confirm nothing was published.
    assert!(!wait_until(200, || !client.published().is_empty()));

    handle.stop().unwrap();
}

#[test]
fn classification_matches_documented_vocabulary() {
    let matcher = CommandMatcher::with_default_table();

    assert_eq!(matcher.match_text("turn the lights on"), Intent::LightsOn);
    assert_eq!(matcher.match_text("please lights off now"), Intent::LightsOff);
    assert_eq!(matcher.match_text("brightness up"), Intent::BrightnessUp);
    assert_eq!(matcher.match_text("whiteness down"), Intent::BrightnessDown);
    assert_eq!(matcher.match_text("good morning"), Intent::Unknown);
}

#[test]
fn decoder_failure_ends_the_pipeline_with_recognition_error() {
    let client = Arc::new(MockActuationClient::new());
    let decoder = MockDecoder::new().with_failure_on_frame(1);
    let (handle, producer) = start(decoder, client, vec![1]);

    push_frames(&producer, 1);
    assert!(wait_until(2000, || handle.is_finished()));

    let err = handle.stop().unwrap_err();
    assert!(matches!(err, VoxlampError::Recognition { .. }));
}

#[test]
fn interrupt_stops_the_pipeline_within_one_pull_timeout() {
    let client = Arc::new(MockActuationClient::new());
    let (handle, producer) = start(MockDecoder::new(), client, vec![1]);

    // Keep some frames flowing so the loop is mid-cycle when stopped.
    push_frames(&producer, 4);

    let started = Instant::now();
    handle.stop().unwrap();
    assert!(started.elapsed() < Duration::from_millis(500));
}

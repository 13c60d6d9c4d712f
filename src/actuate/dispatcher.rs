//! Intent-to-device action dispatch with per-device fault isolation.

use crate::actuate::client::{ActionPayload, ActuationClient, SwitchState};
use crate::command::matcher::Intent;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How on/off intents translate to switch payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    /// LightsOn publishes ON, LightsOff publishes OFF.
    #[default]
    Explicit,
    /// Both publish TOGGLE, matching bridges that only track flips.
    Toggle,
}

/// Static dispatch configuration: the lights group and action parameters.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Device ids in the lights group.
    pub lights: Vec<u32>,
    /// Switch payload semantics for on/off intents.
    pub switch_mode: SwitchMode,
    /// Brightness adjustment per command; negated for "down".
    pub brightness_step: i32,
    /// Brightness transition time in seconds.
    pub transition_secs: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            lights: vec![1, 2, 3],
            switch_mode: SwitchMode::default(),
            brightness_step: crate::defaults::BRIGHTNESS_STEP,
            transition_secs: crate::defaults::TRANSITION_SECS,
        }
    }
}

/// One device action within a dispatch batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub device_id: u32,
    pub payload: ActionPayload,
}

/// Per-device outcome of one dispatch batch.
#[derive(Debug)]
pub struct DispatchResult {
    pub device_id: u32,
    pub result: Result<()>,
}

impl DispatchResult {
    /// True when the action was delivered.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Maps an intent to a batch of device actions and executes them.
///
/// Dispatch is sequential in ascending device-id order. A failure on one
/// device is recorded in its result and never aborts the rest of the batch.
/// Repeated identical intents always re-issue a full batch; no debouncing.
pub struct ActionDispatcher<C: ActuationClient> {
    client: C,
    config: DispatchConfig,
}

impl<C: ActuationClient> ActionDispatcher<C> {
    /// Create a dispatcher over the given client and configuration.
    ///
    /// The lights group is sorted ascending and deduplicated once here, so
    /// every batch iterates devices in the same order.
    pub fn new(client: C, mut config: DispatchConfig) -> Self {
        config.lights.sort_unstable();
        config.lights.dedup();
        Self { client, config }
    }

    /// The device ids this dispatcher fans out to, ascending.
    pub fn lights(&self) -> &[u32] {
        &self.config.lights
    }

    /// Build the action batch for an intent without executing it.
    ///
    /// Unknown yields an empty batch.
    pub fn requests_for(&self, intent: Intent) -> Vec<ActionRequest> {
        let payload = match intent {
            Intent::LightsOn => ActionPayload::Switch {
                state: match self.config.switch_mode {
                    SwitchMode::Explicit => SwitchState::On,
                    SwitchMode::Toggle => SwitchState::Toggle,
                },
            },
            Intent::LightsOff => ActionPayload::Switch {
                state: match self.config.switch_mode {
                    SwitchMode::Explicit => SwitchState::Off,
                    SwitchMode::Toggle => SwitchState::Toggle,
                },
            },
            Intent::BrightnessUp => ActionPayload::Brightness {
                brightness_step: self.config.brightness_step,
                transition: self.config.transition_secs,
            },
            Intent::BrightnessDown => ActionPayload::Brightness {
                brightness_step: -self.config.brightness_step,
                transition: self.config.transition_secs,
            },
            Intent::Unknown => return Vec::new(),
        };

        self.config
            .lights
            .iter()
            .map(|&device_id| ActionRequest { device_id, payload })
            .collect()
    }

    /// Execute the action batch for an intent.
    ///
    /// Returns one result per device, in ascending device-id order. Unknown
    /// performs no device action and returns an empty batch.
    pub fn dispatch(&self, intent: Intent) -> Vec<DispatchResult> {
        self.requests_for(intent)
            .into_iter()
            .map(|request| DispatchResult {
                device_id: request.device_id,
                result: self.client.publish(request.device_id, &request.payload),
            })
            .collect()
    }
}

//! Actuation transport seam with a testable client abstraction.
//!
//! One outbound message per device action, addressed by device id. The
//! concrete client speaks JSON over HTTP to the lighting bridge; the
//! `ActuationClient` trait enables mock implementations for tests.

use crate::error::{Result, VoxlampError};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Target switch state for on/off/toggle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchState {
    On,
    Off,
    Toggle,
}

/// Structured state change published to one device.
///
/// Serializes to the bridge's wire format: `{"state": "ON"}` for switch
/// actions, `{"brightness_step": -80, "transition": 1}` for brightness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionPayload {
    Switch {
        state: SwitchState,
    },
    Brightness {
        brightness_step: i32,
        transition: u32,
    },
}

/// Trait for publishing device state changes.
///
/// Object-safe, Send + Sync for use from the processing thread. Delivery is
/// fire-and-forget: one call, one typed success/failure result, no retries.
pub trait ActuationClient: Send + Sync {
    /// Publish one state change to the device with the given id.
    fn publish(&self, device_id: u32, payload: &ActionPayload) -> Result<()>;
}

/// Implement ActuationClient for Arc<C> to allow sharing across threads.
impl<C: ActuationClient> ActuationClient for std::sync::Arc<C> {
    fn publish(&self, device_id: u32, payload: &ActionPayload) -> Result<()> {
        (**self).publish(device_id, payload)
    }
}

/// Configuration for the HTTP actuation client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the lighting bridge, without trailing slash.
    pub base_url: String,
    /// Device name prefix on the bridge (lamp1, lamp2, ...).
    pub device_prefix: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: crate::defaults::BRIDGE_URL.to_string(),
            device_prefix: crate::defaults::DEVICE_PREFIX.to_string(),
            timeout: Duration::from_secs(crate::defaults::ACTUATION_TIMEOUT_SECS),
        }
    }
}

/// HTTP client publishing state changes to a lighting bridge.
///
/// Posts the payload as JSON to `{base_url}/{prefix}{id}/set`. A non-success
/// status or transport failure yields `VoxlampError::Actuation` for that
/// device only.
pub struct HttpActuationClient {
    http: reqwest::blocking::Client,
    config: HttpClientConfig,
}

impl std::fmt::Debug for HttpActuationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpActuationClient")
            .field("config", &self.config)
            .finish()
    }
}

impl HttpActuationClient {
    /// Create a client with a bounded per-request timeout.
    ///
    /// # Errors
    /// Returns `VoxlampError::Other` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VoxlampError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    fn device_url(&self, device_id: u32) -> String {
        format!(
            "{}/{}{}/set",
            self.config.base_url, self.config.device_prefix, device_id
        )
    }
}

impl ActuationClient for HttpActuationClient {
    fn publish(&self, device_id: u32, payload: &ActionPayload) -> Result<()> {
        let response = self
            .http
            .post(self.device_url(device_id))
            .json(payload)
            .send()
            .map_err(|e| VoxlampError::Actuation {
                device_id,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(VoxlampError::Actuation {
                device_id,
                message: format!("bridge returned status {}", response.status()),
            });
        }
        Ok(())
    }
}

/// Mock actuation client for testing.
///
/// Records every publish in order and can be configured to fail for
/// specific device ids.
#[derive(Debug, Default)]
pub struct MockActuationClient {
    published: Mutex<Vec<(u32, ActionPayload)>>,
    fail_devices: Vec<u32>,
}

impl MockActuationClient {
    /// Create a mock that accepts every publish.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail publishes for the given device ids.
    pub fn with_failing_devices(mut self, devices: &[u32]) -> Self {
        self.fail_devices = devices.to_vec();
        self
    }

    /// All successfully recorded publishes, in publish order.
    ///
    /// Failed publishes are recorded too; the mock fails after recording so
    /// tests can assert the full attempted batch.
    pub fn published(&self) -> Vec<(u32, ActionPayload)> {
        self.published
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ActuationClient for MockActuationClient {
    fn publish(&self, device_id: u32, payload: &ActionPayload) -> Result<()> {
        if let Ok(mut calls) = self.published.lock() {
            calls.push((device_id, *payload));
        }
        if self.fail_devices.contains(&device_id) {
            return Err(VoxlampError::Actuation {
                device_id,
                message: "mock publish failure".to_string(),
            });
        }
        Ok(())
    }
}

//! Configuration for voxlamp.
//!
//! All configuration is supplied at startup (file, environment, CLI) and
//! immutable thereafter.

use crate::actuate::client::HttpClientConfig;
use crate::actuate::dispatcher::{DispatchConfig, SwitchMode};
use crate::audio::capture::CaptureConfig;
use crate::command::matcher::{CommandPattern, Intent, default_command_table};
use crate::error::{Result, VoxlampError};
use crate::stt::vosk::VoskConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioSection,
    pub stt: SttSection,
    pub actuation: ActuationSection,
    pub devices: DevicesSection,
    pub dispatch: DispatchSection,
    /// Ordered command table; empty means the built-in table.
    pub commands: Vec<CommandRule>,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSection {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub block_size: u32,
    pub queue_capacity: usize,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttSection {
    /// Path to the unpacked Vosk model directory.
    pub model_path: PathBuf,
}

/// Actuation transport configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActuationSection {
    pub base_url: String,
    pub device_prefix: String,
    pub timeout_secs: u64,
}

/// Device group membership
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevicesSection {
    /// Device ids in the lights group.
    pub lights: Vec<u32>,
}

/// Dispatch semantics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchSection {
    pub switch_mode: SwitchMode,
    pub brightness_step: i32,
    pub transition_secs: u32,
}

/// One configured command rule: a pattern string and its intent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRule {
    pub pattern: String,
    pub intent: Intent,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: crate::defaults::SAMPLE_RATE,
            block_size: crate::defaults::BLOCK_SIZE,
            queue_capacity: crate::defaults::QUEUE_CAPACITY,
        }
    }
}

impl Default for SttSection {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model"),
        }
    }
}

impl Default for ActuationSection {
    fn default() -> Self {
        Self {
            base_url: crate::defaults::BRIDGE_URL.to_string(),
            device_prefix: crate::defaults::DEVICE_PREFIX.to_string(),
            timeout_secs: crate::defaults::ACTUATION_TIMEOUT_SECS,
        }
    }
}

impl Default for DevicesSection {
    fn default() -> Self {
        Self {
            lights: vec![1, 2, 3],
        }
    }
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            switch_mode: SwitchMode::default(),
            brightness_step: crate::defaults::BRIGHTNESS_STEP,
            transition_secs: crate::defaults::TRANSITION_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values.
    ///
    /// # Errors
    /// Returns `ConfigFileNotFound` if the file is missing and `Config` for
    /// invalid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxlampError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxlampError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if it is missing.
    ///
    /// Invalid TOML is still an error; only a missing file falls back.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoxlampError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - VOXLAMP_MODEL → stt.model_path
    /// - VOXLAMP_AUDIO_DEVICE → audio.device
    /// - VOXLAMP_BASE_URL → actuation.base_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VOXLAMP_MODEL")
            && !model.is_empty()
        {
            self.stt.model_path = PathBuf::from(model);
        }

        if let Ok(device) = std::env::var("VOXLAMP_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(url) = std::env::var("VOXLAMP_BASE_URL")
            && !url.is_empty()
        {
            self.actuation.base_url = url;
        }

        self
    }

    /// Get the default configuration file path.
    ///
    /// Returns ~/.config/voxlamp/config.toml on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxlamp")
            .join("config.toml")
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(VoxlampError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.block_size == 0 {
            return Err(VoxlampError::ConfigInvalidValue {
                key: "audio.block_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.audio.queue_capacity == 0 {
            return Err(VoxlampError::ConfigInvalidValue {
                key: "audio.queue_capacity".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.dispatch.brightness_step <= 0 {
            return Err(VoxlampError::ConfigInvalidValue {
                key: "dispatch.brightness_step".to_string(),
                message: "must be positive; the sign is derived from the intent".to_string(),
            });
        }
        Ok(())
    }

    /// Compile the command table, in configured order.
    ///
    /// An empty `[[commands]]` list selects the built-in table.
    ///
    /// # Errors
    /// Returns `ConfigInvalidValue` naming the offending entry for an
    /// invalid pattern.
    pub fn command_table(&self) -> Result<Vec<CommandPattern>> {
        if self.commands.is_empty() {
            return Ok(default_command_table());
        }
        self.commands
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                CommandPattern::new(&rule.pattern, rule.intent).map_err(|e| {
                    VoxlampError::ConfigInvalidValue {
                        key: format!("commands[{}].pattern", index),
                        message: e.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Capture parameters for the audio stream.
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            device: self.audio.device.clone(),
            sample_rate: self.audio.sample_rate,
            block_size: self.audio.block_size,
        }
    }

    /// Decoder parameters.
    pub fn vosk_config(&self) -> VoskConfig {
        VoskConfig {
            model_path: self.stt.model_path.clone(),
            sample_rate: self.audio.sample_rate,
        }
    }

    /// Dispatch parameters: the lights group and action semantics.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            lights: self.devices.lights.clone(),
            switch_mode: self.dispatch.switch_mode,
            brightness_step: self.dispatch.brightness_step,
            transition_secs: self.dispatch.transition_secs,
        }
    }

    /// Actuation transport parameters.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.actuation.base_url.trim_end_matches('/').to_string(),
            device_prefix: self.actuation.device_prefix.clone(),
            timeout: Duration::from_secs(self.actuation.timeout_secs),
        }
    }
}

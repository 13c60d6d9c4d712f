//! Error types for voxlamp.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxlampError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors — fatal to the pipeline
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Recognition errors — fatal, decoder state is not resumable
    #[error("Recognition model not found at {path}")]
    RecognitionModelNotFound { path: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Actuation errors — recovered per device at the dispatch boundary
    #[error("Actuation failed for device {device_id}: {message}")]
    Actuation { device_id: u32, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxlampError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = VoxlampError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = VoxlampError::ConfigInvalidValue {
            key: "commands[2].pattern".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for commands[2].pattern: unclosed group"
        );
    }

    #[test]
    fn test_audio_device_not_found_display() {
        let error = VoxlampError::AudioDeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_audio_capture_display() {
        let error = VoxlampError::AudioCapture {
            message: "stream closed".to_string(),
        };
        assert_eq!(error.to_string(), "Audio capture failed: stream closed");
    }

    #[test]
    fn test_recognition_model_not_found_display() {
        let error = VoxlampError::RecognitionModelNotFound {
            path: "/models/vosk-small".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition model not found at /models/vosk-small"
        );
    }

    #[test]
    fn test_recognition_display() {
        let error = VoxlampError::Recognition {
            message: "decoder rejected waveform".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition failed: decoder rejected waveform"
        );
    }

    #[test]
    fn test_actuation_display() {
        let error = VoxlampError::Actuation {
            device_id: 2,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Actuation failed for device 2: connection refused"
        );
    }

    #[test]
    fn test_other_display() {
        let error = VoxlampError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoxlampError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: VoxlampError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VoxlampError>();
        assert_sync::<VoxlampError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}

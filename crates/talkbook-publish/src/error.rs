//! Error types for audio publishing.

use talkbook_audio::AudioError;
use talkbook_model::{MediaKind, ModelError};
use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that abort a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The destination channel cannot hold the media the publisher produces.
    #[error("channel '{channel}' cannot hold {kind} media")]
    Factory {
        /// Destination channel name.
        channel: String,
        /// Media kind that was required.
        kind: MediaKind,
    },

    /// A configured channel is not registered with the presentation.
    #[error("unknown channel '{name}'")]
    UnknownChannel {
        /// Channel name.
        name: String,
    },

    /// The publish configuration is invalid.
    #[error("invalid publish configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Audio error while copying payload.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Model error while building clip references.
    #[error(transparent)]
    Model(ModelError),

    /// I/O error on an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns a stable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            PublishError::Factory { .. } => "PUBLISH_001",
            PublishError::UnknownChannel { .. } => "PUBLISH_002",
            PublishError::InvalidConfig { .. } => "PUBLISH_003",
            PublishError::Audio(e) => e.code(),
            PublishError::Model(e) => e.code(),
            PublishError::Io(_) => "PUBLISH_004",
        }
    }
}

impl From<ModelError> for PublishError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnknownChannel { name } => PublishError::UnknownChannel { name },
            ModelError::MediaNotAccepted { channel, kind } => PublishError::Factory { channel, kind },
            ModelError::Audio(e) => PublishError::Audio(e),
            ModelError::Io(e) => PublishError::Io(e),
            other => PublishError::Model(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_map_to_publish_kinds() {
        let err: PublishError = ModelError::MediaNotAccepted {
            channel: "text".into(),
            kind: MediaKind::ExternalAudio,
        }
        .into();
        assert!(matches!(err, PublishError::Factory { .. }));
        assert_eq!(err.code(), "PUBLISH_001");

        let err: PublishError = ModelError::UnknownChannel {
            name: "nope".into(),
        }
        .into();
        assert!(matches!(err, PublishError::UnknownChannel { .. }));
    }

    #[test]
    fn test_audio_codes_pass_through() {
        let err = PublishError::Audio(AudioError::PayloadTooLarge { length: 1 });
        assert_eq!(err.code(), "AUDIO_007");
    }
}

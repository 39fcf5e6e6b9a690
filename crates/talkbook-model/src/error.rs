//! Error types for the content model.

use std::time::Duration;

use talkbook_audio::AudioError;
use thiserror::Error;

use crate::media::MediaKind;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by channels, media values, trees and project documents.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A channel name is not registered with the presentation.
    #[error("unknown channel '{name}'")]
    UnknownChannel {
        /// Requested channel name.
        name: String,
    },

    /// A channel with the same name is already registered.
    #[error("channel '{name}' is already registered")]
    DuplicateChannel {
        /// Conflicting channel name.
        name: String,
    },

    /// A channel cannot carry media of the given kind.
    #[error("channel '{channel}' does not accept {kind} media")]
    MediaNotAccepted {
        /// Channel name.
        channel: String,
        /// Rejected media kind.
        kind: MediaKind,
    },

    /// A clip has its begin after its end.
    #[error("clip begin {begin:?} is after clip end {end:?}")]
    InvalidClip {
        /// Clip begin.
        begin: Duration,
        /// Clip end.
        end: Duration,
    },

    /// A project document is structurally invalid.
    #[error("invalid project document: {message}")]
    InvalidDocument {
        /// What is wrong with the document.
        message: String,
    },

    /// A URI could not be built or resolved.
    #[error("invalid URI '{uri}': {message}")]
    InvalidUri {
        /// Offending URI or path.
        uri: String,
        /// Failure description.
        message: String,
    },

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Audio decoding or editing error.
    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl ModelError {
    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates an invalid URI error.
    pub fn invalid_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Returns a stable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnknownChannel { .. } => "MODEL_001",
            ModelError::DuplicateChannel { .. } => "MODEL_002",
            ModelError::MediaNotAccepted { .. } => "MODEL_003",
            ModelError::InvalidClip { .. } => "MODEL_004",
            ModelError::InvalidDocument { .. } => "MODEL_005",
            ModelError::InvalidUri { .. } => "MODEL_006",
            ModelError::Json(_) => "MODEL_007",
            ModelError::Io(_) => "MODEL_008",
            ModelError::Audio(e) => e.code(),
        }
    }
}

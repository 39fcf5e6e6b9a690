//! Error types for the managed audio layer.

use std::time::Duration;

use thiserror::Error;

use crate::pcm::PcmFormat;

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Errors that can occur while describing, decoding or editing PCM audio.
#[derive(Debug, Error)]
pub enum AudioError {
    /// PCM parameters are outside the supported range.
    #[error("invalid PCM format: {message}")]
    InvalidFormat {
        /// What was wrong with the parameters.
        message: String,
    },

    /// The stream does not parse as a RIFF/WAVE PCM file.
    #[error("malformed WAVE header: {message}")]
    MalformedHeader {
        /// Parse failure description.
        message: String,
    },

    /// The stream ends before the declared header or payload does.
    #[error("truncated stream: expected {expected} bytes, only {available} available")]
    TruncatedStream {
        /// Bytes the header or caller declared.
        expected: u64,
        /// Bytes actually available.
        available: u64,
    },

    /// Two PCM formats that must match do not.
    #[error("PCM format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        /// Format already attached to the target.
        expected: PcmFormat,
        /// Format of the incoming data.
        found: PcmFormat,
    },

    /// A time range lies outside the audio or is inverted.
    #[error("time range {begin:?}..{end:?} is outside 0..{total:?}")]
    Range {
        /// Requested begin.
        begin: Duration,
        /// Requested end.
        end: Duration,
        /// Total duration of the audio.
        total: Duration,
    },

    /// A declared duration does not match the byte count supplied with it.
    #[error("declared duration {declared:?} does not match payload duration {actual:?}")]
    DurationMismatch {
        /// Duration passed by the caller.
        declared: Duration,
        /// Duration implied by the payload length.
        actual: Duration,
    },

    /// The payload no longer fits a 32-bit `data` chunk.
    #[error("PCM payload of {length} bytes exceeds the WAVE data chunk limit")]
    PayloadTooLarge {
        /// Payload length that was requested.
        length: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a malformed header error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            message: message.into(),
        }
    }

    /// Creates a range error.
    pub fn range(begin: Duration, end: Duration, total: Duration) -> Self {
        Self::Range { begin, end, total }
    }

    /// Returns a stable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidFormat { .. } => "AUDIO_001",
            AudioError::MalformedHeader { .. } => "AUDIO_002",
            AudioError::TruncatedStream { .. } => "AUDIO_003",
            AudioError::FormatMismatch { .. } => "AUDIO_004",
            AudioError::Range { .. } => "AUDIO_005",
            AudioError::DurationMismatch { .. } => "AUDIO_006",
            AudioError::PayloadTooLarge { .. } => "AUDIO_007",
            AudioError::Io(_) => "AUDIO_008",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_helper() {
        let err = AudioError::invalid_format("bit depth 24 is not supported");
        assert!(err.to_string().contains("bit depth 24"));
        assert_eq!(err.code(), "AUDIO_001");
    }

    #[test]
    fn test_malformed_helper() {
        let err = AudioError::malformed("missing RIFF magic");
        assert!(err.to_string().contains("missing RIFF magic"));
        assert_eq!(err.code(), "AUDIO_002");
    }

    #[test]
    fn test_range_message_names_bounds() {
        let err = AudioError::range(
            Duration::from_millis(700),
            Duration::from_millis(500),
            Duration::from_secs(1),
        );
        let msg = err.to_string();
        assert!(msg.contains("700ms"));
        assert!(msg.contains("500ms"));
    }

    #[test]
    fn test_format_mismatch_displays_both_formats() {
        let err = AudioError::FormatMismatch {
            expected: PcmFormat::mono(22050),
            found: PcmFormat::stereo(44100),
        };
        let msg = err.to_string();
        assert!(msg.contains("22050"));
        assert!(msg.contains("44100"));
    }
}

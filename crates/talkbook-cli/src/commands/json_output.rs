//! JSON output types for machine-readable CLI output.
//!
//! Every command prints one of these envelopes when `--json` is given:
//! `success`, a list of `errors`, and a command-specific `result`.

use serde::Serialize;
use talkbook_audio::PcmFormat;
use talkbook_publish::PublishReport;

/// Error codes for CLI-level failures.
///
/// Library errors pass their own codes through (`AUDIO_*`, `MODEL_*`,
/// `PUBLISH_*`).
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Report or output could not be written
    pub const FILE_WRITE: &str = "CLI_002";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "AUDIO_003")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Envelope shared by all commands.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T: Serialize> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors, empty on success
    pub errors: Vec<JsonError>,
    /// Command result, absent on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Creates a successful output.
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// Creates a failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// Output of `talkbook publish --json`.
pub type PublishOutput = CommandOutput<PublishReport>;

/// Header and payload facts about one WAV file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InspectResult {
    /// Inspected file
    pub file: String,
    /// PCM format from the `fmt ` chunk
    pub format: PcmFormat,
    /// Bytes per sample frame
    pub block_align: u32,
    /// Bytes per second
    pub byte_rate: u64,
    /// Payload bytes declared by the `data` chunk
    pub data_length: u32,
    /// Payload duration in milliseconds
    pub duration_ms: f64,
    /// Payload duration as `h:mm:ss.mmm`
    pub duration: String,
    /// Size of the file on disk
    pub file_size: u64,
    /// Size a canonical file with this payload would have
    pub canonical_size: u64,
    /// BLAKE3 hash of the payload
    pub pcm_hash: String,
}

/// Output of `talkbook inspect --json`.
pub type InspectOutput = CommandOutput<InspectResult>;

/// Outcome of comparing two WAV files.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompareResult {
    /// First file
    pub a: String,
    /// Second file
    pub b: String,
    /// Format of the first file
    pub format_a: PcmFormat,
    /// Format of the second file
    pub format_b: PcmFormat,
    /// Whether the formats are equal
    pub formats_compatible: bool,
    /// Payload length of the first file
    pub data_length_a: u32,
    /// Payload length of the second file
    pub data_length_b: u32,
    /// Whether the payloads are byte-identical
    pub identical: bool,
}

/// Output of `talkbook compare --json`.
pub type CompareOutput = CommandOutput<CompareResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_omits_result() {
        let output: InspectOutput =
            CommandOutput::failure(vec![JsonError::new("AUDIO_002", "bad magic").with_file("x.wav")]);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&output).unwrap()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["code"], "AUDIO_002");
        assert_eq!(json["errors"][0]["file"], "x.wav");
        assert!(json.get("result").is_none());
    }
}

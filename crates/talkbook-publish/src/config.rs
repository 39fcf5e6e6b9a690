//! Publish configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use talkbook_model::{TreeNode, DEFAULT_AUDIO_CHANNEL, DEFAULT_PUBLISHED_AUDIO_CHANNEL};

use crate::error::{PublishError, PublishResult};

/// Placeholder replaced by the file sequence number in file name patterns.
pub const FILE_INDEX_PLACEHOLDER: &str = "{N}";

/// Default output file name pattern.
pub const DEFAULT_FILE_NAME_PATTERN: &str = "aud{N}.wav";

/// Settings for one publish run.
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Channel whose managed audio is published.
    pub source_channel: String,
    /// Channel receiving the external audio clip references.
    pub destination_channel: String,
    /// Output file name pattern; must contain `{N}` once and end in `.wav`.
    pub file_name_pattern: String,
    /// Sequence number of the first output file.
    pub first_file_index: u32,
    /// Node names that start a new output file.
    pub new_file_on: Vec<String>,
    /// Node names whose subtrees are not published.
    pub skip: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            source_channel: DEFAULT_AUDIO_CHANNEL.to_string(),
            destination_channel: DEFAULT_PUBLISHED_AUDIO_CHANNEL.to_string(),
            file_name_pattern: DEFAULT_FILE_NAME_PATTERN.to_string(),
            first_file_index: 0,
            new_file_on: Vec::new(),
            skip: Vec::new(),
        }
    }
}

impl PublishConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(json: &str) -> PublishResult<Self> {
        let config: PublishConfig =
            serde_json::from_str(json).map_err(|e| PublishError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PublishResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> PublishResult<()> {
        if self.source_channel.is_empty() || self.destination_channel.is_empty() {
            return Err(PublishError::invalid_config("channel names must not be empty"));
        }
        if self.source_channel == self.destination_channel {
            return Err(PublishError::invalid_config(format!(
                "source and destination channel are both '{}'",
                self.source_channel
            )));
        }

        let pattern = &self.file_name_pattern;
        if pattern.matches(FILE_INDEX_PLACEHOLDER).count() != 1 {
            return Err(PublishError::invalid_config(format!(
                "file name pattern '{}' must contain {} exactly once",
                pattern, FILE_INDEX_PLACEHOLDER
            )));
        }
        if !pattern.to_ascii_lowercase().ends_with(".wav") {
            return Err(PublishError::invalid_config(format!(
                "file name pattern '{}' must end in .wav",
                pattern
            )));
        }
        if pattern.contains('/') || pattern.contains('\\') {
            return Err(PublishError::invalid_config(format!(
                "file name pattern '{}' must not contain path separators",
                pattern
            )));
        }
        Ok(())
    }

    /// File name for sequence number `index`.
    pub fn file_name(&self, index: u32) -> String {
        self.file_name_pattern
            .replace(FILE_INDEX_PLACEHOLDER, &index.to_string())
    }

    /// Returns true if `node` starts a new output file.
    pub fn triggers_new_file(&self, node: &TreeNode) -> bool {
        matches_name(&self.new_file_on, node)
    }

    /// Returns true if `node` and its subtree are not published.
    pub fn must_skip(&self, node: &TreeNode) -> bool {
        matches_name(&self.skip, node)
    }
}

fn matches_name(names: &[String], node: &TreeNode) -> bool {
    node.name()
        .map(|name| names.iter().any(|n| n == name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PublishConfig::from_json("{}").unwrap();
        assert_eq!(config, PublishConfig::default());
        assert_eq!(config.source_channel, "audio");
        assert_eq!(config.destination_channel, "audio.published");
        assert_eq!(config.file_name(0), "aud0.wav");
    }

    #[test]
    fn test_partial_config() {
        let config = PublishConfig::from_json(
            r#"{"file_name_pattern":"part_{N}.wav","first_file_index":1,"new_file_on":["level1"]}"#,
        )
        .unwrap();
        assert_eq!(config.file_name(12), "part_12.wav");
        assert_eq!(config.first_file_index, 1);
        assert!(config.triggers_new_file(&TreeNode::named("level1")));
        assert!(!config.triggers_new_file(&TreeNode::named("level2")));
        assert!(!config.triggers_new_file(&TreeNode::new()));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PublishConfig::from_json(r#"{"pattern":"x{N}.wav"}"#).unwrap_err();
        assert!(matches!(err, PublishError::InvalidConfig { .. }));
    }

    #[test]
    fn test_pattern_validation() {
        for bad in ["aud.wav", "aud{N}{N}.wav", "aud{N}.mp3", "out/aud{N}.wav"] {
            let config = PublishConfig {
                file_name_pattern: bad.to_string(),
                ..PublishConfig::default()
            };
            assert!(config.validate().is_err(), "pattern {} should be rejected", bad);
        }
        let config = PublishConfig {
            file_name_pattern: "Chapter-{N}.WAV".to_string(),
            ..PublishConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_source_and_destination_rejected() {
        let config = PublishConfig {
            destination_channel: "audio".to_string(),
            ..PublishConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_skip() {
        let config = PublishConfig {
            skip: vec!["pagenum".to_string()],
            ..PublishConfig::default()
        };
        assert!(config.must_skip(&TreeNode::named("pagenum")));
        assert!(!config.must_skip(&TreeNode::named("p")));
    }

}

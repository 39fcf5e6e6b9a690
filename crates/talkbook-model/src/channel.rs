//! Named channels and the registry that owns them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::media::MediaKind;

/// A named lane of content and the media kinds it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Channel {
    name: String,
    accepts: BTreeSet<MediaKind>,
}

impl Channel {
    /// Creates a channel accepting the given kinds.
    pub fn new(name: impl Into<String>, accepts: impl IntoIterator<Item = MediaKind>) -> Self {
        Self {
            name: name.into(),
            accepts: accepts.into_iter().collect(),
        }
    }

    /// A channel for managed and external audio.
    pub fn audio(name: impl Into<String>) -> Self {
        Self::new(name, [MediaKind::ManagedAudio, MediaKind::ExternalAudio])
    }

    /// A text-only channel.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, [MediaKind::Text])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if media of `kind` may be attached to this channel.
    pub fn accepts(&self, kind: MediaKind) -> bool {
        self.accepts.contains(&kind)
    }

    /// Accepted media kinds.
    pub fn accepted_kinds(&self) -> impl Iterator<Item = MediaKind> + '_ {
        self.accepts.iter().copied()
    }
}

/// Channels of a presentation, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: BTreeMap<String, Channel>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel.
    ///
    /// # Errors
    /// [`ModelError::DuplicateChannel`] if the name is taken.
    pub fn add(&mut self, channel: Channel) -> ModelResult<()> {
        if self.channels.contains_key(channel.name()) {
            return Err(ModelError::DuplicateChannel {
                name: channel.name,
            });
        }
        self.channels.insert(channel.name.clone(), channel);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// Looks up a channel, failing if it is not registered.
    pub fn require(&self, name: &str) -> ModelResult<&Channel> {
        self.get(name).ok_or_else(|| ModelError::UnknownChannel {
            name: name.to_string(),
        })
    }

    /// Checks that channel `name` exists and accepts `kind`.
    pub fn check_accepts(&self, name: &str, kind: MediaKind) -> ModelResult<()> {
        if !self.require(name)?.accepts(kind) {
            return Err(ModelError::MediaNotAccepted {
                channel: name.to_string(),
                kind,
            });
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_channel_accepts_audio_only() {
        let channel = Channel::audio("audio");
        assert!(channel.accepts(MediaKind::ManagedAudio));
        assert!(channel.accepts(MediaKind::ExternalAudio));
        assert!(!channel.accepts(MediaKind::Text));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ChannelRegistry::new();
        registry.add(Channel::audio("audio")).unwrap();
        let err = registry.add(Channel::text("audio")).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateChannel { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_check_accepts() {
        let mut registry = ChannelRegistry::new();
        registry.add(Channel::text("text")).unwrap();

        assert!(registry.check_accepts("text", MediaKind::Text).is_ok());
        assert!(matches!(
            registry.check_accepts("text", MediaKind::ExternalAudio),
            Err(ModelError::MediaNotAccepted { .. })
        ));
        assert!(matches!(
            registry.check_accepts("missing", MediaKind::Text),
            Err(ModelError::UnknownChannel { .. })
        ));
    }

    #[test]
    fn test_channel_serde() {
        let channel: Channel =
            serde_json::from_str(r#"{"name":"video","accepts":["video","image"]}"#).unwrap();
        assert!(channel.accepts(MediaKind::Image));
        assert_eq!(
            channel.accepted_kinds().collect::<Vec<_>>(),
            vec![MediaKind::Image, MediaKind::Video]
        );
    }
}

//! A presentation: base URI, channels and the content tree.

use std::path::Path;

use url::Url;

use crate::channel::{Channel, ChannelRegistry};
use crate::error::{ModelError, ModelResult};
use crate::media::Media;
use crate::tree::{NodePath, TreeNode};

/// Default channel carrying source audio.
pub const DEFAULT_AUDIO_CHANNEL: &str = "audio";

/// Default channel receiving published audio clips.
pub const DEFAULT_PUBLISHED_AUDIO_CHANNEL: &str = "audio.published";

/// Default text channel.
pub const DEFAULT_TEXT_CHANNEL: &str = "text";

/// A content tree together with its channels and base URI.
#[derive(Debug, Clone)]
pub struct Presentation {
    base_uri: Url,
    language: Option<String>,
    channels: ChannelRegistry,
    root: TreeNode,
}

impl Presentation {
    /// Creates an empty presentation rooted at `base_uri`.
    pub fn new(base_uri: Url) -> Self {
        Self {
            base_uri,
            language: None,
            channels: ChannelRegistry::new(),
            root: TreeNode::new(),
        }
    }

    /// Creates an empty presentation whose base URI is a local directory.
    pub fn for_directory(dir: impl AsRef<Path>) -> ModelResult<Self> {
        Ok(Self::new(directory_uri(dir.as_ref())?))
    }

    /// Registers the default `audio`, `audio.published` and `text` channels.
    pub fn with_default_channels(mut self) -> Self {
        for channel in default_channels() {
            // A channel already registered under a default name is kept.
            let _ = self.channels.add(channel);
        }
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_root(mut self, root: TreeNode) -> Self {
        self.root = root;
        self
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut ChannelRegistry {
        &mut self.channels
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }

    /// Splits the presentation into its channels and a mutable root.
    pub fn parts_mut(&mut self) -> (&ChannelRegistry, &mut TreeNode) {
        (&self.channels, &mut self.root)
    }

    /// Sets media on the node at `path`, checking the channel accepts it.
    ///
    /// # Errors
    /// [`ModelError::UnknownChannel`], [`ModelError::MediaNotAccepted`], or
    /// [`ModelError::InvalidDocument`] if no node exists at `path`.
    pub fn set_media(
        &mut self,
        path: &NodePath,
        channel: &str,
        media: impl Into<Media>,
    ) -> ModelResult<Option<Media>> {
        let media = media.into();
        self.channels.check_accepts(channel, media.kind())?;
        let node = self
            .root
            .node_at_mut(path)
            .ok_or_else(|| ModelError::invalid_document(format!("no node at {}", path)))?;
        Ok(node.set_media(channel, media))
    }

    /// Expresses `target` relative to the base URI.
    ///
    /// Falls back to the absolute form when no relative form exists, e.g.
    /// across schemes or hosts.
    pub fn relative_uri(&self, target: &Url) -> String {
        self.base_uri
            .make_relative(target)
            .unwrap_or_else(|| target.to_string())
    }
}

/// The channels every new presentation starts with.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::audio(DEFAULT_AUDIO_CHANNEL),
        Channel::audio(DEFAULT_PUBLISHED_AUDIO_CHANNEL),
        Channel::text(DEFAULT_TEXT_CHANNEL),
    ]
}

/// File URI of a local directory.
pub fn directory_uri(dir: &Path) -> ModelResult<Url> {
    let absolute = absolute_path(dir)?;
    Url::from_directory_path(&absolute)
        .map_err(|()| ModelError::invalid_uri(dir.display().to_string(), "not a local directory path"))
}

/// File URI of a local file.
pub fn file_uri(path: &Path) -> ModelResult<Url> {
    let absolute = absolute_path(path)?;
    Url::from_file_path(&absolute)
        .map_err(|()| ModelError::invalid_uri(path.display().to_string(), "not a local file path"))
}

/// Canonical form of `path` if it exists, otherwise the path made absolute.
fn absolute_path(path: &Path) -> ModelResult<std::path::PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

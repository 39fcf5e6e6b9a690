//! JSON project documents.
//!
//! A project document describes a presentation: its language, channels and a
//! nested node tree with media entries. Managed audio entries name WAV files
//! relative to the document; their payload is referenced on disk, not copied.
//!
//! ```json
//! {
//!   "language": "en",
//!   "root": {
//!     "name": "book",
//!     "children": [
//!       { "name": "p", "media": { "audio": { "kind": "managed_audio", "src": "a.wav" } } }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use talkbook_audio::AudioMediaData;

use crate::channel::{Channel, ChannelRegistry};
use crate::error::{ModelError, ModelResult};
use crate::media::{
    ExternalAudioMedia, ImageMedia, ManagedAudioMedia, Media, TextMedia, VideoMedia,
};
use crate::presentation::{default_channels, Presentation};
use crate::tree::TreeNode;

/// Top-level project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDocument {
    /// Presentation language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Channels; the default set is used when omitted.
    #[serde(default = "default_channels")]
    pub channels: Vec<Channel>,
    /// Root node.
    pub root: NodeDocument,
}

/// A node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDocument {
    /// Element name, e.g. `level1` or `p`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Media values keyed by channel name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub media: BTreeMap<String, MediaDocument>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

/// A media entry. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum MediaDocument {
    /// A WAV file loaded as managed audio, optionally clipped.
    ManagedAudio {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip_begin_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip_end_ms: Option<u64>,
    },
    /// A reference to a clip of an external audio file.
    ExternalAudio {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default)]
        clip_begin_ms: u64,
        clip_end_ms: u64,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    Image {
        src: String,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    },
    Video {
        src: String,
        #[serde(default)]
        clip_begin_ms: u64,
        clip_end_ms: u64,
        #[serde(default)]
        width: u32,
        #[serde(default)]
        height: u32,
    },
}

impl ProjectDocument {
    /// Parses a document from JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the document to pretty JSON.
    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a presentation; relative media paths resolve against `base_dir`.
    pub fn into_presentation(self, base_dir: &Path) -> ModelResult<Presentation> {
        let mut channels = ChannelRegistry::new();
        for channel in self.channels {
            channels.add(channel)?;
        }

        let mut presentation = Presentation::for_directory(base_dir)?;
        *presentation.channels_mut() = channels;
        if let Some(language) = self.language {
            presentation = presentation.with_language(language);
        }

        let root = build_tree(self.root, presentation.channels(), base_dir)?;
        Ok(presentation.with_root(root))
    }
}

/// Loads a project document and the audio it references.
pub fn load_project(path: impl AsRef<Path>) -> ModelResult<Presentation> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let document = ProjectDocument::from_json(&json)?;
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let base_dir = base_dir.canonicalize()?;
    tracing::debug!(path = %path.display(), base = %base_dir.display(), "loading project");
    document.into_presentation(&base_dir)
}

/// Converts a node document tree without recursion.
fn build_tree(
    root: NodeDocument,
    channels: &ChannelRegistry,
    base_dir: &Path,
) -> ModelResult<TreeNode> {
    // Each frame is a converted node plus its unconverted children, reversed
    // so that `pop` yields them in document order.
    struct Frame {
        node: TreeNode,
        pending: Vec<NodeDocument>,
    }

    let open = |doc: NodeDocument| -> ModelResult<Frame> {
        let mut node = TreeNode::new();
        node.set_name(doc.name);
        for (channel, entry) in doc.media {
            let media = build_media(entry, base_dir)?;
            channels.check_accepts(&channel, media.kind())?;
            node.set_media(channel, media);
        }
        let mut pending = doc.children;
        pending.reverse();
        Ok(Frame { node, pending })
    };

    let mut stack = vec![open(root)?];
    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.pop() {
            let child = open(child)?;
            stack.push(child);
            continue;
        }
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.node.append_child(done.node),
            None => return Ok(done.node),
        };
    }
    Err(ModelError::invalid_document("document has no root node"))
}

fn build_media(entry: MediaDocument, base_dir: &Path) -> ModelResult<Media> {
    let media = match entry {
        MediaDocument::ManagedAudio {
            src,
            language,
            clip_begin_ms,
            clip_end_ms,
        } => {
            let mut data = AudioMediaData::from_wav_file(base_dir.join(&src))?;
            if clip_begin_ms.is_some() || clip_end_ms.is_some() {
                let begin = clip_begin_ms.map(Duration::from_millis).unwrap_or_default();
                let end = clip_end_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| data.duration());
                if begin > end {
                    return Err(ModelError::InvalidClip { begin, end });
                }
                data = data.sub_range(begin, end)?;
            }
            let mut managed = ManagedAudioMedia::new(data);
            if let Some(language) = language {
                managed = managed.with_language(language);
            }
            Media::ManagedAudio(managed)
        }
        MediaDocument::ExternalAudio {
            src,
            language,
            clip_begin_ms,
            clip_end_ms,
        } => Media::ExternalAudio(
            ExternalAudioMedia::new(
                src,
                Duration::from_millis(clip_begin_ms),
                Duration::from_millis(clip_end_ms),
            )?
            .with_language(language),
        ),
        MediaDocument::Text { text, language } => Media::Text(TextMedia { language, text }),
        MediaDocument::Image { src, width, height } => Media::Image(ImageMedia { src, width, height }),
        MediaDocument::Video {
            src,
            clip_begin_ms,
            clip_end_ms,
            width,
            height,
        } => Media::Video(
            VideoMedia::new(
                src,
                Duration::from_millis(clip_begin_ms),
                Duration::from_millis(clip_end_ms),
            )?
            .with_size(width, height),
        ),
    };
    Ok(media)
}

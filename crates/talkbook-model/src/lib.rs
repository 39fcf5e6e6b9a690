//! Talkbook Content Model
//!
//! This crate defines the content side of a talking book: named channels,
//! the media values carried on them, the node tree and the presentation
//! that ties them to a base URI.
//!
//! # Overview
//!
//! A [`TreeNode`] carries at most one [`Media`] value per channel. Asking
//! whether a node has audio on a channel is a single map lookup and a match:
//!
//! ```ignore
//! if let Some(audio) = node.managed_audio("audio") {
//!     println!("{:?}", audio.duration());
//! }
//! ```
//!
//! Channels restrict which [`MediaKind`]s they accept; [`Presentation::set_media`]
//! enforces that restriction.
//!
//! # Crate Structure
//!
//! - [`channel`] - Channels and the channel registry
//! - [`media`] - The media tagged union
//! - [`tree`] - Tree nodes, node paths and pre-order iteration
//! - [`presentation`] - Presentations and URI helpers
//! - [`project`] - JSON project documents

pub mod channel;
pub mod error;
pub mod media;
pub mod presentation;
pub mod project;
pub mod tree;

// Re-export main types at crate root
pub use channel::{Channel, ChannelRegistry};
pub use error::{ModelError, ModelResult};
pub use media::{
    ExternalAudioMedia, ImageMedia, ManagedAudioMedia, Media, MediaKind, TextMedia, VideoMedia,
};
pub use presentation::{
    Presentation, DEFAULT_AUDIO_CHANNEL, DEFAULT_PUBLISHED_AUDIO_CHANNEL, DEFAULT_TEXT_CHANNEL,
};
pub use project::{load_project, MediaDocument, NodeDocument, ProjectDocument};
pub use tree::{NodePath, PreOrder, TreeNode};

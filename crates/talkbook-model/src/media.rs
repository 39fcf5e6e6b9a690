//! Media values that tree nodes carry on their channels.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use talkbook_audio::AudioMediaData;

use crate::error::{ModelError, ModelResult};

/// Kinds of media a channel may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// PCM audio owned by the toolkit.
    ManagedAudio,
    /// A clip of an external audio file.
    ExternalAudio,
    /// Plain text.
    Text,
    /// A still image.
    Image,
    /// A clip of an external video file.
    Video,
}

impl MediaKind {
    /// Returns the media kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::ManagedAudio => "managed_audio",
            MediaKind::ExternalAudio => "external_audio",
            MediaKind::Text => "text",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// Returns all media kinds.
    pub fn all() -> &'static [MediaKind] {
        &[
            MediaKind::ManagedAudio,
            MediaKind::ExternalAudio,
            MediaKind::Text,
            MediaKind::Image,
            MediaKind::Video,
        ]
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_clip(begin: Duration, end: Duration) -> ModelResult<()> {
    if begin > end {
        return Err(ModelError::InvalidClip { begin, end });
    }
    Ok(())
}

/// Managed audio: a language tag plus [`AudioMediaData`].
#[derive(Debug, Clone)]
pub struct ManagedAudioMedia {
    language: Option<String>,
    data: AudioMediaData,
}

impl ManagedAudioMedia {
    /// Wraps audio data.
    pub fn new(data: AudioMediaData) -> Self {
        Self {
            language: None,
            data,
        }
    }

    /// Sets the language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Language tag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The audio data.
    pub fn data(&self) -> &AudioMediaData {
        &self.data
    }

    /// Mutable access to the audio data.
    pub fn data_mut(&mut self) -> &mut AudioMediaData {
        &mut self.data
    }

    /// Duration of the audio data.
    pub fn duration(&self) -> Duration {
        self.data.duration()
    }
}

/// A clip of an external audio file.
///
/// `src` is kept as written, usually relative to the presentation base URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalAudioMedia {
    language: Option<String>,
    src: String,
    clip_begin: Duration,
    clip_end: Duration,
}

impl ExternalAudioMedia {
    /// Creates a clip reference.
    ///
    /// # Errors
    /// [`ModelError::InvalidClip`] if `clip_begin > clip_end`.
    pub fn new(src: impl Into<String>, clip_begin: Duration, clip_end: Duration) -> ModelResult<Self> {
        check_clip(clip_begin, clip_end)?;
        Ok(Self {
            language: None,
            src: src.into(),
            clip_begin,
            clip_end,
        })
    }

    /// Sets or clears the language tag.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Language tag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// URI of the audio file.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Clip begin within the file.
    pub fn clip_begin(&self) -> Duration {
        self.clip_begin
    }

    /// Clip end within the file.
    pub fn clip_end(&self) -> Duration {
        self.clip_end
    }

    /// Clip length.
    pub fn duration(&self) -> Duration {
        self.clip_end - self.clip_begin
    }
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMedia {
    /// Language tag, if any.
    pub language: Option<String>,
    /// The text.
    pub text: String,
}

/// A still image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMedia {
    /// URI of the image.
    pub src: String,
    /// Width in pixels (0 if unknown).
    pub width: u32,
    /// Height in pixels (0 if unknown).
    pub height: u32,
}

/// A clip of an external video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMedia {
    src: String,
    clip_begin: Duration,
    clip_end: Duration,
    width: u32,
    height: u32,
}

impl VideoMedia {
    /// Creates a clip reference with unknown frame size.
    pub fn new(src: impl Into<String>, clip_begin: Duration, clip_end: Duration) -> ModelResult<Self> {
        check_clip(clip_begin, clip_end)?;
        Ok(Self {
            src: src.into(),
            clip_begin,
            clip_end,
            width: 0,
            height: 0,
        })
    }

    /// Sets the frame size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// URI of the video file.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Clip begin.
    pub fn clip_begin(&self) -> Duration {
        self.clip_begin
    }

    /// Clip end.
    pub fn clip_end(&self) -> Duration {
        self.clip_end
    }

    /// Frame size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A media value attached to a node channel.
#[derive(Debug, Clone)]
pub enum Media {
    ManagedAudio(ManagedAudioMedia),
    ExternalAudio(ExternalAudioMedia),
    Text(TextMedia),
    Image(ImageMedia),
    Video(VideoMedia),
}

impl Media {
    /// Kind of this media value.
    pub fn kind(&self) -> MediaKind {
        match self {
            Media::ManagedAudio(_) => MediaKind::ManagedAudio,
            Media::ExternalAudio(_) => MediaKind::ExternalAudio,
            Media::Text(_) => MediaKind::Text,
            Media::Image(_) => MediaKind::Image,
            Media::Video(_) => MediaKind::Video,
        }
    }

    /// Language tag, for the kinds that carry one.
    pub fn language(&self) -> Option<&str> {
        match self {
            Media::ManagedAudio(m) => m.language(),
            Media::ExternalAudio(m) => m.language(),
            Media::Text(m) => m.language.as_deref(),
            Media::Image(_) | Media::Video(_) => None,
        }
    }

    pub fn as_managed_audio(&self) -> Option<&ManagedAudioMedia> {
        match self {
            Media::ManagedAudio(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_external_audio(&self) -> Option<&ExternalAudioMedia> {
        match self {
            Media::ExternalAudio(m) => Some(m),
            _ => None,
        }
    }
}

impl From<ManagedAudioMedia> for Media {
    fn from(m: ManagedAudioMedia) -> Self {
        Media::ManagedAudio(m)
    }
}

impl From<ExternalAudioMedia> for Media {
    fn from(m: ExternalAudioMedia) -> Self {
        Media::ExternalAudio(m)
    }
}

impl From<TextMedia> for Media {
    fn from(m: TextMedia) -> Self {
        Media::Text(m)
    }
}

impl From<ImageMedia> for Media {
    fn from(m: ImageMedia) -> Self {
        Media::Image(m)
    }
}

impl From<VideoMedia> for Media {
    fn from(m: VideoMedia) -> Self {
        Media::Video(m)
    }
}

//! Publish run reports.

use std::time::Duration;

use serde::Serialize;
use talkbook_audio::time::to_clock_value;

use crate::config::PublishConfig;
use crate::session::PublishedFile;
use crate::visitor::{PublishedClip, Traversal};

/// A published clip with its times also given as clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipReport {
    #[serde(flatten)]
    pub clip: PublishedClip,
    /// Clip begin as `h:mm:ss.mmm`.
    pub clip_begin_clock: String,
    /// Clip end as `h:mm:ss.mmm`.
    pub clip_end_clock: String,
}

impl From<PublishedClip> for ClipReport {
    fn from(clip: PublishedClip) -> Self {
        Self {
            clip_begin_clock: to_clock_value(clip.clip_begin),
            clip_end_clock: to_clock_value(clip.clip_end),
            clip,
        }
    }
}

/// Outcome of a publish run.
///
/// Contains no timestamps or absolute paths, so publishing the same tree
/// twice yields equal reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Channel the audio was read from.
    pub source_channel: String,
    /// Channel the clip references were written to.
    pub destination_channel: String,
    /// Output files in creation order.
    pub files: Vec<PublishedFile>,
    /// Clip references in document order.
    pub clips: Vec<ClipReport>,
    /// Nodes the walk reached.
    pub visited_nodes: usize,
    /// Nodes whose subtree was skipped.
    pub skipped_nodes: usize,
}

impl PublishReport {
    /// Assembles a report from a finished run.
    pub fn new(config: &PublishConfig, files: Vec<PublishedFile>, traversal: Traversal) -> Self {
        Self {
            source_channel: config.source_channel.clone(),
            destination_channel: config.destination_channel.clone(),
            files,
            clips: traversal.clips.into_iter().map(ClipReport::from).collect(),
            visited_nodes: traversal.visited,
            skipped_nodes: traversal.skipped,
        }
    }

    /// Total payload duration over all files.
    pub fn total_duration(&self) -> Duration {
        self.files.iter().map(|f| f.duration).sum()
    }

    /// Total payload bytes over all files.
    pub fn total_data_length(&self) -> u64 {
        self.files.iter().map(|f| f.data_length).sum()
    }

    /// Looks up a file by name.
    pub fn file(&self, name: &str) -> Option<&PublishedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Clips stored in file `name`, in document order.
    pub fn clips_in<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ClipReport> + 'a {
        self.clips.iter().filter(move |c| c.clip.file == name)
    }

    /// Serializes the report to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

//! Depth-first publish traversal.

use std::time::Duration;

use serde::Serialize;
use talkbook_model::{ExternalAudioMedia, NodePath, Presentation, TreeNode};

use crate::config::PublishConfig;
use crate::error::PublishResult;
use crate::report::PublishReport;
use crate::session::{serialize_millis, PublishSession};

/// A clip reference set on a node during a publish run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedClip {
    /// Path of the node the reference was set on.
    pub node: NodePath,
    /// Output file name.
    pub file: String,
    /// Output file URI relative to the presentation base URI.
    pub src: String,
    #[serde(rename = "clip_begin_ms", serialize_with = "serialize_millis")]
    pub clip_begin: Duration,
    #[serde(rename = "clip_end_ms", serialize_with = "serialize_millis")]
    pub clip_end: Duration,
}

/// Counters and clips collected by [`publish_tree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Nodes the walk reached, including skipped ones.
    pub visited: usize,
    /// Nodes whose subtree was skipped.
    pub skipped: usize,
    /// Clip references set, in document order.
    pub clips: Vec<PublishedClip>,
}

/// Walks `root` in pre-order and publishes its managed audio through `session`.
///
/// For each node, in order:
/// 1. if `must_skip` holds, the node and its subtree are left untouched;
/// 2. if `triggers_new_file` holds, the open output file is closed;
/// 3. managed audio on the source channel is appended to the open output
///    file and an external audio reference to the appended clip replaces
///    whatever the destination channel held.
///
/// The walk uses an explicit stack. The caller finalizes the last output
/// file with [`PublishSession::finish`].
pub fn publish_tree<T, S>(
    root: &mut TreeNode,
    session: &mut PublishSession,
    mut triggers_new_file: T,
    mut must_skip: S,
) -> PublishResult<Traversal>
where
    T: FnMut(&TreeNode) -> bool,
    S: FnMut(&TreeNode) -> bool,
{
    let source = session.source_channel().to_string();
    let destination = session.destination_channel().to_string();
    let mut traversal = Traversal::default();

    let mut stack: Vec<(NodePath, &mut TreeNode)> = vec![(NodePath::root(), root)];
    while let Some((path, node)) = stack.pop() {
        traversal.visited += 1;

        if must_skip(node) {
            tracing::debug!(node = %path, "skipping subtree");
            traversal.skipped += 1;
            continue;
        }

        if triggers_new_file(node) {
            tracing::debug!(node = %path, "new file trigger");
            session.start_new_file()?;
        }

        if let Some(audio) = node.managed_audio(&source) {
            let language = audio.language().map(str::to_string);
            let appended = session.append(audio.data())?;
            tracing::debug!(
                node = %path,
                file = %appended.file,
                begin = ?appended.clip_begin,
                end = ?appended.clip_end,
                "published clip"
            );

            let reference =
                ExternalAudioMedia::new(appended.src.clone(), appended.clip_begin, appended.clip_end)?
                    .with_language(language);
            node.set_media(destination.as_str(), reference);

            traversal.clips.push(PublishedClip {
                node: path.clone(),
                file: appended.file,
                src: appended.src,
                clip_begin: appended.clip_begin,
                clip_end: appended.clip_end,
            });
        }

        for (i, child) in node.children_mut().iter_mut().enumerate().rev() {
            stack.push((path.child(i), child));
        }
    }

    Ok(traversal)
}

/// Publishes all managed audio of `presentation` into `dest_dir`.
///
/// Node names listed in the configuration drive the file triggers and skips.
/// The last output file is finalized on success; on failure the open file's
/// header is still patched when the session drops, and files already written
/// stay on disk.
pub fn publish_presentation(
    presentation: &mut Presentation,
    config: &PublishConfig,
    dest_dir: impl AsRef<std::path::Path>,
) -> PublishResult<PublishReport> {
    let base_uri = presentation.base_uri().clone();
    let (channels, root) = presentation.parts_mut();
    let mut session = PublishSession::new(dest_dir, base_uri, channels, config)?;

    tracing::info!(
        source = %config.source_channel,
        destination = %config.destination_channel,
        dest = %session.dest_dir().display(),
        "publishing presentation"
    );
    let traversal = publish_tree(
        root,
        &mut session,
        |node| config.triggers_new_file(node),
        |node| config.must_skip(node),
    )?;
    let files = session.finish()?;

    Ok(PublishReport::new(config, files, traversal))
}

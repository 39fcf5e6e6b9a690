//! Content tree nodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::media::{ExternalAudioMedia, ManagedAudioMedia, Media};

/// Position of a node as child indices from the root.
///
/// The root has an empty path and displays as `/`; its second child's
/// first child displays as `/1/0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of edges from the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A node of the content tree.
///
/// Each node has an optional element name, at most one media value per
/// channel and an ordered list of children. Cloning a node deep-clones the
/// subtree; managed audio payload storage is shared between the clones.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    name: Option<String>,
    media: BTreeMap<String, Media>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates an unnamed node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node with an element name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Media value on `channel`, if any.
    pub fn media(&self, channel: &str) -> Option<&Media> {
        self.media.get(channel)
    }

    /// Managed audio on `channel`, if that is what the channel carries.
    pub fn managed_audio(&self, channel: &str) -> Option<&ManagedAudioMedia> {
        self.media(channel).and_then(Media::as_managed_audio)
    }

    /// External audio on `channel`, if that is what the channel carries.
    pub fn external_audio(&self, channel: &str) -> Option<&ExternalAudioMedia> {
        self.media(channel).and_then(Media::as_external_audio)
    }

    /// Sets the media on `channel`, returning the previous value.
    ///
    /// No channel check is made here; see
    /// [`Presentation::set_media`](crate::Presentation::set_media).
    pub fn set_media(&mut self, channel: impl Into<String>, media: impl Into<Media>) -> Option<Media> {
        self.media.insert(channel.into(), media.into())
    }

    /// Removes and returns the media on `channel`.
    pub fn remove_media(&mut self, channel: &str) -> Option<Media> {
        self.media.remove(channel)
    }

    /// Channel/media pairs in channel name order.
    pub fn media_entries(&self) -> impl Iterator<Item = (&str, &Media)> {
        self.media.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [TreeNode] {
        &mut self.children
    }

    /// Appends a child and returns a reference to it.
    pub fn append_child(&mut self, child: TreeNode) -> &mut TreeNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Builder form of [`TreeNode::append_child`].
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder form of [`TreeNode::set_media`].
    pub fn with_media(mut self, channel: impl Into<String>, media: impl Into<Media>) -> Self {
        self.set_media(channel, media);
        self
    }

    /// Node at `path` below this node.
    pub fn node_at(&self, path: &NodePath) -> Option<&TreeNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    /// Mutable node at `path` below this node.
    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut TreeNode> {
        path.indices()
            .iter()
            .try_fold(self, |node, &i| node.children.get_mut(i))
    }

    /// Pre-order iterator over this subtree, yielding each node's path.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(NodePath::root(), self)],
        }
    }

    /// Number of nodes in this subtree, including this node.
    pub fn subtree_len(&self) -> usize {
        self.iter().count()
    }
}

/// Depth-first pre-order iterator over a subtree.
///
/// Uses an explicit stack, so deep trees do not grow the call stack.
pub struct PreOrder<'a> {
    stack: Vec<(NodePath, &'a TreeNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (NodePath, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (i, child) in node.children.iter().enumerate().rev() {
            self.stack.push((path.child(i), child));
        }
        Some((path, node))
    }
}

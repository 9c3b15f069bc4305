use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown node key {0:?}")]
    UnknownKey(NodeKey),
    #[error("node {0:?} is not attached to the tree")]
    Detached(NodeKey),
    #[error("{parent:?} node cannot contain {child:?} children")]
    InvalidChild { parent: NodeKind, child: NodeKind },
    #[error("expected a {expected:?} node, found {found:?}")]
    WrongKind { expected: NodeKind, found: NodeKind },
}

/// Stable identity of a node, valid across versions of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
    Checklist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Text,
    List,
    ListItem,
}

/// Closed set of node payloads. Structural code dispatches on
/// `NodeBody::kind` instead of downcasting.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeBody {
    Root,
    Paragraph,
    Text(String),
    List { kind: ListKind, start: u32 },
    ListItem { value: u32, checked: Option<bool> },
}

impl NodeBody {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Root => NodeKind::Root,
            NodeBody::Paragraph => NodeKind::Paragraph,
            NodeBody::Text(_) => NodeKind::Text,
            NodeBody::List { .. } => NodeKind::List,
            NodeBody::ListItem { .. } => NodeKind::ListItem,
        }
    }

    pub fn is_element(&self) -> bool {
        !matches!(self, NodeBody::Text(_))
    }
}

pub(crate) fn can_contain(parent: NodeKind, child: NodeKind) -> bool {
    match parent {
        NodeKind::Root => matches!(child, NodeKind::Paragraph | NodeKind::List),
        NodeKind::Paragraph => matches!(child, NodeKind::Text | NodeKind::List),
        NodeKind::List => child == NodeKind::ListItem,
        NodeKind::ListItem => matches!(child, NodeKind::Text | NodeKind::List),
        NodeKind::Text => false,
    }
}

pub(crate) fn can_be_empty(kind: NodeKind) -> bool {
    kind != NodeKind::List
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub body: NodeBody,
    pub format: String,
    pub indent: u32,
    pub direction: Option<String>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Node {
    fn new(body: NodeBody) -> Self {
        Self {
            body,
            format: String::new(),
            indent: 0,
            direction: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// An immutable, shareable version of the whole tree. Cloning a snapshot
/// is cheap; the nodes themselves are refcounted and never mutated in
/// place, so snapshots taken before an edit stay valid after it commits.
#[derive(Clone, Debug)]
pub struct Snapshot {
    nodes: HashMap<NodeKey, Arc<Node>>,
    root: NodeKey,
    version: u64,
}

impl Snapshot {
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key).map(Arc::as_ref)
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The document tree. All mutation goes through [`DocTree::edit`], which
/// runs a closure against a copy-on-write [`Edit`] transaction and either
/// commits it as the next version or discards it wholesale on error.
#[derive(Clone, Debug)]
pub struct DocTree {
    committed: Snapshot,
    next_key: u64,
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree {
    pub fn new() -> Self {
        let root = NodeKey(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Arc::new(Node::new(NodeBody::Root)));
        Self {
            committed: Snapshot {
                nodes,
                root,
                version: 0,
            },
            next_key: 1,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.committed.root
    }

    pub fn version(&self) -> u64 {
        self.committed.version
    }

    /// Latest committed version of the tree.
    pub fn snapshot(&self) -> Snapshot {
        self.committed.clone()
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.committed.get(key)
    }

    pub fn edit<T>(&mut self, f: impl FnOnce(&mut Edit) -> Result<T>) -> Result<T> {
        let mut edit = Edit {
            base: self.committed.clone(),
            pending: HashMap::new(),
            removed: HashSet::new(),
            next_key: self.next_key,
        };
        let value = f(&mut edit)?;
        for key in &edit.removed {
            self.committed.nodes.remove(key);
        }
        for (key, node) in edit.pending {
            self.committed.nodes.insert(key, Arc::new(node));
        }
        self.committed.version += 1;
        self.next_key = edit.next_key;
        debug!(version = self.committed.version, "edit committed");
        Ok(value)
    }
}

/// One open transaction. Reads resolve pending-over-committed, writes
/// clone the committed node into the pending overlay on first touch.
pub struct Edit {
    base: Snapshot,
    pending: HashMap<NodeKey, Node>,
    removed: HashSet<NodeKey>,
    next_key: u64,
}

impl Edit {
    pub fn root(&self) -> NodeKey {
        self.base.root
    }

    pub fn create(&mut self, body: NodeBody) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        self.pending.insert(key, Node::new(body));
        key
    }

    pub fn exists(&self, key: NodeKey) -> bool {
        !self.removed.contains(&key)
            && (self.pending.contains_key(&key) || self.base.nodes.contains_key(&key))
    }

    /// Freshest version of the node within this transaction.
    pub fn latest(&self, key: NodeKey) -> Result<&Node> {
        if self.removed.contains(&key) {
            return Err(TreeError::UnknownKey(key));
        }
        if let Some(node) = self.pending.get(&key) {
            return Ok(node);
        }
        self.base
            .nodes
            .get(&key)
            .map(Arc::as_ref)
            .ok_or(TreeError::UnknownKey(key))
    }

    /// Clone-on-first-write access to the pending version of the node.
    pub fn writable(&mut self, key: NodeKey) -> Result<&mut Node> {
        if self.removed.contains(&key) {
            return Err(TreeError::UnknownKey(key));
        }
        if !self.pending.contains_key(&key) {
            let node = self
                .base
                .nodes
                .get(&key)
                .ok_or(TreeError::UnknownKey(key))?;
            self.pending.insert(key, Node::clone(node));
        }
        let Some(node) = self.pending.get_mut(&key) else {
            return Err(TreeError::UnknownKey(key));
        };
        Ok(node)
    }

    /// The node as it looked before this transaction, if it existed.
    pub fn committed(&self, key: NodeKey) -> Option<&Node> {
        self.base.get(key)
    }

    pub fn kind(&self, key: NodeKey) -> Result<NodeKind> {
        Ok(self.latest(key)?.body.kind())
    }

    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        Ok(self.latest(key)?.parent)
    }

    pub fn parent_or_err(&self, key: NodeKey) -> Result<NodeKey> {
        self.latest(key)?.parent.ok_or(TreeError::Detached(key))
    }

    pub fn children(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        Ok(self.latest(key)?.children.clone())
    }

    pub fn child_count(&self, key: NodeKey) -> Result<usize> {
        Ok(self.latest(key)?.children.len())
    }

    pub fn first_child(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        Ok(self.latest(key)?.children.first().copied())
    }

    pub fn last_child(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        Ok(self.latest(key)?.children.last().copied())
    }

    fn index_in_parent(&self, key: NodeKey) -> Result<(NodeKey, usize)> {
        let parent = self.parent_or_err(key)?;
        let index = self
            .latest(parent)?
            .children
            .iter()
            .position(|&child| child == key)
            .ok_or(TreeError::Detached(key))?;
        Ok((parent, index))
    }

    pub fn previous_sibling(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        let Some(parent) = self.parent(key)? else {
            return Ok(None);
        };
        let children = &self.latest(parent)?.children;
        let Some(index) = children.iter().position(|&child| child == key) else {
            return Ok(None);
        };
        Ok(index.checked_sub(1).and_then(|i| children.get(i).copied()))
    }

    pub fn next_sibling(&self, key: NodeKey) -> Result<Option<NodeKey>> {
        let Some(parent) = self.parent(key)? else {
            return Ok(None);
        };
        let children = &self.latest(parent)?.children;
        let Some(index) = children.iter().position(|&child| child == key) else {
            return Ok(None);
        };
        Ok(children.get(index + 1).copied())
    }

    /// All siblings before `key`, in document order.
    pub fn previous_siblings(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        let Some(parent) = self.parent(key)? else {
            return Ok(Vec::new());
        };
        let children = &self.latest(parent)?.children;
        let Some(index) = children.iter().position(|&child| child == key) else {
            return Ok(Vec::new());
        };
        Ok(children[..index].to_vec())
    }

    /// All siblings after `key`, in document order.
    pub fn next_siblings(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        let Some(parent) = self.parent(key)? else {
            return Ok(Vec::new());
        };
        let children = &self.latest(parent)?.children;
        let Some(index) = children.iter().position(|&child| child == key) else {
            return Ok(Vec::new());
        };
        Ok(children[index + 1..].to_vec())
    }

    pub fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> Result<bool> {
        let mut current = self.parent(node)?;
        while let Some(key) = current {
            if key == ancestor {
                return Ok(true);
            }
            current = self.parent(key)?;
        }
        Ok(false)
    }

    fn check_insertion(&self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let parent_kind = self.kind(parent)?;
        let child_kind = self.kind(child)?;
        if !can_contain(parent_kind, child_kind) {
            return Err(TreeError::InvalidChild {
                parent: parent_kind,
                child: child_kind,
            });
        }
        if parent == child || self.is_ancestor(child, parent)? {
            return Err(TreeError::InvalidChild {
                parent: parent_kind,
                child: child_kind,
            });
        }
        Ok(())
    }

    fn detach(&mut self, key: NodeKey) -> Result<()> {
        let Some(parent) = self.parent(key)? else {
            return Ok(());
        };
        self.writable(parent)?.children.retain(|&child| child != key);
        self.writable(key)?.parent = None;
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.writable(parent)?.children.push(child);
        self.writable(child)?.parent = Some(parent);
        Ok(())
    }

    /// Generic sibling insertion: `new` ends up directly before `node`.
    pub fn insert_before(&mut self, node: NodeKey, new: NodeKey) -> Result<NodeKey> {
        self.insert_sibling(node, new, false)
    }

    /// Generic sibling insertion: `new` ends up directly after `node`.
    pub fn insert_after(&mut self, node: NodeKey, new: NodeKey) -> Result<NodeKey> {
        self.insert_sibling(node, new, true)
    }

    fn insert_sibling(&mut self, node: NodeKey, new: NodeKey, after: bool) -> Result<NodeKey> {
        let parent = self.parent_or_err(node)?;
        self.check_insertion(parent, new)?;
        self.detach(new)?;
        let (parent, index) = self.index_in_parent(node)?;
        let at = if after { index + 1 } else { index };
        self.writable(parent)?.children.insert(at, new);
        self.writable(new)?.parent = Some(parent);
        Ok(new)
    }

    /// Generic structural replace: `new` takes `node`'s place, `node` and
    /// its subtree are removed. Children are not carried over.
    pub fn replace(&mut self, node: NodeKey, new: NodeKey) -> Result<NodeKey> {
        self.insert_after(node, new)?;
        self.remove(node, false)?;
        Ok(new)
    }

    /// Generic removal. Unless `preserve_empty_parent` is set, a parent
    /// that may not be empty (a list container) is removed along with its
    /// last child.
    pub fn remove(&mut self, key: NodeKey, preserve_empty_parent: bool) -> Result<()> {
        let parent = self.parent(key)?;
        if let Some(parent) = parent {
            self.writable(parent)?.children.retain(|&child| child != key);
        }
        self.delete_subtree(key)?;
        if let Some(parent) = parent {
            if !preserve_empty_parent
                && !can_be_empty(self.kind(parent)?)
                && self.latest(parent)?.children.is_empty()
            {
                self.remove(parent, false)?;
            }
        }
        Ok(())
    }

    fn delete_subtree(&mut self, key: NodeKey) -> Result<()> {
        for child in self.children(key)? {
            self.delete_subtree(child)?;
        }
        self.pending.remove(&key);
        self.removed.insert(key);
        Ok(())
    }

    /// Concatenated text of all `Text` descendants, in document order.
    pub fn text_content(&self, key: NodeKey) -> Result<String> {
        let mut out = String::new();
        self.collect_text(key, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, key: NodeKey, out: &mut String) -> Result<()> {
        let node = self.latest(key)?;
        if let NodeBody::Text(text) = &node.body {
            out.push_str(text);
            return Ok(());
        }
        for child in node.children.clone() {
            self.collect_text(child, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tree_tests;

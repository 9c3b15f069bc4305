use crate::tree::{Edit, NodeBody, NodeKey, Result, TreeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointKind {
    Element,
    Text,
}

/// One endpoint of a range selection. An `Element` point addresses a gap
/// between children (`offset` counts children), a `Text` point addresses
/// a character position inside a text node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
    pub kind: PointKind,
}

impl Point {
    pub fn new(key: NodeKey, offset: usize, kind: PointKind) -> Self {
        Self { key, offset, kind }
    }

    pub fn set(&mut self, key: NodeKey, offset: usize, kind: PointKind) {
        self.key = key;
        self.offset = offset;
        self.kind = kind;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangeSelection {
    pub anchor: Point,
    pub focus: Point,
}

impl RangeSelection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Text covered by the range, in document order. Endpoint order does
    /// not matter; both endpoints must be reachable from the root.
    pub fn text_content(&self, edit: &Edit) -> Result<String> {
        let (text, anchor_at, focus_at) = self.resolve(edit)?;
        let (from, to) = (anchor_at.min(focus_at), anchor_at.max(focus_at));
        Ok(text.chars().skip(from).take(to - from).collect())
    }

    /// Whether the focus precedes the anchor in document order.
    pub fn is_backward(&self, edit: &Edit) -> Result<bool> {
        let (_, anchor_at, focus_at) = self.resolve(edit)?;
        Ok(focus_at < anchor_at)
    }

    fn resolve(&self, edit: &Edit) -> Result<(String, usize, usize)> {
        let mut walk = Walk {
            text: String::new(),
            chars: 0,
            anchor_at: None,
            focus_at: None,
        };
        walk.visit(edit, edit.root(), self)?;
        let Some(anchor_at) = walk.anchor_at else {
            return Err(TreeError::Detached(self.anchor.key));
        };
        let Some(focus_at) = walk.focus_at else {
            return Err(TreeError::Detached(self.focus.key));
        };
        Ok((walk.text, anchor_at, focus_at))
    }
}

/// Selections other than a plain contiguous range carry whole nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Range(RangeSelection),
    Nodes(Vec<NodeKey>),
}

struct Walk {
    text: String,
    chars: usize,
    anchor_at: Option<usize>,
    focus_at: Option<usize>,
}

impl Walk {
    fn visit(&mut self, edit: &Edit, key: NodeKey, selection: &RangeSelection) -> Result<()> {
        let node = edit.latest(key)?;
        if let NodeBody::Text(text) = &node.body {
            let len = text.chars().count();
            self.mark_text_point(&selection.anchor, key, len, true);
            self.mark_text_point(&selection.focus, key, len, false);
            self.text.push_str(text);
            self.chars += len;
            return Ok(());
        }
        let children = node.children().to_vec();
        for (index, child) in children.iter().enumerate() {
            self.mark_element_point(&selection.anchor, key, index, children.len(), true);
            self.mark_element_point(&selection.focus, key, index, children.len(), false);
            self.visit(edit, *child, selection)?;
        }
        self.mark_element_point(&selection.anchor, key, children.len(), children.len(), true);
        self.mark_element_point(&selection.focus, key, children.len(), children.len(), false);
        Ok(())
    }

    fn mark_text_point(&mut self, point: &Point, key: NodeKey, len: usize, anchor: bool) {
        if point.kind != PointKind::Text || point.key != key {
            return;
        }
        let at = self.chars + point.offset.min(len);
        let slot = if anchor {
            &mut self.anchor_at
        } else {
            &mut self.focus_at
        };
        if slot.is_none() {
            *slot = Some(at);
        }
    }

    fn mark_element_point(
        &mut self,
        point: &Point,
        key: NodeKey,
        index: usize,
        child_count: usize,
        anchor: bool,
    ) {
        if point.kind != PointKind::Element || point.key != key {
            return;
        }
        let matches = point.offset == index || (index == child_count && point.offset > child_count);
        if !matches {
            return;
        }
        let slot = if anchor {
            &mut self.anchor_at
        } else {
            &mut self.focus_at
        };
        if slot.is_none() {
            *slot = Some(self.chars);
        }
    }
}

use tracing::warn;

use super::{
    container, create_list, create_list_item, format, is_list_item_node, is_list_node,
    is_nested_list_item,
};
use crate::selection::{PointKind, RangeSelection, Selection};
use crate::tree::{Edit, NodeBody, NodeKey, NodeKind, Result, TreeError};

pub fn value(edit: &Edit, item: NodeKey) -> Result<u32> {
    match &edit.latest(item)?.body {
        NodeBody::ListItem { value, .. } => Ok(*value),
        body => Err(TreeError::WrongKind {
            expected: NodeKind::ListItem,
            found: body.kind(),
        }),
    }
}

pub fn set_value(edit: &mut Edit, item: NodeKey, new_value: u32) -> Result<()> {
    match &mut edit.writable(item)?.body {
        NodeBody::ListItem { value, .. } => {
            *value = new_value;
            Ok(())
        }
        body => Err(TreeError::WrongKind {
            expected: NodeKind::ListItem,
            found: body.kind(),
        }),
    }
}

pub fn checked(edit: &Edit, item: NodeKey) -> Result<Option<bool>> {
    match &edit.latest(item)?.body {
        NodeBody::ListItem { checked, .. } => Ok(*checked),
        body => Err(TreeError::WrongKind {
            expected: NodeKind::ListItem,
            found: body.kind(),
        }),
    }
}

pub fn set_checked(edit: &mut Edit, item: NodeKey, new_checked: Option<bool>) -> Result<()> {
    match &mut edit.writable(item)?.body {
        NodeBody::ListItem { checked, .. } => {
            *checked = new_checked;
            Ok(())
        }
        body => Err(TreeError::WrongKind {
            expected: NodeKind::ListItem,
            found: body.kind(),
        }),
    }
}

pub fn toggle_checked(edit: &mut Edit, item: NodeKey) -> Result<()> {
    let current = checked(edit, item)?;
    set_checked(edit, item, Some(!current.unwrap_or(false)))
}

/// Appends `nodes` to the item. Elements the item can merge with
/// (paragraphs and other items) are spliced in: their children are
/// appended instead and the emptied element is discarded. No mergeable
/// element survives as a direct child.
pub fn append(edit: &mut Edit, item: NodeKey, nodes: &[NodeKey]) -> Result<()> {
    for &node in nodes {
        let mergeable = edit.latest(node)?.body.is_element() && can_merge_with(edit, node);
        if mergeable {
            let children = edit.children(node)?;
            append(edit, item, &children)?;
            if is_list_item_node(edit, node) {
                remove(edit, node, false)?;
            } else {
                edit.remove(node, false)?;
            }
        } else {
            edit.append_child(item, node)?;
        }
    }
    Ok(())
}

/// Replaces the item with `replacement`. Item-for-item goes through the
/// generic structural replace. Any other node is placed at the
/// container's level: the item is outdented to the top first, then the
/// replacement lands before, after, or between a split of the container
/// depending on the item's position. With `include_children` the item's
/// children move onto the replacement. An emptied container is removed.
pub fn replace(
    edit: &mut Edit,
    item: NodeKey,
    replacement: NodeKey,
    include_children: bool,
) -> Result<NodeKey> {
    if is_list_item_node(edit, replacement) {
        return edit.replace(item, replacement);
    }
    set_indent(edit, item, 0)?;
    let list = edit.parent_or_err(item)?;
    if !is_list_node(edit, list) {
        return Ok(replacement);
    }
    if edit.first_child(list)? == Some(item) {
        edit.insert_before(list, replacement)?;
    } else if edit.last_child(list)? == Some(item) {
        edit.insert_after(list, replacement)?;
    } else {
        // Split the container around the item.
        let kind = container::list_kind(edit, list)?;
        let split = create_list(edit, kind);
        let mut next = edit.next_sibling(item)?;
        while let Some(sibling) = next {
            next = edit.next_sibling(sibling)?;
            edit.append_child(split, sibling)?;
        }
        edit.insert_after(list, replacement)?;
        edit.insert_after(replacement, split)?;
    }
    if include_children {
        for child in edit.children(item)? {
            edit.append_child(replacement, child)?;
        }
    }
    remove(edit, item, false)?;
    if edit.exists(list) && edit.child_count(list)? == 0 {
        edit.remove(list, false)?;
    }
    Ok(replacement)
}

/// Inserts `node` after the item. Items are inserted as plain siblings.
/// A container of the same kind is fused in child by child instead of
/// nesting; the surviving container keeps its own metadata. Anything
/// else splits the container at this point, with the item's following
/// siblings moved into a fresh container of the original kind.
pub fn insert_after(edit: &mut Edit, item: NodeKey, node: NodeKey) -> Result<NodeKey> {
    let list = edit.parent_or_err(item)?;
    if !is_list_node(edit, list) {
        warn!("insert_after: parent of list item is not a list container");
        return Ok(list);
    }
    let siblings = edit.next_siblings(item)?;

    if is_list_item_node(edit, node) {
        return edit.insert_after(item, node);
    }

    if is_list_node(edit, node)
        && container::list_kind(edit, node)? == container::list_kind(edit, list)?
    {
        let children = edit.children(node)?;
        let mut last = node;
        for &child in children.iter().rev() {
            insert_after(edit, item, child)?;
            last = child;
        }
        edit.remove(node, false)?;
        return Ok(last);
    }

    // Different kind or non-list node: split the container around it.
    edit.insert_after(list, node)?;
    if !siblings.is_empty() {
        let kind = container::list_kind(edit, list)?;
        let split = create_list(edit, kind);
        for sibling in siblings {
            edit.append_child(split, sibling)?;
        }
        edit.insert_after(node, split)?;
    }
    Ok(node)
}

/// Inserts `node` before the item. Inserting an item first renumbers the
/// siblings that are about to shift position.
pub fn insert_before(edit: &mut Edit, item: NodeKey, node: NodeKey) -> Result<NodeKey> {
    if is_list_item_node(edit, node) {
        let parent = edit.parent_or_err(item)?;
        if is_list_node(edit, parent) {
            let siblings = edit.next_siblings(item)?;
            container::update_item_values(edit, parent, Some(&siblings))?;
        }
    }
    edit.insert_before(item, node)
}

/// Removes the item. When the removal leaves two nesting wrappers as
/// direct neighbors their nested containers are fused into one;
/// otherwise the next sibling's container is renumbered.
pub fn remove(edit: &mut Edit, item: NodeKey, preserve_empty_parent: bool) -> Result<()> {
    let previous = edit.previous_sibling(item)?;
    let next = edit.next_sibling(item)?;
    edit.remove(item, preserve_empty_parent)?;

    match (previous, next) {
        (Some(previous), Some(next))
            if is_nested_list_item(edit, previous) && is_nested_list_item(edit, next) =>
        {
            let Some(into) = edit.first_child(previous)? else {
                return Ok(());
            };
            let Some(from) = edit.first_child(next)? else {
                return Ok(());
            };
            format::merge_lists(edit, into, from)?;
            remove(edit, next, false)?;
        }
        (_, Some(next)) => {
            if let Some(parent) = edit.parent(next)? {
                if is_list_node(edit, parent) {
                    container::update_item_values(edit, parent, None)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Creates the item for a "new list entry" gesture and inserts it after
/// this one. A checked state is carried over as unchecked; items without
/// one stay without one.
pub fn insert_new_after(edit: &mut Edit, item: NodeKey) -> Result<NodeKey> {
    let carried = checked(edit, item)?.map(|_| false);
    let new = create_list_item(edit, carried);
    insert_after(edit, item, new)?;
    Ok(new)
}

/// Dedents the item into a paragraph when the cursor sits at its start.
/// A sole item of a nested container removes the container outright and
/// selects the enclosing item; a sole item of a top-level container
/// replaces the container with the paragraph, re-pointing any element
/// selection endpoints; otherwise the paragraph lands before the
/// container and only this item is removed.
pub fn collapse_at_start(
    edit: &mut Edit,
    item: NodeKey,
    selection: &mut RangeSelection,
) -> Result<bool> {
    let paragraph = edit.create(NodeBody::Paragraph);
    for child in edit.children(item)? {
        edit.append_child(paragraph, child)?;
    }
    let list = edit.parent_or_err(item)?;
    let list_parent = edit.parent_or_err(list)?;
    let indented = is_list_item_node(edit, list_parent);

    if edit.child_count(list)? == 1 {
        if indented {
            edit.remove(list, false)?;
            edit.remove(paragraph, false)?;
            let offset = edit.child_count(list_parent)?;
            selection.anchor.set(list_parent, offset, PointKind::Element);
            selection.focus.set(list_parent, offset, PointKind::Element);
        } else {
            edit.replace(list, paragraph)?;
            if selection.anchor.kind == PointKind::Element && selection.anchor.key == item {
                selection
                    .anchor
                    .set(paragraph, selection.anchor.offset, PointKind::Element);
            }
            if selection.focus.kind == PointKind::Element && selection.focus.key == item {
                selection
                    .focus
                    .set(paragraph, selection.focus.offset, PointKind::Element);
            }
        }
    } else {
        edit.insert_before(list, paragraph)?;
        remove(edit, item, false)?;
    }
    Ok(true)
}

/// Indent level derived from nesting depth: one level per
/// (container, item) ancestor pair above the item's own container. Falls
/// back to the stored field only when the item has no parent yet, as
/// happens mid-deserialization.
pub fn indent(edit: &Edit, item: NodeKey) -> Result<u32> {
    let node = edit.latest(item)?;
    let Some(parent) = node.parent() else {
        return Ok(node.indent);
    };
    let mut level = 0;
    let mut ancestor = edit.parent_or_err(parent)?;
    while is_list_item_node(edit, ancestor) {
        let list = edit.parent_or_err(ancestor)?;
        ancestor = edit.parent_or_err(list)?;
        level += 1;
    }
    Ok(level)
}

/// Steps single-level indents or outdents until the structural indent
/// matches `target`. A step that makes no structural progress ends the
/// loop, so unreachable targets clamp at the nearest reachable level.
pub fn set_indent(edit: &mut Edit, item: NodeKey, target: u32) -> Result<()> {
    let mut current = indent(edit, item)?;
    while current != target {
        if current < target {
            format::handle_indent(edit, item)?;
        } else {
            format::handle_outdent(edit, item)?;
        }
        let updated = indent(edit, item)?;
        if updated == current {
            break;
        }
        current = updated;
    }
    Ok(())
}

/// Indent and outdent for list items go through the structural
/// algorithms, never the generic element indent.
pub fn can_indent() -> bool {
    false
}

pub fn can_insert_after(edit: &Edit, node: NodeKey) -> bool {
    is_list_node(edit, node)
}

pub fn can_replace_with(edit: &Edit, node: NodeKey) -> bool {
    is_list_item_node(edit, node)
}

pub fn can_merge_with(edit: &Edit, node: NodeKey) -> bool {
    matches!(
        edit.kind(node),
        Ok(NodeKind::Paragraph | NodeKind::ListItem)
    )
}

/// Whether the item's identity may be discarded in favor of `child`
/// alone when extracting `selection`: true only for a range selection
/// contained in the item whose text covers exactly the item's full text.
pub fn extract_with_child(
    edit: &Edit,
    item: NodeKey,
    _child: NodeKey,
    selection: &Selection,
) -> Result<bool> {
    let Selection::Range(range) = selection else {
        return Ok(false);
    };
    if !edit.is_ancestor(item, range.anchor.key)? || !edit.is_ancestor(item, range.focus.key)? {
        return Ok(false);
    }
    let item_text = edit.text_content(item)?;
    let selected = range.text_content(edit)?;
    Ok(item_text.chars().count() == selected.chars().count())
}

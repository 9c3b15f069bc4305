use crate::tree::{Edit, ListKind, NodeBody, NodeKey, NodeKind};

pub mod container;
pub mod format;
pub mod item;

/// Creates a fresh, detached list container of the given kind.
pub fn create_list(edit: &mut Edit, kind: ListKind) -> NodeKey {
    edit.create(NodeBody::List { kind, start: 1 })
}

/// Creates a fresh, detached list item. Passing `Some(..)` gives the item
/// a checked state, as used inside checklist containers.
pub fn create_list_item(edit: &mut Edit, checked: Option<bool>) -> NodeKey {
    edit.create(NodeBody::ListItem { value: 1, checked })
}

pub fn is_list_node(edit: &Edit, key: NodeKey) -> bool {
    edit.kind(key).is_ok_and(|kind| kind == NodeKind::List)
}

pub fn is_list_item_node(edit: &Edit, key: NodeKey) -> bool {
    edit.kind(key).is_ok_and(|kind| kind == NodeKind::ListItem)
}

/// An item whose first child is a list container, i.e. an indentation
/// wrapper holding one nested list.
pub fn is_nested_list_item(edit: &Edit, key: NodeKey) -> bool {
    if !is_list_item_node(edit, key) {
        return false;
    }
    match edit.first_child(key) {
        Ok(Some(child)) => is_list_node(edit, child),
        _ => false,
    }
}

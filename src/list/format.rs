use super::{
    container, create_list, create_list_item, is_list_item_node, is_list_node,
    is_nested_list_item, item,
};
use crate::tree::{Edit, NodeKey, Result};

/// Moves `item` one indent level deeper. When a nesting wrapper already
/// exists next to the item it is merged into that wrapper (fusing the
/// wrappers on both sides when the item sits between two of them);
/// otherwise a fresh wrapper of the parent's kind is created in place.
/// Nesting wrappers themselves are never indented.
pub fn handle_indent(edit: &mut Edit, item: NodeKey) -> Result<()> {
    if is_nested_list_item(edit, item) {
        return Ok(());
    }
    let Some(parent) = edit.parent(item)? else {
        return Ok(());
    };
    let previous = edit.previous_sibling(item)?;
    let next = edit.next_sibling(item)?;
    let previous_nested = previous.filter(|&key| is_nested_list_item(edit, key));
    let next_nested = next.filter(|&key| is_nested_list_item(edit, key));

    match (previous_nested, next_nested) {
        (Some(previous), Some(next)) => {
            let Some(inner) = edit.first_child(previous)? else {
                return Ok(());
            };
            edit.append_child(inner, item)?;
            let Some(next_inner) = edit.first_child(next)? else {
                return Ok(());
            };
            for child in edit.children(next_inner)? {
                edit.append_child(inner, child)?;
            }
            item::remove(edit, next, false)?;
        }
        (None, Some(next)) => {
            let Some(inner) = edit.first_child(next)? else {
                return Ok(());
            };
            match edit.first_child(inner)? {
                Some(first) => {
                    edit.insert_before(first, item)?;
                }
                None => edit.append_child(inner, item)?,
            }
        }
        (Some(previous), None) => {
            let Some(inner) = edit.first_child(previous)? else {
                return Ok(());
            };
            edit.append_child(inner, item)?;
        }
        (None, None) => {
            if is_list_node(edit, parent) {
                let kind = container::list_kind(edit, parent)?;
                let wrapper = create_list_item(edit, None);
                let inner = create_list(edit, kind);
                edit.append_child(wrapper, inner)?;
                edit.append_child(inner, item)?;
                match (previous, next) {
                    (Some(previous), _) => {
                        edit.insert_after(previous, wrapper)?;
                    }
                    (None, Some(next)) => {
                        edit.insert_before(next, wrapper)?;
                    }
                    (None, None) => edit.append_child(parent, wrapper)?,
                }
            }
        }
    }

    if is_list_node(edit, parent) {
        container::update_item_values(edit, parent, None)?;
    }
    Ok(())
}

/// Moves `item` one indent level out. Only applies when the item's
/// container is itself nested inside an item of an outer container.
/// First and last children hop out before/after the wrapper; a middle
/// child splits the wrapper in two and takes its place.
pub fn handle_outdent(edit: &mut Edit, item: NodeKey) -> Result<()> {
    if is_nested_list_item(edit, item) {
        return Ok(());
    }
    let Some(parent_list) = edit.parent(item)? else {
        return Ok(());
    };
    let Some(wrapper_item) = edit.parent(parent_list)? else {
        return Ok(());
    };
    let Some(outer_list) = edit.parent(wrapper_item)? else {
        return Ok(());
    };
    if !is_list_node(edit, outer_list)
        || !is_list_item_node(edit, wrapper_item)
        || !is_list_node(edit, parent_list)
    {
        return Ok(());
    }

    if edit.first_child(parent_list)? == Some(item) {
        edit.insert_before(wrapper_item, item)?;
        if edit.child_count(parent_list)? == 0 {
            item::remove(edit, wrapper_item, false)?;
        }
    } else if edit.last_child(parent_list)? == Some(item) {
        edit.insert_after(wrapper_item, item)?;
        if edit.child_count(parent_list)? == 0 {
            item::remove(edit, wrapper_item, false)?;
        }
    } else {
        // Split the wrapper into previous- and next-sibling wrappers and
        // put the item where the old wrapper was.
        let kind = container::list_kind(edit, parent_list)?;
        let previous_wrapper = create_list_item(edit, None);
        let previous_list = create_list(edit, kind);
        edit.append_child(previous_wrapper, previous_list)?;
        for sibling in edit.previous_siblings(item)? {
            edit.append_child(previous_list, sibling)?;
        }
        let next_wrapper = create_list_item(edit, None);
        let next_list = create_list(edit, kind);
        edit.append_child(next_wrapper, next_list)?;
        for sibling in edit.next_siblings(item)? {
            edit.append_child(next_list, sibling)?;
        }
        edit.insert_before(wrapper_item, previous_wrapper)?;
        edit.insert_after(wrapper_item, next_wrapper)?;
        edit.replace(wrapper_item, item)?;
    }

    if edit.exists(parent_list) {
        container::update_item_values(edit, parent_list, None)?;
    }
    container::update_item_values(edit, outer_list, None)?;
    Ok(())
}

/// Fuses two adjacent nested containers: every child of `from` is moved
/// to the end of `into`, which is then renumbered. Callers pass the first
/// children of two neighboring nesting wrappers and dispose of the
/// emptied wrapper themselves.
pub fn merge_lists(edit: &mut Edit, into: NodeKey, from: NodeKey) -> Result<()> {
    for child in edit.children(from)? {
        edit.append_child(into, child)?;
    }
    container::update_item_values(edit, into, None)?;
    Ok(())
}

use crate::tree::{Edit, ListKind, NodeBody, NodeKey, NodeKind, Result, TreeError};

pub fn list_kind(edit: &Edit, list: NodeKey) -> Result<ListKind> {
    match &edit.latest(list)?.body {
        NodeBody::List { kind, .. } => Ok(*kind),
        body => Err(TreeError::WrongKind {
            expected: NodeKind::List,
            found: body.kind(),
        }),
    }
}

pub fn set_list_kind(edit: &mut Edit, list: NodeKey, new_kind: ListKind) -> Result<()> {
    match &mut edit.writable(list)?.body {
        NodeBody::List { kind, .. } => {
            *kind = new_kind;
            Ok(())
        }
        body => Err(TreeError::WrongKind {
            expected: NodeKind::List,
            found: body.kind(),
        }),
    }
}

pub fn start(edit: &Edit, list: NodeKey) -> Result<u32> {
    match &edit.latest(list)?.body {
        NodeBody::List { start, .. } => Ok(*start),
        body => Err(TreeError::WrongKind {
            expected: NodeKind::List,
            found: body.kind(),
        }),
    }
}

pub fn set_start(edit: &mut Edit, list: NodeKey, new_start: u32) -> Result<()> {
    match &mut edit.writable(list)?.body {
        NodeBody::List { start, .. } => {
            *start = new_start;
            Ok(())
        }
        body => Err(TreeError::WrongKind {
            expected: NodeKind::List,
            found: body.kind(),
        }),
    }
}

/// Reassigns ordinal values across the container's item children: each
/// item gets the container start plus the number of item siblings before
/// it. Non-item children are skipped and consume no ordinal. An explicit
/// `children` subsequence limits which nodes are rewritten; positions are
/// still taken from the container.
pub fn update_item_values(
    edit: &mut Edit,
    list: NodeKey,
    children: Option<&[NodeKey]>,
) -> Result<()> {
    let first = start(edit, list)?;
    let all = edit.children(list)?;
    let targets: Vec<NodeKey> = match children {
        Some(subset) => subset.to_vec(),
        None => all.clone(),
    };
    for key in targets {
        let Some(position) = all.iter().position(|&child| child == key) else {
            continue;
        };
        if edit.kind(key)? != NodeKind::ListItem {
            continue;
        }
        let preceding = all[..position]
            .iter()
            .filter(|&&child| matches!(edit.kind(child), Ok(NodeKind::ListItem)))
            .count() as u32;
        let next_value = first + preceding;
        let NodeBody::ListItem { value, .. } = &edit.latest(key)?.body else {
            continue;
        };
        if *value == next_value {
            continue;
        }
        if let NodeBody::ListItem { value, .. } = &mut edit.writable(key)?.body {
            *value = next_value;
        }
    }
    Ok(())
}

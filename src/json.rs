use serde::{Deserialize, Serialize};

use crate::list::item;
use crate::tree::{Edit, ListKind, NodeBody, NodeKey, Result};

/// Generic element-node fields shared by every serialized element record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedElement {
    pub format: String,
    pub indent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub children: Vec<SerializedNode>,
    pub version: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedText {
    pub text: String,
    pub version: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedList {
    #[serde(rename = "listType")]
    pub list_type: ListKind,
    pub start: u32,
    #[serde(flatten)]
    pub element: SerializedElement,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedListItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub value: u32,
    #[serde(flatten)]
    pub element: SerializedElement,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializedNode {
    #[serde(rename = "root")]
    Root(SerializedElement),
    #[serde(rename = "paragraph")]
    Paragraph(SerializedElement),
    #[serde(rename = "text")]
    Text(SerializedText),
    #[serde(rename = "list")]
    List(SerializedList),
    #[serde(rename = "list-item")]
    ListItem(SerializedListItem),
}

/// Serializes the subtree under `key`. Item indent is exported
/// structurally, from nesting depth rather than the stored field.
pub fn export_node(edit: &Edit, key: NodeKey) -> Result<SerializedNode> {
    let node = edit.latest(key)?;
    let body = node.body.clone();
    let format = node.format.clone();
    let direction = node.direction.clone();
    let stored_indent = node.indent;
    let children = node.children().to_vec();

    let mut serialized_children = Vec::with_capacity(children.len());
    for child in children {
        serialized_children.push(export_node(edit, child)?);
    }

    let element = |indent: u32| SerializedElement {
        format: format.clone(),
        indent,
        direction: direction.clone(),
        children: serialized_children.clone(),
        version: 1,
    };

    Ok(match body {
        NodeBody::Root => SerializedNode::Root(element(stored_indent)),
        NodeBody::Paragraph => SerializedNode::Paragraph(element(stored_indent)),
        NodeBody::Text(text) => SerializedNode::Text(SerializedText { text, version: 1 }),
        NodeBody::List { kind, start } => SerializedNode::List(SerializedList {
            list_type: kind,
            start,
            element: element(stored_indent),
        }),
        NodeBody::ListItem { value, checked } => SerializedNode::ListItem(SerializedListItem {
            checked,
            value,
            element: element(item::indent(edit, key)?),
        }),
    })
}

/// Reconstructs a detached subtree from its serialized form. Item indent
/// is applied through `set_indent`, i.e. re-derived structurally: the
/// serialized shape must already nest to match the declared indent, or
/// the structural restore will move nodes around to make it so.
pub fn import_node(edit: &mut Edit, serialized: &SerializedNode) -> Result<NodeKey> {
    match serialized {
        SerializedNode::Root(element) => {
            let key = edit.create(NodeBody::Root);
            import_element(edit, key, element)?;
            Ok(key)
        }
        SerializedNode::Paragraph(element) => {
            let key = edit.create(NodeBody::Paragraph);
            import_element(edit, key, element)?;
            Ok(key)
        }
        SerializedNode::Text(text) => Ok(edit.create(NodeBody::Text(text.text.clone()))),
        SerializedNode::List(list) => {
            let key = edit.create(NodeBody::List {
                kind: list.list_type,
                start: list.start,
            });
            import_element(edit, key, &list.element)?;
            Ok(key)
        }
        SerializedNode::ListItem(serialized_item) => {
            let key = edit.create(NodeBody::ListItem {
                value: serialized_item.value,
                checked: serialized_item.checked,
            });
            import_element_meta(edit, key, &serialized_item.element)?;
            for child in &serialized_item.element.children {
                let child_key = import_node(edit, child)?;
                edit.append_child(key, child_key)?;
            }
            item::set_indent(edit, key, serialized_item.element.indent)?;
            Ok(key)
        }
    }
}

fn import_element(edit: &mut Edit, key: NodeKey, element: &SerializedElement) -> Result<()> {
    import_element_meta(edit, key, element)?;
    edit.writable(key)?.indent = element.indent;
    for child in &element.children {
        let child_key = import_node(edit, child)?;
        edit.append_child(key, child_key)?;
    }
    Ok(())
}

fn import_element_meta(edit: &mut Edit, key: NodeKey, element: &SerializedElement) -> Result<()> {
    let node = edit.writable(key)?;
    node.format = element.format.clone();
    node.direction = element.direction.clone();
    Ok(())
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod json_tests;

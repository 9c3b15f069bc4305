use super::*;
use crate::selection::{Point, PointKind, RangeSelection};

fn paragraph_with_text(edit: &mut Edit, text: &str) -> NodeKey {
    let paragraph = edit.create(NodeBody::Paragraph);
    let text_node = edit.create(NodeBody::Text(text.to_string()));
    edit.append_child(paragraph, text_node)
        .expect("paragraph accepts text");
    paragraph
}

fn list_with_items(edit: &mut Edit, kind: ListKind, texts: &[&str]) -> (NodeKey, Vec<NodeKey>) {
    let list = edit.create(NodeBody::List { kind, start: 1 });
    let mut items = Vec::new();
    for text in texts {
        let item = edit.create(NodeBody::ListItem {
            value: 1,
            checked: None,
        });
        let text_node = edit.create(NodeBody::Text(text.to_string()));
        edit.append_child(item, text_node).expect("item accepts text");
        edit.append_child(list, item).expect("list accepts items");
        items.push(item);
    }
    (list, items)
}

#[test]
fn commit_bumps_version_and_publishes_nodes() {
    let mut tree = DocTree::new();
    assert_eq!(tree.version(), 0);

    let paragraph = tree
        .edit(|edit| {
            let root = edit.root();
            let paragraph = paragraph_with_text(edit, "hello");
            edit.append_child(root, paragraph)?;
            Ok(paragraph)
        })
        .expect("edit commits");

    assert_eq!(tree.version(), 1);
    let node = tree.get(paragraph).expect("paragraph committed");
    assert_eq!(node.body.kind(), NodeKind::Paragraph);
    assert_eq!(tree.get(tree.root()).expect("root").children(), &[paragraph]);
}

#[test]
fn failed_edit_is_discarded_wholesale() {
    let mut tree = DocTree::new();
    let paragraph = tree
        .edit(|edit| {
            let root = edit.root();
            let paragraph = paragraph_with_text(edit, "kept");
            edit.append_child(root, paragraph)?;
            Ok(paragraph)
        })
        .expect("first edit commits");

    let result = tree.edit(|edit| {
        let orphan = edit.create(NodeBody::Paragraph);
        edit.append_child(edit.root(), orphan)?;
        edit.remove(paragraph, false)?;
        // Text nodes cannot carry children, so this aborts the edit.
        let text = edit.create(NodeBody::Text("x".to_string()));
        let inner = edit.create(NodeBody::Text("y".to_string()));
        edit.append_child(text, inner)
    });

    assert!(result.is_err());
    assert_eq!(tree.version(), 1);
    assert!(tree.get(paragraph).is_some());
    assert_eq!(tree.get(tree.root()).expect("root").children().len(), 1);
}

#[test]
fn snapshots_survive_later_edits() {
    let mut tree = DocTree::new();
    let paragraph = tree
        .edit(|edit| {
            let paragraph = paragraph_with_text(edit, "before");
            edit.append_child(edit.root(), paragraph)?;
            Ok(paragraph)
        })
        .expect("edit commits");

    let before = tree.snapshot();
    tree.edit(|edit| {
        let text = edit.first_child(paragraph)?.expect("text child");
        if let NodeBody::Text(value) = &mut edit.writable(text)?.body {
            *value = "after".to_string();
        }
        Ok(())
    })
    .expect("second edit commits");

    let old_text = before
        .get(paragraph)
        .and_then(|node| node.children().first().copied())
        .and_then(|key| before.get(key))
        .map(|node| node.body.clone());
    assert_eq!(old_text, Some(NodeBody::Text("before".to_string())));
    assert_eq!(before.version() + 1, tree.version());
}

#[test]
fn child_type_enforcement() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Unordered, &["a"]);
        edit.append_child(edit.root(), list)?;

        let paragraph = edit.create(NodeBody::Paragraph);
        let error = edit.append_child(list, paragraph);
        assert!(matches!(
            error,
            Err(TreeError::InvalidChild {
                parent: NodeKind::List,
                child: NodeKind::Paragraph,
            })
        ));

        let item = items[0];
        let error = edit.append_child(edit.root(), item);
        assert!(matches!(error, Err(TreeError::InvalidChild { .. })));
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn inserting_into_own_subtree_is_rejected() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Unordered, &["a"]);
        edit.append_child(edit.root(), list)?;
        let inner = edit.create(NodeBody::List {
            kind: ListKind::Unordered,
            start: 1,
        });
        edit.append_child(items[0], inner)?;
        assert!(edit.append_child(inner, items[0]).is_err());
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn sibling_insertion_and_navigation() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Ordered, &["a", "b", "c"]);
        edit.append_child(edit.root(), list)?;

        assert_eq!(edit.previous_sibling(items[1])?, Some(items[0]));
        assert_eq!(edit.next_sibling(items[1])?, Some(items[2]));
        assert_eq!(edit.next_siblings(items[0])?, vec![items[1], items[2]]);
        assert_eq!(edit.previous_siblings(items[2])?, vec![items[0], items[1]]);

        let extra = edit.create(NodeBody::ListItem {
            value: 1,
            checked: None,
        });
        edit.insert_after(items[0], extra)?;
        assert_eq!(
            edit.children(list)?,
            vec![items[0], extra, items[1], items[2]]
        );

        edit.insert_before(items[0], extra)?;
        assert_eq!(
            edit.children(list)?,
            vec![extra, items[0], items[1], items[2]]
        );
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn removing_last_item_removes_the_container() {
    let mut tree = DocTree::new();
    let (list, item) = tree
        .edit(|edit| {
            let (list, items) = list_with_items(edit, ListKind::Unordered, &["only"]);
            edit.append_child(edit.root(), list)?;
            Ok((list, items[0]))
        })
        .expect("edit commits");

    tree.edit(|edit| edit.remove(item, false)).expect("removal");
    assert!(tree.get(list).is_none());
    assert!(tree.get(tree.root()).expect("root").children().is_empty());
}

#[test]
fn preserve_empty_parent_keeps_the_container() {
    let mut tree = DocTree::new();
    let (list, item) = tree
        .edit(|edit| {
            let (list, items) = list_with_items(edit, ListKind::Unordered, &["only"]);
            edit.append_child(edit.root(), list)?;
            Ok((list, items[0]))
        })
        .expect("edit commits");

    tree.edit(|edit| edit.remove(item, true)).expect("removal");
    assert!(tree.get(list).is_some());
    assert!(tree.get(list).expect("list").children().is_empty());
}

#[test]
fn replace_swaps_nodes_in_place() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let first = paragraph_with_text(edit, "first");
        let second = paragraph_with_text(edit, "second");
        let third = paragraph_with_text(edit, "third");
        edit.append_child(edit.root(), first)?;
        edit.append_child(edit.root(), second)?;
        edit.append_child(edit.root(), third)?;

        let replacement = paragraph_with_text(edit, "swapped");
        edit.replace(second, replacement)?;
        assert_eq!(edit.children(edit.root())?, vec![first, replacement, third]);
        assert!(!edit.exists(second));
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn text_content_walks_the_subtree() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Unordered, &["Hello ", "World"]);
        edit.append_child(edit.root(), list)?;
        assert_eq!(edit.text_content(list)?, "Hello World");
        assert_eq!(edit.text_content(items[1])?, "World");
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn selection_text_between_points() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Unordered, &["Hello", "World"]);
        edit.append_child(edit.root(), list)?;
        let first_text = edit.first_child(items[0])?.expect("text");
        let second_text = edit.first_child(items[1])?.expect("text");

        let selection = RangeSelection::new(
            Point::new(first_text, 2, PointKind::Text),
            Point::new(second_text, 3, PointKind::Text),
        );
        assert_eq!(selection.text_content(edit)?, "lloWor");

        let reversed = RangeSelection::new(
            Point::new(second_text, 3, PointKind::Text),
            Point::new(first_text, 2, PointKind::Text),
        );
        assert_eq!(reversed.text_content(edit)?, "lloWor");

        let whole_item = RangeSelection::new(
            Point::new(items[0], 0, PointKind::Element),
            Point::new(items[0], 1, PointKind::Element),
        );
        assert_eq!(whole_item.text_content(edit)?, "Hello");
        Ok(())
    })
    .expect("edit commits");
}

#[test]
fn selection_direction_follows_document_order() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let (list, items) = list_with_items(edit, ListKind::Unordered, &["Hello", "World"]);
        edit.append_child(edit.root(), list)?;
        let first_text = edit.first_child(items[0])?.expect("text");
        let second_text = edit.first_child(items[1])?.expect("text");

        let forward = RangeSelection::new(
            Point::new(first_text, 1, PointKind::Text),
            Point::new(second_text, 1, PointKind::Text),
        );
        assert!(!forward.is_backward(edit)?);

        let backward = RangeSelection::new(
            Point::new(second_text, 1, PointKind::Text),
            Point::new(first_text, 1, PointKind::Text),
        );
        assert!(backward.is_backward(edit)?);

        let collapsed = RangeSelection::collapsed(Point::new(first_text, 2, PointKind::Text));
        assert!(!collapsed.is_backward(edit)?);
        Ok(())
    })
    .expect("edit commits");
}

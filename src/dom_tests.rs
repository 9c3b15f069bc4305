use super::*;
use crate::list::{container, create_list, create_list_item, item};
use crate::tree::{DocTree, Edit, ListKind, NodeBody, NodeKey};

fn attach_item(edit: &mut Edit, list: NodeKey, text: &str) -> NodeKey {
    let item_key = create_list_item(edit, None);
    let text_node = edit.create(NodeBody::Text(text.to_string()));
    edit.append_child(item_key, text_node)
        .expect("item accepts text");
    edit.append_child(list, item_key).expect("list accepts items");
    item_key
}

fn setup(kind: ListKind, texts: &[&str]) -> (DocTree, NodeKey, Vec<NodeKey>) {
    let mut tree = DocTree::new();
    let (list, items) = tree
        .edit(|edit| {
            let list = create_list(edit, kind);
            edit.append_child(edit.root(), list)?;
            let items = texts
                .iter()
                .map(|text| attach_item(edit, list, text))
                .collect();
            Ok((list, items))
        })
        .expect("setup commits");
    (tree, list, items)
}

#[test]
fn checklist_leaf_items_render_checkbox_attributes() {
    let (mut tree, _, items) = setup(ListKind::Checklist, &["task"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        let element = create_item_dom(edit, items[0], &theme)?;
        assert_eq!(element.tag(), "li");
        assert_eq!(element.attribute("role"), Some("checkbox"));
        assert_eq!(element.attribute("tabindex"), Some("-1"));
        assert_eq!(element.attribute("aria-checked"), Some("false"));
        assert_eq!(element.attribute("value"), Some("1"));
        assert!(element.has_class("list-item"));
        assert!(element.has_class("list-item-unchecked"));
        assert!(!element.has_class("list-item-checked"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn checked_items_swap_the_complement_class() {
    let (mut tree, _, items) = setup(ListKind::Checklist, &["task"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        item::set_checked(edit, items[0], Some(true))?;
        let element = create_item_dom(edit, items[0], &theme)?;
        assert_eq!(element.attribute("aria-checked"), Some("true"));
        assert!(element.has_class("list-item-checked"));
        assert!(!element.has_class("list-item-unchecked"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn wrapper_items_have_checkbox_attributes_stripped() {
    let mut tree = DocTree::new();
    let wrapper = tree
        .edit(|edit| {
            let list = edit.create(NodeBody::List {
                kind: ListKind::Checklist,
                start: 1,
            });
            edit.append_child(edit.root(), list)?;
            let wrapper = create_list_item(edit, None);
            let inner = create_list(edit, ListKind::Checklist);
            edit.append_child(wrapper, inner)?;
            edit.append_child(list, wrapper)?;
            attach_item(edit, inner, "nested");
            Ok(wrapper)
        })
        .expect("setup commits");

    let theme = ListTheme::default();
    tree.edit(|edit| {
        let mut element = DomElement::new("li");
        element.set_attribute("role", "checkbox");
        element.set_attribute("tabindex", "-1");
        element.set_attribute("aria-checked", "false");
        update_item_dom(edit, wrapper, &mut element, &theme)?;
        assert_eq!(element.attribute("role"), None);
        assert_eq!(element.attribute("tabindex"), None);
        assert_eq!(element.attribute("aria-checked"), None);
        assert!(element.has_class("nested-list-item"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn non_checklist_render_clears_a_stray_checked_flag() {
    let (mut tree, _, items) = setup(ListKind::Unordered, &["entry"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        item::set_checked(edit, items[0], Some(true))?;
        let element = create_item_dom(edit, items[0], &theme)?;
        assert_eq!(item::checked(edit, items[0])?, None);
        assert_eq!(element.attribute("role"), None);
        assert_eq!(element.attribute("aria-checked"), None);
        assert!(!element.has_class("list-item-checked"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn aria_checked_is_rewritten_only_when_the_value_changed() {
    let (mut tree, _, items) = setup(ListKind::Checklist, &["task"]);
    let theme = ListTheme::default();
    tree.edit(|edit| item::set_checked(edit, items[0], Some(false)))
        .expect("seed commits");

    // Changed since the last committed version: rewritten.
    tree.edit(|edit| {
        item::set_checked(edit, items[0], Some(true))?;
        let mut element = DomElement::new("li");
        element.set_attribute("aria-checked", "false");
        update_item_dom(edit, items[0], &mut element, &theme)?;
        assert_eq!(element.attribute("aria-checked"), Some("true"));
        Ok(())
    })
    .expect("render commits");

    // Unchanged: the previously rendered attribute is left alone.
    tree.edit(|edit| {
        let mut element = DomElement::new("li");
        element.set_attribute("aria-checked", "stale");
        update_item_dom(edit, items[0], &mut element, &theme)?;
        assert_eq!(element.attribute("aria-checked"), Some("stale"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn rendering_renumbers_the_owning_container_first() {
    let (mut tree, _, items) = setup(ListKind::Ordered, &["a", "b"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        item::set_value(edit, items[1], 9)?;
        let element = create_item_dom(edit, items[1], &theme)?;
        assert_eq!(element.attribute("value"), Some("2"));
        assert_eq!(item::value(edit, items[1])?, 2);
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn list_dom_carries_tag_start_and_theme_class() {
    let (mut tree, list, _) = setup(ListKind::Ordered, &["a"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        let element = create_list_dom(edit, list, &theme)?;
        assert_eq!(element.tag(), "ol");
        assert_eq!(element.attribute("start"), None);
        assert!(element.has_class("list-ordered"));

        container::set_start(edit, list, 3)?;
        let element = create_list_dom(edit, list, &theme)?;
        assert_eq!(element.attribute("start"), Some("3"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn update_list_dom_requests_recreate_on_tag_change() {
    let (mut tree, list, _) = setup(ListKind::Ordered, &["a"]);
    let theme = ListTheme::default();
    tree.edit(|edit| {
        let mut element = create_list_dom(edit, list, &theme)?;
        container::set_list_kind(edit, list, ListKind::Unordered)?;
        assert!(update_list_dom(edit, list, &mut element, &theme)?);

        container::set_list_kind(edit, list, ListKind::Ordered)?;
        container::set_start(edit, list, 5)?;
        assert!(!update_list_dom(edit, list, &mut element, &theme)?);
        assert_eq!(element.attribute("start"), Some("5"));
        Ok(())
    })
    .expect("render commits");
}

#[test]
fn render_html_produces_list_markup() {
    let (mut tree, list, _) = setup(ListKind::Ordered, &["a", "b"]);
    let theme = ListTheme::default();
    let html = tree
        .edit(|edit| render_html(edit, list, &theme))
        .expect("render commits");
    assert_eq!(
        html,
        "<ol class=\"list-ordered\">\
         <li class=\"list-item\" value=\"1\">a</li>\
         <li class=\"list-item\" value=\"2\">b</li>\
         </ol>"
    );
}

#[test]
fn render_html_of_a_checklist_leaf() {
    let (mut tree, list, _) = setup(ListKind::Checklist, &["task"]);
    let theme = ListTheme::default();
    let html = tree
        .edit(|edit| render_html(edit, list, &theme))
        .expect("render commits");
    assert_eq!(
        html,
        "<ul class=\"list-checklist\">\
         <li class=\"list-item list-item-unchecked\" aria-checked=\"false\" \
         role=\"checkbox\" tabindex=\"-1\" value=\"1\">task</li>\
         </ul>"
    );
}

#[test]
fn imports_map_tags_back_to_the_model() {
    let mut tree = DocTree::new();
    tree.edit(|edit| {
        let mut source = DomElement::new("ol");
        source.set_attribute("start", "4");
        let list = import_list(edit, &source)?.expect("ol converts");
        assert_eq!(container::list_kind(edit, list)?, ListKind::Ordered);
        assert_eq!(container::start(edit, list)?, 4);

        let unordered = import_list(edit, &DomElement::new("ul"))?.expect("ul converts");
        assert_eq!(container::list_kind(edit, unordered)?, ListKind::Unordered);

        assert!(import_list(edit, &DomElement::new("div"))?.is_none());

        let mut marked = DomElement::new("li");
        marked.set_attribute("aria-checked", "true");
        marked.set_attribute("value", "9");
        let item_key = import_list_item(edit, &marked);
        assert_eq!(item::value(edit, item_key)?, 1);
        assert_eq!(item::checked(edit, item_key)?, None);
        Ok(())
    })
    .expect("import commits");
}

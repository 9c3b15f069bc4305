use std::collections::BTreeMap;

use crate::list::{self, container, item};
use crate::tree::{Edit, ListKind, NodeBody, NodeKey, Result};

/// Theme class configuration for rendered list markup. Every field may
/// hold several space-separated class names.
#[derive(Clone, Debug)]
pub struct ListTheme {
    /// Class applied to every list item
    pub list_item: String,

    /// Class applied to items wrapping a nested list container
    pub nested_list_item: String,

    /// Class for checked checklist items
    pub list_item_checked: String,

    /// Class for unchecked checklist items
    pub list_item_unchecked: String,

    /// Class for ordered list containers
    pub ordered_list: String,

    /// Class for unordered list containers
    pub unordered_list: String,

    /// Class for checklist containers
    pub checklist: String,
}

impl Default for ListTheme {
    fn default() -> Self {
        Self {
            list_item: "list-item".to_string(),
            nested_list_item: "nested-list-item".to_string(),
            list_item_checked: "list-item-checked".to_string(),
            list_item_unchecked: "list-item-unchecked".to_string(),
            ordered_list: "list-ordered".to_string(),
            unordered_list: "list-unordered".to_string(),
            checklist: "list-checklist".to_string(),
        }
    }
}

/// The crate's DOM stand-in: one element with a tag, attributes, and an
/// ordered class list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
}

impl DomElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|existing| existing != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Serializes the element around already-rendered inner markup.
    pub fn render(&self, inner: &str) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_attribute(&self.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(inner);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        out
    }
}

pub(crate) fn list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Ordered => "ol",
        ListKind::Unordered | ListKind::Checklist => "ul",
    }
}

/// First render of a list item: renumbers the owning container, applies
/// checkbox attributes, the `value` attribute, and theme classes.
pub fn create_item_dom(edit: &mut Edit, item_key: NodeKey, theme: &ListTheme) -> Result<DomElement> {
    let mut element = DomElement::new("li");
    if let Some(parent) = edit.parent(item_key)?.filter(|&key| list::is_list_node(edit, key)) {
        container::update_item_values(edit, parent, None)?;
        update_item_checked(edit, &mut element, item_key, None, parent)?;
    }
    element.set_attribute("value", item::value(edit, item_key)?.to_string());
    set_item_theme_classes(edit, &mut element, item_key, theme)?;
    Ok(element)
}

/// Re-render of a list item against its previously rendered element.
/// `aria-checked` is only rewritten when the checked value changed since
/// the last committed version. Returns false: the element never needs to
/// be recreated.
pub fn update_item_dom(
    edit: &mut Edit,
    item_key: NodeKey,
    element: &mut DomElement,
    theme: &ListTheme,
) -> Result<bool> {
    let previous_checked = edit.committed(item_key).and_then(|node| match &node.body {
        NodeBody::ListItem { checked, .. } => Some(*checked),
        _ => None,
    });
    if let Some(parent) = edit.parent(item_key)?.filter(|&key| list::is_list_node(edit, key)) {
        container::update_item_values(edit, parent, None)?;
        update_item_checked(edit, element, item_key, previous_checked, parent)?;
    }
    element.set_attribute("value", item::value(edit, item_key)?.to_string());
    set_item_theme_classes(edit, element, item_key, theme)?;
    Ok(false)
}

fn update_item_checked(
    edit: &mut Edit,
    element: &mut DomElement,
    item_key: NodeKey,
    previous_checked: Option<Option<bool>>,
    list: NodeKey,
) -> Result<()> {
    let is_checklist = container::list_kind(edit, list)? == ListKind::Checklist;
    if !is_checklist {
        // Clean up a checked state left behind by a kind change.
        if item::checked(edit, item_key)?.is_some() {
            item::set_checked(edit, item_key, None)?;
        }
        return Ok(());
    }

    let wraps_nested_list = edit
        .first_child(item_key)?
        .is_some_and(|child| list::is_list_node(edit, child));
    if wraps_nested_list {
        element.remove_attribute("role");
        element.remove_attribute("tabindex");
        element.remove_attribute("aria-checked");
        return Ok(());
    }

    element.set_attribute("role", "checkbox");
    element.set_attribute("tabindex", "-1");
    let checked = item::checked(edit, item_key)?;
    let rewrite = match previous_checked {
        None => true,
        Some(previous) => previous != checked,
    };
    if rewrite {
        let rendered = if checked.unwrap_or(false) { "true" } else { "false" };
        element.set_attribute("aria-checked", rendered);
    }
    Ok(())
}

fn set_item_theme_classes(
    edit: &Edit,
    element: &mut DomElement,
    item_key: NodeKey,
    theme: &ListTheme,
) -> Result<()> {
    let mut to_add: Vec<&str> = Vec::new();
    let mut to_remove: Vec<&str> = Vec::new();

    to_add.extend(theme.list_item.split_whitespace());

    let is_checklist = edit
        .parent(item_key)?
        .is_some_and(|parent| matches!(container::list_kind(edit, parent), Ok(ListKind::Checklist)));
    let checked = item::checked(edit, item_key)?.unwrap_or(false);

    if !is_checklist || checked {
        to_remove.extend(theme.list_item_unchecked.split_whitespace());
    }
    if !is_checklist || !checked {
        to_remove.extend(theme.list_item_checked.split_whitespace());
    }
    if is_checklist {
        let class = if checked {
            &theme.list_item_checked
        } else {
            &theme.list_item_unchecked
        };
        to_add.extend(class.split_whitespace());
    }

    let wraps_nested_list = edit
        .children(item_key)?
        .iter()
        .any(|&child| list::is_list_node(edit, child));
    if wraps_nested_list {
        to_add.extend(theme.nested_list_item.split_whitespace());
    } else {
        to_remove.extend(theme.nested_list_item.split_whitespace());
    }

    for class in to_remove {
        element.remove_class(class);
    }
    for class in to_add {
        element.add_class(class);
    }
    Ok(())
}

/// First render of a list container: `<ol>` with a `start` attribute
/// when it differs from 1, `<ul>` for unordered and checklist kinds.
pub fn create_list_dom(edit: &Edit, list: NodeKey, theme: &ListTheme) -> Result<DomElement> {
    let kind = container::list_kind(edit, list)?;
    let mut element = DomElement::new(list_tag(kind));
    let start = container::start(edit, list)?;
    if kind == ListKind::Ordered && start != 1 {
        element.set_attribute("start", start.to_string());
    }
    for class in kind_class(kind, theme).split_whitespace() {
        element.add_class(class);
    }
    Ok(element)
}

/// Re-render of a list container. Returns true when the element must be
/// recreated because the kind now maps to a different tag.
pub fn update_list_dom(
    edit: &Edit,
    list: NodeKey,
    element: &mut DomElement,
    theme: &ListTheme,
) -> Result<bool> {
    let kind = container::list_kind(edit, list)?;
    if element.tag() != list_tag(kind) {
        return Ok(true);
    }
    let start = container::start(edit, list)?;
    if kind == ListKind::Ordered && start != 1 {
        element.set_attribute("start", start.to_string());
    } else {
        element.remove_attribute("start");
    }
    for other in [
        &theme.ordered_list,
        &theme.unordered_list,
        &theme.checklist,
    ] {
        for class in other.split_whitespace() {
            element.remove_class(class);
        }
    }
    for class in kind_class(kind, theme).split_whitespace() {
        element.add_class(class);
    }
    Ok(false)
}

fn kind_class(kind: ListKind, theme: &ListTheme) -> &str {
    match kind {
        ListKind::Ordered => &theme.ordered_list,
        ListKind::Unordered => &theme.unordered_list,
        ListKind::Checklist => &theme.checklist,
    }
}

/// DOM conversion for `<li>`: a fresh default item. Checked state, if
/// present in the source markup, is restored by a higher-level import.
pub fn import_list_item(edit: &mut Edit, _element: &DomElement) -> NodeKey {
    list::create_list_item(edit, None)
}

/// DOM conversion for `<ol>`/`<ul>`. Other tags convert to nothing.
pub fn import_list(edit: &mut Edit, element: &DomElement) -> Result<Option<NodeKey>> {
    let kind = match element.tag() {
        "ol" => ListKind::Ordered,
        "ul" => ListKind::Unordered,
        _ => return Ok(None),
    };
    let list = list::create_list(edit, kind);
    if kind == ListKind::Ordered {
        if let Some(start) = element
            .attribute("start")
            .and_then(|value| value.parse().ok())
        {
            container::set_start(edit, list, start)?;
        }
    }
    Ok(Some(list))
}

/// Recursive subtree render to HTML markup.
pub fn render_html(edit: &mut Edit, key: NodeKey, theme: &ListTheme) -> Result<String> {
    let body = edit.latest(key)?.body.clone();
    match body {
        NodeBody::Text(text) => Ok(escape_text(&text)),
        NodeBody::Root => render_children(edit, key, theme),
        NodeBody::Paragraph => {
            let inner = render_children(edit, key, theme)?;
            Ok(format!("<p>{inner}</p>"))
        }
        NodeBody::List { .. } => {
            let element = create_list_dom(edit, key, theme)?;
            let inner = render_children(edit, key, theme)?;
            Ok(element.render(&inner))
        }
        NodeBody::ListItem { .. } => {
            let element = create_item_dom(edit, key, theme)?;
            let inner = render_children(edit, key, theme)?;
            Ok(element.render(&inner))
        }
    }
}

fn render_children(edit: &mut Edit, key: NodeKey, theme: &ListTheme) -> Result<String> {
    let mut out = String::new();
    for child in edit.children(key)? {
        out.push_str(&render_html(edit, child, theme)?);
    }
    Ok(out)
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod dom_tests;

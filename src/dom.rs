use std::rc::Rc;

use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

pub fn select_first(root: &NodeRef, selector: &str) -> Option<NodeRef> {
    root.select_first(selector)
        .ok()
        .map(|n| n.as_node().clone())
}

pub fn select_all(root: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match root.select(selector) {
        Ok(nodes) => nodes.map(|n| n.as_node().clone()).collect(),
        Err(()) => {
            tracing::warn!(selector, "invalid selector");
            Vec::new()
        }
    }
}

pub fn get_element_by_id(root: &NodeRef, id: &str) -> Option<NodeRef> {
    root.descendants()
        .find(|n| get_attr(n, "id").as_deref() == Some(id))
}

pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::ptr_eq(&a.0, &b.0)
}

pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    element.attributes.borrow().get(name).map(|s| s.to_string())
}

pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|e| e.attributes.borrow().contains(name))
}

/// Returns `true` when the stored value changed.
pub fn set_attr(node: &NodeRef, name: &str, value: &str) -> bool {
    let Some(element) = node.as_element() else {
        return false;
    };
    let mut attrs = element.attributes.borrow_mut();
    if attrs.get(name) == Some(value) {
        return false;
    }
    attrs.insert(name, value.to_string());
    true
}

pub fn remove_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|e| e.attributes.borrow_mut().remove(name).is_some())
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    get_attr(node, "class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
}

pub fn add_class(node: &NodeRef, class: &str) -> bool {
    if node.as_element().is_none() || has_class(node, class) {
        return false;
    }
    let mut classes: Vec<String> = get_attr(node, "class")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    classes.push(class.to_string());
    set_attr(node, "class", &classes.join(" "))
}

pub fn remove_class(node: &NodeRef, class: &str) -> bool {
    if !has_class(node, class) {
        return false;
    }
    let remaining: Vec<String> = get_attr(node, "class")
        .unwrap_or_default()
        .split_whitespace()
        .filter(|c| *c != class)
        .map(str::to_string)
        .collect();
    set_attr(node, "class", &remaining.join(" "))
}

pub fn toggle_class(node: &NodeRef, class: &str, on: bool) -> bool {
    if on {
        add_class(node, class)
    } else {
        remove_class(node, class)
    }
}

/// Sets one inline style property; `None` removes it, dropping the attribute once empty.
pub fn set_style_property(node: &NodeRef, property: &str, value: Option<&str>) -> bool {
    if node.as_element().is_none() {
        return false;
    }
    let current = get_attr(node, "style").unwrap_or_default();
    let mut decls: Vec<(String, String)> = current
        .split(';')
        .filter_map(|decl| {
            let (name, val) = decl.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), val.trim().to_string()))
        })
        .collect();
    decls.retain(|(name, _)| name != property);
    if let Some(value) = value {
        decls.push((property.to_string(), value.to_string()));
    }

    if decls.is_empty() {
        return remove_attr(node, "style");
    }
    let rendered = decls
        .iter()
        .map(|(n, v)| format!("{n}: {v};"))
        .collect::<Vec<_>>()
        .join(" ");
    set_attr(node, "style", &rendered)
}

pub fn style_property(node: &NodeRef, property: &str) -> Option<String> {
    get_attr(node, "style")?.split(';').find_map(|decl| {
        let (name, val) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| val.trim().to_string())
    })
}

pub fn set_text(node: &NodeRef, text: &str) {
    if node.text_contents() == text {
        return;
    }
    for child in node.children().collect::<Vec<_>>() {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

/// Swaps `node` for the top-level nodes of `markup`, like assigning `outerHTML`.
pub fn replace_with_markup(node: &NodeRef, markup: &str) {
    let fragment = parse_document(markup);
    let Some(body) = select_first(&fragment, "body") else {
        return;
    };
    for child in body.children().collect::<Vec<_>>() {
        node.insert_before(child);
    }
    node.detach();
}

pub fn serialize(document: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    document.serialize(&mut out).context("serialize page")?;
    String::from_utf8(out).context("page html not utf-8")
}

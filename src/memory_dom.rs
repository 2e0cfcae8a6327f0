//! In-memory [`Dom`] implementation.
//!
//! A flat arena of element nodes with parent/child links. Nodes are never
//! freed; removing a node only detaches it, which is what lets tests observe
//! that a timer callback refused to touch a detached anchor.

#[cfg(test)]
#[path = "memory_dom_test.rs"]
mod memory_dom_test;

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId, Selector};
use crate::error::DomError;

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    style: BTreeMap<String, String>,
    value: String,
}

/// Arena-backed document with an `<html>` root and a `<body>`.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    document: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    #[must_use]
    pub fn new() -> Self {
        let html = Node { tag: "html".to_owned(), ..Node::default() };
        let body = Node { tag: "body".to_owned(), parent: Some(NodeId(0)), ..Node::default() };
        let mut nodes = vec![html, body];
        nodes[0].children.push(NodeId(1));
        Self { nodes, document: NodeId(0), body: NodeId(1), focused: None }
    }

    /// Start building a new element appended to `parent`.
    pub fn build(&mut self, parent: NodeId, tag: &str) -> ElementBuilder<'_> {
        let id = self.alloc(tag);
        self.link(parent, id);
        ElementBuilder { dom: self, id }
    }

    /// Classes of `node` in insertion order.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.node(node).map(|n| n.classes.clone()).unwrap_or_default()
    }

    /// Direct children of `node`.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node { tag: tag.to_ascii_lowercase(), ..Node::default() });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0 as usize).ok_or(DomError::UnknownNode(id))
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.nodes.get_mut(id.0 as usize) {
            n.parent = None;
        }
        if self.focused.is_some_and(|f| self.contains(id, f)) {
            self.focused = None;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent.0 as usize) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child.0 as usize) {
            c.parent = Some(parent);
        }
    }

    fn descendants(&self, scope: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(scope) else {
            return;
        };
        for child in &node.children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn matches_node(&self, node: &Node, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => node.attrs.get("id").is_some_and(|v| v == id),
            Selector::Class(class) => node.classes.iter().any(|c| c == class),
            Selector::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Selector::Attr(name) => {
                if *name == "class" {
                    !node.classes.is_empty()
                } else {
                    node.attrs.contains_key(*name)
                }
            }
            Selector::AttrValue(name, value) => node.attrs.get(*name).is_some_and(|v| v == value),
            Selector::And(parts) => parts.iter().all(|p| self.matches_node(node, p)),
            Selector::Any(parts) => parts.iter().any(|p| self.matches_node(node, p)),
        }
    }
}

impl Dom for MemoryDom {
    fn document_element(&self) -> NodeId {
        self.document
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn get_by_id(&self, id: &str) -> Option<NodeId> {
        let mut all = Vec::new();
        self.descendants(self.document, &mut all);
        all.into_iter().find(|n| self.node(*n).is_some_and(|node| node.attrs.get("id").is_some_and(|v| v == id)))
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(scope, &mut all);
        all.retain(|n| self.matches(*n, selector));
        all
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if self.matches(id, selector) {
                return Some(id);
            }
            cursor = self.parent(id);
        }
        None
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.node(node).is_some_and(|n| self.matches_node(n, selector))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.node(node).is_some() && self.contains(self.document, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.node(parent).is_none() {
            return Err(DomError::UnknownNode(parent));
        }
        if self.node(child).is_none() {
            return Err(DomError::UnknownNode(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }
        self.link(parent, child);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.node_mut(node)?;
        self.detach(node);
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let n = self.node(node)?;
        if name == "class" {
            return if n.classes.is_empty() { None } else { Some(n.classes.join(" ")) };
        }
        n.attrs.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let n = self.node_mut(node)?;
        if name == "class" {
            n.classes = value.split_whitespace().map(str::to_owned).collect();
        } else {
            n.attrs.insert(name.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let n = self.node_mut(node)?;
        if name == "class" {
            n.classes.clear();
        } else {
            n.attrs.remove(name);
        }
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        let n = self.node_mut(node)?;
        let present = n.classes.iter().any(|c| c == class);
        if on && !present {
            n.classes.push(class.to_owned());
        } else if !on && present {
            n.classes.retain(|c| c != class);
        }
        Ok(())
    }

    fn text(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        let mut out = n.text.clone();
        for child in &n.children {
            out.push_str(&self.text(*child));
        }
        out
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let children = self.node_mut(node)?.children.clone();
        for child in children {
            self.detach(child);
        }
        self.node_mut(node)?.text = text.to_owned();
        Ok(())
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node)?.style.get(property).cloned()
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.node_mut(node)?.style.insert(property.to_owned(), value.to_owned());
        Ok(())
    }

    fn value(&self, node: NodeId) -> String {
        self.node(node).map(|n| n.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.node_mut(node)?.value = value.to_owned();
        Ok(())
    }

    fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.node_mut(node)?;
        if !self.is_attached(node) {
            return Err(DomError::Detached(node));
        }
        self.focused = Some(node);
        Ok(())
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|f| self.is_attached(*f))
    }
}

/// Fluent element construction for fixtures and headless pages.
pub struct ElementBuilder<'a> {
    dom: &'a mut MemoryDom,
    id: NodeId,
}

impl ElementBuilder<'_> {
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        if let Some(n) = self.dom.nodes.get_mut(self.id.0 as usize) {
            n.classes.extend(class.split_whitespace().map(str::to_owned));
        }
        self
    }

    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        if let Some(n) = self.dom.nodes.get_mut(self.id.0 as usize) {
            if name == "class" {
                n.classes = value.split_whitespace().map(str::to_owned).collect();
            } else {
                n.attrs.insert(name.to_owned(), value.to_owned());
            }
        }
        self
    }

    #[must_use]
    pub fn id_attr(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn text(self, text: &str) -> Self {
        if let Some(n) = self.dom.nodes.get_mut(self.id.0 as usize) {
            n.text = text.to_owned();
        }
        self
    }

    #[must_use]
    pub fn value(self, value: &str) -> Self {
        if let Some(n) = self.dom.nodes.get_mut(self.id.0 as usize) {
            n.value = value.to_owned();
        }
        self
    }

    /// Finish building and return the new element's id.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }
}

//! DOM abstraction: node handles, selectors, and the `Dom` trait.
//!
//! Controllers never hold browser objects. They hold [`NodeId`]s issued by a
//! [`Dom`] implementation and perform every read and write through it. The
//! browser host maps ids to `web_sys::Element`s; [`crate::memory_dom::MemoryDom`]
//! keeps a small arena so controller logic can be exercised in plain tests.

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use crate::error::DomError;

/// Opaque handle to an element owned by a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// The subset of CSS selectors the DOM contract needs.
///
/// Kept as data rather than strings so the in-memory DOM can evaluate it
/// without a selector engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `#id`
    Id(&'static str),
    /// `.class`
    Class(&'static str),
    /// `tag`
    Tag(&'static str),
    /// `[attr]`
    Attr(&'static str),
    /// `[attr="value"]`
    AttrValue(&'static str, &'static str),
    /// Compound selector: the element must match every part.
    And(&'static [Selector]),
    /// Selector list: the element must match at least one part.
    Any(&'static [Selector]),
}

impl Selector {
    /// Render as a CSS selector string for `querySelectorAll` / `closest`.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Class(class) => format!(".{class}"),
            Self::Tag(tag) => (*tag).to_owned(),
            Self::Attr(name) => format!("[{name}]"),
            Self::AttrValue(name, value) => format!("[{name}=\"{value}\"]"),
            Self::And(parts) => parts.iter().map(Self::to_css).collect::<String>(),
            Self::Any(parts) => parts.iter().map(Self::to_css).collect::<Vec<_>>().join(", "),
        }
    }
}

/// Every DOM read and write a controller may perform.
///
/// Reads on unknown or detached nodes return empty values; writes return
/// [`DomError`] so a controller can roll back a half-applied change.
pub trait Dom {
    /// The `<html>` element.
    fn document_element(&self) -> NodeId;

    /// The `<body>` element.
    fn body(&self) -> NodeId;

    /// Look up an attached element by its `id` attribute.
    fn get_by_id(&self, id: &str) -> Option<NodeId>;

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in document order.
    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId>;

    /// First descendant of `scope` matching `selector`.
    fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId>;

    /// Whether `node` itself matches `selector`.
    fn matches(&self, node: NodeId, selector: &Selector) -> bool;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Whether `node` is still part of the document tree.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Parent element, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Create a detached element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the browser refuses to create the element.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError>;

    /// Append `child` as the last child of `parent`, moving it if needed.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or an invalid hierarchy.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError>;

    /// Detach `node` from its parent.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unknown nodes.
    fn remove(&mut self, node: NodeId) -> Result<(), DomError>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or a browser exception.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or a browser exception.
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add (`on = true`) or remove a class.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or a browser exception.
    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError>;

    /// Text content of the node and its descendants.
    fn text(&self, node: NodeId) -> String;

    /// Replace all children with a single text node.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unknown nodes.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError>;

    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or a browser exception.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError>;

    /// Current value of a form control (`""` for other elements).
    fn value(&self, node: NodeId) -> String;

    /// # Errors
    ///
    /// Returns `Err` for unknown nodes or a browser exception.
    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError>;

    /// Move keyboard focus to `node`.
    ///
    /// # Errors
    ///
    /// Returns `Err` for unknown or detached nodes.
    fn focus(&mut self, node: NodeId) -> Result<(), DomError>;

    /// The element that currently has keyboard focus.
    fn focused(&self) -> Option<NodeId>;

    // --- Provided helpers ---

    /// Write a boolean ARIA-style attribute as `"true"` / `"false"`.
    ///
    /// # Errors
    ///
    /// Propagates [`Dom::set_attribute`] failures.
    fn set_flag(&mut self, node: NodeId, name: &str, value: bool) -> Result<(), DomError> {
        self.set_attribute(node, name, if value { "true" } else { "false" })
    }

    /// Add or remove the boolean `hidden` attribute.
    ///
    /// # Errors
    ///
    /// Propagates attribute write failures.
    fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<(), DomError> {
        if hidden {
            self.set_attribute(node, "hidden", "")
        } else {
            self.remove_attribute(node, "hidden")
        }
    }

    /// Value of `property` as the page resolves it, custom properties
    /// included. Defaults to the inline style.
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.style(node, property)
    }

    /// Flush pending style changes so that removing and re-adding an
    /// animation class restarts the animation. No-op without a renderer.
    fn reflow(&self, _node: NodeId) {}

    /// Parse a numeric attribute, ignoring absent or malformed values.
    fn number_attribute(&self, node: NodeId, name: &str) -> Option<f64> {
        match self.attribute(node, name)?.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => None,
        }
    }
}

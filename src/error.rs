//! Error types shared across the crate.
//!
//! Missing anchors are not errors (controllers go inert instead) and invalid
//! indices are silent no-ops, so the taxonomy here is small: DOM failures,
//! markup that contradicts a controller's contract, and the two external
//! collaborators.

use crate::dom::NodeId;

/// A DOM operation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node id was never issued by this DOM.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    /// The node is no longer attached to the document.
    #[error("node {0:?} is detached from the document")]
    Detached(NodeId),
    /// Appending would make a node its own ancestor.
    #[error("cannot append {child:?} under its own descendant {parent:?}")]
    Hierarchy { parent: NodeId, child: NodeId },
    /// The browser threw while performing the operation.
    #[error("browser DOM call failed: {0}")]
    Js(String),
}

/// A controller failed to construct or to apply a state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error(transparent)]
    Dom(#[from] DomError),
    /// The page markup is present but inconsistent with the controller's contract.
    #[error("{widget}: {reason}")]
    Markup { widget: &'static str, reason: String },
}

impl WidgetError {
    #[must_use]
    pub fn markup(widget: &'static str, reason: impl Into<String>) -> Self {
        Self::Markup { widget, reason: reason.into() }
    }
}

/// The key/value store rejected an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled (private mode, blocked cookies, no window).
    #[error("storage is unavailable")]
    Unavailable,
    /// The browser threw while reading or writing.
    #[error("storage access failed: {0}")]
    Access(String),
}

/// The clipboard rejected a write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard API is exposed in this context.
    #[error("clipboard is unavailable")]
    Unavailable,
    /// The write was attempted and refused.
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
}

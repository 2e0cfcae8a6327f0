//! Clipboard collaborator.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ClipboardError;

pub trait Clipboard {
    /// # Errors
    ///
    /// Returns `Err` when no clipboard is available or the write is refused.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory clipboard. Clones share contents.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
    available: bool,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self { contents: Rc::new(RefCell::new(None)), available: true }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self { available: false, ..Self::new() }
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if !self.available {
            return Err(ClipboardError::Unavailable);
        }
        *self.contents.borrow_mut() = Some(text.to_owned());
        Ok(())
    }
}

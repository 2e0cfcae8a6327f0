//! Shared page state.
//!
//! DESIGN
//! ======
//! `SharedState` is created once by `App` and injected into every controller
//! constructor as a [`StateHandle`]. Each field has exactly one writer (the
//! controller that owns it); everyone else only reads. Borrows are never held
//! across a call into another component.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

// =============================================================================
// THEME
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored or attribute value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// =============================================================================
// PRICING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    #[default]
    Monthly,
    Annual,
}

impl PricingMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Monthly => Self::Annual,
            Self::Annual => Self::Monthly,
        }
    }
}

// =============================================================================
// SHARED STATE
// =============================================================================

/// The single cross-controller state record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    /// Written by the theme controller.
    pub theme: Theme,
    /// Written by the navigation controller.
    pub nav_open: bool,
    /// Written by the carousel controller.
    pub current_index: usize,
    /// Written by the tab controller.
    pub current_tab: Option<String>,
    /// Written by the filter controller.
    pub active_filter: Option<String>,
    /// Written by the pricing controller.
    pub pricing_mode: PricingMode,
    /// Written by `App` from the reduced-motion preference.
    pub motion_enabled: bool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            nav_open: false,
            current_index: 0,
            current_tab: None,
            active_filter: None,
            pricing_mode: PricingMode::Monthly,
            motion_enabled: true,
        }
    }
}

/// Injected handle to the page's [`SharedState`].
pub type StateHandle = Rc<RefCell<SharedState>>;

/// Create a fresh handle with default state.
#[must_use]
pub fn new_handle() -> StateHandle {
    Rc::new(RefCell::new(SharedState::default()))
}

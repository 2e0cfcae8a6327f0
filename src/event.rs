//! Host events in, broadcasts and effects out.
//!
//! The host translates browser events into [`PageEvent`]s and feeds them to
//! `App::dispatch`. Controllers never call into the host; anything the host
//! or another controller must act on is pushed to the [`Effect`] outbox and
//! drained by the orchestrator after the handler returns.

use crate::dom::NodeId;
use crate::state::Theme;

/// Keyboard keys the controllers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Escape,
    Enter,
    Space,
    Tab,
    Char(char),
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// Modifier keys held during a key press.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false, meta: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false, meta: false };
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true, meta: false };
}

/// A browser event, reduced to what the controllers read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    Click { target: NodeId },
    KeyDown { target: NodeId, key: Key, modifiers: Modifiers },
    PointerEnter { target: NodeId },
    PointerLeave { target: NodeId },
    FocusIn { target: NodeId },
    /// `related` is the element receiving focus, if any.
    FocusOut { target: NodeId, related: Option<NodeId> },
    Submit { form: NodeId },
    /// A form control committed a new value.
    Change { target: NodeId },
    /// Raw viewport resize; `App` debounces it into `ResizeSettled`.
    Resize { width: f64 },
    ResizeSettled { width: f64 },
    Scroll { y: f64 },
    VisibilityChange { hidden: bool },
    Intersection { target: NodeId, ratio: f64 },
    ColorSchemeChange { dark: bool },
    MotionPreferenceChange { reduced: bool },
    BeforeUnload,
}

/// Cross-component notifications fanned out to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    ThemeChanged { theme: Theme },
}

impl Broadcast {
    /// Name of the `CustomEvent` the browser host dispatches on `document`.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ThemeChanged { .. } => "themechange",
        }
    }
}

/// Requests a controller hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Broadcast(Broadcast),
    ShowButtonLoading { button: NodeId, label: Option<String> },
    HideButtonLoading { button: NodeId },
}

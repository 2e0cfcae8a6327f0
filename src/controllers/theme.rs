//! Theme controller: light/dark selection, persistence, theme menu, and the
//! full-viewport transition overlay.
//!
//! The effective theme on load is the persisted choice, else the OS colour
//! scheme, else light. Only a user choice is persisted, so OS preference
//! changes keep applying until the user picks a theme explicitly.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use crate::controller::Controller;
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::{Broadcast, Effect, Key, PageEvent};
use crate::selectors::{
    ACTIVE_CLASS, THEME_CONTROLS, THEME_MENU, THEME_MENU_TOGGLE, THEME_OPTION, THEME_OVERLAY_CLASS, THEME_TOGGLE,
};
use crate::state::{StateHandle, Theme};
use crate::timer::{Task, TimerId, TimerSlots};

const NAME: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeTimer {
    /// Start fading the overlay out.
    OverlayFadeOut,
    /// Detach the overlay.
    OverlayRemove,
}

#[derive(Debug)]
pub struct ThemeController {
    document: NodeId,
    toggles: Vec<NodeId>,
    options: Vec<NodeId>,
    menu: Option<NodeId>,
    menu_toggle: Option<NodeId>,
    controls: Option<NodeId>,
    state: StateHandle,
    /// The user picked a theme (now or in an earlier visit).
    explicit: bool,
    overlay: Option<NodeId>,
    slots: TimerSlots<ThemeTimer>,
}

impl ThemeController {
    /// Resolve the effective theme and reflect it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the initial reflection fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let dom = env.dom.as_ref();
        let body = dom.body();
        let this = Self {
            document: dom.document_element(),
            toggles: dom.query_all(body, &THEME_TOGGLE),
            options: dom.query_all(body, &THEME_OPTION),
            menu: dom.query(body, &THEME_MENU),
            menu_toggle: dom.query(body, &THEME_MENU_TOGGLE),
            controls: dom.query(body, &THEME_CONTROLS),
            state,
            explicit: false,
            overlay: None,
            slots: TimerSlots::new(),
        };

        let stored = env.store.get(&env.config.theme_storage_key).and_then(|raw| Theme::parse(&raw));
        let theme = stored.unwrap_or(if env.prefs.prefers_dark { Theme::Dark } else { Theme::Light });
        this.reflect(env.dom.as_mut(), theme)?;
        this.state.borrow_mut().theme = theme;
        env.emit(Effect::Broadcast(Broadcast::ThemeChanged { theme }));
        log::info!("{NAME}: initial theme {} ({})", theme.as_str(), if stored.is_some() { "stored" } else { "default" });
        Ok(Self { explicit: stored.is_some(), ..this })
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state.borrow().theme
    }

    /// Whether the current theme came from a user choice.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    #[must_use]
    pub fn menu_open(&self, dom: &dyn Dom) -> bool {
        self.menu.is_some_and(|m| dom.has_class(m, ACTIVE_CLASS))
    }

    /// Apply and persist a user-chosen theme.
    ///
    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the previous theme stays applied.
    pub fn set_theme(&mut self, env: &mut Env, theme: Theme) -> Result<(), WidgetError> {
        self.apply(env, theme, true)
    }

    /// Flip the theme, with the overlay transition when motion is enabled.
    ///
    /// # Errors
    ///
    /// See [`ThemeController::set_theme`].
    pub fn toggle_theme(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let next = self.theme().toggled();
        self.set_theme(env, next)?;
        if self.state.borrow().motion_enabled {
            self.play_overlay(env);
        }
        Ok(())
    }

    fn apply(&mut self, env: &mut Env, theme: Theme, persist: bool) -> Result<(), WidgetError> {
        let previous = self.theme();
        reflect_or_restore(env.dom.as_mut(), NAME, theme, previous, |dom, t| self.reflect(dom, t))?;
        self.state.borrow_mut().theme = theme;
        if persist {
            self.explicit = true;
            let key = env.config.theme_storage_key.clone();
            env.store.set(&key, theme.as_str());
        }
        env.announce(match theme {
            Theme::Light => "Light theme enabled",
            Theme::Dark => "Dark theme enabled",
        });
        env.emit(Effect::Broadcast(Broadcast::ThemeChanged { theme }));
        Ok(())
    }

    fn reflect(&self, dom: &mut dyn Dom, theme: Theme) -> Result<(), DomError> {
        dom.set_attribute(self.document, "data-theme", theme.as_str())?;
        let label = match theme {
            Theme::Light => "Switch to dark theme",
            Theme::Dark => "Switch to light theme",
        };
        for toggle in &self.toggles {
            dom.set_flag(*toggle, "aria-pressed", theme == Theme::Dark)?;
            dom.set_attribute(*toggle, "aria-label", label)?;
        }
        for option in &self.options {
            let selected = dom.attribute(*option, "data-theme").as_deref() == Some(theme.as_str());
            dom.toggle_class(*option, ACTIVE_CLASS, selected)?;
            dom.set_flag(*option, "aria-pressed", selected)?;
        }
        Ok(())
    }

    // =========================================================================
    // OVERLAY
    // =========================================================================

    fn play_overlay(&mut self, env: &mut Env) {
        self.remove_overlay(env);
        let node = match Self::mount_overlay(env.dom.as_mut()) {
            Ok(node) => node,
            Err(err) => {
                log::warn!("{NAME}: transition overlay skipped: {err}");
                return;
            }
        };
        self.overlay = Some(node);
        let total = env.config.theme_overlay_ms;
        self.slots.arm(&mut env.timers, ThemeTimer::OverlayFadeOut, total / 2, Task::Theme(ThemeTimer::OverlayFadeOut));
        self.slots.arm(&mut env.timers, ThemeTimer::OverlayRemove, total, Task::Theme(ThemeTimer::OverlayRemove));
    }

    fn mount_overlay(dom: &mut dyn Dom) -> Result<NodeId, DomError> {
        let node = dom.create_element("div")?;
        dom.toggle_class(node, THEME_OVERLAY_CLASS, true)?;
        dom.toggle_class(node, "is-active", true)?;
        dom.set_attribute(node, "aria-hidden", "true")?;
        let body = dom.body();
        dom.append_child(body, node)?;
        Ok(node)
    }

    fn remove_overlay(&mut self, env: &mut Env) {
        self.slots.disarm_all(&mut env.timers);
        let Some(node) = self.overlay.take() else {
            return;
        };
        if env.dom.is_attached(node)
            && let Err(err) = env.dom.remove(node)
        {
            log::warn!("{NAME}: could not remove overlay: {err}");
        }
    }

    // =========================================================================
    // MENU
    // =========================================================================

    fn set_menu_open(&self, dom: &mut dyn Dom, open: bool) -> Result<(), DomError> {
        let Some(menu) = self.menu else {
            return Ok(());
        };
        dom.toggle_class(menu, ACTIVE_CLASS, open)?;
        if let Some(toggle) = self.menu_toggle {
            dom.set_flag(toggle, "aria-expanded", open)?;
        }
        Ok(())
    }

    fn inside_controls(&self, dom: &dyn Dom, target: NodeId) -> bool {
        [self.controls, self.menu, self.menu_toggle].into_iter().flatten().any(|n| dom.contains(n, target))
    }

    fn handle_click(&mut self, env: &mut Env, target: NodeId) -> Result<(), WidgetError> {
        let dom = env.dom.as_ref();
        if self.toggles.iter().any(|t| dom.contains(*t, target)) {
            return self.toggle_theme(env);
        }
        if let Some(option) = self.options.iter().copied().find(|o| dom.contains(*o, target)) {
            let chosen = dom.attribute(option, "data-theme").and_then(|raw| Theme::parse(&raw));
            self.set_menu_open(env.dom.as_mut(), false)?;
            return match chosen {
                Some(theme) => self.set_theme(env, theme),
                None => Ok(()),
            };
        }
        if self.menu_toggle.is_some_and(|t| dom.contains(t, target)) {
            let open = !self.menu_open(dom);
            self.set_menu_open(env.dom.as_mut(), open)?;
            return Ok(());
        }
        if self.menu_open(dom) && !self.inside_controls(dom, target) {
            self.set_menu_open(env.dom.as_mut(), false)?;
        }
        Ok(())
    }
}

impl Controller for ThemeController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        false
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        match *event {
            PageEvent::Click { target } => {
                self.handle_click(env, target)?;
                Ok(false)
            }
            PageEvent::KeyDown { key: Key::Escape, .. } if self.menu_open(env.dom.as_ref()) => {
                self.set_menu_open(env.dom.as_mut(), false)?;
                if let Some(toggle) = self.menu_toggle {
                    env.dom.focus(toggle)?;
                }
                Ok(false)
            }
            PageEvent::ColorSchemeChange { dark } if !self.explicit => {
                let theme = if dark { Theme::Dark } else { Theme::Light };
                if theme != self.theme() {
                    self.apply(env, theme, false)?;
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_timer(&mut self, env: &mut Env, id: TimerId, task: Task) -> Result<(), WidgetError> {
        let Task::Theme(kind) = task else {
            return Ok(());
        };
        if !self.slots.settle(kind, id) {
            return Ok(());
        }
        let Some(node) = self.overlay else {
            return Ok(());
        };
        if !env.dom.is_attached(node) {
            self.overlay = None;
            return Ok(());
        }
        match kind {
            ThemeTimer::OverlayFadeOut => {
                env.dom.toggle_class(node, "fade-out", true)?;
            }
            ThemeTimer::OverlayRemove => {
                self.overlay = None;
                env.dom.remove(node)?;
            }
        }
        Ok(())
    }

    fn teardown(&mut self, env: &mut Env) {
        self.slots.disarm_all(&mut env.timers);
        self.remove_overlay(env);
    }
}

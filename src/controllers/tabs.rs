//! Tab group: exactly one selected tab and visible panel.
//!
//! Tabs are `[role="tab"]` inside the first `[role="tablist"]`. A tab's id is
//! its `data-tab` attribute, falling back to `aria-controls`. Arrow keys move
//! the selection (automatic activation), wrapping at both ends.

#[cfg(test)]
#[path = "tabs_test.rs"]
mod tabs_test;

use crate::controller::{Axis, Controller, roving_target};
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{ACTIVE_CLASS, TAB, TAB_LIST};
use crate::state::StateHandle;

const NAME: &str = "tabs";

#[derive(Debug, Clone)]
struct Tab {
    id: String,
    button: NodeId,
    panel: NodeId,
}

#[derive(Debug)]
pub struct TabController {
    list: Option<NodeId>,
    tabs: Vec<Tab>,
    active: Option<usize>,
    state: StateHandle,
}

impl TabController {
    /// Pair every tab with its panel and reflect the initial selection.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Markup`] when a tab has no id or its
    /// `aria-controls` panel does not exist.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let mut this = Self { list: None, tabs: Vec::new(), active: None, state };
        let dom = env.dom.as_ref();
        let Some(list) = dom.query(dom.body(), &TAB_LIST) else {
            log::debug!("{NAME}: no tablist, inert");
            return Ok(this);
        };
        let mut tabs = Vec::new();
        for button in dom.query_all(list, &TAB) {
            let controls = dom.attribute(button, "aria-controls").unwrap_or_default();
            let id = dom.attribute(button, "data-tab").filter(|id| !id.is_empty()).unwrap_or_else(|| controls.clone());
            if id.is_empty() {
                return Err(WidgetError::markup(NAME, "tab without data-tab or aria-controls"));
            }
            let Some(panel) = dom.get_by_id(&controls) else {
                return Err(WidgetError::markup(NAME, format!("tab {id:?} controls missing panel {controls:?}")));
            };
            tabs.push(Tab { id, button, panel });
        }
        if tabs.is_empty() {
            log::debug!("{NAME}: tablist has no tabs, inert");
            return Ok(this);
        }
        let initial = tabs
            .iter()
            .position(|t| dom.attribute(t.button, "aria-selected").as_deref() == Some("true") || dom.has_class(t.button, ACTIVE_CLASS))
            .unwrap_or(0);

        Self::reflect(&tabs, env.dom.as_mut(), initial)?;
        this.state.borrow_mut().current_tab = Some(tabs[initial].id.clone());
        this.list = Some(list);
        this.tabs = tabs;
        this.active = Some(initial);
        Ok(this)
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.active.and_then(|i| self.tabs.get(i)).map(|t| t.id.as_str())
    }

    /// Select the tab with `id`. Unknown ids and the current tab are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the previous tab stays selected.
    pub fn select(&mut self, env: &mut Env, id: &str) -> Result<(), WidgetError> {
        match self.tabs.iter().position(|t| t.id == id) {
            Some(index) => self.select_index(env, index),
            None => Ok(()),
        }
    }

    fn select_index(&mut self, env: &mut Env, index: usize) -> Result<(), WidgetError> {
        let Some(previous) = self.active else {
            return Ok(());
        };
        if index == previous || index >= self.tabs.len() {
            return Ok(());
        }
        let tabs = &self.tabs;
        reflect_or_restore(env.dom.as_mut(), NAME, index, previous, |dom, i| Self::reflect(tabs, dom, i))?;
        self.active = Some(index);
        let tab = &self.tabs[index];
        self.state.borrow_mut().current_tab = Some(tab.id.clone());
        let label = env.dom.text(tab.button);
        env.announce(format!("{} tab selected", label.trim()));
        Ok(())
    }

    fn reflect(tabs: &[Tab], dom: &mut dyn Dom, active: usize) -> Result<(), DomError> {
        for (i, tab) in tabs.iter().enumerate() {
            let on = i == active;
            dom.toggle_class(tab.button, ACTIVE_CLASS, on)?;
            dom.set_flag(tab.button, "aria-selected", on)?;
            dom.set_attribute(tab.button, "tabindex", if on { "0" } else { "-1" })?;
            dom.toggle_class(tab.panel, ACTIVE_CLASS, on)?;
            dom.set_hidden(tab.panel, !on)?;
        }
        Ok(())
    }

    fn tab_at(&self, dom: &dyn Dom, target: NodeId) -> Option<usize> {
        self.tabs.iter().position(|t| dom.contains(t.button, target))
    }
}

impl Controller for TabController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.list.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        if self.list.is_none() {
            return Ok(false);
        }
        match *event {
            PageEvent::Click { target } => {
                if let Some(index) = self.tab_at(env.dom.as_ref(), target) {
                    self.select_index(env, index)?;
                }
                Ok(false)
            }
            PageEvent::KeyDown { target, key, .. } => {
                let Some(current) = self.tab_at(env.dom.as_ref(), target) else {
                    return Ok(false);
                };
                let Some(index) = roving_target(key, Axis::Horizontal, current, self.tabs.len()) else {
                    return Ok(false);
                };
                self.select_index(env, index)?;
                env.dom.focus(self.tabs[index].button)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn teardown(&mut self, _env: &mut Env) {}
}

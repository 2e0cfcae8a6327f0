//! Filter group: one active `[data-filter]` button hides every
//! `[data-category]` item that does not carry its category.
//!
//! An item's `data-category` may list several space-separated categories.
//! The [`FILTER_ALL`] id matches every item.

#[cfg(test)]
#[path = "filter_test.rs"]
mod filter_test;

use crate::controller::{Axis, Controller, roving_target};
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{ACTIVE_CLASS, FILTER_ALL, FILTER_BUTTON, FILTER_COUNT, FILTER_GROUP, FILTER_ITEM};
use crate::state::StateHandle;

const NAME: &str = "filter";

#[derive(Debug, Clone)]
struct Anchors {
    group: NodeId,
    /// `(filter id, button)`
    buttons: Vec<(String, NodeId)>,
    /// `(item, categories)`
    items: Vec<(NodeId, Vec<String>)>,
    count: Option<NodeId>,
}

impl Anchors {
    fn matching(&self, filter: &str) -> usize {
        self.items.iter().filter(|(_, cats)| matches(filter, cats)).count()
    }

    fn reflect(&self, dom: &mut dyn Dom, active: usize) -> Result<(), DomError> {
        let Some((filter, _)) = self.buttons.get(active) else {
            return Ok(());
        };
        for (i, (_, button)) in self.buttons.iter().enumerate() {
            dom.toggle_class(*button, ACTIVE_CLASS, i == active)?;
            dom.set_flag(*button, "aria-pressed", i == active)?;
        }
        for (item, cats) in &self.items {
            dom.set_hidden(*item, !matches(filter, cats))?;
        }
        if let Some(count) = self.count {
            dom.set_text(count, &self.matching(filter).to_string())?;
        }
        Ok(())
    }
}

fn matches(filter: &str, categories: &[String]) -> bool {
    filter == FILTER_ALL || categories.iter().any(|c| c == filter)
}

#[derive(Debug)]
pub struct FilterController {
    anchors: Option<Anchors>,
    active: usize,
    state: StateHandle,
}

impl FilterController {
    /// Collect buttons and items and reflect the initial filter.
    ///
    /// The initial filter is the button already marked active, else `all`,
    /// else the first button.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the initial reflection fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let mut this = Self { anchors: None, active: 0, state };
        let dom = env.dom.as_ref();
        let body = dom.body();
        let Some(group) = dom.query(body, &FILTER_GROUP) else {
            log::debug!("{NAME}: no filter group, inert");
            return Ok(this);
        };
        let buttons: Vec<(String, NodeId)> = dom
            .query_all(group, &FILTER_BUTTON)
            .into_iter()
            .filter_map(|b| dom.attribute(b, "data-filter").map(|id| (id.trim().to_owned(), b)))
            .collect();
        if buttons.is_empty() {
            log::debug!("{NAME}: group has no buttons, inert");
            return Ok(this);
        }
        let items = dom
            .query_all(body, &FILTER_ITEM)
            .into_iter()
            .map(|item| {
                let cats = dom.attribute(item, "data-category").unwrap_or_default();
                (item, cats.split_whitespace().map(str::to_owned).collect())
            })
            .collect();
        let initial = buttons
            .iter()
            .position(|(_, b)| dom.has_class(*b, ACTIVE_CLASS) || dom.attribute(*b, "aria-pressed").as_deref() == Some("true"))
            .or_else(|| buttons.iter().position(|(id, _)| id == FILTER_ALL))
            .unwrap_or(0);
        let anchors = Anchors { group, buttons, items, count: dom.query(body, &FILTER_COUNT) };

        anchors.reflect(env.dom.as_mut(), initial)?;
        this.state.borrow_mut().active_filter = anchors.buttons.get(initial).map(|(id, _)| id.clone());
        this.active = initial;
        this.anchors = Some(anchors);
        Ok(this)
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.anchors.as_ref().and_then(|a| a.buttons.get(self.active)).map(|(id, _)| id.as_str())
    }

    /// Number of items the active filter shows.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        match (&self.anchors, self.current()) {
            (Some(anchors), Some(filter)) => anchors.matching(filter),
            _ => 0,
        }
    }

    /// Apply the filter `id`. Unknown ids are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the previous filter stays applied.
    pub fn apply(&mut self, env: &mut Env, id: &str) -> Result<(), WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        let Some(index) = anchors.buttons.iter().position(|(f, _)| f == id) else {
            return Ok(());
        };
        self.apply_index(env, index)
    }

    fn apply_index(&mut self, env: &mut Env, index: usize) -> Result<(), WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        let Some((id, button)) = anchors.buttons.get(index) else {
            return Ok(());
        };
        reflect_or_restore(env.dom.as_mut(), NAME, index, self.active, |dom, i| anchors.reflect(dom, i))?;
        self.active = index;
        self.state.borrow_mut().active_filter = Some(id.clone());

        let shown = anchors.matching(id);
        let label = env.dom.text(*button);
        let noun = if shown == 1 { "item" } else { "items" };
        env.announce(format!("{} filter applied, {shown} {noun} shown", label.trim()));
        Ok(())
    }

    fn button_at(&self, dom: &dyn Dom, target: NodeId) -> Option<usize> {
        self.anchors.as_ref()?.buttons.iter().position(|(_, b)| dom.contains(*b, target))
    }
}

impl Controller for FilterController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        let Some(group) = self.anchors.as_ref().map(|a| a.group) else {
            return Ok(false);
        };
        match *event {
            PageEvent::Click { target } if env.dom.contains(group, target) => {
                if let Some(index) = self.button_at(env.dom.as_ref(), target) {
                    self.apply_index(env, index)?;
                }
                Ok(false)
            }
            PageEvent::KeyDown { target, key, .. } => {
                let Some(current) = self.button_at(env.dom.as_ref(), target) else {
                    return Ok(false);
                };
                let Some(anchors) = &self.anchors else {
                    return Ok(false);
                };
                let Some(next) = roving_target(key, Axis::Horizontal, current, anchors.buttons.len()) else {
                    return Ok(false);
                };
                if let Some((_, button)) = anchors.buttons.get(next) {
                    env.dom.focus(*button)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn teardown(&mut self, _env: &mut Env) {}
}

//! Accordions: at most one open item per `.accordion` group.
//!
//! Clicking the open item's trigger closes it, so a group may have zero open
//! items. Up/Down/Home/End move focus between a group's triggers without
//! opening anything.

#[cfg(test)]
#[path = "accordion_test.rs"]
mod accordion_test;

use crate::controller::{Axis, Controller, roving_target};
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{ACCORDION, ACCORDION_ITEM, ACCORDION_OPEN_CLASS, ACCORDION_PANEL, ACCORDION_TRIGGER};

const NAME: &str = "accordion";

#[derive(Debug, Clone, Copy)]
struct Item {
    root: NodeId,
    trigger: NodeId,
    panel: NodeId,
}

#[derive(Debug, Clone)]
struct Group {
    items: Vec<Item>,
    open: Option<usize>,
}

impl Group {
    fn reflect(items: &[Item], dom: &mut dyn Dom, open: Option<usize>) -> Result<(), DomError> {
        for (i, item) in items.iter().enumerate() {
            let on = open == Some(i);
            dom.toggle_class(item.root, ACCORDION_OPEN_CLASS, on)?;
            dom.set_flag(item.trigger, "aria-expanded", on)?;
            dom.set_hidden(item.panel, !on)?;
        }
        Ok(())
    }

    fn trigger_at(&self, dom: &dyn Dom, target: NodeId) -> Option<usize> {
        self.items.iter().position(|item| dom.contains(item.trigger, target))
    }
}

#[derive(Debug, Default)]
pub struct AccordionController {
    groups: Vec<Group>,
}

impl AccordionController {
    /// Pair every trigger with its panel, group by group.
    ///
    /// A panel is the trigger's `aria-controls` target, else the item's
    /// `.accordion-panel`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Markup`] when an item has no trigger or no
    /// panel.
    pub fn new(env: &mut Env) -> Result<Self, WidgetError> {
        let dom = env.dom.as_ref();
        let mut groups = Vec::new();
        for root in dom.query_all(dom.body(), &ACCORDION) {
            let mut items = Vec::new();
            for item in dom.query_all(root, &ACCORDION_ITEM) {
                let Some(trigger) = dom.query(item, &ACCORDION_TRIGGER) else {
                    return Err(WidgetError::markup(NAME, "item without a trigger"));
                };
                let panel = dom
                    .attribute(trigger, "aria-controls")
                    .and_then(|id| dom.get_by_id(&id))
                    .or_else(|| dom.query(item, &ACCORDION_PANEL));
                let Some(panel) = panel else {
                    return Err(WidgetError::markup(NAME, format!("trigger {:?} has no panel", dom.text(trigger).trim())));
                };
                items.push(Item { root: item, trigger, panel });
            }
            let open = items.iter().position(|i| {
                dom.has_class(i.root, ACCORDION_OPEN_CLASS) || dom.attribute(i.trigger, "aria-expanded").as_deref() == Some("true")
            });
            groups.push(Group { items, open });
        }
        if groups.is_empty() {
            log::debug!("{NAME}: no accordion, inert");
        }
        for group in &groups {
            Group::reflect(&group.items, env.dom.as_mut(), group.open)?;
        }
        Ok(Self { groups })
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Open item of `group`, if any.
    #[must_use]
    pub fn open_item(&self, group: usize) -> Option<usize> {
        self.groups.get(group).and_then(|g| g.open)
    }

    /// Open `index` in `group`, closing its sibling; if it is already open,
    /// close it. Unknown groups or items are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the group keeps its previous state.
    pub fn toggle(&mut self, env: &mut Env, group: usize, index: usize) -> Result<(), WidgetError> {
        let Some(g) = self.groups.get_mut(group) else {
            return Ok(());
        };
        let Some(item) = g.items.get(index).copied() else {
            return Ok(());
        };
        let next = if g.open == Some(index) { None } else { Some(index) };
        let items = &g.items;
        reflect_or_restore(env.dom.as_mut(), NAME, next, g.open, |dom, open| Group::reflect(items, dom, open))?;
        g.open = next;

        let label = env.dom.text(item.trigger);
        let verb = if next.is_some() { "expanded" } else { "collapsed" };
        env.announce(format!("{} {verb}", label.trim()));
        Ok(())
    }

    fn locate(&self, dom: &dyn Dom, target: NodeId) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(g, group)| group.trigger_at(dom, target).map(|i| (g, i)))
    }
}

impl Controller for AccordionController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.groups.is_empty()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        match *event {
            PageEvent::Click { target } => {
                if let Some((group, index)) = self.locate(env.dom.as_ref(), target) {
                    self.toggle(env, group, index)?;
                }
                Ok(false)
            }
            PageEvent::KeyDown { target, key, .. } => {
                let Some((group, index)) = self.locate(env.dom.as_ref(), target) else {
                    return Ok(false);
                };
                let Some(items) = self.groups.get(group).map(|g| &g.items) else {
                    return Ok(false);
                };
                let Some(next) = roving_target(key, Axis::Vertical, index, items.len()) else {
                    return Ok(false);
                };
                if let Some(item) = items.get(next) {
                    env.dom.focus(item.trigger)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn teardown(&mut self, _env: &mut Env) {}
}

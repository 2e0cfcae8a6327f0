//! Monthly / annual pricing switch.

#[cfg(test)]
#[path = "pricing_test.rs"]
mod pricing_test;

use crate::controller::Controller;
use crate::controllers::reflect_or_restore;
use crate::dom::{Dom, NodeId};
use crate::env::Env;
use crate::error::{DomError, WidgetError};
use crate::event::PageEvent;
use crate::selectors::{ACTIVE_CLASS, PRICE, PRICING_PERIOD, PRICING_TOGGLE};
use crate::state::{PricingMode, StateHandle};

const NAME: &str = "pricing";

#[derive(Debug, Clone)]
struct Anchors {
    toggle: NodeId,
    /// `(node, monthly text, annual text)`
    prices: Vec<(NodeId, String, String)>,
    /// `(label, period it names)`
    periods: Vec<(NodeId, Option<PricingMode>)>,
}

impl Anchors {
    fn reflect(&self, dom: &mut dyn Dom, mode: PricingMode) -> Result<(), DomError> {
        dom.set_flag(self.toggle, "aria-checked", mode == PricingMode::Annual)?;
        dom.toggle_class(self.toggle, ACTIVE_CLASS, mode == PricingMode::Annual)?;
        for (node, monthly, annual) in &self.prices {
            let text = match mode {
                PricingMode::Monthly => monthly,
                PricingMode::Annual => annual,
            };
            dom.set_text(*node, text)?;
        }
        for (label, period) in &self.periods {
            dom.toggle_class(*label, ACTIVE_CLASS, *period == Some(mode))?;
        }
        Ok(())
    }
}

fn parse_mode(raw: &str) -> Option<PricingMode> {
    match raw.trim() {
        "monthly" => Some(PricingMode::Monthly),
        "annual" | "yearly" => Some(PricingMode::Annual),
        _ => None,
    }
}

#[derive(Debug)]
pub struct PricingController {
    anchors: Option<Anchors>,
    state: StateHandle,
}

impl PricingController {
    /// # Errors
    ///
    /// Returns `Err` if the initial reflection fails.
    pub fn new(env: &mut Env, state: StateHandle) -> Result<Self, WidgetError> {
        let mut this = Self { anchors: None, state };
        let dom = env.dom.as_ref();
        let body = dom.body();
        let Some(toggle) = dom.query(body, &PRICING_TOGGLE) else {
            log::debug!("{NAME}: no pricing toggle, inert");
            return Ok(this);
        };
        let prices = dom
            .query_all(body, &PRICE)
            .into_iter()
            .map(|n| {
                let monthly = dom.attribute(n, "data-monthly").unwrap_or_default();
                let annual = dom.attribute(n, "data-annual").unwrap_or_default();
                (n, monthly, annual)
            })
            .collect();
        let periods = dom
            .query_all(body, &PRICING_PERIOD)
            .into_iter()
            .map(|n| (n, dom.attribute(n, "data-period").as_deref().and_then(parse_mode)))
            .collect();
        let mode = if dom.attribute(toggle, "aria-checked").as_deref() == Some("true") {
            PricingMode::Annual
        } else {
            PricingMode::Monthly
        };
        let anchors = Anchors { toggle, prices, periods };

        anchors.reflect(env.dom.as_mut(), mode)?;
        this.state.borrow_mut().pricing_mode = mode;
        this.anchors = Some(anchors);
        Ok(this)
    }

    #[must_use]
    pub fn mode(&self) -> PricingMode {
        self.state.borrow().pricing_mode
    }

    /// # Errors
    ///
    /// Returns `Err` if reflection failed; the previous mode is restored.
    pub fn set_mode(&mut self, env: &mut Env, mode: PricingMode) -> Result<(), WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(());
        };
        let previous = self.mode();
        if mode == previous {
            return Ok(());
        }
        reflect_or_restore(env.dom.as_mut(), NAME, mode, previous, |dom, m| anchors.reflect(dom, m))?;
        self.state.borrow_mut().pricing_mode = mode;
        env.announce(match mode {
            PricingMode::Monthly => "Showing monthly pricing",
            PricingMode::Annual => "Showing annual pricing",
        });
        Ok(())
    }

    /// # Errors
    ///
    /// See [`PricingController::set_mode`].
    pub fn toggle(&mut self, env: &mut Env) -> Result<(), WidgetError> {
        let next = self.mode().toggled();
        self.set_mode(env, next)
    }
}

impl Controller for PricingController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        self.anchors.is_none()
    }

    fn handle_event(&mut self, env: &mut Env, event: &PageEvent) -> Result<bool, WidgetError> {
        let Some(anchors) = &self.anchors else {
            return Ok(false);
        };
        let PageEvent::Click { target } = *event else {
            return Ok(false);
        };
        if env.dom.contains(anchors.toggle, target) {
            self.toggle(env)?;
            return Ok(false);
        }
        let period = anchors.periods.iter().find(|(label, _)| env.dom.contains(*label, target)).and_then(|(_, p)| *p);
        if let Some(mode) = period {
            self.set_mode(env, mode)?;
        }
        Ok(false)
    }

    fn teardown(&mut self, _env: &mut Env) {}
}

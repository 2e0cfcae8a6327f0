use super::*;
use crate::fixtures::{self, FlakyDom, announcements};
use crate::memory_dom::MemoryDom;
use crate::state::{self, StateHandle};

struct PricingPage {
    toggle: NodeId,
    monthly_label: NodeId,
    annual_label: NodeId,
    prices: Vec<NodeId>,
}

fn pricing_page(dom: &mut MemoryDom) -> PricingPage {
    let body = dom.body();
    let header = dom.build(body, "div").class("pricing-header").id();
    let monthly_label = dom.build(header, "span").class("pricing-period").attr("data-period", "monthly").text("Monthly").id();
    let toggle = dom.build(header, "button").class("pricing-toggle").attr("role", "switch").id();
    let annual_label = dom.build(header, "span").class("pricing-period").attr("data-period", "annual").text("Annual").id();
    let prices = [("$9", "$90"), ("$29", "$290")]
        .iter()
        .map(|(m, a)| dom.build(body, "span").class("price").attr("data-monthly", m).attr("data-annual", a).text(m).id())
        .collect();
    PricingPage { toggle, monthly_label, annual_label, prices }
}

fn setup() -> (Env, PricingController, PricingPage, StateHandle) {
    let mut dom = MemoryDom::new();
    let page = pricing_page(&mut dom);
    let mut env = fixtures::env(dom);
    let state = state::new_handle();
    let pricing = PricingController::new(&mut env, state.clone()).unwrap();
    (env, pricing, page, state)
}

fn price_texts(env: &Env, page: &PricingPage) -> Vec<String> {
    page.prices.iter().map(|p| env.dom.text(*p)).collect()
}

// =============================================================
// Switching
// =============================================================

#[test]
fn starts_monthly() {
    let (env, pricing, page, _) = setup();
    assert_eq!(pricing.mode(), PricingMode::Monthly);
    assert_eq!(env.dom.attribute(page.toggle, "aria-checked").as_deref(), Some("false"));
    assert!(env.dom.has_class(page.monthly_label, ACTIVE_CLASS));
    assert_eq!(price_texts(&env, &page), vec!["$9", "$29"]);
}

#[test]
fn toggle_click_switches_to_annual() {
    let (mut env, mut pricing, page, state) = setup();
    pricing.handle_event(&mut env, &PageEvent::Click { target: page.toggle }).unwrap();
    assert_eq!(state.borrow().pricing_mode, PricingMode::Annual);
    assert_eq!(env.dom.attribute(page.toggle, "aria-checked").as_deref(), Some("true"));
    assert_eq!(price_texts(&env, &page), vec!["$90", "$290"]);
    assert!(env.dom.has_class(page.annual_label, ACTIVE_CLASS));
    assert!(!env.dom.has_class(page.monthly_label, ACTIVE_CLASS));
    assert_eq!(announcements(&env), vec!["Showing annual pricing".to_owned()]);
}

#[test]
fn period_label_click_selects_that_period() {
    let (mut env, mut pricing, page, _) = setup();
    pricing.handle_event(&mut env, &PageEvent::Click { target: page.annual_label }).unwrap();
    assert_eq!(pricing.mode(), PricingMode::Annual);
    pricing.handle_event(&mut env, &PageEvent::Click { target: page.annual_label }).unwrap();
    assert_eq!(pricing.mode(), PricingMode::Annual);
    assert_eq!(announcements(&env).len(), 1);
}

#[test]
fn failed_reflection_keeps_monthly() {
    let mut dom = MemoryDom::new();
    let page = pricing_page(&mut dom);
    let flaky = FlakyDom::new(dom);
    let poison = flaky.poison_handle();
    let mut env = fixtures::env(flaky);
    let state = state::new_handle();
    let mut pricing = PricingController::new(&mut env, state.clone()).unwrap();

    poison.borrow_mut().insert(page.annual_label);
    assert!(pricing.toggle(&mut env).is_err());
    assert_eq!(pricing.mode(), PricingMode::Monthly);
    assert_eq!(price_texts(&env, &page), vec!["$9", "$29"]);
    assert_eq!(env.dom.attribute(page.toggle, "aria-checked").as_deref(), Some("false"));
}

#[test]
fn absent_toggle_is_inert() {
    let mut env = fixtures::env(MemoryDom::new());
    let mut pricing = PricingController::new(&mut env, state::new_handle()).unwrap();
    assert!(pricing.is_inert());
    pricing.toggle(&mut env).unwrap();
    assert_eq!(pricing.mode(), PricingMode::Monthly);
}

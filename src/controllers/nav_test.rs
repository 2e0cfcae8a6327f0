use super::*;
use crate::event::Modifiers;
use crate::fixtures::{self, FlakyDom, announcements, intersect, run_for};
use crate::memory_dom::MemoryDom;
use crate::state;

struct NavPage {
    header: NodeId,
    toggle: NodeId,
    menu: NodeId,
    links: Vec<NodeId>,
    sections: Vec<NodeId>,
    outside: NodeId,
}

fn nav_page(dom: &mut MemoryDom) -> NavPage {
    let body = dom.body();
    let header = dom.build(body, "header").class("main-nav").id();
    let toggle = dom.build(header, "button").class("nav-toggle").id();
    let menu = dom.build(header, "ul").class("nav-menu").id();
    let links = ["intro", "features", "pricing"]
        .iter()
        .map(|id| dom.build(menu, "a").class("nav-link").attr("href", &format!("#{id}")).id())
        .collect();
    let main = dom.build(body, "main").id();
    let sections = ["intro", "features", "pricing"].iter().map(|id| dom.build(main, "section").id_attr(id).id()).collect();
    let outside = dom.build(main, "p").id();
    NavPage { header, toggle, menu, links, sections, outside }
}

fn setup() -> (Env, NavController, NavPage, StateHandle) {
    let mut dom = MemoryDom::new();
    let page = nav_page(&mut dom);
    let mut env = fixtures::env(dom);
    let state = state::new_handle();
    let nav = NavController::new(&mut env, state.clone()).unwrap();
    (env, nav, page, state)
}

fn click(env: &mut Env, nav: &mut NavController, target: NodeId) {
    nav.handle_event(env, &PageEvent::Click { target }).unwrap();
}

// =============================================================
// Open state
// =============================================================

#[test]
fn toggle_reflects_aria_and_body_lock() {
    let (mut env, mut nav, page, state) = setup();
    assert_eq!(env.dom.attribute(page.toggle, "aria-expanded").as_deref(), Some("false"));

    click(&mut env, &mut nav, page.toggle);
    assert!(state.borrow().nav_open);
    assert_eq!(env.dom.attribute(page.toggle, "aria-expanded").as_deref(), Some("true"));
    assert!(env.dom.has_class(page.menu, NAV_OPEN_CLASS));
    assert!(env.dom.has_class(env.dom.body(), NAV_OPEN_BODY_CLASS));
    assert_eq!(announcements(&env), vec!["Navigation menu opened".to_owned()]);

    click(&mut env, &mut nav, page.toggle);
    assert!(!nav.is_open());
    assert!(!env.dom.has_class(env.dom.body(), NAV_OPEN_BODY_CLASS));
}

#[test]
fn outside_click_closes() {
    let (mut env, mut nav, page, _) = setup();
    click(&mut env, &mut nav, page.toggle);
    click(&mut env, &mut nav, page.menu);
    assert!(nav.is_open());
    click(&mut env, &mut nav, page.outside);
    assert!(!nav.is_open());
}

#[test]
fn outside_click_while_closed_does_nothing() {
    let (mut env, mut nav, page, _) = setup();
    click(&mut env, &mut nav, page.outside);
    assert!(!nav.is_open());
    assert!(announcements(&env).is_empty());
}

#[test]
fn escape_closes_and_returns_focus() {
    let (mut env, mut nav, page, _) = setup();
    click(&mut env, &mut nav, page.toggle);
    let escape = PageEvent::KeyDown { target: page.links[0], key: Key::Escape, modifiers: Modifiers::NONE };
    nav.handle_event(&mut env, &escape).unwrap();
    assert!(!nav.is_open());
    assert_eq!(env.dom.focused(), Some(page.toggle));
}

#[test]
fn nav_link_click_closes_and_marks_current() {
    let (mut env, mut nav, page, _) = setup();
    click(&mut env, &mut nav, page.toggle);
    click(&mut env, &mut nav, page.links[1]);
    assert!(!nav.is_open());
    assert!(env.dom.has_class(page.links[1], ACTIVE_CLASS));
    assert!(!env.dom.has_class(page.links[0], ACTIVE_CLASS));
}

#[test]
fn settled_resize_past_breakpoint_closes() {
    let (mut env, mut nav, page, _) = setup();
    click(&mut env, &mut nav, page.toggle);
    nav.handle_event(&mut env, &PageEvent::ResizeSettled { width: 600.0 }).unwrap();
    assert!(nav.is_open());
    nav.handle_event(&mut env, &PageEvent::ResizeSettled { width: 768.0 }).unwrap();
    assert!(!nav.is_open());
}

#[test]
fn failed_reflection_keeps_state_closed() {
    let mut dom = MemoryDom::new();
    let page = nav_page(&mut dom);
    let flaky = FlakyDom::new(dom);
    let poison = flaky.poison_handle();
    let mut env = fixtures::env(flaky);
    let state = state::new_handle();
    let mut nav = NavController::new(&mut env, state.clone()).unwrap();

    let body = env.dom.body();
    poison.borrow_mut().insert(body);
    assert!(nav.toggle(&mut env).is_err());
    assert!(!state.borrow().nav_open);
    assert!(!env.dom.has_class(page.menu, NAV_OPEN_CLASS));
    assert_eq!(env.dom.attribute(page.toggle, "aria-expanded").as_deref(), Some("false"));
}

#[test]
fn absent_menu_is_inert() {
    let mut env = fixtures::env(MemoryDom::new());
    let mut nav = NavController::new(&mut env, state::new_handle()).unwrap();
    assert!(nav.is_inert());
    nav.toggle(&mut env).unwrap();
    assert!(!nav.is_open());
    assert!(announcements(&env).is_empty());
}

// =============================================================
// Header hide-on-scroll
// =============================================================

#[test]
fn scrolling_down_past_offset_hides_header() {
    let (mut env, mut nav, page, state) = setup();
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 50.0 }).unwrap();
    assert!(!nav.header_hidden());
    run_for(&mut env, &mut nav, 100);
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 200.0 }).unwrap();
    assert!(env.dom.has_class(page.header, HEADER_HIDDEN_CLASS));
    assert!(!state.borrow().nav_open);

    run_for(&mut env, &mut nav, 100);
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 150.0 }).unwrap();
    assert!(!env.dom.has_class(page.header, HEADER_HIDDEN_CLASS));
}

#[test]
fn scroll_is_throttled_with_trailing_position() {
    let (mut env, mut nav, page, _) = setup();
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 10.0 }).unwrap();
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 120.0 }).unwrap();
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 300.0 }).unwrap();
    assert!(!nav.header_hidden());
    assert_eq!(env.timers.count(|t| matches!(t, Task::Nav(_))), 1);

    run_for(&mut env, &mut nav, 100);
    assert!(env.dom.has_class(page.header, HEADER_HIDDEN_CLASS));
}

// =============================================================
// Scroll-spy
// =============================================================

#[test]
fn visible_section_marks_its_link() {
    let (mut env, mut nav, page, _) = setup();
    intersect(&mut env, &mut nav, page.sections[2], 0.6);
    assert!(env.dom.has_class(page.links[2], ACTIVE_CLASS));
    assert_eq!(env.dom.attribute(page.links[2], "aria-current").as_deref(), Some("true"));

    intersect(&mut env, &mut nav, page.sections[0], 0.4);
    assert!(env.dom.has_class(page.links[0], ACTIVE_CLASS));
    assert!(!env.dom.has_class(page.links[2], ACTIVE_CLASS));
    assert_eq!(env.dom.attribute(page.links[2], "aria-current"), None);
}

#[test]
fn teardown_drops_registrations() {
    let (mut env, mut nav, page, _) = setup();
    nav.handle_event(&mut env, &PageEvent::Scroll { y: 10.0 }).unwrap();
    nav.teardown(&mut env);
    assert!(env.timers.is_empty());
    assert!(!env.visibility.is_observed(page.sections[0], Observer::ScrollSpy));
}

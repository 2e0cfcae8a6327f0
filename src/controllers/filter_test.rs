use super::*;
use crate::event::{Key, Modifiers};
use crate::fixtures::{self, FilterPage, FlakyDom, announcements, filter_page};
use crate::memory_dom::MemoryDom;
use crate::state::{self, StateHandle};

const FILTERS: &[&str] = &["all", "layout", "forms"];
const CATEGORIES: &[&str] = &["layout", "forms", "layout", "forms layout", "forms"];

fn setup() -> (Env, FilterController, FilterPage, StateHandle) {
    let mut dom = MemoryDom::new();
    let page = filter_page(&mut dom, FILTERS, CATEGORIES);
    let mut env = fixtures::env(dom);
    let state = state::new_handle();
    let filter = FilterController::new(&mut env, state.clone()).unwrap();
    (env, filter, page, state)
}

fn hidden(env: &Env, page: &FilterPage) -> Vec<bool> {
    page.items.iter().map(|i| env.dom.attribute(*i, "hidden").is_some()).collect()
}

// =============================================================
// Applying
// =============================================================

#[test]
fn starts_on_all_with_everything_visible() {
    let (env, filter, page, state) = setup();
    assert_eq!(filter.current(), Some("all"));
    assert_eq!(state.borrow().active_filter.as_deref(), Some("all"));
    assert_eq!(hidden(&env, &page), vec![false; 5]);
    assert_eq!(env.dom.text(page.count), "5");
    assert_eq!(env.dom.attribute(page.buttons[0], "aria-pressed").as_deref(), Some("true"));
}

#[test]
fn forms_hides_other_categories_and_announces_count() {
    let (mut env, mut filter, page, state) = setup();
    filter.handle_event(&mut env, &PageEvent::Click { target: page.buttons[2] }).unwrap();

    assert_eq!(hidden(&env, &page), vec![true, false, true, false, false]);
    assert_eq!(filter.visible_count(), 3);
    assert_eq!(env.dom.text(page.count), "3");
    assert_eq!(state.borrow().active_filter.as_deref(), Some("forms"));
    assert_eq!(announcements(&env), vec!["Forms filter applied, 3 items shown".to_owned()]);
    assert!(env.dom.has_class(page.buttons[2], ACTIVE_CLASS));
    assert!(!env.dom.has_class(page.buttons[0], ACTIVE_CLASS));
}

#[test]
fn back_to_all_shows_everything() {
    let (mut env, mut filter, page, _) = setup();
    filter.apply(&mut env, "layout").unwrap();
    assert_eq!(hidden(&env, &page), vec![false, true, false, false, true]);
    filter.apply(&mut env, "all").unwrap();
    assert_eq!(hidden(&env, &page), vec![false; 5]);
}

#[test]
fn singular_count_wording() {
    let mut dom = MemoryDom::new();
    filter_page(&mut dom, &["all", "forms"], &["layout", "forms"]);
    let mut env = fixtures::env(dom);
    let mut filter = FilterController::new(&mut env, state::new_handle()).unwrap();
    filter.apply(&mut env, "forms").unwrap();
    assert_eq!(announcements(&env), vec!["Forms filter applied, 1 item shown".to_owned()]);
}

#[test]
fn unknown_id_is_noop() {
    let (mut env, mut filter, page, _) = setup();
    filter.apply(&mut env, "widgets").unwrap();
    assert_eq!(filter.current(), Some("all"));
    assert_eq!(hidden(&env, &page), vec![false; 5]);
    assert!(announcements(&env).is_empty());
}

#[test]
fn failed_reflection_keeps_previous_filter() {
    let mut dom = MemoryDom::new();
    let page = filter_page(&mut dom, FILTERS, CATEGORIES);
    let flaky = FlakyDom::new(dom);
    let poison = flaky.poison_handle();
    let mut env = fixtures::env(flaky);
    let state = state::new_handle();
    let mut filter = FilterController::new(&mut env, state.clone()).unwrap();

    poison.borrow_mut().insert(page.buttons[1]);
    assert!(filter.apply(&mut env, "layout").is_err());
    assert_eq!(filter.current(), Some("all"));
    assert_eq!(state.borrow().active_filter.as_deref(), Some("all"));
    assert!(env.dom.has_class(page.buttons[0], ACTIVE_CLASS));
    assert_eq!(hidden(&env, &page), vec![false; 5]);
}

// =============================================================
// Keyboard and construction
// =============================================================

#[test]
fn arrows_move_focus_without_applying() {
    let (mut env, mut filter, page, _) = setup();
    let left = PageEvent::KeyDown { target: page.buttons[0], key: Key::ArrowLeft, modifiers: Modifiers::NONE };
    assert!(filter.handle_event(&mut env, &left).unwrap());
    assert_eq!(env.dom.focused(), Some(page.buttons[2]));
    assert_eq!(filter.current(), Some("all"));
}

#[test]
fn markup_active_button_wins() {
    let mut dom = MemoryDom::new();
    let page = filter_page(&mut dom, FILTERS, CATEGORIES);
    dom.toggle_class(page.buttons[1], ACTIVE_CLASS, true).unwrap();
    let mut env = fixtures::env(dom);
    let filter = FilterController::new(&mut env, state::new_handle()).unwrap();
    assert_eq!(filter.current(), Some("layout"));
    assert!(!env.dom.has_class(page.buttons[0], ACTIVE_CLASS));
}

#[test]
fn absent_group_is_inert() {
    let mut env = fixtures::env(MemoryDom::new());
    let mut filter = FilterController::new(&mut env, state::new_handle()).unwrap();
    assert!(filter.is_inert());
    filter.apply(&mut env, "forms").unwrap();
    assert_eq!(filter.current(), None);
    assert_eq!(filter.visible_count(), 0);
    assert!(announcements(&env).is_empty());
}

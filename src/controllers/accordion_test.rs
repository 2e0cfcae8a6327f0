use super::*;
use crate::event::{Key, Modifiers};
use crate::fixtures::{self, AccordionPage, FlakyDom, accordion_page, announcements};
use crate::memory_dom::MemoryDom;

fn setup(count: usize) -> (Env, AccordionController, AccordionPage) {
    let mut dom = MemoryDom::new();
    let page = accordion_page(&mut dom, "faq", count);
    let mut env = fixtures::env(dom);
    let accordion = AccordionController::new(&mut env).unwrap();
    (env, accordion, page)
}

fn open_items(env: &Env, page: &AccordionPage) -> Vec<usize> {
    (0..page.items.len()).filter(|i| env.dom.has_class(page.items[*i], ACCORDION_OPEN_CLASS)).collect()
}

fn click(env: &mut Env, accordion: &mut AccordionController, target: NodeId) {
    accordion.handle_event(env, &PageEvent::Click { target }).unwrap();
}

// =============================================================
// Toggling
// =============================================================

#[test]
fn starts_all_closed() {
    let (env, accordion, page) = setup(3);
    assert_eq!(accordion.open_item(0), None);
    assert!(open_items(&env, &page).is_empty());
    assert_eq!(env.dom.attribute(page.panels[0], "hidden").as_deref(), Some(""));
    assert_eq!(env.dom.attribute(page.triggers[0], "aria-expanded").as_deref(), Some("false"));
}

#[test]
fn click_opens_one_and_click_again_closes_all() {
    let (mut env, mut accordion, page) = setup(3);
    click(&mut env, &mut accordion, page.triggers[1]);
    assert_eq!(open_items(&env, &page), vec![1]);
    assert_eq!(env.dom.attribute(page.triggers[1], "aria-expanded").as_deref(), Some("true"));
    assert_eq!(env.dom.attribute(page.panels[1], "hidden"), None);

    click(&mut env, &mut accordion, page.triggers[1]);
    assert!(open_items(&env, &page).is_empty());
    assert_eq!(accordion.open_item(0), None);
    assert_eq!(announcements(&env), vec!["Question 2 expanded".to_owned(), "Question 2 collapsed".to_owned()]);
}

#[test]
fn opening_another_closes_sibling() {
    let (mut env, mut accordion, page) = setup(3);
    accordion.toggle(&mut env, 0, 0).unwrap();
    accordion.toggle(&mut env, 0, 2).unwrap();
    assert_eq!(open_items(&env, &page), vec![2]);
    assert_eq!(env.dom.attribute(page.panels[0], "hidden").as_deref(), Some(""));
}

#[test]
fn groups_are_independent() {
    let mut dom = MemoryDom::new();
    let first = accordion_page(&mut dom, "faq", 2);
    let second = accordion_page(&mut dom, "help", 2);
    let mut env = fixtures::env(dom);
    let mut accordion = AccordionController::new(&mut env).unwrap();
    assert_eq!(accordion.group_count(), 2);

    click(&mut env, &mut accordion, first.triggers[0]);
    click(&mut env, &mut accordion, second.triggers[1]);
    assert_eq!(accordion.open_item(0), Some(0));
    assert_eq!(accordion.open_item(1), Some(1));
}

#[test]
fn out_of_range_is_noop() {
    let (mut env, mut accordion, page) = setup(2);
    accordion.toggle(&mut env, 0, 7).unwrap();
    accordion.toggle(&mut env, 4, 0).unwrap();
    assert!(open_items(&env, &page).is_empty());
    assert!(announcements(&env).is_empty());
}

#[test]
fn failed_reflection_keeps_group_closed() {
    let mut dom = MemoryDom::new();
    let page = accordion_page(&mut dom, "faq", 3);
    let flaky = FlakyDom::new(dom);
    let poison = flaky.poison_handle();
    let mut env = fixtures::env(flaky);
    let mut accordion = AccordionController::new(&mut env).unwrap();

    poison.borrow_mut().insert(page.items[1]);
    assert!(accordion.toggle(&mut env, 0, 1).is_err());
    assert_eq!(accordion.open_item(0), None);
    assert_eq!(env.dom.attribute(page.panels[1], "hidden").as_deref(), Some(""));
}

// =============================================================
// Keyboard and construction
// =============================================================

#[test]
fn arrows_move_focus_only() {
    let (mut env, mut accordion, page) = setup(3);
    let up = PageEvent::KeyDown { target: page.triggers[0], key: Key::ArrowUp, modifiers: Modifiers::NONE };
    assert!(accordion.handle_event(&mut env, &up).unwrap());
    assert_eq!(env.dom.focused(), Some(page.triggers[2]));
    assert!(open_items(&env, &page).is_empty());

    let right = PageEvent::KeyDown { target: page.triggers[0], key: Key::ArrowRight, modifiers: Modifiers::NONE };
    assert!(!accordion.handle_event(&mut env, &right).unwrap());
}

#[test]
fn markup_open_item_is_kept() {
    let mut dom = MemoryDom::new();
    let page = accordion_page(&mut dom, "faq", 3);
    dom.set_attribute(page.triggers[2], "aria-expanded", "true").unwrap();
    let mut env = fixtures::env(dom);
    let accordion = AccordionController::new(&mut env).unwrap();
    assert_eq!(accordion.open_item(0), Some(2));
    assert_eq!(open_items(&env, &page), vec![2]);
}

#[test]
fn missing_panel_fails_construction() {
    let mut dom = MemoryDom::new();
    let page = accordion_page(&mut dom, "faq", 2);
    dom.remove(page.panels[0]).unwrap();
    let mut env = fixtures::env(dom);
    let err = AccordionController::new(&mut env).unwrap_err();
    assert!(matches!(err, WidgetError::Markup { widget: "accordion", .. }));
}

#[test]
fn absent_accordion_is_inert() {
    let mut env = fixtures::env(MemoryDom::new());
    let mut accordion = AccordionController::new(&mut env).unwrap();
    assert!(accordion.is_inert());
    accordion.toggle(&mut env, 0, 0).unwrap();
    assert!(announcements(&env).is_empty());
}

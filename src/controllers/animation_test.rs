use super::*;
use crate::fixtures::{self, run_for};
use crate::memory_dom::MemoryDom;

struct Showcase {
    cards: Vec<NodeId>,
    boxes: Vec<NodeId>,
    play_all: NodeId,
    speed: NodeId,
}

fn showcase(dom: &mut MemoryDom, names: &[&str]) -> Showcase {
    let body = dom.body();
    let play_all = dom.build(body, "button").id_attr("playAnimations").text("Play all").id();
    let speed = dom.build(body, "select").id_attr("animationSpeed").id();
    let mut cards = Vec::new();
    let mut boxes = Vec::new();
    for name in names {
        let card = dom.build(body, "div").class("animation-card").attr("data-animation", name).id();
        boxes.push(dom.build(card, "div").class("animation-box").id());
        cards.push(card);
    }
    Showcase { cards, boxes, play_all, speed }
}

fn setup(names: &[&str]) -> (Env, AnimationController, Showcase) {
    let mut dom = MemoryDom::new();
    let page = showcase(&mut dom, names);
    let env = fixtures::env(dom);
    let animation = AnimationController::new(&env);
    (env, animation, page)
}

fn click(env: &mut Env, animation: &mut AnimationController, target: NodeId) {
    animation.handle_event(env, &PageEvent::Click { target }).unwrap();
}

// =============================================================
// Single card
// =============================================================

#[test]
fn card_click_plays_until_duration_elapses() {
    let (mut env, mut animation, page) = setup(&["bounce"]);
    click(&mut env, &mut animation, page.boxes[0]);
    assert!(env.dom.has_class(page.boxes[0], "animate-bounce"));

    run_for(&mut env, &mut animation, 299);
    assert!(env.dom.has_class(page.boxes[0], "animate-bounce"));
    run_for(&mut env, &mut animation, 1);
    assert!(!env.dom.has_class(page.boxes[0], "animate-bounce"));
}

#[test]
fn replay_restarts_the_finish_timer() {
    let (mut env, mut animation, page) = setup(&["fade"]);
    click(&mut env, &mut animation, page.cards[0]);
    run_for(&mut env, &mut animation, 200);
    click(&mut env, &mut animation, page.cards[0]);
    assert_eq!(env.timers.count(|t| matches!(t, Task::Animation(AnimationTimer::Finish(_)))), 1);

    run_for(&mut env, &mut animation, 200);
    assert!(env.dom.has_class(page.boxes[0], "animate-fade"));
    run_for(&mut env, &mut animation, 100);
    assert!(!env.dom.has_class(page.boxes[0], "animate-fade"));
}

#[test]
fn card_without_box_is_ignored() {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let card = dom.build(body, "div").class("animation-card").attr("data-animation", "spin").id();
    let mut env = fixtures::env(dom);
    let mut animation = AnimationController::new(&env);
    click(&mut env, &mut animation, card);
    assert!(env.timers.is_empty());
}

// =============================================================
// Play all
// =============================================================

#[test]
fn play_all_staggers_cards() {
    let (mut env, mut animation, page) = setup(&["fade", "slide", "zoom"]);
    click(&mut env, &mut animation, page.play_all);

    run_for(&mut env, &mut animation, 0);
    assert!(env.dom.has_class(page.boxes[0], "animate-fade"));
    assert!(!env.dom.has_class(page.boxes[1], "animate-slide"));

    run_for(&mut env, &mut animation, 100);
    assert!(env.dom.has_class(page.boxes[1], "animate-slide"));
    assert!(!env.dom.has_class(page.boxes[2], "animate-zoom"));

    run_for(&mut env, &mut animation, 100);
    assert!(env.dom.has_class(page.boxes[2], "animate-zoom"));

    run_for(&mut env, &mut animation, 100);
    assert!(!env.dom.has_class(page.boxes[0], "animate-fade"));
    assert!(env.dom.has_class(page.boxes[1], "animate-slide"));
}

#[test]
fn pressing_play_all_twice_keeps_one_sequence() {
    let (mut env, mut animation, page) = setup(&["fade", "slide"]);
    click(&mut env, &mut animation, page.play_all);
    click(&mut env, &mut animation, page.play_all);
    assert_eq!(env.timers.count(|t| matches!(t, Task::Animation(AnimationTimer::Start(_)))), 2);
}

#[test]
fn removed_card_is_skipped() {
    let (mut env, mut animation, page) = setup(&["fade", "slide"]);
    click(&mut env, &mut animation, page.play_all);
    env.dom.remove(page.cards[1]).unwrap();
    run_for(&mut env, &mut animation, 1_000);
    assert!(!env.dom.has_class(page.boxes[1], "animate-slide"));
    assert!(env.timers.is_empty());
}

// =============================================================
// Speed
// =============================================================

#[test]
fn speed_change_rewrites_durations_and_timing() {
    let (mut env, mut animation, page) = setup(&["bounce"]);
    env.dom.set_value(page.speed, "slow").unwrap();
    animation.handle_event(&mut env, &PageEvent::Change { target: page.speed }).unwrap();
    assert_eq!(animation.speed(), Speed::Slow);
    let root = env.dom.document_element();
    for property in DURATION_PROPERTIES {
        assert_eq!(env.dom.style(root, property).as_deref(), Some("500ms"));
    }

    click(&mut env, &mut animation, page.cards[0]);
    run_for(&mut env, &mut animation, 499);
    assert!(env.dom.has_class(page.boxes[0], "animate-bounce"));
    run_for(&mut env, &mut animation, 1);
    assert!(!env.dom.has_class(page.boxes[0], "animate-bounce"));
}

#[test]
fn unknown_speed_is_ignored() {
    let (mut env, mut animation, _) = setup(&["bounce"]);
    assert!(!animation.set_speed(&mut env, "ludicrous").unwrap());
    assert_eq!(animation.speed(), Speed::Normal);
    assert_eq!(env.dom.style(env.dom.document_element(), "--duration-normal"), None);
}

#[test]
fn initial_speed_follows_the_control() {
    let mut dom = MemoryDom::new();
    let page = showcase(&mut dom, &["fade"]);
    dom.set_value(page.speed, "slower").unwrap();
    let env = fixtures::env(dom);
    assert_eq!(AnimationController::new(&env).speed(), Speed::Slower);
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn teardown_cancels_pending_timers() {
    let (mut env, mut animation, page) = setup(&["fade", "slide"]);
    click(&mut env, &mut animation, page.play_all);
    animation.teardown(&mut env);
    assert!(env.timers.is_empty());
}

#[test]
fn page_without_showcase_is_inert() {
    let env = fixtures::env(MemoryDom::new());
    assert!(AnimationController::new(&env).is_inert());
}

use super::*;
use crate::fixtures::{self, intersect, run_for};
use crate::memory_dom::MemoryDom;
use crate::state::{self, StateHandle};

struct ProgressPage {
    bar: NodeId,
    fill: NodeId,
    text: NodeId,
    counter: NodeId,
}

fn progress_page(dom: &mut MemoryDom) -> ProgressPage {
    let body = dom.body();
    let bar = dom.build(body, "div").class("progress").attr("role", "progressbar").attr("data-value", "60").id();
    let fill = dom.build(bar, "div").class("progress-bar").id();
    let text = dom.build(bar, "span").class("progress-text").id();
    let counter = dom.build(body, "span").class("counter").attr("data-target", "1200").id();
    ProgressPage { bar, fill, text, counter }
}

fn setup(motion: bool) -> (Env, ProgressController, ProgressPage, StateHandle) {
    let mut dom = MemoryDom::new();
    let page = progress_page(&mut dom);
    let mut env = fixtures::env(dom);
    let state = state::new_handle();
    state.borrow_mut().motion_enabled = motion;
    let progress = ProgressController::new(&mut env, state.clone()).unwrap();
    (env, progress, page, state)
}

fn shown(env: &Env, page: &ProgressPage) -> (Option<String>, Option<String>, String) {
    (env.dom.attribute(page.bar, "aria-valuenow"), env.dom.style(page.fill, "width"), env.dom.text(page.text))
}

// =============================================================
// Easing and clamping
// =============================================================

#[test]
fn ease_out_cubic_endpoints_and_shape() {
    assert!(ease_out_cubic(0.0).abs() < f64::EPSILON);
    assert!((ease_out_cubic(1.0) - 1.0).abs() < f64::EPSILON);
    assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-9);
    assert!((ease_out_cubic(3.0) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn set_progress_clamps_out_of_range_values() {
    let (mut env, mut progress, page, _) = setup(false);
    progress.set_progress(&mut env, page.bar, -10.0, false).unwrap();
    assert_eq!(progress.value(&env, page.bar), Some(0.0));
    assert_eq!(env.dom.text(page.text), "0%");

    progress.set_progress(&mut env, page.bar, 150.0, true).unwrap();
    assert_eq!(progress.value(&env, page.bar), Some(100.0));
    assert_eq!(shown(&env, &page), (Some("100".into()), Some("100%".into()), "100%".into()));

    progress.set_progress(&mut env, page.bar, f64::NAN, false).unwrap();
    assert_eq!(progress.value(&env, page.bar), Some(0.0));
}

// =============================================================
// Animation
// =============================================================

#[test]
fn animated_set_interpolates_to_target() {
    let (mut env, mut progress, page, _) = setup(true);
    progress.set_progress(&mut env, page.bar, 80.0, true).unwrap();
    assert!(progress.is_animating(page.bar));
    assert_eq!(progress.value(&env, page.bar), Some(80.0));
    assert_eq!(env.dom.text(page.text), "0%");

    run_for(&mut env, &mut progress, 256);
    let midway: f64 = env.dom.attribute(page.bar, "aria-valuenow").unwrap().parse().unwrap();
    assert!(midway > 40.0 && midway < 80.0, "midway value {midway}");

    run_for(&mut env, &mut progress, 300);
    assert!(!progress.is_animating(page.bar));
    assert_eq!(shown(&env, &page), (Some("80".into()), Some("80%".into()), "80%".into()));
    assert_eq!(env.timers.count(|t| matches!(t, Task::Progress(_))), 0);
}

#[test]
fn increment_builds_on_stored_value() {
    let (mut env, mut progress, page, _) = setup(false);
    progress.increment(&mut env, page.bar, 15.0).unwrap();
    assert_eq!(progress.value(&env, page.bar), Some(75.0));
    progress.increment(&mut env, page.bar, 50.0).unwrap();
    assert_eq!(progress.value(&env, page.bar), Some(100.0));
    assert_eq!(env.dom.text(page.text), "100%");
}

#[test]
fn bar_animates_from_zero_on_first_visibility() {
    let (mut env, mut progress, page, _) = setup(true);
    assert_eq!(env.dom.text(page.text), "0%");
    intersect(&mut env, &mut progress, page.bar, 0.5);
    assert!(progress.is_animating(page.bar));
    run_for(&mut env, &mut progress, 600);
    assert_eq!(env.dom.text(page.text), "60%");

    assert!(!env.visibility.is_observed(page.bar, Observer::Progress));
}

#[test]
fn reduced_motion_applies_immediately() {
    let (mut env, mut progress, page, _) = setup(false);
    assert_eq!(env.dom.text(page.text), "60%");
    assert_eq!(env.dom.text(page.counter), "1200");
    assert!(!env.visibility.is_observed(page.bar, Observer::Progress));

    progress.set_progress(&mut env, page.bar, 30.0, true).unwrap();
    assert!(!progress.is_animating(page.bar));
    assert_eq!(env.dom.text(page.text), "30%");
}

#[test]
fn detached_bar_stops_animating() {
    let (mut env, mut progress, page, _) = setup(true);
    progress.set_progress(&mut env, page.bar, 90.0, true).unwrap();
    env.dom.remove(page.bar).unwrap();
    run_for(&mut env, &mut progress, 16);
    assert!(!progress.is_animating(page.bar));
    assert!(env.timers.is_empty());
}

// =============================================================
// Counters
// =============================================================

#[test]
fn counter_counts_up_on_first_visibility() {
    let (mut env, mut progress, page, _) = setup(true);
    assert_eq!(env.dom.text(page.counter), "0");
    intersect(&mut env, &mut progress, page.counter, 1.0);
    run_for(&mut env, &mut progress, 1000);
    let partial: f64 = env.dom.text(page.counter).parse().unwrap();
    assert!(partial > 0.0 && partial < 1200.0);
    run_for(&mut env, &mut progress, 1100);
    assert_eq!(env.dom.text(page.counter), "1200");
    assert!(!progress.is_animating(page.counter));
}

#[test]
fn teardown_cancels_frames_and_registrations() {
    let (mut env, mut progress, page, _) = setup(true);
    progress.set_progress(&mut env, page.bar, 20.0, true).unwrap();
    progress.teardown(&mut env);
    assert!(env.timers.is_empty());
    assert!(!env.visibility.is_observed(page.counter, Observer::Counter));
}

#[test]
fn absent_elements_are_inert() {
    let mut env = fixtures::env(MemoryDom::new());
    let mut progress = ProgressController::new(&mut env, state::new_handle()).unwrap();
    assert!(progress.is_inert());
    let body = env.dom.body();
    progress.set_progress(&mut env, body, 50.0, true).unwrap();
    assert_eq!(env.dom.attribute(body, "data-value"), None);
    assert!(env.timers.is_empty());
}

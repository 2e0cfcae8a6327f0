use super::*;
use crate::memory_dom::MemoryDom;

struct Harness {
    dom: MemoryDom,
    timers: TimerQueue,
    center: NotificationCenter,
}

impl Harness {
    fn new() -> Self {
        Self { dom: MemoryDom::new(), timers: TimerQueue::new(), center: NotificationCenter::new(300) }
    }

    fn show(&mut self, message: &str, kind: ToastKind, duration_ms: u64) -> ToastId {
        self.center.show(&mut self.dom, &mut self.timers, &Toast::new(message, kind, duration_ms)).unwrap()
    }

    fn advance(&mut self, until: u64) {
        while let Some((_, task)) = self.timers.pop_due(until) {
            if let Task::Toast(id, stage) = task {
                self.center.on_timer(&mut self.dom, &mut self.timers, id, stage);
            }
        }
        self.timers.advance_clock(until);
    }
}

// =============================================================
// Mounting
// =============================================================

#[test]
fn show_creates_container_once() {
    let mut h = Harness::new();
    h.show("one", ToastKind::Info, 3_000);
    h.show("two", ToastKind::Success, 3_000);
    let container = h.dom.get_by_id(CONTAINER_ID).unwrap();
    assert_eq!(h.dom.children(container).len(), 2);
    assert_eq!(h.dom.query_all(h.dom.body(), &Selector::Id(CONTAINER_ID)).len(), 1);
}

#[test]
fn show_uses_existing_container() {
    let mut h = Harness::new();
    let body = h.dom.body();
    let existing = h.dom.build(body, "div").id_attr(CONTAINER_ID).id();
    let id = h.show("hi", ToastKind::Warning, 3_000);
    let node = h.center.node(id).unwrap();
    assert_eq!(h.dom.parent(node), Some(existing));
    assert!(h.dom.has_class(node, "toast-warning"));
    assert!(h.dom.text(node).contains("hi"));
}

#[test]
fn error_toasts_use_alert_role() {
    let mut h = Harness::new();
    let id = h.show("boom", ToastKind::Error, 3_000);
    assert_eq!(h.dom.attribute(h.center.node(id).unwrap(), "role").as_deref(), Some("alert"));
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn auto_dismiss_then_detach() {
    let mut h = Harness::new();
    let id = h.show("hi", ToastKind::Info, 3_000);
    let node = h.center.node(id).unwrap();

    h.advance(2_999);
    assert!(!h.dom.has_class(node, EXIT_CLASS));
    h.advance(3_000);
    assert!(h.dom.has_class(node, EXIT_CLASS));
    assert!(h.dom.is_attached(node));
    h.advance(3_300);
    assert!(!h.dom.is_attached(node));
    assert_eq!(h.center.active_count(), 0);
}

#[test]
fn zero_duration_stays_until_closed() {
    let mut h = Harness::new();
    let id = h.show("sticky", ToastKind::Info, 0);
    h.advance(60_000);
    assert_eq!(h.center.active_count(), 1);
    assert!(h.center.close(&mut h.dom, &mut h.timers, id));
    h.advance(60_300);
    assert_eq!(h.center.active_count(), 0);
}

#[test]
fn close_cancels_auto_dismiss() {
    let mut h = Harness::new();
    let id = h.show("hi", ToastKind::Info, 3_000);
    h.advance(1_000);
    assert!(h.center.close(&mut h.dom, &mut h.timers, id));
    assert_eq!(h.timers.count(|t| matches!(t, Task::Toast(_, ToastStage::AutoDismiss))), 0);
    assert_eq!(h.timers.count(|t| matches!(t, Task::Toast(_, ToastStage::Detach))), 1);
    h.advance(10_000);
    assert_eq!(h.center.active_count(), 0);
    assert!(h.timers.is_empty());
}

#[test]
fn second_close_is_noop() {
    let mut h = Harness::new();
    let id = h.show("hi", ToastKind::Info, 3_000);
    assert!(h.center.close(&mut h.dom, &mut h.timers, id));
    assert!(!h.center.close(&mut h.dom, &mut h.timers, id));
    assert_eq!(h.timers.count(|t| matches!(t, Task::Toast(_, ToastStage::Detach))), 1);
}

#[test]
fn close_button_click_closes_owning_toast() {
    let mut h = Harness::new();
    let first = h.show("one", ToastKind::Info, 3_000);
    let second = h.show("two", ToastKind::Info, 3_000);
    let second_node = h.center.node(second).unwrap();
    let button = h.dom.query(second_node, &CLOSE_SELECTOR).unwrap();

    assert!(h.center.handle_click(&mut h.dom, &mut h.timers, button));
    assert!(h.dom.has_class(second_node, EXIT_CLASS));
    assert!(!h.dom.has_class(h.center.node(first).unwrap(), EXIT_CLASS));
}

#[test]
fn unrelated_click_is_not_consumed() {
    let mut h = Harness::new();
    h.show("one", ToastKind::Info, 3_000);
    let body = h.dom.body();
    assert!(!h.center.handle_click(&mut h.dom, &mut h.timers, body));
}

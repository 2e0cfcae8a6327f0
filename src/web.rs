//! Browser host: binds the core to `web-sys`.
//!
//! ARCHITECTURE
//! ============
//! [`WebDom`] hands out [`NodeId`]s from a registry of `web_sys::Element`s
//! shared with the host, so event targets can be mapped to the same ids the
//! controllers hold. Removed elements are forgotten at once, and elements
//! detached by other means are swept between steps, after which their ids
//! read as detached. Document and window listeners translate browser events
//! into [`PageEvent`]s; one `IntersectionObserver` feeds visibility ratios;
//! a single pending timeout, re-armed after every step, drives the timer
//! queue from `performance.now()`.
//!
//! Only compiled with the `hydrate` feature.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventTarget, FocusEvent, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MediaQueryListEvent,
};

use crate::app::App;
use crate::clipboard::Clipboard;
use crate::config::{CONFIG_ELEMENT_ID, PageConfig};
use crate::dom::{Dom, NodeId, Selector};
use crate::env::{Env, MediaPrefs};
use crate::error::{ClipboardError, DomError, StorageError};
use crate::event::{Broadcast, Key, Modifiers, PageEvent};
use crate::handles::HandleTable;
use crate::storage::{Storage, Store};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

fn js_error(err: &JsValue) -> DomError {
    DomError::Js(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    web_sys::window().and_then(|w| w.performance()).map_or(0, |p| p.now().max(0.0) as u64)
}

fn media_matches(query: &str) -> bool {
    web_sys::window().and_then(|w| w.match_media(query).ok().flatten()).is_some_and(|mq| mq.matches())
}

// =============================================================================
// DOM
// =============================================================================

/// Elements the host has handed out ids for.
#[derive(Debug)]
struct Registry {
    table: HandleTable<Element>,
    /// Element -> raw id, so lookups never scan the table.
    ids: js_sys::WeakMap,
}

impl Registry {
    fn new() -> Self {
        Self { table: HandleTable::new(), ids: js_sys::WeakMap::new() }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn id_of(&mut self, element: Element) -> NodeId {
        let known = self.ids.get(&element).as_f64().map(|raw| NodeId(raw as u32));
        if let Some(id) = known.filter(|id| self.table.contains(*id)) {
            return id;
        }
        let id = self.table.insert(element.clone());
        self.ids.set(&element, &JsValue::from(id.0));
        id
    }

    fn get(&self, id: NodeId) -> Option<Element> {
        self.table.get(id).cloned()
    }

    /// Forget `id` and every registered element inside it.
    fn forget_tree(&mut self, id: NodeId) {
        let Some(root) = self.table.remove(id) else {
            return;
        };
        self.ids.delete(&root);
        for element in self.table.retain(|_, e| !root.contains(Some(&**e))) {
            self.ids.delete(&element);
        }
    }

    /// Forget elements no longer in the document.
    fn sweep(&mut self) {
        for element in self.table.sweep(|_, e| e.is_connected()) {
            self.ids.delete(&element);
        }
    }
}

/// [`Dom`] over the live document.
#[derive(Debug)]
pub struct WebDom {
    document: Document,
    html: NodeId,
    body: NodeId,
    registry: Rc<RefCell<Registry>>,
}

impl WebDom {
    /// # Errors
    ///
    /// Returns `Err` when the document has no `<html>` or `<body>`.
    pub fn new(document: Document) -> Result<Self, DomError> {
        let html = document.document_element().ok_or_else(|| DomError::Js("document has no root element".into()))?;
        let body = document.body().ok_or_else(|| DomError::Js("document has no body".into()))?;
        let registry = Rc::new(RefCell::new(Registry::new()));
        let (html, body) = {
            let mut reg = registry.borrow_mut();
            (reg.id_of(html), reg.id_of(body.into()))
        };
        Ok(Self { document, html, body, registry })
    }

    fn element(&self, id: NodeId) -> Result<Element, DomError> {
        self.registry.borrow().get(id).ok_or(DomError::UnknownNode(id))
    }

    fn html_element(&self, id: NodeId) -> Result<HtmlElement, DomError> {
        self.element(id)?.dyn_into::<HtmlElement>().map_err(|_| DomError::Js(format!("{id:?} is not an HTML element")))
    }

    fn register(&self, element: Element) -> NodeId {
        self.registry.borrow_mut().id_of(element)
    }
}

impl Dom for WebDom {
    fn document_element(&self) -> NodeId {
        self.html
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.document.get_element_by_id(id).map(|e| self.register(e))
    }

    fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Ok(scope) = self.element(scope) else {
            return Vec::new();
        };
        let Ok(list) = scope.query_selector_all(&selector.to_css()) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|e| self.register(e))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let element = self.element(node).ok()?;
        element.closest(&selector.to_css()).ok().flatten().map(|e| self.register(e))
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node).is_ok_and(|e| e.matches(&selector.to_css()).unwrap_or(false))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.element(ancestor), self.element(node)) {
            (Ok(a), Ok(n)) => a.contains(Some(&*n)),
            _ => false,
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.element(node).is_ok_and(|e| e.is_connected())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.element(node).ok()?.parent_element()?;
        Some(self.register(parent))
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        let element = self.document.create_element(tag).map_err(|e| js_error(&e))?;
        Ok(self.register(element))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let child = self.element(child)?;
        self.element(parent)?.append_child(&child).map(drop).map_err(|e| js_error(&e))
    }

    fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element(node)?.remove();
        self.registry.borrow_mut().forget_tree(node);
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element(node)?.set_attribute(name, value).map_err(|e| js_error(&e))
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.element(node)?.remove_attribute(name).map_err(|e| js_error(&e))
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_ok_and(|e| e.class_list().contains(class))
    }

    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        self.element(node)?.class_list().toggle_with_force(class, on).map(drop).map_err(|e| js_error(&e))
    }

    fn text(&self, node: NodeId) -> String {
        self.element(node).ok().and_then(|e| e.text_content()).unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.element(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        let value = self.html_element(node).ok()?.style().get_property_value(property).ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.html_element(node)?.style().set_property(property, value).map_err(|e| js_error(&e))
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let element = self.element(node).ok()?;
        let style = web_sys::window()?.get_computed_style(&element).ok().flatten()?;
        let value = style.get_property_value(property).ok()?.trim().to_owned();
        (!value.is_empty()).then_some(value)
    }

    fn reflow(&self, node: NodeId) {
        if let Ok(element) = self.html_element(node) {
            element.offset_width();
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.element(node)
            .ok()
            .and_then(|e| js_sys::Reflect::get(&e, &JsValue::from_str("value")).ok())
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        let element = self.element(node)?;
        js_sys::Reflect::set(&element, &JsValue::from_str("value"), &JsValue::from_str(value))
            .map(drop)
            .map_err(|e| js_error(&e))
    }

    fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        if !self.is_attached(node) {
            return Err(DomError::Detached(node));
        }
        self.html_element(node)?.focus().map_err(|e| js_error(&e))
    }

    fn focused(&self) -> Option<NodeId> {
        self.document.active_element().map(|e| self.register(e))
    }
}

// =============================================================================
// STORAGE / CLIPBOARD
// =============================================================================

/// `window.localStorage`.
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn backend() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Access(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::backend()?.get_item(key).map_err(|e| StorageError::Access(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::backend()?.set_item(key, value).map_err(|e| StorageError::Access(format!("{e:?}")))
    }
}

/// `navigator.clipboard`. The write completes asynchronously; a rejection
/// after it started is only logged.
#[derive(Debug, Default)]
pub struct NavigatorClipboard;

impl Clipboard for NavigatorClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let window = web_sys::window().ok_or(ClipboardError::Unavailable)?;
        let navigator = window.navigator();
        let present = js_sys::Reflect::has(&navigator, &JsValue::from_str("clipboard")).unwrap_or(false);
        if !present || !window.is_secure_context() {
            return Err(ClipboardError::Unavailable);
        }
        let promise = navigator.clipboard().write_text(text);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::warn!("clipboard write rejected: {err:?}");
            }
        });
        Ok(())
    }
}

// =============================================================================
// HOST
// =============================================================================

type Translate = fn(&Host, &Event) -> Option<PageEvent>;

struct Host {
    app: RefCell<App>,
    registry: Rc<RefCell<Registry>>,
    document: Document,
    /// Bumped on every re-arm; a wake-up from an older generation is stale.
    generation: Cell<u64>,
    listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
    observer: RefCell<Option<(IntersectionObserver, Closure<dyn FnMut(js_sys::Array, JsValue)>)>>,
}

thread_local! {
    static HOST: RefCell<Option<Rc<Host>>> = const { RefCell::new(None) };
}

impl Host {
    fn node(&self, target: Option<EventTarget>) -> Option<NodeId> {
        let element = target?.dyn_into::<Element>().ok()?;
        Some(self.registry.borrow_mut().id_of(element))
    }

    /// Advance the clock, dispatch, and re-arm the wake-up.
    fn dispatch(self: &Rc<Self>, event: PageEvent) -> bool {
        let prevent = {
            let Ok(mut app) = self.app.try_borrow_mut() else {
                log::debug!("host: nested {event:?} dropped");
                return false;
            };
            app.advance_to(now_ms());
            app.dispatch(event)
        };
        self.rearm();
        prevent
    }

    fn tick(self: &Rc<Self>) {
        if let Ok(mut app) = self.app.try_borrow_mut() {
            app.advance_to(now_ms());
        }
        self.rearm();
    }

    fn rearm(self: &Rc<Self>) {
        self.registry.borrow_mut().sweep();
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        let Some(deadline) = self.app.borrow().next_deadline() else {
            return;
        };
        let delay = u32::try_from(deadline.saturating_sub(now_ms())).unwrap_or(u32::MAX);
        let host = Rc::clone(self);
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(delay).await;
            if host.generation.get() == generation {
                host.tick();
            }
        });
    }

    fn listen(self: &Rc<Self>, target: &EventTarget, name: &str, capture: bool, translate: Translate) {
        let host = Rc::clone(self);
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(page_event) = translate(&host, &event)
                && host.dispatch(page_event)
            {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);
        match target.add_event_listener_with_callback_and_bool(name, callback.as_ref().unchecked_ref(), capture) {
            Ok(()) => self.listeners.borrow_mut().push(callback),
            Err(err) => log::warn!("host: could not listen for {name}: {err:?}"),
        }
    }

    fn listen_media(self: &Rc<Self>, query: &str, translate: Translate) {
        let list = web_sys::window().and_then(|w| w.match_media(query).ok().flatten());
        match list {
            Some(list) => self.listen(&list, "change", false, translate),
            None => log::debug!("host: media query {query} unsupported"),
        }
    }

    fn observe_visibility(self: &Rc<Self>) {
        let (nodes, thresholds) = {
            let app = self.app.borrow();
            (app.env().visibility.observed_nodes(), app.env().visibility.thresholds())
        };
        if nodes.is_empty() {
            return;
        }
        let host = Rc::clone(self);
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: JsValue| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = host.registry.borrow_mut().id_of(entry.target());
                let ratio = if entry.is_intersecting() { entry.intersection_ratio() } else { 0.0 };
                host.dispatch(PageEvent::Intersection { target, ratio });
            }
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let init = IntersectionObserverInit::new();
        let list: js_sys::Array = thresholds.iter().map(|t| JsValue::from_f64(*t)).collect();
        init.set_threshold(&list);
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                let registry = self.registry.borrow();
                for element in nodes.into_iter().filter_map(|n| registry.get(n)) {
                    observer.observe(&element);
                }
                drop(registry);
                *self.observer.borrow_mut() = Some((observer, callback));
            }
            Err(err) => log::warn!("host: IntersectionObserver unavailable: {err:?}"),
        }
    }
}

// -----------------------------------------------------------------------------
// Event translation
// -----------------------------------------------------------------------------

fn on_click(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::Click { target: host.node(event.target())? })
}

fn on_keydown(host: &Host, event: &Event) -> Option<PageEvent> {
    let key = event.dyn_ref::<KeyboardEvent>()?;
    Some(PageEvent::KeyDown {
        target: host.node(event.target())?,
        key: Key::from_dom_key(&key.key()),
        modifiers: Modifiers { shift: key.shift_key(), ctrl: key.ctrl_key(), alt: key.alt_key(), meta: key.meta_key() },
    })
}

fn on_focusin(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::FocusIn { target: host.node(event.target())? })
}

fn on_focusout(host: &Host, event: &Event) -> Option<PageEvent> {
    let related = event.dyn_ref::<FocusEvent>().and_then(FocusEvent::related_target);
    Some(PageEvent::FocusOut { target: host.node(event.target())?, related: host.node(related) })
}

fn on_pointerenter(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::PointerEnter { target: host.node(event.target())? })
}

fn on_pointerleave(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::PointerLeave { target: host.node(event.target())? })
}

fn on_submit(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::Submit { form: host.node(event.target())? })
}

fn on_change(host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::Change { target: host.node(event.target())? })
}

fn on_resize(_host: &Host, _event: &Event) -> Option<PageEvent> {
    let width = web_sys::window()?.inner_width().ok()?.as_f64()?;
    Some(PageEvent::Resize { width })
}

fn on_scroll(_host: &Host, _event: &Event) -> Option<PageEvent> {
    Some(PageEvent::Scroll { y: web_sys::window()?.scroll_y().ok()? })
}

fn on_visibility(host: &Host, _event: &Event) -> Option<PageEvent> {
    Some(PageEvent::VisibilityChange { hidden: host.document.hidden() })
}

fn on_unload(_host: &Host, _event: &Event) -> Option<PageEvent> {
    Some(PageEvent::BeforeUnload)
}

fn on_color_scheme(_host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::ColorSchemeChange { dark: event.dyn_ref::<MediaQueryListEvent>()?.matches() })
}

fn on_motion(_host: &Host, event: &Event) -> Option<PageEvent> {
    Some(PageEvent::MotionPreferenceChange { reduced: event.dyn_ref::<MediaQueryListEvent>()?.matches() })
}

fn dispatch_broadcast(document: &Document, broadcast: &Broadcast) {
    let Broadcast::ThemeChanged { theme } = *broadcast;
    let detail = js_sys::Object::new();
    if let Err(err) = js_sys::Reflect::set(&detail, &JsValue::from_str("theme"), &JsValue::from_str(theme.as_str())) {
        log::warn!("host: could not build {} detail: {err:?}", broadcast.event_name());
        return;
    }
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(broadcast.event_name(), &init) {
        Ok(event) => {
            if let Err(err) = document.dispatch_event(&event) {
                log::warn!("host: {} dispatch failed: {err:?}", broadcast.event_name());
            }
        }
        Err(err) => log::warn!("host: could not create {}: {err:?}", broadcast.event_name()),
    }
}

// =============================================================================
// BOOT
// =============================================================================

/// Module entry point.
#[wasm_bindgen(start)]
pub fn boot() {
    console_error_panic_hook::set_once();
    if let Err(err) = start() {
        log::error!("pagewire failed to start: {err}");
    }
}

fn start() -> Result<(), DomError> {
    let window = web_sys::window().ok_or_else(|| DomError::Js("no window".into()))?;
    let document = window.document().ok_or_else(|| DomError::Js("no document".into()))?;

    let raw = document.get_element_by_id(CONFIG_ELEMENT_ID).and_then(|e| e.text_content()).unwrap_or_default();
    let config = PageConfig::from_json(&raw);
    if let Err(err) = console_log::init_with_level(config.log_level()) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("logger already set: {err}")));
    }

    let dom = WebDom::new(document.clone())?;
    let registry = Rc::clone(&dom.registry);
    let prefs = MediaPrefs { prefers_dark: media_matches(DARK_QUERY), reduced_motion: media_matches(REDUCED_MOTION_QUERY) };
    let mut env = Env::new(
        Box::new(dom),
        Store::new(Box::new(LocalStorage)),
        Box::new(NavigatorClipboard),
        config,
        prefs,
    );
    env.timers.advance_clock(now_ms());

    let mut app = App::new(env);
    let broadcast_target = document.clone();
    app.subscribe(move |b| dispatch_broadcast(&broadcast_target, b));

    let host = Rc::new(Host {
        app: RefCell::new(app),
        registry,
        document: document.clone(),
        generation: Cell::new(0),
        listeners: RefCell::new(Vec::new()),
        observer: RefCell::new(None),
    });

    let doc: &EventTarget = document.as_ref();
    let win: &EventTarget = window.as_ref();
    host.listen(doc, "click", false, on_click);
    host.listen(doc, "keydown", false, on_keydown);
    host.listen(doc, "focusin", false, on_focusin);
    host.listen(doc, "focusout", false, on_focusout);
    host.listen(doc, "pointerenter", true, on_pointerenter);
    host.listen(doc, "pointerleave", true, on_pointerleave);
    host.listen(doc, "submit", false, on_submit);
    host.listen(doc, "change", false, on_change);
    host.listen(doc, "visibilitychange", false, on_visibility);
    host.listen(win, "resize", false, on_resize);
    host.listen(win, "scroll", false, on_scroll);
    host.listen(win, "beforeunload", false, on_unload);
    host.listen_media(DARK_QUERY, on_color_scheme);
    host.listen_media(REDUCED_MOTION_QUERY, on_motion);
    host.observe_visibility();
    host.rearm();

    HOST.with(|slot| *slot.borrow_mut() = Some(host));
    log::info!("pagewire started");
    Ok(())
}

//! DOM contract: the anchors each controller looks for.
//!
//! A controller whose root anchor is absent at construction is inert. Optional
//! sub-elements (text nodes, counters, close buttons) only switch off the
//! sub-feature that needs them.

use crate::dom::Selector;

// ── Theme ───────────────────────────────────────────────────────

/// Buttons that flip between light and dark.
pub const THEME_TOGGLE: Selector = Selector::Any(&[Selector::Attr("data-theme-toggle"), Selector::Class("theme-toggle")]);
/// Buttons that pick a specific theme from the theme menu.
pub const THEME_OPTION: Selector = Selector::And(&[Selector::Class("theme-option"), Selector::Attr("data-theme")]);
pub const THEME_MENU: Selector = Selector::Any(&[Selector::Id("themeMenu"), Selector::Class("theme-menu")]);
pub const THEME_MENU_TOGGLE: Selector = Selector::Class("theme-menu-toggle");
/// Wrapper around the theme menu and its toggle; clicks outside it close the menu.
pub const THEME_CONTROLS: Selector = Selector::Class("theme-controls");
pub const THEME_OVERLAY_CLASS: &str = "theme-transition-overlay";

// ── Navigation ──────────────────────────────────────────────────

/// Root anchor of the navigation controller.
pub const NAV_MENU: Selector = Selector::Class("nav-menu");
pub const NAV_TOGGLE: Selector = Selector::Class("nav-toggle");
pub const NAV_LINK: Selector = Selector::Class("nav-link");
/// Header bar hidden while scrolling down.
pub const NAV_HEADER: Selector = Selector::Any(&[Selector::Class("main-nav"), Selector::Class("site-header")]);
pub const NAV_OPEN_BODY_CLASS: &str = "nav-open";
pub const NAV_OPEN_CLASS: &str = "is-open";
pub const HEADER_HIDDEN_CLASS: &str = "header-hidden";

// ── Carousel ────────────────────────────────────────────────────

pub const CAROUSEL: Selector = Selector::Class("carousel");
pub const CAROUSEL_SLIDE: Selector = Selector::Class("carousel-slide");
pub const CAROUSEL_DOT: Selector = Selector::Class("carousel-dot");
pub const CAROUSEL_PREV: Selector = Selector::Class("carousel-prev");
pub const CAROUSEL_NEXT: Selector = Selector::Class("carousel-next");

// ── Tabs ────────────────────────────────────────────────────────

pub const TAB_LIST: Selector = Selector::AttrValue("role", "tablist");
pub const TAB: Selector = Selector::AttrValue("role", "tab");

// ── Filters ─────────────────────────────────────────────────────

pub const FILTER_GROUP: Selector = Selector::Class("filter-group");
pub const FILTER_BUTTON: Selector = Selector::Attr("data-filter");
pub const FILTER_ITEM: Selector = Selector::Attr("data-category");
pub const FILTER_COUNT: Selector = Selector::Class("filter-count");
/// Filter id that matches every item.
pub const FILTER_ALL: &str = "all";

// ── Accordion ───────────────────────────────────────────────────

pub const ACCORDION: Selector = Selector::Class("accordion");
pub const ACCORDION_ITEM: Selector = Selector::Class("accordion-item");
pub const ACCORDION_TRIGGER: Selector = Selector::Class("accordion-trigger");
pub const ACCORDION_PANEL: Selector = Selector::Class("accordion-panel");
pub const ACCORDION_OPEN_CLASS: &str = "is-open";

// ── Progress / loading ──────────────────────────────────────────

pub const PROGRESS: Selector = Selector::And(&[Selector::Class("progress"), Selector::Attr("data-value")]);
pub const PROGRESS_FILL: Selector = Selector::Class("progress-bar");
pub const PROGRESS_TEXT: Selector = Selector::Class("progress-text");
pub const COUNTER: Selector = Selector::And(&[Selector::Class("counter"), Selector::Attr("data-target")]);
pub const LOADING_OVERLAY: Selector = Selector::Class("loading-overlay");
pub const LOADING_CLASS: &str = "is-loading";

// ── Pricing ─────────────────────────────────────────────────────

pub const PRICING_TOGGLE: Selector = Selector::Class("pricing-toggle");
pub const PRICE: Selector = Selector::And(&[Selector::Class("price"), Selector::Attr("data-monthly"), Selector::Attr("data-annual")]);
pub const PRICING_PERIOD: Selector = Selector::And(&[Selector::Class("pricing-period"), Selector::Attr("data-period")]);

// ── Modal ───────────────────────────────────────────────────────

pub const MODAL_ID: &str = "modal";
pub const MODAL_TITLE: Selector = Selector::Any(&[Selector::Id("modalTitle"), Selector::Class("modal-title")]);
pub const MODAL_BODY: Selector = Selector::Any(&[Selector::Id("modalBody"), Selector::Class("modal-body")]);
pub const MODAL_CLOSE: Selector = Selector::Any(&[Selector::Id("modalClose"), Selector::Class("modal-close")]);
pub const MODAL_TRIGGER: Selector = Selector::Attr("data-modal-open");
pub const MODAL_OPEN_BODY_CLASS: &str = "modal-open";
/// Elements that can take keyboard focus inside a dialog.
pub const FOCUSABLE: Selector = Selector::Any(&[
    Selector::Tag("button"),
    Selector::Attr("href"),
    Selector::Tag("input"),
    Selector::Tag("select"),
    Selector::Tag("textarea"),
    Selector::Attr("tabindex"),
]);

// ── Copy ────────────────────────────────────────────────────────

pub const COPY_VALUE: Selector = Selector::Attr("data-copy");
pub const COPY_ICON: Selector = Selector::And(&[Selector::Class("icon-item"), Selector::Attr("data-icon")]);
/// Design-token swatches; the copy is `--token: <resolved value>;`.
pub const COLOR_CARD: Selector = Selector::And(&[Selector::Class("color-card"), Selector::Attr("data-color")]);
pub const COPY_TARGET: Selector = Selector::Any(&[COPY_VALUE, COPY_ICON, COLOR_CARD]);
pub const COPIED_CLASS: &str = "copied";

// ── Forms ───────────────────────────────────────────────────────

pub const VALIDATED_FORM: Selector = Selector::And(&[Selector::Tag("form"), Selector::Attr("data-validate")]);
pub const FORM_FIELD: Selector = Selector::Any(&[Selector::Tag("input"), Selector::Tag("textarea"), Selector::Tag("select")]);
pub const SUBMIT_BUTTON: Selector = Selector::And(&[Selector::Tag("button"), Selector::AttrValue("type", "submit")]);
pub const FORM_ERROR_CLASS: &str = "form-error";
pub const FIELD_ERROR_CLASS: &str = "error";

// ── Reveal ──────────────────────────────────────────────────────

pub const ANIMATE: Selector = Selector::Attr("data-animate");
pub const ANIMATE_IN_CLASS: &str = "animate-in";
pub const LAZY: Selector = Selector::Attr("data-lazy");
pub const LOADED_CLASS: &str = "loaded";

// ── Animation showcase ──────────────────────────────────────────

/// A demo card; `data-animation` names the `animate-*` class it plays.
pub const ANIMATION_CARD: Selector = Selector::And(&[Selector::Class("animation-card"), Selector::Attr("data-animation")]);
pub const ANIMATION_BOX: Selector = Selector::Class("animation-box");
pub const ANIMATION_PLAY: Selector = Selector::Any(&[Selector::Id("playAnimations"), Selector::Attr("data-play-animations")]);
pub const ANIMATION_SPEED: Selector = Selector::Any(&[Selector::Id("animationSpeed"), Selector::Attr("data-animation-speed")]);
/// Custom properties on the document element rewritten by the speed control.
pub const DURATION_PROPERTIES: [&str; 2] = ["--duration-normal", "--duration-slow"];

// ── Shared ──────────────────────────────────────────────────────

pub const ACTIVE_CLASS: &str = "active";

//! Widget lifecycle and coordination layer for interactive pages.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive behaviour of a page: theme switching, navigation, carousel,
//! tabs, filters, accordions, toasts, progress and loading indicators. Each
//! widget is a [`controller::Controller`] that locates its DOM anchors at
//! construction, reacts to [`event::PageEvent`]s, arms timers in the shared
//! [`timer::TimerQueue`], and reports through the single
//! [`announce::Announcer`] and [`toast::NotificationCenter`].
//!
//! All logic runs against the [`dom::Dom`] trait and a virtual clock so it can
//! be tested without a browser. The `hydrate` feature adds the [`web`] host
//! that binds the core to `web-sys`.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Orchestrator: construction order, event fan-out, timer routing |
//! | [`controllers`] | One module per widget controller |
//! | [`controller`] | The `Controller` capability trait and roving-focus helper |
//! | [`env`] | Collaborator bundle passed to every controller operation |
//! | [`state`] | `SharedState` record and its injected handle |
//! | [`dom`] | `Dom` trait, node ids, selectors |
//! | [`handles`] | Id table behind the browser host's element registry |
//! | [`memory_dom`] | In-memory `Dom` used by tests and headless embeddings |
//! | [`timer`] | Virtual-clock timer queue and per-purpose timer slots |
//! | [`visibility`] | Viewport-intersection registrations and signals |
//! | [`announce`] | Screen-reader announcements |
//! | [`toast`] | Visible toast notifications |
//! | [`storage`] | Key/value storage collaborator |
//! | [`clipboard`] | Clipboard collaborator |
//! | [`event`] | Host events, keys, broadcasts, effects |
//! | [`config`] | Timing constants and storage keys |
//! | [`selectors`] | DOM contract for every controller |
//! | [`error`] | Error types |

pub mod announce;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod dom;
pub mod env;
pub mod error;
pub mod event;
pub mod handles;
pub mod memory_dom;
pub mod selectors;
pub mod state;
pub mod storage;
pub mod timer;
pub mod toast;
pub mod visibility;

#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
#[path = "fixtures_test.rs"]
pub(crate) mod fixtures;

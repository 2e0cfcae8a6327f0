//! Busy indicators for buttons and page sections.
//!
//! Buttons keep the label they had when loading started and get it back on
//! hide; showing again while already loading only swaps the loading label.
//! A section gets a single `.loading-overlay` child while busy.

#[cfg(test)]
#[path = "loading_test.rs"]
mod loading_test;

use std::collections::HashMap;

use crate::controller::Controller;
use crate::dom::NodeId;
use crate::env::Env;
use crate::error::WidgetError;
use crate::event::PageEvent;
use crate::selectors::{LOADING_CLASS, LOADING_OVERLAY};

const NAME: &str = "loading";
const DEFAULT_LABEL: &str = "Loading...";

#[derive(Debug, Default)]
pub struct LoadingController {
    /// Label captured when each button started loading.
    captured: HashMap<NodeId, String>,
}

impl LoadingController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_button_loading(&self, button: NodeId) -> bool {
        self.captured.contains_key(&button)
    }

    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn show_button_loading(&mut self, env: &mut Env, button: NodeId, label: Option<&str>) -> Result<(), WidgetError> {
        let dom = env.dom.as_mut();
        if !self.captured.contains_key(&button) {
            let original = dom.text(button);
            dom.toggle_class(button, LOADING_CLASS, true)?;
            dom.set_flag(button, "aria-busy", true)?;
            dom.set_attribute(button, "disabled", "")?;
            self.captured.insert(button, original);
        }
        dom.set_text(button, label.unwrap_or(DEFAULT_LABEL))?;
        Ok(())
    }

    /// Restore the captured label. Buttons that are not loading are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn hide_button_loading(&mut self, env: &mut Env, button: NodeId) -> Result<(), WidgetError> {
        let Some(original) = self.captured.remove(&button) else {
            return Ok(());
        };
        let dom = env.dom.as_mut();
        if !dom.is_attached(button) {
            log::debug!("{NAME}: button {button:?} detached while loading");
            return Ok(());
        }
        dom.set_text(button, &original)?;
        dom.toggle_class(button, LOADING_CLASS, false)?;
        dom.remove_attribute(button, "aria-busy")?;
        dom.remove_attribute(button, "disabled")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn show_section_loading(&mut self, env: &mut Env, section: NodeId) -> Result<(), WidgetError> {
        let dom = env.dom.as_mut();
        if dom.query(section, &LOADING_OVERLAY).is_none() {
            let overlay = dom.create_element("div")?;
            dom.set_attribute(overlay, "class", "loading-overlay")?;
            let spinner = dom.create_element("div")?;
            dom.set_attribute(spinner, "class", "spinner")?;
            dom.append_child(overlay, spinner)?;
            dom.append_child(section, overlay)?;
        }
        dom.set_flag(section, "aria-busy", true)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Err` if a DOM write failed.
    pub fn hide_section_loading(&mut self, env: &mut Env, section: NodeId) -> Result<(), WidgetError> {
        let dom = env.dom.as_mut();
        for overlay in dom.query_all(section, &LOADING_OVERLAY) {
            dom.remove(overlay)?;
        }
        dom.remove_attribute(section, "aria-busy")?;
        Ok(())
    }
}

impl Controller for LoadingController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_inert(&self) -> bool {
        false
    }

    fn handle_event(&mut self, _env: &mut Env, _event: &PageEvent) -> Result<bool, WidgetError> {
        Ok(false)
    }

    fn teardown(&mut self, _env: &mut Env) {
        self.captured.clear();
    }
}

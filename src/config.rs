//! Page configuration: timing constants, thresholds, and storage keys.
//!
//! Every field has a default, so an empty or partial JSON object is a valid
//! configuration. The browser host reads it from
//! `<script type="application/json" id="pagewire-config">`.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

/// Element id of the inline JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "pagewire-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    // ── Carousel ────────────────────────────────────────────────
    /// Delay between automatic slide advances.
    pub autoplay_ms: u64,
    /// Delay before autoplay resumes after manual navigation.
    pub autoplay_grace_ms: u64,
    /// Fraction of the carousel that must be in view for autoplay.
    pub carousel_visible_ratio: f64,

    // ── Feedback ────────────────────────────────────────────────
    /// Lifetime of an announcement's live-region node.
    pub announcement_ms: u64,
    /// Default toast lifetime; 0 disables auto-dismiss.
    pub toast_ms: u64,
    /// Toast exit transition length.
    pub toast_exit_ms: u64,
    /// How long the "copied" class stays on a copy affordance.
    pub copy_feedback_ms: u64,

    // ── Transitions ─────────────────────────────────────────────
    /// Theme overlay transition length (fade-out starts halfway).
    pub theme_overlay_ms: u64,
    /// Progress bar interpolation length.
    pub progress_ms: u64,
    /// Counter count-up length.
    pub counter_ms: u64,
    /// Animation frame spacing.
    pub frame_ms: u64,
    /// Simulated form submission latency.
    pub submit_ms: u64,
    /// Delay between cards when the animation showcase plays them all.
    pub animation_stagger_ms: u64,

    // ── Page listeners ──────────────────────────────────────────
    pub resize_debounce_ms: u64,
    pub scroll_throttle_ms: u64,
    /// Viewport width at which an open mobile navigation closes itself.
    pub nav_breakpoint_px: f64,
    /// Scroll offset below which the header is never hidden.
    pub header_hide_offset_px: f64,
    /// Fraction of a section that must be in view to mark its nav link.
    pub scroll_spy_ratio: f64,
    /// Fraction of an element that must be in view to reveal it.
    pub reveal_ratio: f64,

    // ── Storage ─────────────────────────────────────────────────
    pub theme_storage_key: String,
    pub snapshot_storage_key: String,

    /// `error`, `warn`, `info`, `debug`, or `trace`.
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            autoplay_ms: 5_000,
            autoplay_grace_ms: 2_000,
            carousel_visible_ratio: 0.5,
            announcement_ms: 1_000,
            toast_ms: 3_000,
            toast_exit_ms: 300,
            copy_feedback_ms: 1_000,
            theme_overlay_ms: 300,
            progress_ms: 500,
            counter_ms: 2_000,
            frame_ms: 16,
            submit_ms: 1_000,
            animation_stagger_ms: 100,
            resize_debounce_ms: 250,
            scroll_throttle_ms: 100,
            nav_breakpoint_px: 768.0,
            header_hide_offset_px: 80.0,
            scroll_spy_ratio: 0.3,
            reveal_ratio: 0.1,
            theme_storage_key: "theme".to_owned(),
            snapshot_storage_key: "pagewire_state".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl PageConfig {
    /// Parse a JSON configuration, falling back to defaults when malformed.
    #[must_use]
    pub fn from_json(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed page config: {err}");
                Self::default()
            }
        }
    }

    /// The configured log level, `Info` when unrecognised.
    #[must_use]
    pub fn log_level(&self) -> log::Level {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}

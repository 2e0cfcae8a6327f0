//! Widget controllers, one module per widget.
//!
//! | Module | Owns |
//! |--------|------|
//! | [`theme`] | `SharedState.theme`, theme menu, transition overlay |
//! | [`nav`] | `SharedState.nav_open`, header hide-on-scroll, scroll-spy |
//! | [`tabs`] | `SharedState.current_tab` |
//! | [`filter`] | `SharedState.active_filter` |
//! | [`carousel`] | `SharedState.current_index`, autoplay |
//! | [`accordion`] | open item per accordion group |
//! | [`progress`] | progress bars and counters |
//! | [`loading`] | button and section loading indicators |
//! | [`pricing`] | `SharedState.pricing_mode` |
//! | [`modal`] | the page dialog |
//! | [`copy`] | click-to-copy affordances |
//! | [`form`] | validated forms |
//! | [`reveal`] | reveal-on-scroll and lazy loading |
//! | [`animation`] | animation showcase playback and speed |

pub mod accordion;
pub mod animation;
pub mod carousel;
pub mod copy;
pub mod filter;
pub mod form;
pub mod loading;
pub mod modal;
pub mod nav;
pub mod pricing;
pub mod progress;
pub mod reveal;
pub mod tabs;
pub mod theme;

use crate::dom::{Dom, NodeId};
use crate::error::DomError;

/// Reflect `next`; if that fails partway, re-reflect `previous` (best effort)
/// and return the original failure.
///
/// # Errors
///
/// Returns the failure that interrupted the reflection of `next`.
pub(crate) fn reflect_or_restore<S: Copy>(
    dom: &mut dyn Dom,
    widget: &'static str,
    next: S,
    previous: S,
    reflect: impl Fn(&mut dyn Dom, S) -> Result<(), DomError>,
) -> Result<(), DomError> {
    match reflect(&mut *dom, next) {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Err(again) = reflect(&mut *dom, previous) {
                log::error!("{widget}: could not restore previous state: {again}");
            }
            Err(err)
        }
    }
}

//! Browser platform layer
//!
//! Handles the parts that need the DOM:
//! - Media preloading (`preload`)
//! - HTML media element playback (`media`)
//! - Small DOM/time helpers

pub mod media;
pub mod preload;

pub use media::MediaChannels;
pub use preload::preload;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Milliseconds on the same clock as `requestAnimationFrame`
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Toggle the `hidden` class on an element, if it exists
pub fn set_hidden(document: &Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }
}

/// Look up an element as an `HtmlElement`
pub fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into().ok()
}

/// Full page reload; the only way back to a fresh session
pub fn reload_page() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            log::error!("Reload failed: {:?}", e);
        }
    }
}

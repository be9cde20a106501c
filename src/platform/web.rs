//! Browser history backing for the URL parameter state.

use wasm_bindgen::JsValue;

use crate::params::UrlState;

/// `window.location` / `window.history` as a [`UrlState`]. Updates go through
/// `replaceState`/`pushState`, so the page never reloads.
pub struct BrowserHistory {
    window: web_sys::Window,
}

impl BrowserHistory {
    /// `None` outside a browsing context (workers).
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self { window })
    }

    fn history(&self) -> Option<web_sys::History> {
        match self.window.history() {
            Ok(history) => Some(history),
            Err(e) => {
                log::warn!("[ecashx][platform] no history object: {e:?}");
                None
            }
        }
    }
}

impl UrlState for BrowserHistory {
    fn current(&self) -> String {
        let location = self.window.location();
        let path = location.pathname().unwrap_or_else(|_| "/".into());
        let search = location.search().unwrap_or_default();
        let hash = location.hash().unwrap_or_default();
        format!("{path}{search}{hash}")
    }

    fn replace(&mut self, url: &str) {
        if let Some(history) = self.history() {
            if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
                log::warn!("[ecashx][platform] replaceState({url}) failed: {e:?}");
            }
        }
    }

    fn push(&mut self, url: &str) {
        if let Some(history) = self.history() {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(url)) {
                log::warn!("[ecashx][platform] pushState({url}) failed: {e:?}");
            }
        }
    }

    // The browser applies `back()` asynchronously; callers re-sync on popstate.
    fn back(&mut self) -> bool {
        self.history().is_some_and(|h| h.back().is_ok())
    }
}

//! Platform glue: clipboard on native builds, browser history on the web.

#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
mod web;
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub use web::BrowserHistory;

#[cfg(feature = "native")]
mod native;
#[cfg(feature = "native")]
pub use native::copy_to_clipboard;

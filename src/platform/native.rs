//! Native platform implementation (system clipboard through copypasta)

use copypasta::{ClipboardContext, ClipboardProvider};

/// Copy text to the system clipboard. Returns `false` when no clipboard is
/// reachable (headless sessions, missing display server).
pub fn copy_to_clipboard(content: &str) -> bool {
    let mut ctx = match ClipboardContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            log::warn!("[ecashx][platform] clipboard unavailable: {e}");
            return false;
        }
    };
    match ctx.set_contents(content.to_string()) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[ecashx][platform] clipboard write failed: {e}");
            false
        }
    }
}

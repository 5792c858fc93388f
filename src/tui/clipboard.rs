//! Clipboard abstraction layer.
//!
//! Copy and paste go through [`ClipboardProvider`] so tests can run without a
//! display server.

use tracing::warn;

pub trait ClipboardProvider {
    fn get_text(&mut self) -> Option<String>;

    /// Returns false when the text could not be stored.
    fn set_text(&mut self, text: String) -> bool;
}

/// System clipboard implementation using arboard.
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let mut cb = arboard::Clipboard::new()
            .map_err(|e| warn!(error = %e, "clipboard unavailable"))
            .ok()?;
        cb.get_text().ok()
    }

    fn set_text(&mut self, text: String) -> bool {
        let mut cb = match arboard::Clipboard::new() {
            Ok(cb) => cb,
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                return false;
            }
        };
        cb.set_text(text).is_ok()
    }
}

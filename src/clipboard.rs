// System clipboard access

use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("clipboard error: {0}")]
pub struct ClipboardError(pub String);

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        Self(err.to_string())
    }
}

/// Write-only port onto a clipboard.
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Arboard-backed clipboard, opened on first write.
///
/// The handle is kept for the life of the process: on X11 the copied text is
/// only served while its owner is alive.
#[derive(Default)]
pub struct ArboardClipboard {
    clipboard: Option<Clipboard>,
}

impl ArboardClipboard {
    pub const fn new() -> Self {
        Self { clipboard: None }
    }
}

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new()?,
        };
        self.clipboard.insert(clipboard).set_text(text)?;
        Ok(())
    }
}

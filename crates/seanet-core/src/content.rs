#![forbid(unsafe_code)]

//! Content lifecycle.
//!
//! ```text
//! Empty -> Loading -> Ready <-> Reloading
//!             |
//!             v
//!           Failed
//! ```
//!
//! A failed reload returns to `Ready` with the old text. `Ready` and
//! `Reloading` expose text; every other state renders the placeholder.

use crate::text::TextBuffer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentState {
    #[default]
    Empty,
    Loading,
    Ready(TextBuffer),
    /// A new request is in flight; the previous text stays up.
    Reloading(TextBuffer),
    /// Fetch or parse failed; no automatic retry.
    Failed(String),
}

impl ContentState {
    /// Request started. A loaded page becomes `Reloading`.
    pub fn begin_loading(&mut self) {
        *self = match std::mem::take(self) {
            Self::Ready(text) | Self::Reloading(text) => Self::Reloading(text),
            Self::Empty | Self::Loading | Self::Failed(_) => Self::Loading,
        };
    }

    pub fn loaded(&mut self, text: TextBuffer) {
        *self = Self::Ready(text);
    }

    /// A failed reload falls back to the text already on screen.
    pub fn failed(&mut self, reason: impl Into<String>) {
        *self = match std::mem::take(self) {
            Self::Reloading(text) => Self::Ready(text),
            _ => Self::Failed(reason.into()),
        };
    }

    /// Text to lay out, if any has loaded.
    #[must_use]
    pub fn text(&self) -> Option<&TextBuffer> {
        match self {
            Self::Ready(text) | Self::Reloading(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Loading | Self::Reloading(_))
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Reloading(_) => "reloading",
            Self::Failed(_) => "failed",
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::page::emitter::EncodedPage;

/// Subtitle event kind, mirroring the rect types a demuxer hands over.
/// Only [`EventKind::Ass`] events can be encoded to teletext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// ASS/SSA styled dialogue (the supported kind)
    Ass,
    /// Plain unstyled text
    Text,
    /// Bitmap subtitle (PGS, DVB bitmap); never encodable here
    Bitmap,
}

/// Vertical anchor for subtitle placement on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// One dialogue event as delivered by the dialogue splitter.
///
/// Timing is presentation time in milliseconds and is passed through to the
/// output unchanged; the encoder never rescales it.
#[derive(Debug, Clone)]
pub struct DialogueEvent {
    /// Start of display in milliseconds
    pub start_ms: i64,
    /// End of display in milliseconds
    pub end_ms: i64,
    /// Base style name from the dialogue line
    pub style: String,
    /// Raw styled text, override tags included
    pub text: String,
    /// Input kind tag
    pub kind: EventKind,
}

impl DialogueEvent {
    /// Create a new ASS dialogue event
    pub fn new(start_ms: i64, end_ms: i64, style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            style: style.into(),
            text: text.into(),
            kind: EventKind::Ass,
        }
    }

    /// Get the display duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Recoverable conditions raised while encoding one event.
///
/// These degrade legibility but never corrupt the bitstream; the encoder
/// substitutes or truncates and continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    /// The composed text needed more rows than the page has; trailing lines
    /// were dropped and the truncated page is still broadcast
    RowOverflow { dropped_lines: usize },
    /// A glyph outside the configured character set was replaced by the
    /// substitution glyph
    CharsetSubstitution { ch: char, row: u8 },
}

/// Result of encoding one dialogue event.
///
/// `page` is `None` for events that produce nothing (zero-length dialogue,
/// tag-only text); the caller then simply emits no packets.
#[derive(Debug)]
pub struct EncodeOutput {
    /// The encoded page transmission, if the event produced one
    pub page: Option<EncodedPage>,
    /// Recoverable diagnostics collected along the way
    pub warnings: Vec<EncodeWarning>,
}

impl EncodeOutput {
    /// An explicit "no output" result
    pub(crate) fn empty() -> Self {
        Self {
            page: None,
            warnings: Vec::new(),
        }
    }
}

//! Encoder entry point
//!
//! One [`TeletextEncoder`] per subtitle stream: construct it with a
//! validated configuration, feed it dialogue events one at a time, read
//! back complete page transmissions. Calls are synchronous and all
//! working memory is scoped to the call; the subpage rotation counter is
//! the only state carried between events. Instances are `Send` but hold
//! no internal locking, so callers serialize calls per instance.

use uuid::Uuid;

use crate::ass::runs::{parse_runs, StyleState};
use crate::ass::split::SplitContext;
use crate::config::EncoderConfig;
use crate::error::{Result, TxtError};
use crate::grid::composer;
use crate::page::emitter::{EncodedPage, PageEmitter};
use crate::types::{DialogueEvent, EncodeOutput, EncodeWarning, EventKind};

/// Stateful dialogue-to-teletext encoder for one subtitle stream
pub struct TeletextEncoder {
    config: EncoderConfig,
    emitter: PageEmitter,
    /// Correlation id for log lines from this instance
    encoder_id: String,
}

impl TeletextEncoder {
    /// Create an encoder; the configuration is validated once and fixed
    /// for the instance lifetime
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        let emitter = PageEmitter::new(config.initial_subpage);
        let encoder_id = Uuid::new_v4().to_string();
        tracing::debug!(
            encoder_id = %encoder_id,
            magazine = config.magazine,
            page = config.page,
            "teletext encoder created"
        );
        Ok(Self {
            config,
            emitter,
            encoder_id,
        })
    }

    /// Encode one dialogue event into a page transmission.
    ///
    /// Returns `page: None` for events with no visible text; such events
    /// do not advance the subpage counter. Malformed markup rejects the
    /// whole event so a corrupt style directive never reaches a broadcast
    /// page. Recoverable conditions (overflow truncation, glyph
    /// substitution) are reported as warnings alongside the page.
    pub fn encode(
        &mut self,
        event: &DialogueEvent,
        ctx: &SplitContext,
    ) -> Result<EncodeOutput> {
        if event.kind != EventKind::Ass {
            return Err(TxtError::UnsupportedInput(format!(
                "{:?} events cannot be encoded",
                event.kind
            )));
        }

        let base = self.base_state(event, ctx);
        let runs = parse_runs(&event.text, &base, ctx)?;

        if runs.iter().all(|r| r.text.trim().is_empty()) {
            tracing::debug!(
                encoder_id = %self.encoder_id,
                start_ms = event.start_ms,
                "event has no visible text, emitting nothing"
            );
            return Ok(EncodeOutput::empty());
        }

        let (grid, mut warnings) = composer::compose(&runs, &self.config);
        let (page, mut pack_warnings) =
            self.emitter
                .emit(&grid, event.start_ms, event.end_ms, &self.config)?;
        warnings.append(&mut pack_warnings);

        for warning in &warnings {
            match warning {
                EncodeWarning::RowOverflow { dropped_lines } => tracing::warn!(
                    encoder_id = %self.encoder_id,
                    dropped_lines,
                    "page overflow, trailing lines truncated"
                ),
                EncodeWarning::CharsetSubstitution { ch, row } => tracing::warn!(
                    encoder_id = %self.encoder_id,
                    %ch,
                    row,
                    "glyph not in character set, substituted"
                ),
            }
        }
        tracing::debug!(
            encoder_id = %self.encoder_id,
            start_ms = event.start_ms,
            end_ms = event.end_ms,
            packets = page.rows.len(),
            subcode = page.subcode,
            "encoded dialogue event"
        );

        Ok(EncodeOutput {
            page: Some(page),
            warnings,
        })
    }

    /// Emit a header-only page that clears the display, for intervals
    /// with no active dialogue
    pub fn encode_erase(&mut self, at_ms: i64) -> EncodedPage {
        tracing::debug!(encoder_id = %self.encoder_id, at_ms, "emitting erase page");
        self.emitter.emit_erase(at_ms, &self.config)
    }

    /// The configuration this encoder was built with
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// The subpage value the next displayed page will carry
    pub fn subpage(&self) -> u16 {
        self.emitter.subpage()
    }

    /// Base style for an event: its named style from the catalogue, or
    /// the configured defaults when the sheet does not know the name
    fn base_state(&self, event: &DialogueEvent, ctx: &SplitContext) -> StyleState {
        let mut base = match ctx.style_state(&event.style) {
            Some(state) => state,
            None => {
                tracing::warn!(
                    encoder_id = %self.encoder_id,
                    style = %event.style,
                    "event style not in catalogue, using configured defaults"
                );
                StyleState {
                    color: self.config.default_color,
                    align: self.config.default_position,
                    ..StyleState::default()
                }
            }
        };
        base.double_height = self.config.double_height;
        base
    }
}

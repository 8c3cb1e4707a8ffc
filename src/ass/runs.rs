//! Inline override tag parsing
//!
//! Splits one dialogue event's marked-up text into ordered style runs.
//! A run is a stretch of plain text under one style state; override blocks
//! (`{\b1}`, `{\c&H0000FF&}`) switch the state between runs and line-break
//! escapes become zero-width runs flagged as forced breaks.
//!
//! Unknown or unsupported tags are skipped so upstream authoring noise does
//! not kill the event; an unterminated `{` or a broken colour payload is a
//! hard parse error because a half-applied style directive must not reach
//! the page.

use crate::ass::split::SplitContext;
use crate::error::ParseError;
use crate::grid::cell::colors;
use crate::types::VAlign;

/// Style attributes in force over one run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleState {
    /// Teletext colour index 0..=7
    pub color: u8,
    /// Lay this text out double height
    pub double_height: bool,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Vertical anchor requested for the event
    pub align: VAlign,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            color: colors::WHITE,
            double_height: false,
            bold: false,
            italic: false,
            underline: false,
            align: VAlign::Bottom,
        }
    }
}

impl StyleState {
    /// Whether any typographic emphasis is active
    ///
    /// Teletext Level 1 has no bold/italic/underline rendition, so emphasis
    /// surfaces as a colour change when composed onto the grid.
    pub fn emphasised(&self) -> bool {
        self.bold || self.italic || self.underline
    }
}

/// One parsed fragment of an event's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRun {
    /// Plain text with all markup consumed; empty for break runs
    pub text: String,
    /// The style active over this fragment
    pub style: StyleState,
    /// Zero-width marker for an explicit line break
    pub forced_break: bool,
}

/// Map a BGR colour value (ASS `&HBBGGRR&` byte order) to the nearest of
/// the 8 teletext colours by thresholding each channel
pub(crate) fn teletext_color_index(bgr: u32) -> u8 {
    let r = u8::from((bgr & 0xFF) >= 0x80);
    let g = u8::from(((bgr >> 8) & 0xFF) >= 0x80);
    let b = u8::from(((bgr >> 16) & 0xFF) >= 0x80);
    r | (g << 1) | (b << 2)
}

/// Split marked-up dialogue text into style runs.
///
/// The returned runs cover the input completely and in order: markup is
/// consumed, escapes are resolved (`\N` break, `\n` space, `\h` hard
/// space), drawing-mode payloads are dropped. Tag-only input yields a
/// single empty run so the caller can detect a blank event.
pub fn parse_runs(
    text: &str,
    base: &StyleState,
    ctx: &SplitContext,
) -> Result<Vec<StyleRun>, ParseError> {
    let mut runs: Vec<StyleRun> = Vec::new();
    let mut buf = String::new();
    let mut state = *base;
    let mut drawing = false;

    let mut i = 0;
    while let Some(ch) = text[i..].chars().next() {
        match ch {
            '{' => {
                let Some(rel) = text[i + 1..].find('}') else {
                    return Err(ParseError::UnterminatedTag { pos: i });
                };
                let block = &text[i + 1..i + 1 + rel];
                let next = apply_block(block, state, base, ctx, &mut drawing)?;
                if next != state {
                    close_run(&mut runs, &mut buf, state);
                    state = next;
                }
                i += rel + 2;
            }
            '\\' => {
                let esc = text[i + 1..].chars().next();
                match esc {
                    Some('N') => {
                        if !drawing {
                            close_run(&mut runs, &mut buf, state);
                            runs.push(StyleRun {
                                text: String::new(),
                                style: state,
                                forced_break: true,
                            });
                        }
                        i += 2;
                    }
                    // Soft break: rendered as an ordinary space
                    Some('n') => {
                        if !drawing {
                            buf.push(' ');
                        }
                        i += 2;
                    }
                    // Hard space: non-breaking for the wrapper
                    Some('h') => {
                        if !drawing {
                            buf.push('\u{A0}');
                        }
                        i += 2;
                    }
                    Some(other) => {
                        if !drawing {
                            buf.push('\\');
                            buf.push(other);
                        }
                        i += 1 + other.len_utf8();
                    }
                    None => {
                        if !drawing {
                            buf.push('\\');
                        }
                        i += 1;
                    }
                }
            }
            _ => {
                if !drawing {
                    buf.push(ch);
                }
                i += ch.len_utf8();
            }
        }
    }
    close_run(&mut runs, &mut buf, state);

    // Tag-only or empty input still covers the text with one (blank) run
    if runs.is_empty() {
        runs.push(StyleRun {
            text: String::new(),
            style: state,
            forced_break: false,
        });
    }
    Ok(runs)
}

fn close_run(runs: &mut Vec<StyleRun>, buf: &mut String, state: StyleState) {
    if !buf.is_empty() {
        runs.push(StyleRun {
            text: std::mem::take(buf),
            style: state,
            forced_break: false,
        });
    }
}

/// Apply every tag in one `{...}` block to a copy of the current state
fn apply_block(
    block: &str,
    state: StyleState,
    base: &StyleState,
    ctx: &SplitContext,
    drawing: &mut bool,
) -> Result<StyleState, ParseError> {
    let mut next = state;

    // Tags are backslash-delimited; backslashes inside parentheses belong
    // to an argument list (`\t(\c&HFF&)`) and do not start a new tag
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (pos, ch) in block.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '\\' if depth == 0 => {
                if let Some(s) = start {
                    apply_tag(block[s..pos].trim(), &mut next, base, ctx, drawing)?;
                }
                start = Some(pos + 1);
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        apply_tag(block[s..].trim(), &mut next, base, ctx, drawing)?;
    }
    Ok(next)
}

/// How the trailing characters of a flag-style tag parsed
enum FlagArg {
    /// No argument: reset to the base style's value
    Empty,
    Num(i32),
    /// Not numeric: this is really a different tag sharing the prefix
    /// (`\blur`, `\bord`, `\iclip`), skip it
    Other,
}

fn flag_arg(arg: &str) -> FlagArg {
    if arg.is_empty() {
        FlagArg::Empty
    } else if let Ok(n) = arg.parse::<i32>() {
        FlagArg::Num(n)
    } else {
        FlagArg::Other
    }
}

fn apply_tag(
    tag: &str,
    state: &mut StyleState,
    base: &StyleState,
    ctx: &SplitContext,
    drawing: &mut bool,
) -> Result<(), ParseError> {
    if tag.is_empty() {
        return Ok(());
    }

    // \an1-9, numpad layout: 1-3 bottom, 4-6 middle, 7-9 top
    if let Some(arg) = tag.strip_prefix("an") {
        if let Ok(n) = arg.parse::<u8>() {
            match n {
                1..=3 => state.align = VAlign::Bottom,
                4..=6 => state.align = VAlign::Center,
                7..=9 => state.align = VAlign::Top,
                _ => {}
            }
        }
        return Ok(());
    }

    // Primary colour, \c&HBBGGRR& or \1c&HBBGGRR&; bare \c resets
    if let Some(arg) = tag.strip_prefix("1c").or_else(|| tag.strip_prefix('c')) {
        let arg = arg.trim();
        if arg.is_empty() {
            state.color = base.color;
        } else if let Some(hex) = arg.strip_prefix('&') {
            let hex = hex
                .strip_prefix('H')
                .or_else(|| hex.strip_prefix('h'))
                .unwrap_or(hex);
            let digits: &str = {
                let end = hex
                    .find(|c: char| !c.is_ascii_hexdigit())
                    .unwrap_or(hex.len());
                &hex[..end]
            };
            if digits.is_empty() || digits.len() > 8 {
                return Err(ParseError::MalformedTag {
                    tag: format!("\\{tag}"),
                });
            }
            // Cannot fail: at most 8 hex digits
            let bgr = u32::from_str_radix(digits, 16).unwrap_or(0);
            state.color = teletext_color_index(bgr);
        } else {
            // Shares the prefix with \clip; not a colour payload
            tracing::debug!(tag, "ignoring unsupported override tag");
        }
        return Ok(());
    }

    if let Some(arg) = tag.strip_prefix('b') {
        match flag_arg(arg) {
            FlagArg::Empty => state.bold = base.bold,
            FlagArg::Num(n) => state.bold = n != 0,
            FlagArg::Other => tracing::debug!(tag, "ignoring unsupported override tag"),
        }
        return Ok(());
    }
    if let Some(arg) = tag.strip_prefix('i') {
        match flag_arg(arg) {
            FlagArg::Empty => state.italic = base.italic,
            FlagArg::Num(n) => state.italic = n != 0,
            FlagArg::Other => tracing::debug!(tag, "ignoring unsupported override tag"),
        }
        return Ok(());
    }
    if let Some(arg) = tag.strip_prefix('u') {
        match flag_arg(arg) {
            FlagArg::Empty => state.underline = base.underline,
            FlagArg::Num(n) => state.underline = n != 0,
            FlagArg::Other => tracing::debug!(tag, "ignoring unsupported override tag"),
        }
        return Ok(());
    }

    // Drawing mode: suppress everything until \p0, vector payloads must
    // never reach the character grid
    if let Some(arg) = tag.strip_prefix('p') {
        match flag_arg(arg) {
            FlagArg::Num(n) => *drawing = n > 0,
            FlagArg::Empty | FlagArg::Other => {
                tracing::debug!(tag, "ignoring unsupported override tag")
            }
        }
        return Ok(());
    }

    // Legacy \a: 1-3 bottom, +4 top, +8 middle
    if let Some(arg) = tag.strip_prefix('a') {
        if let Ok(n) = arg.parse::<u8>() {
            match n {
                1..=3 => state.align = VAlign::Bottom,
                5..=7 => state.align = VAlign::Top,
                9..=11 => state.align = VAlign::Center,
                _ => {}
            }
        }
        return Ok(());
    }

    // Style reset: \r back to the event base, \r<name> to a named style
    if let Some(name) = tag.strip_prefix('r') {
        let name = name.trim();
        if name.is_empty() {
            *state = *base;
        } else {
            match ctx.style_state(name) {
                Some(mut st) => {
                    // Page geometry decides height, not the style sheet
                    st.double_height = base.double_height;
                    *state = st;
                }
                None => {
                    return Err(ParseError::UndefinedStyle {
                        name: name.to_string(),
                    })
                }
            }
        }
        return Ok(());
    }

    tracing::debug!(tag, "ignoring unsupported override tag");
    Ok(())
}

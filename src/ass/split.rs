//! ASS script header and dialogue line splitting
//!
//! The encoder receives dialogue in two shapes: scripted `Dialogue:` lines
//! with their own timestamps, and packet-form lines (the Matroska payload
//! layout) whose timing comes from the container. Both resolve style names
//! against the script header's style catalogue, which is parsed once into
//! a reusable [`SplitContext`].

use std::collections::HashMap;

use regex::Regex;

use crate::ass::runs::{teletext_color_index, StyleState};
use crate::error::{ParseError, Result};
use crate::grid::cell::colors;
use crate::types::{DialogueEvent, VAlign};

/// Standard V4+ style line field order, used when the section carries no
/// `Format:` line of its own
const V4PLUS_FORMAT: &[&str] = &[
    "name",
    "fontname",
    "fontsize",
    "primarycolour",
    "secondarycolour",
    "outlinecolour",
    "backcolour",
    "bold",
    "italic",
    "underline",
    "strikeout",
    "scalex",
    "scaley",
    "spacing",
    "angle",
    "borderstyle",
    "outline",
    "shadow",
    "alignment",
    "marginl",
    "marginr",
    "marginv",
    "encoding",
];

/// One style from the script catalogue, reduced to the attributes teletext
/// can express
#[derive(Debug, Clone)]
pub(crate) struct AssStyle {
    pub(crate) name: String,
    /// Primary colour mapped to a teletext index
    pub(crate) color: u8,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
    pub(crate) underline: bool,
    pub(crate) align: VAlign,
}

/// Reusable dialogue-splitting context built from one script header.
///
/// Holds the style catalogue; the encoder borrows it per call so style
/// lookups and `\r<style>` resets resolve against the right sheet. The
/// context itself never changes after construction.
#[derive(Debug, Clone)]
pub struct SplitContext {
    styles: HashMap<String, AssStyle>,
}

impl SplitContext {
    /// Parse a script header.
    ///
    /// The header must contain a `[V4+ Styles]` (or legacy `[V4 Styles]`)
    /// section; a sheet without one cannot resolve any style reference.
    pub fn new(header: &str) -> Result<Self> {
        let mut styles = HashMap::new();
        let mut in_styles = false;
        let mut found_section = false;
        let mut legacy = false;
        let mut format: Vec<String> =
            V4PLUS_FORMAT.iter().map(|f| f.to_string()).collect();

        for line in header.lines() {
            let line = line.trim_start_matches('\u{feff}').trim();
            if line.starts_with('[') {
                let section = line.to_ascii_lowercase();
                in_styles = section == "[v4+ styles]" || section == "[v4 styles]";
                legacy = section == "[v4 styles]";
                found_section |= in_styles;
                continue;
            }
            if !in_styles {
                continue;
            }
            if let Some(rest) = line.strip_prefix("Format:") {
                format = rest
                    .split(',')
                    .map(|f| f.trim().to_ascii_lowercase())
                    .collect();
            } else if let Some(rest) = line.strip_prefix("Style:") {
                match parse_style(rest, &format, legacy) {
                    Some(style) => {
                        styles.insert(style.name.clone(), style);
                    }
                    None => tracing::debug!(line, "skipping malformed style line"),
                }
            }
        }

        if !found_section {
            return Err(ParseError::MissingHeaderSection {
                section: "V4+ Styles".to_string(),
            }
            .into());
        }

        tracing::debug!(styles = styles.len(), "parsed style catalogue");
        Ok(Self { styles })
    }

    /// Resolve a style name to a run style state.
    ///
    /// A leading `*` (authoring-tool auto styles) is ignored. Returns
    /// `None` for names absent from the catalogue; the caller decides
    /// whether that is fatal (`\r<style>`) or a fallback (event base).
    pub fn style_state(&self, name: &str) -> Option<StyleState> {
        let key = name.trim().trim_start_matches('*');
        let style = self.styles.get(key)?;
        Some(StyleState {
            color: style.color,
            double_height: false,
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            align: style.align,
        })
    }

    /// Split one raw dialogue line into a [`DialogueEvent`].
    ///
    /// With `timing` the line is packet form (`ReadOrder, Layer, Style,
    /// Name, MarginL, MarginR, MarginV, Effect, Text`) and the given
    /// start/end are attached. Without it the line must be a scripted
    /// `Dialogue:` line carrying its own `H:MM:SS.CC` timestamps.
    pub fn split_dialogue(
        &self,
        line: &str,
        timing: Option<(i64, i64)>,
    ) -> Result<DialogueEvent> {
        let line = line.trim_end_matches(['\r', '\n']);
        match timing {
            Some((start_ms, end_ms)) => {
                let rest = line
                    .trim_start()
                    .strip_prefix("Dialogue:")
                    .unwrap_or(line)
                    .trim_start();
                let fields: Vec<&str> = rest.splitn(9, ',').collect();
                if fields.len() < 9 {
                    return Err(ParseError::BadDialogueLine {
                        detail: format!(
                            "packet form needs 9 fields, got {}",
                            fields.len()
                        ),
                    }
                    .into());
                }
                Ok(DialogueEvent::new(
                    start_ms,
                    end_ms,
                    clean_style_name(fields[2]),
                    fields[8],
                ))
            }
            None => {
                let Some(rest) = line.trim_start().strip_prefix("Dialogue:") else {
                    return Err(ParseError::BadDialogueLine {
                        detail: "expected a Dialogue: line".to_string(),
                    }
                    .into());
                };
                let fields: Vec<&str> = rest.splitn(10, ',').collect();
                if fields.len() < 10 {
                    return Err(ParseError::BadDialogueLine {
                        detail: format!(
                            "scripted form needs 10 fields, got {}",
                            fields.len()
                        ),
                    }
                    .into());
                }
                let start_ms = parse_timestamp(fields[1])?;
                let end_ms = parse_timestamp(fields[2])?;
                Ok(DialogueEvent::new(
                    start_ms,
                    end_ms,
                    clean_style_name(fields[3]),
                    fields[9],
                ))
            }
        }
    }
}

fn clean_style_name(name: &str) -> &str {
    name.trim().trim_start_matches('*')
}

/// Parse one `Style:` value list against the section's field order
fn parse_style(rest: &str, format: &[String], legacy: bool) -> Option<AssStyle> {
    let parts: Vec<&str> = rest.splitn(format.len(), ',').collect();
    let field = |key: &str| -> Option<&str> {
        let idx = format.iter().position(|f| f == key)?;
        parts.get(idx).map(|v| v.trim())
    };

    let name = field("name")?;
    if name.is_empty() {
        return None;
    }

    let color = field("primarycolour")
        .and_then(parse_style_color)
        .map(teletext_color_index)
        .unwrap_or(colors::WHITE);
    let flag = |key: &str| {
        field(key)
            .and_then(|v| v.parse::<i32>().ok())
            .map(|n| n != 0)
            .unwrap_or(false)
    };
    let align = field("alignment")
        .and_then(|v| v.parse::<u8>().ok())
        .and_then(|n| {
            if legacy {
                match n {
                    1..=3 => Some(VAlign::Bottom),
                    5..=7 => Some(VAlign::Top),
                    9..=11 => Some(VAlign::Center),
                    _ => None,
                }
            } else {
                match n {
                    1..=3 => Some(VAlign::Bottom),
                    4..=6 => Some(VAlign::Center),
                    7..=9 => Some(VAlign::Top),
                    _ => None,
                }
            }
        })
        .unwrap_or(VAlign::Bottom);

    Some(AssStyle {
        name: clean_style_name(name).to_string(),
        color,
        bold: flag("bold"),
        italic: flag("italic"),
        underline: flag("underline"),
        align,
    })
}

/// Style colours are `&HAABBGGRR` / `&HBBGGRR` hex or a plain decimal BGR
/// integer in old scripts
fn parse_style_color(value: &str) -> Option<u32> {
    let v = value.trim();
    if let Some(hex) = v.strip_prefix("&H").or_else(|| v.strip_prefix("&h")) {
        u32::from_str_radix(hex.trim_end_matches('&'), 16).ok()
    } else {
        v.parse::<u32>().ok()
    }
}

/// `H:MM:SS.CC` to milliseconds
fn parse_timestamp(value: &str) -> std::result::Result<i64, ParseError> {
    let v = value.trim();
    let re = Regex::new(r"^(\d{1,9}):(\d{1,2}):(\d{1,2})[.:](\d{1,2})$").unwrap();
    let caps = re.captures(v).ok_or_else(|| ParseError::BadTimestamp {
        value: v.to_string(),
    })?;
    let num = |i: usize| -> i64 {
        // Capture groups are bounded digit spans, parse cannot fail
        caps[i].parse().unwrap_or(0)
    };
    Ok(num(1) * 3_600_000 + num(2) * 60_000 + num(3) * 1_000 + num(4) * 10)
}

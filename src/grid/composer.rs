//! Text layout onto the page grid
//!
//! Turns an event's style runs into populated grid rows: word wrapping at
//! the usable width, spacing attributes on colour changes, double-height
//! promotion with the reserved row below, vertical placement from the
//! event's anchor, and truncation with a warning when the text needs more
//! rows than the page has.
//!
//! Rows are boxed (start-box pair at the front, end-box behind the text)
//! because subtitle pages display only boxed areas.

use crate::ass::runs::StyleRun;
use crate::config::EncoderConfig;
use crate::grid::cell::{colors, CharacterCell, ControlCode, PageGrid};
use crate::types::{EncodeWarning, VAlign};

/// Layout tokens produced from the run sequence
enum Atom {
    Word { text: String, color: u8 },
    Space { color: u8 },
    Break,
}

/// Cell content of one composed line, colour switches materialized
enum Piece {
    Attr(u8),
    Text(String),
}

struct Line {
    pieces: Vec<Piece>,
    double: bool,
}

impl Line {
    fn fresh(double: bool) -> Self {
        Self {
            pieces: Vec::new(),
            double,
        }
    }

    fn is_blank(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Physical transmission rows this line occupies
    fn phys_rows(&self) -> usize {
        if self.is_blank() {
            1
        } else {
            1 + usize::from(self.double)
        }
    }
}

/// Lay one event's runs out on a fresh grid.
///
/// Never fails: text that does not fit is truncated and reported through
/// the returned warnings.
pub(crate) fn compose(
    runs: &[StyleRun],
    config: &EncoderConfig,
) -> (PageGrid, Vec<EncodeWarning>) {
    let mut grid = PageGrid::new(config.rows, config.columns);
    let mut warnings = Vec::new();

    let double = config.double_height
        && runs
            .iter()
            .any(|r| !r.forced_break && r.style.double_height);
    let atoms = tokenize(runs, config.emphasis_color);

    let mut builder = LineBuilder::new(config.columns, double);
    for atom in &atoms {
        match atom {
            Atom::Word { text, color } => builder.append_word(text, *color),
            Atom::Space { color } => builder.append_space(*color),
            Atom::Break => builder.break_line(),
        }
    }
    let mut lines = builder.finish();

    // Truncate trailing lines until the page height fits
    let mut dropped = 0usize;
    while lines.iter().map(Line::phys_rows).sum::<usize>() > config.rows {
        lines.pop();
        dropped += 1;
    }
    if dropped > 0 {
        warnings.push(EncodeWarning::RowOverflow {
            dropped_lines: dropped,
        });
    }

    let phys: usize = lines.iter().map(Line::phys_rows).sum();
    if phys == 0 {
        return (grid, warnings);
    }
    let start_row = match event_align(runs) {
        VAlign::Top => 0,
        VAlign::Center => (config.rows - phys) / 2,
        // Keep one clear row below the text block
        VAlign::Bottom => config.rows.saturating_sub(phys + 1),
    };

    let mut row = start_row;
    for line in &lines {
        if !line.is_blank() {
            write_line(&mut grid, row, line);
        }
        row += line.phys_rows();
    }

    (grid, warnings)
}

/// The vertical anchor for the whole event: the first run's anchor, unless
/// a mid-text override switched it
fn event_align(runs: &[StyleRun]) -> VAlign {
    let mut align = runs
        .first()
        .map(|r| r.style.align)
        .unwrap_or(VAlign::Bottom);
    for run in runs {
        if run.style.align != align {
            align = run.style.align;
            break;
        }
    }
    align
}

/// Flatten runs to words, spaces and breaks, resolving emphasis to the
/// configured colour
fn tokenize(runs: &[StyleRun], emphasis_color: u8) -> Vec<Atom> {
    let mut atoms = Vec::new();
    for run in runs {
        if run.forced_break {
            atoms.push(Atom::Break);
            continue;
        }
        let color = if run.style.emphasised() {
            emphasis_color
        } else {
            run.style.color
        };
        let mut word = String::new();
        for ch in run.text.chars() {
            if ch == ' ' {
                if !word.is_empty() {
                    atoms.push(Atom::Word {
                        text: std::mem::take(&mut word),
                        color,
                    });
                }
                atoms.push(Atom::Space { color });
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            atoms.push(Atom::Word { text: word, color });
        }
    }
    atoms
}

struct LineBuilder {
    lines: Vec<Line>,
    cur: Line,
    /// Cells available for text and attribute codes on each line, after
    /// the start boxes, optional height code and the end box
    usable: usize,
    used: usize,
    cur_color: u8,
    double: bool,
}

impl LineBuilder {
    fn new(columns: usize, double: bool) -> Self {
        Self {
            lines: Vec::new(),
            cur: Line::fresh(double),
            usable: columns.saturating_sub(3 + usize::from(double)),
            used: 0,
            cur_color: colors::WHITE,
            double,
        }
    }

    fn break_line(&mut self) {
        let line = std::mem::replace(&mut self.cur, Line::fresh(self.double));
        self.lines.push(line);
        self.used = 0;
        self.cur_color = colors::WHITE;
    }

    fn ensure_color(&mut self, color: u8) {
        if color != self.cur_color {
            self.cur.pieces.push(Piece::Attr(color));
            self.used += 1;
            self.cur_color = color;
        }
    }

    fn push_glyph(&mut self, ch: char) {
        if let Some(Piece::Text(text)) = self.cur.pieces.last_mut() {
            text.push(ch);
        } else {
            self.cur.pieces.push(Piece::Text(ch.to_string()));
        }
        self.used += 1;
    }

    fn append_word(&mut self, text: &str, color: u8) {
        let chars: Vec<char> = text.chars().collect();
        let mut idx = 0;
        while idx < chars.len() {
            let attr = usize::from(color != self.cur_color);
            let left = self.usable.saturating_sub(self.used);
            if left <= attr {
                if self.used == 0 {
                    // Line too narrow for anything, drop the rest
                    return;
                }
                self.break_line();
                continue;
            }
            let space = left - attr;
            let remaining = chars.len() - idx;
            // Wrap whole words that fit on a fresh line; anything longer
            // than a full line is hard-broken at the boundary
            let fresh_need = remaining + usize::from(color != colors::WHITE);
            if space < remaining && self.used > 0 && fresh_need <= self.usable {
                self.break_line();
                continue;
            }
            self.ensure_color(color);
            for &ch in &chars[idx..idx + space.min(remaining)] {
                self.push_glyph(ch);
            }
            idx += space.min(remaining);
        }
    }

    fn append_space(&mut self, color: u8) {
        // Lines never open with spaces; wrapped-away spaces just vanish
        if self.used == 0 {
            return;
        }
        let attr = usize::from(color != self.cur_color);
        if self.usable.saturating_sub(self.used) <= attr {
            self.break_line();
            return;
        }
        self.ensure_color(color);
        self.push_glyph(' ');
    }

    fn finish(mut self) -> Vec<Line> {
        if !self.cur.is_blank() {
            self.lines.push(self.cur);
        }
        self.lines
    }
}

/// Write one composed line into the grid at `row`
fn write_line(grid: &mut PageGrid, row: usize, line: &Line) {
    let d = line.double;
    let mut col = 0;
    let put = |grid: &mut PageGrid, col: &mut usize, cell: CharacterCell| {
        grid.set(row, *col, cell);
        *col += 1;
    };

    // Start box twice for transmission reliability
    put(grid, &mut col, CharacterCell::control(ControlCode::StartBox, colors::WHITE, d));
    put(grid, &mut col, CharacterCell::control(ControlCode::StartBox, colors::WHITE, d));
    if d {
        put(
            grid,
            &mut col,
            CharacterCell::control(ControlCode::DoubleHeight, colors::WHITE, d),
        );
    }

    let mut cur = colors::WHITE;
    for piece in &line.pieces {
        match piece {
            Piece::Attr(color) => {
                cur = *color;
                put(
                    grid,
                    &mut col,
                    CharacterCell::control(ControlCode::AlphaColor(cur), cur, d),
                );
            }
            Piece::Text(text) => {
                for ch in text.chars() {
                    put(grid, &mut col, CharacterCell::glyph(ch, cur, d));
                }
            }
        }
    }
    put(grid, &mut col, CharacterCell::control(ControlCode::EndBox, cur, d));
}

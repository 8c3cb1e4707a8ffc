//! Character grid data model
//!
//! A teletext page is a fixed grid of cells; each cell is either a display
//! glyph or an embedded spacing attribute (a control code that itself
//! occupies one character position and displays as a space).

/// Teletext alpha colour indices (spacing attributes 0x00..=0x07)
#[allow(dead_code)] // colour tags can map to any index at runtime
pub mod colors {
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const WHITE: u8 = 7;
}

/// Spacing attribute control codes emitted by the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Switch alphanumeric foreground colour (index 0..=7)
    AlphaColor(u8),
    /// End of boxed area
    EndBox,
    /// Start of boxed area; transmitted twice in succession per convention
    StartBox,
    /// Return to normal height
    #[allow(dead_code)] // the composer never switches height mid-row
    NormalHeight,
    /// Double height for the rest of the row; the row below is reserved
    DoubleHeight,
}

impl ControlCode {
    /// The 7-bit code transmitted for this attribute
    pub fn byte(self) -> u8 {
        match self {
            ControlCode::AlphaColor(c) => c & 0x07,
            ControlCode::EndBox => 0x0A,
            ControlCode::StartBox => 0x0B,
            ControlCode::NormalHeight => 0x0C,
            ControlCode::DoubleHeight => 0x0D,
        }
    }
}

/// One grid position
///
/// Every cell is always in a valid displayable state; `Default` is a white
/// normal-height space, which is also what untouched padding packs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCell {
    /// Display glyph; spaces for control cells
    pub glyph: char,
    /// Foreground colour index active at this cell (0..=7)
    pub color: u8,
    /// Whether this cell belongs to a double-height row
    pub double_height: bool,
    /// Spacing attribute carried by this cell instead of a glyph
    pub control: Option<ControlCode>,
}

impl Default for CharacterCell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            color: colors::WHITE,
            double_height: false,
            control: None,
        }
    }
}

impl CharacterCell {
    /// A glyph cell
    pub fn glyph(glyph: char, color: u8, double_height: bool) -> Self {
        Self {
            glyph,
            color,
            double_height,
            control: None,
        }
    }

    /// A control cell carrying a spacing attribute
    pub fn control(code: ControlCode, color: u8, double_height: bool) -> Self {
        Self {
            glyph: ' ',
            color,
            double_height,
            control: Some(code),
        }
    }

    /// Whether the cell differs from untouched padding
    pub fn is_populated(&self) -> bool {
        self.control.is_some() || self.glyph != ' '
    }
}

/// The full character grid for one page, fixed geometry for the encoder's
/// lifetime
///
/// Owned exclusively by the composer while it lays text out, then read-only
/// for the packer.
#[derive(Debug, Clone)]
pub struct PageGrid {
    rows: usize,
    cols: usize,
    cells: Vec<CharacterCell>,
}

impl PageGrid {
    /// Create a blank grid; all cells default to space/white/normal
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CharacterCell::default(); rows * cols],
        }
    }

    /// Grid height in rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Borrow one row of cells
    pub fn row(&self, row: usize) -> &[CharacterCell] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: CharacterCell) {
        self.cells[row * self.cols + col] = cell;
    }

    /// Whether a row contains anything worth transmitting
    pub fn row_is_populated(&self, row: usize) -> bool {
        self.row(row).iter().any(CharacterCell::is_populated)
    }

    /// Whether a row contains double-height content
    #[allow(dead_code)]
    pub fn row_is_double(&self, row: usize) -> bool {
        self.row(row).iter().any(|c| c.double_height && c.is_populated())
    }
}

//! G0 Latin character mapping
//!
//! Teletext Level 1 displays the Latin G0 set: ASCII 0x20..=0x7E with 13
//! positions re-assigned per national option sub-set (ETS 300 706 chapter
//! 15). Mapping is a static table lookup; glyphs with no code in the
//! selected sub-set become the substitution glyph and are reported to the
//! caller as a recoverable diagnostic.

use serde::{Deserialize, Serialize};

/// The 13 code positions replaced by national glyphs
const NATIONAL_POSITIONS: [u8; 13] = [
    0x23, 0x24, 0x40, 0x5B, 0x5C, 0x5D, 0x5E, 0x5F, 0x60, 0x7B, 0x7C, 0x7D, 0x7E,
];

/// Code of the substitution glyph `?`
pub(crate) const SUBSTITUTE_CODE: u8 = 0x3F;

/// National option character sub-sets for the default Latin G0 set
///
/// The variant order matches the C12..C14 option values written into the
/// page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NationalCharset {
    English,
    French,
    Swedish,
    Czech,
    German,
    Spanish,
    Italian,
}

impl NationalCharset {
    /// The 3-bit national option value carried in header bits C12..C14
    pub(crate) fn option_bits(self) -> u8 {
        match self {
            NationalCharset::English => 0,
            NationalCharset::French => 1,
            NationalCharset::Swedish => 2,
            NationalCharset::Czech => 3,
            NationalCharset::German => 4,
            NationalCharset::Spanish => 5,
            NationalCharset::Italian => 6,
        }
    }

    /// Glyphs shown at the 13 national positions, in position order
    fn replacements(self) -> &'static [char; 13] {
        match self {
            NationalCharset::English => &[
                '£', '$', '@', '←', '½', '→', '↑', '#', '–', '¼', '‖', '¾', '÷',
            ],
            NationalCharset::French => &[
                'é', 'ï', 'à', 'ë', 'ê', 'ù', 'î', '#', 'è', 'â', 'ô', 'û', 'ç',
            ],
            NationalCharset::Swedish => &[
                '#', '¤', 'É', 'Ä', 'Ö', 'Å', 'Ü', '_', 'é', 'ä', 'ö', 'å', 'ü',
            ],
            NationalCharset::Czech => &[
                '#', 'ů', 'č', 'ť', 'ž', 'ý', 'í', 'ř', 'é', 'á', 'ě', 'ú', 'š',
            ],
            NationalCharset::German => &[
                '#', '$', '§', 'Ä', 'Ö', 'Ü', '^', '_', '°', 'ä', 'ö', 'ü', 'ß',
            ],
            NationalCharset::Spanish => &[
                'ç', '$', '¡', 'á', 'é', 'í', 'ó', 'ú', '¿', 'ü', 'ñ', 'è', 'à',
            ],
            NationalCharset::Italian => &[
                '£', '$', 'é', '°', 'ç', '→', '↑', '#', 'ù', 'à', 'ò', 'è', 'ì',
            ],
        }
    }

    /// Map one glyph to its 7-bit G0 code, or `None` when the sub-set has no
    /// code for it and the substitution glyph must be transmitted instead
    pub(crate) fn encode(self, glyph: char) -> Option<u8> {
        // Hard spaces display as ordinary spaces
        if glyph == '\u{A0}' {
            return Some(0x20);
        }

        // National glyphs first: they win over the ASCII meaning of their
        // position, and they are the only route to the re-assigned slots
        if let Some(idx) = self.replacements().iter().position(|&r| r == glyph) {
            return Some(NATIONAL_POSITIONS[idx]);
        }

        let code = glyph as u32;
        if (0x20..0x7F).contains(&code) {
            let code = code as u8;
            // An ASCII char whose slot shows a national glyph is unmappable
            if NATIONAL_POSITIONS.contains(&code) {
                return None;
            }
            return Some(code);
        }

        None
    }
}

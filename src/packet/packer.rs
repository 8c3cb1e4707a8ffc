//! Row and header packet assembly
//!
//! A transmitted packet is 44 bytes: clock run-in and framing code, the
//! two Hamming-coded address bytes, then 40 data bytes. Row packets carry
//! 40 odd-parity display bytes. The page header carries 8 Hamming-coded
//! bytes (page number, subcode, control bits) followed by 32 parity-coded
//! bytes of header text, which this encoder leaves blank.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, TxtError};
use crate::grid::cell::CharacterCell;
use crate::packet::charset::{NationalCharset, SUBSTITUTE_CODE};
use crate::packet::coding::{hamming_8_4, mrag, odd_parity};
use crate::types::EncodeWarning;

/// Total size of one packet on the wire
pub(crate) const ROW_PACKET_LEN: usize = 44;

/// Number of display bytes in a row packet
const ROW_DATA_LEN: usize = 40;

const CLOCK_RUN_IN: u8 = 0x55;
const FRAMING_CODE: u8 = 0x27;

/// One fully coded teletext packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedRow {
    /// Packet number: 0 for the page header, 1..=24 for display rows
    pub packet: u8,
    /// The 44 wire bytes
    pub data: Bytes,
}

fn packet_prefix(buf: &mut BytesMut, magazine: u8, packet: u8) {
    buf.put_u8(CLOCK_RUN_IN);
    buf.put_u8(FRAMING_CODE);
    buf.put_slice(&mrag(magazine, packet));
}

/// Pack one grid row into a display packet.
///
/// Cells shorter than the row width are padded with spaces. Glyphs the
/// selected character sub-set cannot express are transmitted as the
/// substitution glyph and reported as warnings.
pub(crate) fn pack_row(
    cells: &[CharacterCell],
    magazine: u8,
    packet: u8,
    charset: NationalCharset,
) -> Result<(PackedRow, Vec<EncodeWarning>)> {
    if cells.len() > ROW_DATA_LEN {
        return Err(TxtError::InvalidCellState {
            row: packet,
            col: cells.len(),
            detail: format!("row has {} cells, at most {} fit", cells.len(), ROW_DATA_LEN),
        });
    }

    let mut warnings = Vec::new();
    let mut buf = BytesMut::with_capacity(ROW_PACKET_LEN);
    packet_prefix(&mut buf, magazine, packet);

    for (col, cell) in cells.iter().enumerate() {
        if cell.color > 7 {
            return Err(TxtError::InvalidCellState {
                row: packet,
                col,
                detail: format!("colour index {} out of range", cell.color),
            });
        }
        let byte = match cell.control {
            Some(ctrl) => ctrl.byte(),
            None => match charset.encode(cell.glyph) {
                Some(code) => code,
                None => {
                    warnings.push(EncodeWarning::CharsetSubstitution {
                        ch: cell.glyph,
                        row: packet,
                    });
                    SUBSTITUTE_CODE
                }
            },
        };
        buf.put_u8(odd_parity(byte));
    }
    for _ in cells.len()..ROW_DATA_LEN {
        buf.put_u8(odd_parity(0x20));
    }

    Ok((
        PackedRow {
            packet,
            data: buf.freeze(),
        },
        warnings,
    ))
}

/// Pack the page header (packet 0).
///
/// The control bits mark the page as a boxed subtitle page with header
/// display suppressed and serial magazine transmission. `erase` sets C4
/// so the receiver clears the page memory before applying this page.
pub(crate) fn pack_header(
    magazine: u8,
    page: u8,
    subcode: u16,
    erase: bool,
    charset: NationalCharset,
) -> PackedRow {
    let mut buf = BytesMut::with_capacity(ROW_PACKET_LEN);
    packet_prefix(&mut buf, magazine, 0);

    let s1 = (subcode & 0xF) as u8;
    let s2 = ((subcode >> 4) & 0x7) as u8;
    let s3 = ((subcode >> 8) & 0xF) as u8;
    let s4 = ((subcode >> 12) & 0x3) as u8;

    let erase_bit = u8::from(erase);
    let option = charset.option_bits();

    buf.put_u8(hamming_8_4(page & 0xF));
    buf.put_u8(hamming_8_4(page >> 4));
    buf.put_u8(hamming_8_4(s1));
    // C4 erase page
    buf.put_u8(hamming_8_4(s2 | (erase_bit << 3)));
    buf.put_u8(hamming_8_4(s3));
    // C6 subtitle
    buf.put_u8(hamming_8_4(s4 | (1 << 3)));
    // C7 suppress header
    buf.put_u8(hamming_8_4(0x1));
    // C11 magazine serial, C12..C14 national option
    buf.put_u8(hamming_8_4(0x1 | (option << 1)));
    for _ in 0..32 {
        buf.put_u8(odd_parity(0x20));
    }

    PackedRow {
        packet: 0,
        data: buf.freeze(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::{colors, ControlCode};
    use crate::tests::unham_8_4;

    fn glyph_cell(glyph: char) -> CharacterCell {
        CharacterCell::glyph(glyph, colors::WHITE, false)
    }

    fn control_cell(code: ControlCode) -> CharacterCell {
        CharacterCell::control(code, colors::WHITE, false)
    }

    #[test]
    fn test_row_packet_layout() {
        let cells: Vec<CharacterCell> = "Ha".chars().map(glyph_cell).collect();
        let (row, warnings) =
            pack_row(&cells, 8, 5, NationalCharset::English).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(row.packet, 5);
        assert_eq!(row.data.len(), ROW_PACKET_LEN);
        assert_eq!(row.data[0], CLOCK_RUN_IN);
        assert_eq!(row.data[1], FRAMING_CODE);
        // Magazine 8 travels as 0, packet 5 in the address nibbles
        assert_eq!(unham_8_4(row.data[2]), (5 & 1) << 3);
        assert_eq!(unham_8_4(row.data[3]), 5 >> 1);
        // 'H' 0x48 needs its parity bit set, 'a' 0x61 does not
        assert_eq!(row.data[4], 0xC8);
        assert_eq!(row.data[5], 0x61);
    }

    #[test]
    fn test_row_padded_with_parity_spaces() {
        let cells = [glyph_cell('A')];
        let (row, _) = pack_row(&cells, 1, 1, NationalCharset::English).unwrap();
        for i in 5..ROW_PACKET_LEN {
            assert_eq!(row.data[i], 0x20);
        }
    }

    #[test]
    fn test_control_codes_pass_through() {
        let cells = [
            control_cell(ControlCode::StartBox),
            control_cell(ControlCode::AlphaColor(colors::YELLOW)),
            glyph_cell('x'),
            control_cell(ControlCode::EndBox),
        ];
        let (row, _) = pack_row(&cells, 1, 3, NationalCharset::English).unwrap();
        assert_eq!(row.data[4], odd_parity(0x0B));
        assert_eq!(row.data[5], odd_parity(0x03));
        assert_eq!(row.data[6], odd_parity(0x78));
        assert_eq!(row.data[7], odd_parity(0x0A));
    }

    #[test]
    fn test_unmappable_glyph_substituted_with_warning() {
        let cells = [glyph_cell('€')];
        let (row, warnings) =
            pack_row(&cells, 1, 2, NationalCharset::English).unwrap();
        assert_eq!(row.data[4], odd_parity(SUBSTITUTE_CODE));
        assert_eq!(
            warnings,
            vec![EncodeWarning::CharsetSubstitution { ch: '€', row: 2 }]
        );
    }

    #[test]
    fn test_overlong_row_rejected() {
        let cells: Vec<CharacterCell> = (0..41).map(|_| glyph_cell('a')).collect();
        let err = pack_row(&cells, 1, 1, NationalCharset::English).unwrap_err();
        assert!(matches!(err, TxtError::InvalidCellState { row: 1, col: 41, .. }));
    }

    #[test]
    fn test_bad_colour_rejected() {
        let cells = [CharacterCell {
            color: 9,
            ..CharacterCell::default()
        }];
        let err = pack_row(&cells, 1, 4, NationalCharset::English).unwrap_err();
        assert!(matches!(err, TxtError::InvalidCellState { row: 4, col: 0, .. }));
    }

    #[test]
    fn test_header_page_and_subcode() {
        let header = pack_header(1, 0x88, 0x15, false, NationalCharset::English);
        assert_eq!(header.packet, 0);
        assert_eq!(header.data.len(), ROW_PACKET_LEN);
        assert_eq!(unham_8_4(header.data[4]), 0x8);
        assert_eq!(unham_8_4(header.data[5]), 0x8);
        // S1 = 5, S2 = 1, upper subcode nibbles unused
        assert_eq!(unham_8_4(header.data[6]), 0x5);
        assert_eq!(unham_8_4(header.data[7]), 0x1);
        assert_eq!(unham_8_4(header.data[8]), 0x0);
    }

    #[test]
    fn test_header_control_bits() {
        let header = pack_header(1, 0x88, 0, false, NationalCharset::German);
        // C6 subtitle set, C5 newsflash clear
        assert_eq!(unham_8_4(header.data[9]), 0x8);
        // C7 suppress header
        assert_eq!(unham_8_4(header.data[10]), 0x1);
        // C11 serial plus German option bits (4)
        assert_eq!(unham_8_4(header.data[11]), 0x1 | (4 << 1));

        let erased = pack_header(1, 0x88, 0, true, NationalCharset::German);
        // C4 erase rides on top of S2
        assert_eq!(unham_8_4(erased.data[7]), 0x8);
    }

    #[test]
    fn test_header_text_is_blank() {
        let header = pack_header(1, 0x88, 0, false, NationalCharset::English);
        for i in 12..ROW_PACKET_LEN {
            assert_eq!(header.data[i], 0x20);
        }
    }
}

//! Teletext error-protection coding
//!
//! Two schemes from ETS 300 706: Hamming-8/4 for address and control
//! nibbles (single-bit correction), and odd parity for display data bytes
//! (error detection only). Both are applied byte-at-a-time at packing time.

/// Hamming-8/4 code table indexed by the 4-bit data value
///
/// Bit layout per coded byte, LSB first: P1 D1 P2 D2 P3 D3 P4 D4.
pub(crate) const HAMMING_8_4: [u8; 16] = [
    0x15, 0x02, 0x49, 0x5E, 0x64, 0x73, 0x38, 0x2F,
    0xD0, 0xC7, 0x8C, 0x9B, 0xA1, 0xB6, 0xFD, 0xEA,
];

/// Hamming-8/4 code one nibble
pub(crate) fn hamming_8_4(nibble: u8) -> u8 {
    HAMMING_8_4[(nibble & 0x0F) as usize]
}

/// Set the parity bit so the byte carries an odd number of ones
pub(crate) fn odd_parity(byte: u8) -> u8 {
    let b = byte & 0x7F;
    if b.count_ones() % 2 == 0 {
        b | 0x80
    } else {
        b
    }
}

/// Build the two Hamming-coded magazine/row address bytes.
///
/// The 8-bit address is magazine (3 bits, magazine 8 transmitted as 0) plus
/// packet number (5 bits); the low nibble goes in the first byte, the high
/// nibble in the second.
pub(crate) fn mrag(magazine: u8, packet: u8) -> [u8; 2] {
    let mag = magazine & 0x07;
    [
        hamming_8_4(mag | ((packet & 0x01) << 3)),
        hamming_8_4((packet >> 1) & 0x0F),
    ]
}

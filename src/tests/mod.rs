//! Integration testing module
//!
//! End-to-end tests for the teletext subtitle encoder:
//! - Dialogue splitting through page emission
//! - Wire-format conformance (framing, addressing, parity, lengths)
//! - Styled-text layout scenarios
//! - Configuration round-trips

pub mod e2e;

/// Recover the data nibble from a Hamming-8/4 coded byte (D1..D4 sit at
/// bits 1, 3, 5, 7)
pub(crate) fn unham_8_4(byte: u8) -> u8 {
    ((byte >> 1) & 0x01)
        | ((byte >> 2) & 0x02)
        | ((byte >> 3) & 0x04)
        | ((byte >> 4) & 0x08)
}

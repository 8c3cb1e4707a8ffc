//! Page transmission assembly
//!
//! Sequences one header packet plus the populated data rows into a page,
//! stamps it with the event timing for the caller's mux scheduling, and
//! owns the subpage rotation counter. Every emitted page sets the erase
//! control bit so the receiver drops the previous subtitle before drawing
//! the new one; an erase page is just a header with no rows.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::EncoderConfig;
use crate::error::Result;
use crate::grid::cell::PageGrid;
use crate::packet::packer::{pack_header, pack_row, PackedRow, ROW_PACKET_LEN};
use crate::types::EncodeWarning;

/// Rotation modulus of the subpage counter: the subcode digits S1 plus the
/// three low bits of S2
pub(crate) const SUBPAGE_MODULUS: u16 = 0x80;

/// One complete page transmission
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// Presentation start in milliseconds, passed through from the event
    pub start_ms: i64,
    /// Presentation end in milliseconds
    pub end_ms: i64,
    /// Magazine this page travels in, 1..=8
    pub magazine: u8,
    /// Page number digits within the magazine
    pub page: u8,
    /// Subcode carrying the subpage rotation value
    pub subcode: u16,
    /// Header packet first, then data rows in row order
    pub rows: Vec<PackedRow>,
}

impl EncodedPage {
    /// Flatten all packets into one buffer in transmission order
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.rows.len() * ROW_PACKET_LEN);
        for row in &self.rows {
            buf.put_slice(&row.data);
        }
        buf.freeze()
    }
}

/// Assembles pages and rotates the subpage counter.
///
/// The counter is the only state an encoder keeps between events; it
/// advances once per displayed page and stays put for erase pages.
#[derive(Debug)]
pub struct PageEmitter {
    subpage: u16,
}

impl PageEmitter {
    pub fn new(initial_subpage: u16) -> Self {
        Self {
            subpage: initial_subpage % SUBPAGE_MODULUS,
        }
    }

    /// The subpage value the next displayed page will carry
    pub fn subpage(&self) -> u16 {
        self.subpage
    }

    /// Assemble a display page from a composed grid.
    ///
    /// Grid row `r` travels as packet `r + 1`; rows without content are
    /// not transmitted. Advances the subpage counter.
    pub(crate) fn emit(
        &mut self,
        grid: &PageGrid,
        start_ms: i64,
        end_ms: i64,
        config: &EncoderConfig,
    ) -> Result<(EncodedPage, Vec<EncodeWarning>)> {
        let mut warnings = Vec::new();
        let mut rows = Vec::new();
        rows.push(pack_header(
            config.magazine,
            config.page,
            self.subpage,
            true,
            config.charset,
        ));
        for r in 0..grid.rows() {
            if !grid.row_is_populated(r) {
                continue;
            }
            let (row, mut row_warnings) =
                pack_row(grid.row(r), config.magazine, (r + 1) as u8, config.charset)?;
            warnings.append(&mut row_warnings);
            rows.push(row);
        }

        let page = EncodedPage {
            start_ms,
            end_ms,
            magazine: config.magazine,
            page: config.page,
            subcode: self.subpage,
            rows,
        };
        self.subpage = (self.subpage + 1) % SUBPAGE_MODULUS;
        Ok((page, warnings))
    }

    /// Header-only page clearing the display for an empty interval.
    ///
    /// Does not advance the subpage counter; nothing is displayed.
    pub(crate) fn emit_erase(&mut self, at_ms: i64, config: &EncoderConfig) -> EncodedPage {
        let header = pack_header(
            config.magazine,
            config.page,
            self.subpage,
            true,
            config.charset,
        );
        EncodedPage {
            start_ms: at_ms,
            end_ms: at_ms,
            magazine: config.magazine,
            page: config.page,
            subcode: self.subpage,
            rows: vec![header],
        }
    }
}

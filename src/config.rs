//! Encoder configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, TxtError};
use crate::grid::cell::colors;
use crate::packet::charset::NationalCharset;
use crate::types::VAlign;

/// Maximum displayable rows on a teletext page (packets 1..=24; packet 0 is
/// the page header)
pub const MAX_ROWS: usize = 24;

/// Data bytes per row packet, and therefore the widest possible grid
pub const MAX_COLUMNS: usize = 40;

/// Narrowest useful grid: boxing and height codes cost up to 4 cells per
/// row before any text fits
pub const MIN_COLUMNS: usize = 8;

/// Encoder configuration, fixed for the lifetime of a [`crate::TeletextEncoder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Text grid height in rows (at most [`MAX_ROWS`])
    pub rows: usize,

    /// Text grid width in columns ([`MIN_COLUMNS`]..=[`MAX_COLUMNS`]);
    /// packets are always padded to the full 40 data bytes
    pub columns: usize,

    /// Teletext magazine number, 1..=8 (8 is transmitted as 0 per the
    /// addressing convention)
    pub magazine: u8,

    /// Page number digits within the magazine, two 4-bit digits
    /// (0x88 selects the conventional subtitle page 888)
    pub page: u8,

    /// Initial value of the subpage rotation counter, below 0x80
    pub initial_subpage: u16,

    /// National option character sub-set for glyph mapping and the header
    /// C12..C14 bits
    pub charset: NationalCharset,

    /// Foreground colour index (0..=7) for plain text
    pub default_color: u8,

    /// Foreground colour index (0..=7) substituted for bold/italic/underline
    /// runs; Level 1 teletext has no typographic emphasis
    pub emphasis_color: u8,

    /// Transmit text double height, the conventional subtitle presentation
    pub double_height: bool,

    /// Vertical anchor used when neither style nor tags supply one
    pub default_position: VAlign,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            columns: 40,
            magazine: 8,
            page: 0x88, // page 888
            initial_subpage: 0,
            charset: NationalCharset::English,
            default_color: colors::WHITE,
            emphasis_color: colors::YELLOW,
            double_height: true,
            default_position: VAlign::Bottom,
        }
    }
}

impl EncoderConfig {
    /// Validate field ranges; called once at encoder construction
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(TxtError::Config(format!(
                "rows must be 1..={}, got {}",
                MAX_ROWS, self.rows
            )));
        }
        if self.columns < MIN_COLUMNS || self.columns > MAX_COLUMNS {
            return Err(TxtError::Config(format!(
                "columns must be {}..={}, got {}",
                MIN_COLUMNS, MAX_COLUMNS, self.columns
            )));
        }
        if self.magazine == 0 || self.magazine > 8 {
            return Err(TxtError::Config(format!(
                "magazine must be 1..=8, got {}",
                self.magazine
            )));
        }
        if self.initial_subpage >= 0x80 {
            return Err(TxtError::Config(format!(
                "initial_subpage must be below 0x80, got {:#x}",
                self.initial_subpage
            )));
        }
        if self.default_color > colors::WHITE || self.emphasis_color > colors::WHITE {
            return Err(TxtError::Config(
                "colour indices must be 0..=7".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EncoderConfig =
            toml::from_str(&content).map_err(|e| TxtError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TxtError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub(crate) mod ass;
pub(crate) mod config;
pub(crate) mod encoder;
pub(crate) mod error;
pub(crate) mod grid;
pub(crate) mod packet;
pub(crate) mod page;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use ass::SplitContext;
pub use config::{EncoderConfig, MAX_COLUMNS, MAX_ROWS, MIN_COLUMNS};
pub use encoder::TeletextEncoder;
pub use error::{ParseError, Result, TxtError};
pub use packet::{NationalCharset, PackedRow};
pub use page::EncodedPage;
pub use types::{DialogueEvent, EncodeOutput, EncodeWarning, EventKind, VAlign};

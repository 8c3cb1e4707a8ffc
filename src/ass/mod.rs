//! ASS dialogue handling
//!
//! This module parses ASS/SSA material into styled text runs:
//! - Script header parsing (style catalogue from `[V4+ Styles]`)
//! - Dialogue line splitting (scripted and packet forms)
//! - Override tag parsing into flat style runs

pub mod runs;
pub mod split;

pub use split::SplitContext;

//! Character grid module
//!
//! This module models the 24x40 display grid and fills it from styled
//! text runs: word wrapping, spacing attributes, vertical placement.

pub mod cell;
pub mod composer;

//! Page emission module
//!
//! This module assembles complete timed pages from packed packets and
//! manages the rolling subpage counter.

pub mod emitter;

pub use emitter::EncodedPage;

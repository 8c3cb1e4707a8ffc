//! Wire-level packet coding
//!
//! This module turns grid rows into transmission packets:
//! - Protection coding (Hamming-8/4 address bytes, odd-parity display bytes)
//! - G0 Latin character mapping with national option sub-sets
//! - Header and display row packet assembly

pub mod charset;
pub mod coding;
pub mod packer;

pub use charset::NationalCharset;
pub use packer::PackedRow;

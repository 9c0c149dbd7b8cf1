//! Core primitives for velo-route
//!
//! Error type, fixed-point and bit-field codecs, and numeric helpers used by
//! the graph tables and the routing layer.

pub mod bits;
pub mod error;
pub mod math;
pub mod q28_4;

pub use error::{Error, Result};

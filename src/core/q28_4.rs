//! Q28.4 fixed-point conversions (4 fractional bits, `real = raw / 16`)

use super::error::{Error, Result};

/// Number of fractional bits.
pub const FRACTION_BITS: u32 = 4;

const MIN_INT: i32 = i32::MIN >> FRACTION_BITS;
const MAX_INT: i32 = i32::MAX >> FRACTION_BITS;

/// Q28.4 encoding of the integer `i`.
///
/// Fails when `i` has no Q28.4 representation, i.e. `|i|` needs more than 28 bits.
pub fn of_int(i: i32) -> Result<i32> {
    if !(MIN_INT..=MAX_INT).contains(&i) {
        return Err(Error::invalid(format!(
            "{i} is outside the Q28.4 integer range [{MIN_INT}, {MAX_INT}]"
        )));
    }
    Ok(i << FRACTION_BITS)
}

/// Real value of a Q28.4 number.
#[inline]
pub fn as_f64(q28_4: i32) -> f64 {
    f64::from(q28_4) / f64::from(1u32 << FRACTION_BITS)
}

/// Real value of a Q28.4 number, single precision.
///
/// Exact for every value whose integer part fits in 20 bits.
#[inline]
pub fn as_f32(q28_4: i32) -> f32 {
    (q28_4 as f32) / (1u32 << FRACTION_BITS) as f32
}

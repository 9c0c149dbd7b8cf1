//! Bit-field extraction from 32-bit words
//!
//! Bit 0 is the least significant bit. Invalid ranges are programmer errors
//! and panic.

#[inline]
fn check_range(start: u32, length: u32) {
    assert!(
        (1..=32).contains(&length) && start + length <= 32,
        "invalid bit range: start={start}, length={length}"
    );
}

/// Extract `length` bits starting at `start`, sign-extending the result.
#[inline]
pub fn extract_signed(value: u32, start: u32, length: u32) -> i32 {
    check_range(start, length);
    let left = 32 - (start + length);
    // Arithmetic shift on i32 sign-extends
    ((value << left) as i32) >> (32 - length)
}

/// Extract `length` bits starting at `start` as an unsigned value.
#[inline]
pub fn extract_unsigned(value: u32, start: u32, length: u32) -> u32 {
    check_range(start, length);
    let left = 32 - (start + length);
    (value << left) >> (32 - length)
}

//! Fixed-width radix-91 encoding
//!
//! Each digit `d` (0..=90) is written as the printable character `33 + d`,
//! most significant digit first.

use crate::{Result, TrackerError};

/// Numeric base of the encoding.
pub const BASE: u64 = 91;

/// Character code of digit zero (`!`).
pub const OFFSET: u8 = 33;

/// Field width used by compressed latitude and longitude.
pub const DEFAULT_WIDTH: usize = 4;

/// Exclusive upper bound of values representable in `width` digits.
///
/// Saturates at `u64::MAX` for widths past the u64 range.
pub fn capacity(width: usize) -> u64 {
    u32::try_from(width).ok().and_then(|w| BASE.checked_pow(w)).unwrap_or(u64::MAX)
}

/// Encode `value` as exactly `width` base91 characters.
///
/// Values at or above `91^width` are rejected instead of wrapping.
pub fn encode(value: u64, width: usize) -> Result<String> {
    let limit = capacity(width);
    if value >= limit {
        return Err(TrackerError::encoding_range("base91", value as f64, limit as f64));
    }

    let mut digits = vec![OFFSET; width];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = OFFSET + (rest % BASE) as u8;
        rest /= BASE;
    }

    // Every byte is in 33..=123, so this is always valid ASCII.
    Ok(digits.into_iter().map(char::from).collect())
}

/// Encode `value` in the default four-character width.
pub fn encode4(value: u64) -> Result<String> {
    encode(value, DEFAULT_WIDTH)
}

/// Decode a base91 field back into its integer value.
pub fn decode(field: &str) -> Result<u64> {
    field.bytes().try_fold(0u64, |acc, byte| {
        let digit = byte
            .checked_sub(OFFSET)
            .filter(|d| u64::from(*d) < BASE)
            .ok_or_else(|| TrackerError::parse("base91", format!("invalid digit {:?}", byte as char)))?;

        acc.checked_mul(BASE)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or_else(|| TrackerError::parse("base91", format!("{field:?} overflows u64")))
    })
}

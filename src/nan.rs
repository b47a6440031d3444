//! Quiet `NaN`s from payload strings.
//!
//! These are the string-to-`NaN` routines of the provided precisions, i.e.,
//! what `nan("0x7")` or `strtod("NAN(0x7)")` produce. A payload is an
//! n-char-sequence that is read like `strtoull` with base 0: a `0x` prefix
//! selects hexadecimal, a leading `0` selects octal and anything else is
//! decimal. The value is placed in the mantissa below the quiet bit, truncated
//! to the bits available. A payload that is not entirely a number (including
//! the empty payload) produces the default quiet `NaN`.

use crate::DoubleDouble;

const F32_QUIET_NAN: u32 = 0x7fc0_0000;
const F32_PAYLOAD_MASK: u32 = 0x003f_ffff;
const F64_QUIET_NAN: u64 = 0x7ff8_0000_0000_0000;
const F64_PAYLOAD_MASK: u64 = 0x0007_ffff_ffff_ffff;

/// Reads a payload string as an unsigned integer.
///
/// Returns `None` if the string is empty or is not entirely consumed. Values
/// that do not fit saturate to `u64::MAX`, like `strtoull`.
pub fn parse_payload(payload: &str) -> Option<u64> {
    let (digits, radix) = if let Some(hex) = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
    {
        (hex, 16)
    }
    else if payload.len() > 1 && payload.starts_with('0') {
        (&payload[1..], 8)
    }
    else {
        (payload, 10)
    };
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u64, |value, c| {
        let digit = c.to_digit(radix)?;
        Some(
            value
                .checked_mul(u64::from(radix))
                .and_then(|value| value.checked_add(u64::from(digit)))
                .unwrap_or(u64::MAX),
        )
    })
}

pub fn f32_from_str(payload: &str) -> f32 {
    let mantissa = parse_payload(payload).map_or(0, |payload| payload as u32 & F32_PAYLOAD_MASK);
    f32::from_bits(F32_QUIET_NAN | mantissa)
}

pub fn f64_from_str(payload: &str) -> f64 {
    let mantissa = parse_payload(payload).map_or(0, |payload| payload & F64_PAYLOAD_MASK);
    f64::from_bits(F64_QUIET_NAN | mantissa)
}

/// The payload is carried by the high-order word; the low-order word is zero.
pub fn double_double_from_str(payload: &str) -> DoubleDouble {
    DoubleDouble::new(f64_from_str(payload), 0.0)
}

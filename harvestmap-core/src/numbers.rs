//! Numeric parsing and conversion helpers centralizing lenient parses and safe casts.

use num_traits::cast::cast;

/// Parse the leading integer of a field the way loosely typed exports are read.
///
/// Leading whitespace and a single sign are accepted, then decimal digits are
/// consumed until the first non-digit. `"12.7"` reads as 12, `"1,234"` as 1.
/// Returns NaN when no digit follows the optional sign.
#[must_use]
pub fn parse_leading_int(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value = 0.0_f64;
    let mut seen_digit = false;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        value = value.mul_add(10.0, f64::from(byte - b'0'));
    }

    if !seen_digit {
        return f64::NAN;
    }
    if negative { -value } else { value }
}

/// Map a ratio in `[0, 1]` onto `steps` buckets.
///
/// `floor(ratio * steps)` clamped to `[0, steps - 1]`. NaN lands in bucket 0 and
/// positive infinity in the last bucket, so degenerate ranges never index out of bounds.
#[must_use]
pub fn ratio_to_bucket(ratio: f64, steps: usize) -> usize {
    if steps == 0 {
        return 0;
    }
    let last = steps - 1;
    let scaled = (ratio * usize_to_f64(steps)).floor();
    if scaled.is_nan() || scaled <= 0.0 {
        return 0;
    }
    if scaled >= usize_to_f64(last) {
        return last;
    }
    cast::<f64, usize>(scaled).unwrap_or(0).min(last)
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Round a channel value and clamp it to the `u8` range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, 255.0);
    cast::<f64, u8>(clamped).unwrap_or(0)
}

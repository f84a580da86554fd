//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Widen a magnitude into the f64 domain used by progress math.
#[must_use]
pub fn magnitude_to_f64(value: u32) -> f64 {
    cast::<u32, f64>(value).unwrap_or(0.0)
}

/// Parse a run of ASCII digits into a magnitude, saturating at `u32::MAX`.
///
/// Returns `None` for empty input or any non-digit character.
#[must_use]
pub fn parse_magnitude(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u64>() {
        Ok(value) => Some(cast::<u64, u32>(value).unwrap_or(u32::MAX)),
        Err(_) => Some(u32::MAX),
    }
}

/// Clamp a percentage to `[0, 100]`, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Round a percentage and clamp it into the `u8` range, returning 0 for NaN values.
#[must_use]
pub fn round_percent_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(u8::MAX)).round();
    cast::<f64, u8>(clamped).unwrap_or(0)
}

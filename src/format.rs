//! Text forms of evaluated values.
//!
//! Two renderings exist: the committed form written back into the input
//! (it must lex again), and the live preview shown while typing.

use crate::eval::FRACTION_DIGITS;

/// Magnitudes above this are previewed in scientific notation.
pub const SCIENTIFIC_THRESHOLD: f64 = 1_000_000.0;

/// Shortest round-trip decimal, never in exponent form.
pub fn format_result(value: f64) -> String {
    if value == 0.0 {
        // also folds -0
        return "0".to_string();
    }
    format!("{value}")
}

/// Locale-free preview text.
///
/// Up to [`FRACTION_DIGITS`] fractional digits with trailing zeros removed,
/// or three fractional digits of scientific notation (`1.235e+6`) once the
/// magnitude exceeds [`SCIENTIFIC_THRESHOLD`].
pub fn format_preview(value: f64) -> String {
    if value.abs() > SCIENTIFIC_THRESHOLD {
        return scientific(value);
    }

    let fixed = format!("{value:.prec$}", prec = FRACTION_DIGITS as usize);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn scientific(value: f64) -> String {
    let text = format!("{value:.3e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}

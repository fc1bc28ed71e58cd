use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    MetersToFeet,
    FeetToMeters,
    KilogramsToPounds,
    PoundsToKilograms,
    KilometersToMiles,
    MilesToKilometers,
}

impl Conversion {
    pub const ALL: [Conversion; 6] = [
        Conversion::MetersToFeet,
        Conversion::FeetToMeters,
        Conversion::KilogramsToPounds,
        Conversion::PoundsToKilograms,
        Conversion::KilometersToMiles,
        Conversion::MilesToKilometers,
    ];

    pub fn factor(self) -> f64 {
        match self {
            Conversion::MetersToFeet => 3.28084,
            Conversion::FeetToMeters => 0.3048,
            Conversion::KilogramsToPounds => 2.20462,
            Conversion::PoundsToKilograms => 0.453592,
            Conversion::KilometersToMiles => 0.621371,
            Conversion::MilesToKilometers => 1.609344,
        }
    }

    pub fn apply(self, value: f64) -> f64 {
        value * self.factor()
    }

    fn code(self) -> &'static str {
        match self {
            Conversion::MetersToFeet => "m-ft",
            Conversion::FeetToMeters => "ft-m",
            Conversion::KilogramsToPounds => "kg-lb",
            Conversion::PoundsToKilograms => "lb-kg",
            Conversion::KilometersToMiles => "km-mi",
            Conversion::MilesToKilometers => "mi-km",
        }
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown conversion `{0}`")]
pub struct UnknownConversion(pub String);

impl FromStr for Conversion {
    type Err = UnknownConversion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Conversion::ALL
            .into_iter()
            .find(|conversion| conversion.code() == s)
            .ok_or_else(|| UnknownConversion(s.to_string()))
    }
}

/// Reads the longest leading decimal number of `text`, ignoring whatever
/// follows it. Returns `None` when `text` does not start with a number.
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        digits += fraction_end - fraction_start;
        end = fraction_end;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while bytes.get(exponent_end).is_some_and(u8::is_ascii_digit) {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }

    text[..end].parse().ok()
}

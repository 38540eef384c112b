//! Choosing and rendering the binary representation of a number.
//!
//! Numbers travel through the codec as decimal text. The encoder picks the
//! most compact binary representation that renders back to *exactly* the
//! same text, and falls back to shipping the text itself otherwise, so
//! `1.0`, `1e5`, `-0` or a 30-digit integer are preserved verbatim.
use alloc::string::{String, ToString};

use crate::format::SMALL_INT_MAX;

/// The wire representation of one number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumberRepr<'a> {
    Small(u8),
    Unsigned(u64),
    Signed(i64),
    Float32(f32),
    Float64(f64),
    Text(&'a str),
}

impl<'a> NumberRepr<'a> {
    /// Picks the representation for the decimal `text`.
    ///
    /// Integral values take the smallest integer encoding. Non-integral
    /// values take `f32` when the value survives a round trip through single
    /// precision and `f64` otherwise.
    pub(crate) fn classify(text: &'a str) -> Self {
        if let Ok(n) = text.parse::<u64>() {
            if n.to_string() == text {
                return match u8::try_from(n) {
                    Ok(small) if n <= SMALL_INT_MAX => Self::Small(small),
                    _ => Self::Unsigned(n),
                };
            }
        } else if let Ok(n) = text.parse::<i64>() {
            if n < 0 && n.to_string() == text {
                return Self::Signed(n);
            }
        }

        match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f % 1.0 != 0.0 && f.to_string() == text => {
                #[allow(clippy::cast_possible_truncation)]
                let single = f as f32;
                if f64::from(single) == f {
                    Self::Float32(single)
                } else {
                    Self::Float64(f)
                }
            }
            _ => Self::Text(text),
        }
    }
}

/// Renders a decoded float the same way `classify` compared it.
pub(crate) fn render_f64(value: f64) -> String {
    value.to_string()
}

pub(crate) fn render_f32(value: f32) -> String {
    render_f64(f64::from(value))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", NumberRepr::Small(0))]
    #[case("15", NumberRepr::Small(15))]
    #[case("16", NumberRepr::Unsigned(16))]
    #[case("1234567890", NumberRepr::Unsigned(1_234_567_890))]
    #[case("73588229205", NumberRepr::Unsigned(0x11_2233_4455))]
    #[case("18446744073709551615", NumberRepr::Unsigned(u64::MAX))]
    #[case("-1", NumberRepr::Signed(-1))]
    #[case("-73588229205", NumberRepr::Signed(-0x11_2233_4455))]
    #[case("-9223372036854775808", NumberRepr::Signed(i64::MIN))]
    #[case("12.5", NumberRepr::Float32(12.5))]
    #[case("-0.25", NumberRepr::Float32(-0.25))]
    #[case("0.1", NumberRepr::Float64(0.1))]
    #[case("3.141592653589793", NumberRepr::Float64(core::f64::consts::PI))]
    fn picks_compact_representation(#[case] text: &str, #[case] expected: NumberRepr<'_>) {
        assert_eq!(NumberRepr::classify(text), expected);
    }

    #[rstest]
    #[case("-0")]
    #[case("007")]
    #[case("+5")]
    #[case("1.0")]
    #[case("1e5")]
    #[case("1E-7")]
    #[case("12.50")]
    #[case("18446744073709551616")]
    #[case("-9223372036854775809")]
    #[case("123456789012345678901234567890")]
    #[case("0.30000000000000000001")]
    fn keeps_non_canonical_text(#[case] text: &str) {
        assert_eq!(NumberRepr::classify(text), NumberRepr::Text(text));
    }

    #[test]
    fn float_rendering_matches_classification() {
        assert_eq!(render_f32(12.5), "12.5");
        assert_eq!(render_f64(0.1), "0.1");
        assert_eq!(render_f64(core::f64::consts::PI), "3.141592653589793");
    }
}

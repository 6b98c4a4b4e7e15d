//! Fixed-precision geocoordinate codec.
//!
//! Incident coordinates are stored with exactly four fractional digits,
//! independent of how much precision the client sent. A [`Coordinate`] holds
//! the value as a scaled integer (degrees × 10⁴), so quantization happens
//! once at the boundary and storage never touches floating point. Rounding is
//! half-up with ties away from zero: `0.00005` becomes `0.0001`, and
//! `-0.00005` becomes `-0.0001`.

use std::fmt;

use crate::error::Error;

/// Scale factor for the fixed four-fractional-digit representation.
const SCALE: i64 = 10_000;

/// A geocoordinate quantized to four fractional digits.
///
/// The inner value is the coordinate in degrees multiplied by 10⁴. Two
/// coordinates compare equal exactly when their stored decimal forms are
/// identical, which makes equality meaningful in tests and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinate(i64);

impl Coordinate {
    /// Quantize a raw floating-point coordinate to four fractional digits.
    ///
    /// Uses round-half-up with ties away from zero. Non-finite input (NaN or
    /// an infinity) is rejected before quantization, as is any value whose
    /// scaled form cannot be represented.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for non-finite or out-of-range input.
    pub fn quantize(value: f64) -> Result<Self, Error> {
        if !value.is_finite() {
            return Err(Error::Validation(format!(
                "coordinate must be a finite number, got {value}"
            )));
        }

        let scaled = value * SCALE as f64;
        if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
            return Err(Error::Validation(format!(
                "coordinate {value} is out of range"
            )));
        }

        // Ties round away from zero: +0.5 fractions go up, -0.5 fractions go
        // down.
        let rounded = if scaled >= 0.0 {
            (scaled + 0.5).floor()
        } else {
            (scaled - 0.5).ceil()
        };

        Ok(Self(rounded as i64))
    }

    /// Reconstruct a coordinate from its stored scaled-integer form.
    pub fn from_scaled(scaled: i64) -> Self {
        Self(scaled)
    }

    /// The scaled-integer form persisted by the storage layer.
    pub fn scaled(self) -> i64 {
        self.0
    }

    /// Recover the IEEE-754 double for API responses.
    ///
    /// Lossy only beyond the fourth fractional digit; every quantized value
    /// round-trips to within 1e-9 of its decimal form.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:04}",
            magnitude / SCALE as u64,
            magnitude % SCALE as u64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_half_up() {
        // Ties round away from zero, not to even
        assert_eq!(Coordinate::quantize(0.00005).unwrap().scaled(), 1);
        assert_eq!(Coordinate::quantize(0.00005).unwrap().to_f64(), 0.0001);
        assert_eq!(Coordinate::quantize(0.00025).unwrap().scaled(), 3);
    }

    #[test]
    fn quantize_negative_ties_round_away_from_zero() {
        assert_eq!(Coordinate::quantize(-0.00005).unwrap().scaled(), -1);
        assert_eq!(Coordinate::quantize(-0.00005).unwrap().to_f64(), -0.0001);
    }

    #[test]
    fn quantize_truncates_excess_precision() {
        let c = Coordinate::quantize(53.349812345).unwrap();
        assert_eq!(c.scaled(), 533_498);
        assert_eq!(c.to_f64(), 53.3498);
    }

    #[test]
    fn quantize_preserves_exact_four_digit_input() {
        assert_eq!(Coordinate::quantize(53.3498).unwrap().scaled(), 533_498);
        assert_eq!(Coordinate::quantize(-6.2603).unwrap().scaled(), -62_603);
        assert_eq!(Coordinate::quantize(0.0).unwrap().scaled(), 0);
    }

    #[test]
    fn round_trip_stays_within_tolerance() {
        let cases = [
            (53.3498, 53.3498),
            (-6.2603, -6.2603),
            (0.0, 0.0),
            (90.0, 90.0),
            (-90.0, -90.0),
            (180.0, 180.0),
            (-180.0, -180.0),
            (12.34567, 12.3457),
            (-12.34561, -12.3456),
            (0.00004, 0.0),
            (0.00006, 0.0001),
        ];
        for (value, expected) in cases {
            let quantized = Coordinate::quantize(value).unwrap();
            assert!(
                (quantized.to_f64() - expected).abs() < 1e-9,
                "round trip drifted for {value}: got {}",
                quantized.to_f64()
            );
        }
    }

    #[test]
    fn quantize_is_idempotent() {
        let first = Coordinate::quantize(12.34567).unwrap();
        let second = Coordinate::quantize(first.to_f64()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(Coordinate::quantize(f64::NAN).is_err());
        assert!(Coordinate::quantize(f64::INFINITY).is_err());
        assert!(Coordinate::quantize(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        assert!(Coordinate::quantize(f64::MAX).is_err());
    }

    #[test]
    fn display_renders_four_fractional_digits() {
        assert_eq!(Coordinate::quantize(53.3498).unwrap().to_string(), "53.3498");
        assert_eq!(Coordinate::quantize(-6.2603).unwrap().to_string(), "-6.2603");
        assert_eq!(Coordinate::quantize(0.00005).unwrap().to_string(), "0.0001");
        assert_eq!(Coordinate::quantize(7.0).unwrap().to_string(), "7.0000");
    }
}

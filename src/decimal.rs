//! Fixed-point decimal numbers for dump values and prices.
//!
//! A value is `mantissa / 10^scale`. The textual scale is preserved, so
//! `12.50` displays as `12.50`, while equality compares numeric value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest scale whose power of ten fits in an `i128`.
pub const MAX_SCALE: u32 = 38;

#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("empty decimal literal")]
    Empty,
    #[error("invalid decimal literal: {0}")]
    Invalid(String),
    #[error("decimal literal out of range: {0}")]
    Overflow(String),
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    pub fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn from_i64(value: i64) -> Self {
        Self::new(i128::from(value), 0)
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Exact product; `None` on overflow.
    /// Exact product. Trailing zeros are dropped from both operands first,
    /// so `49.9900000` multiplies like `49.99`.
    pub fn checked_mul(&self, other: &Decimal) -> Option<Decimal> {
        let (a, b) = (self.normalize(), other.normalize());
        let mantissa = a.mantissa.checked_mul(b.mantissa)?;
        let scale = a.scale + b.scale;
        if scale > MAX_SCALE {
            return Decimal::new(mantissa, scale).reduce_scale(MAX_SCALE);
        }
        Some(Decimal::new(mantissa, scale))
    }

    /// Same value with trailing fractional zeros removed.
    pub fn normalize(&self) -> Decimal {
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Decimal::new(mantissa, scale)
    }

    /// Drop fractional digits beyond `max_scale`, truncating toward zero.
    fn reduce_scale(&self, max_scale: u32) -> Option<Decimal> {
        if self.scale <= max_scale {
            return Some(*self);
        }
        let divisor = pow10(self.scale - max_scale)?;
        Some(Decimal::new(self.mantissa / divisor, max_scale))
    }

    pub fn to_f64(&self) -> f64 {
        // Display round-trip keeps full precision for large scales.
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

pub(crate) fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalize();
        let b = other.normalize();
        a.mantissa == b.mantissa && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl FromStr for Decimal {
    type Err = DecimalError;

    /// Accepts `[+-]digits[.digits][e[+-]digits]` with at least one digit
    /// in the significand; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(DecimalError::Empty);
        }
        let invalid = || DecimalError::Invalid(text.to_string());
        let overflow = || DecimalError::Overflow(text.to_string());

        let bytes = text.as_bytes();
        let mut pos = 0;
        let negative = match bytes[0] {
            b'-' => {
                pos += 1;
                true
            }
            b'+' => {
                pos += 1;
                false
            }
            _ => false,
        };

        let mut mantissa: i128 = 0;
        let mut digits = 0usize;
        let mut frac_digits: u32 = 0;
        let mut seen_dot = false;

        while pos < bytes.len() {
            let b = bytes[pos];
            match b {
                b'0'..=b'9' => {
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(i128::from(b - b'0')))
                        .ok_or_else(overflow)?;
                    digits += 1;
                    if seen_dot {
                        frac_digits += 1;
                    }
                }
                b'.' if !seen_dot => seen_dot = true,
                b'e' | b'E' => break,
                _ => return Err(invalid()),
            }
            pos += 1;
        }

        if digits == 0 {
            return Err(invalid());
        }

        let mut exponent: i64 = 0;
        if pos < bytes.len() {
            // bytes[pos] is the exponent marker
            let exp_text = &text[pos + 1..];
            exponent = exp_text.parse::<i64>().map_err(|_| invalid())?;
        }

        let scale = i64::from(frac_digits)
            .checked_sub(exponent)
            .ok_or_else(overflow)?;
        let (mantissa, scale) = if scale < 0 {
            let factor = u32::try_from(-scale)
                .ok()
                .and_then(pow10)
                .ok_or_else(overflow)?;
            (mantissa.checked_mul(factor).ok_or_else(overflow)?, 0)
        } else {
            let scale = u32::try_from(scale).map_err(|_| overflow())?;
            if scale > MAX_SCALE {
                return Err(overflow());
            }
            (mantissa, scale)
        };

        let mantissa = if negative { -mantissa } else { mantissa };
        Ok(Decimal::new(mantissa, scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = self.scale as usize;

        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            let zeros = "0".repeat(scale - digits.len());
            write!(f, "{sign}0.{zeros}{digits}")
        }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::from_i64(value)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Int(i64),
            Float(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Int(i) => Ok(Decimal::from_i64(i)),
            Repr::Float(x) => x.to_string().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display_keep_scale() {
        assert_eq!(dec("12.50").to_string(), "12.50");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("7").to_string(), "7");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("5.").to_string(), "5");
    }

    #[test]
    fn test_equality_ignores_trailing_zeros() {
        assert_eq!(dec("12.50"), dec("12.5"));
        assert_eq!(dec("3.000"), Decimal::from_i64(3));
        assert_ne!(dec("1.01"), dec("1.1"));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(dec("1.5e3"), Decimal::from_i64(1500));
        assert_eq!(dec("25E-2"), dec("0.25"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<Decimal>().is_err());
        assert!(".".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("12abc".parse::<Decimal>().is_err());
        assert!("1e".parse::<Decimal>().is_err());
        assert!("-".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = "9".repeat(60);
        assert!(matches!(
            huge.parse::<Decimal>(),
            Err(DecimalError::Overflow(_))
        ));
    }

    #[test]
    fn test_checked_mul() {
        let product = dec("49.99").checked_mul(&dec("1300")).unwrap();
        assert_eq!(product, dec("64987"));
        assert_eq!(product.to_string(), "64987.00");
    }

    #[test]
    fn test_checked_mul_ignores_trailing_zeros() {
        let price = dec("49.99000000000000000000000000000000000");
        assert_eq!(price.scale(), 35);
        let product = price.checked_mul(&dec("1300")).unwrap();
        assert_eq!(product, dec("64987"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&dec("1.50")).unwrap();
        assert_eq!(json, "\"1.50\"");
        let back: Decimal = serde_json::from_str("\"1.50\"").unwrap();
        assert_eq!(back, dec("1.5"));
        let from_int: Decimal = serde_json::from_str("1300").unwrap();
        assert_eq!(from_int, Decimal::from_i64(1300));
    }
}

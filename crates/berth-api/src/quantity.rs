//! Fixed-point resource quantities.
//!
//! A [`Quantity`] is a decimal number with a suffix, as written in workload
//! definitions: `"2"`, `"100m"`, `"1Gi"`, `"1.5Gi"`, `"10k"`. Internally it
//! is a significand and a base-ten exponent, so arithmetic-free accessors
//! like [`Quantity::value`] and [`Quantity::milli_value`] are exact for
//! every representable input. Binary suffixes are resolved to absolute
//! integers at parse time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Suffix family a quantity was written in. Only affects rendering;
/// comparisons are purely numeric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Decimal suffixes: `n`, `u`, `m`, none, `k`, `M`, `G`, `T`, `P`, `E`.
    DecimalSi,
    /// Power-of-two suffixes: `Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei`.
    BinarySi,
}

/// A resource amount such as `"500m"` of cpu or `"1.5Gi"` of memory.
///
/// The value is `significand * 10^exponent`. Up to 18 significant digits
/// are kept; integer accessors round away from zero and saturate at the
/// `i64` range, so a fractional byte count is never silently dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quantity {
    significand: i64,
    exponent: i32,
    format: Format,
}

/// Error parsing a quantity string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseQuantityError {
    #[error("empty quantity string")]
    Empty,
    #[error("quantity {0:?} has no digits")]
    NoDigits(String),
    #[error("quantity {0:?} has an unknown suffix")]
    UnknownSuffix(String),
    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

fn decimal_suffix_exponent(suffix: &str) -> Option<i32> {
    Some(match suffix {
        "n" => -9,
        "u" => -6,
        "m" => -3,
        "" => 0,
        "k" => 3,
        "M" => 6,
        "G" => 9,
        "T" => 12,
        "P" => 15,
        "E" => 18,
        _ => return None,
    })
}

fn binary_suffix_shift(suffix: &str) -> Option<u32> {
    Some(match suffix {
        "Ki" => 10,
        "Mi" => 20,
        "Gi" => 30,
        "Ti" => 40,
        "Pi" => 50,
        "Ei" => 60,
        _ => return None,
    })
}

/// Strips factors of ten from the significand into the exponent, so that
/// equal values always share one representation.
fn normalize(mut significand: i64, mut exponent: i32) -> (i64, i32) {
    if significand == 0 {
        return (0, 0);
    }
    while significand % 10 == 0 {
        significand /= 10;
        exponent += 1;
    }
    (significand, exponent)
}

impl Quantity {
    /// Whole units, e.g. `Quantity::new(2, Format::DecimalSi)` is `"2"`.
    pub fn new(value: i64, format: Format) -> Self {
        let (significand, exponent) = normalize(value, 0);
        Quantity {
            significand,
            exponent,
            format,
        }
    }

    /// Thousandths of a unit, e.g. `Quantity::from_milli(2500)` is `"2500m"`.
    pub fn from_milli(value: i64) -> Self {
        let (significand, exponent) = normalize(value, -3);
        Quantity {
            significand,
            exponent,
            format: Format::DecimalSi,
        }
    }

    /// The value in whole units, rounded away from zero.
    pub fn value(&self) -> i64 {
        self.scaled_value(0)
    }

    /// The value in thousandths of a unit, rounded away from zero.
    pub fn milli_value(&self) -> i64 {
        self.scaled_value(3)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.significand == 0
    }

    fn scaled_value(&self, shift: i32) -> i64 {
        if self.significand == 0 {
            return 0;
        }
        let exp = self.exponent.saturating_add(shift);
        let sig = self.significand as i128;
        if exp >= 0 {
            if exp > 18 {
                // 10^19 alone exceeds the i64 range.
                return if self.significand > 0 { i64::MAX } else { i64::MIN };
            }
            let v = sig * 10_i128.pow(exp as u32);
            if v > i64::MAX as i128 {
                i64::MAX
            } else if v < i64::MIN as i128 {
                i64::MIN
            } else {
                v as i64
            }
        } else {
            let down = -(exp as i64);
            if down > 18 {
                // Anything nonzero below one rounds away from zero.
                return if self.significand > 0 { 1 } else { -1 };
            }
            let div = 10_i128.pow(down as u32);
            let q = sig / div;
            let r = sig % div;
            let q = if r != 0 {
                q + if sig > 0 { 1 } else { -1 }
            } else {
                q
            };
            q as i64
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        // Format is cosmetic; "1Gi" and "1073741824" are the same amount.
        self.significand == other.significand && self.exponent == other.exponent
    }
}

impl Eq for Quantity {}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(s: &str) -> Result<Self, ParseQuantityError> {
        if s.is_empty() {
            return Err(ParseQuantityError::Empty);
        }
        let bytes = s.as_bytes();
        let mut pos = 0;
        let negative = match bytes[0] {
            b'+' => {
                pos += 1;
                false
            }
            b'-' => {
                pos += 1;
                true
            }
            _ => false,
        };

        let int_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let int_part = &s[int_start..pos];

        let mut frac_part = "";
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            frac_part = &s[frac_start..pos];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseQuantityError::NoDigits(s.to_string()));
        }

        // An 'e'/'E' followed by a signed integer is a decimal exponent;
        // a trailing bare 'E' is the exa suffix.
        let mut dec_exp: i32 = 0;
        if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
            let mut probe = pos + 1;
            if probe < bytes.len() && (bytes[probe] == b'+' || bytes[probe] == b'-') {
                probe += 1;
            }
            if probe < bytes.len() && bytes[probe].is_ascii_digit() {
                let exp_start = pos + 1;
                pos = probe;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos != bytes.len() {
                    return Err(ParseQuantityError::UnknownSuffix(s.to_string()));
                }
                dec_exp = s[exp_start..]
                    .parse::<i32>()
                    .map_err(|_| ParseQuantityError::OutOfRange(s.to_string()))?;
            }
        }
        let suffix = &s[pos..];

        // Fold the fraction into the mantissa. Trailing fractional zeros
        // carry no value, leading zeros no digits.
        let frac_trimmed = frac_part.trim_end_matches('0');
        let mut mantissa_str = String::with_capacity(int_part.len() + frac_trimmed.len());
        mantissa_str.push_str(int_part);
        mantissa_str.push_str(frac_trimmed);
        let mantissa_str = mantissa_str.trim_start_matches('0');
        if mantissa_str.len() > 18 {
            return Err(ParseQuantityError::OutOfRange(s.to_string()));
        }
        let mantissa: i128 = if mantissa_str.is_empty() {
            0
        } else {
            mantissa_str
                .parse::<i128>()
                .map_err(|_| ParseQuantityError::NoDigits(s.to_string()))?
        };
        let frac_len = frac_trimmed.len() as i32;

        let (significand, exponent, format) = if let Some(shift) = binary_suffix_shift(suffix) {
            // Resolve to an absolute integer now; 1.5Gi is 1610612736.
            let num = mantissa << shift;
            let den = 10_i128.pow(frac_len as u32);
            let mut v = num / den;
            if num % den != 0 {
                v += 1;
            }
            if v > i64::MAX as i128 {
                return Err(ParseQuantityError::OutOfRange(s.to_string()));
            }
            (v as i64, 0, Format::BinarySi)
        } else if let Some(suffix_exp) = decimal_suffix_exponent(suffix) {
            let exponent = suffix_exp
                .saturating_add(dec_exp)
                .saturating_sub(frac_len);
            (mantissa as i64, exponent, Format::DecimalSi)
        } else {
            return Err(ParseQuantityError::UnknownSuffix(s.to_string()));
        };

        let significand = if negative { -significand } else { significand };
        let (significand, exponent) = normalize(significand, exponent);
        Ok(Quantity {
            significand,
            exponent,
            format,
        })
    }
}

impl TryFrom<String> for Quantity {
    type Error = ParseQuantityError;

    fn try_from(s: String) -> Result<Self, ParseQuantityError> {
        s.parse()
    }
}

impl From<Quantity> for String {
    fn from(q: Quantity) -> String {
        q.to_string()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.significand == 0 {
            return f.write_str("0");
        }
        if self.format == Format::BinarySi && self.exponent >= 0 {
            let v = self.value();
            for (shift, suffix) in [
                (60, "Ei"),
                (50, "Pi"),
                (40, "Ti"),
                (30, "Gi"),
                (20, "Mi"),
                (10, "Ki"),
            ] {
                let unit = 1_i64 << shift;
                if v % unit == 0 {
                    return write!(f, "{}{}", v / unit, suffix);
                }
            }
            return write!(f, "{v}");
        }
        // Largest decimal suffix that keeps the digits integral.
        for (step, suffix) in [
            (18, "E"),
            (15, "P"),
            (12, "T"),
            (9, "G"),
            (6, "M"),
            (3, "k"),
            (0, ""),
            (-3, "m"),
            (-6, "u"),
            (-9, "n"),
        ] {
            if self.exponent >= step {
                let shift = self.exponent - step;
                if shift <= 18 {
                    let digits = self.significand as i128 * 10_i128.pow(shift as u32);
                    if digits >= i64::MIN as i128 && digits <= i64::MAX as i128 {
                        return write!(f, "{digits}{suffix}");
                    }
                }
                break;
            }
        }
        write!(f, "{}e{}", self.significand, self.exponent)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

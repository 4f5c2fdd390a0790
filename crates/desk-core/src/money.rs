//! # Money -- Integer Minor Units
//!
//! Amounts are stored as `i64` halalas (1 SAR = 100 halalas). The backend is
//! inconsistent about amount encoding: some endpoints return JSON numbers
//! (`1500`, `1500.5`), others decimal strings (`"1500.50"`, `"1,500.50"`).
//! `Money` accepts all of these on the way in and always serializes as a
//! two-decimal string on the way out.
//!
//! Arithmetic saturates at the `i64` bounds rather than wrapping or
//! panicking; use [`Money::checked_add`] / [`Money::checked_sub`] where an
//! overflow must be reported.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DeskError;

/// A monetary amount in halalas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (halalas).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Construct from whole riyals. Saturates at the `i64` bounds.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// Raw minor units.
    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Convert a wire float. Non-finite values are rejected.
    pub fn from_f64(value: f64) -> Result<Self, DeskError> {
        if !value.is_finite() {
            return Err(DeskError::InvalidAmount(value.to_string()));
        }
        let minor = (value * 100.0).round();
        if minor.abs() > i64::MAX as f64 {
            return Err(DeskError::InvalidAmount(value.to_string()));
        }
        Ok(Self(minor as i64))
    }

    /// Plain two-decimal rendering without grouping, e.g. `-1234.50`.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DeskError::InvalidAmount(s.to_string());

        let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
        let (negative, body) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
        };
        if body.is_empty() {
            return Err(invalid());
        }

        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        // Sub-halala precision is only accepted when it is all zeros.
        if frac.len() > 2 && frac[2..].chars().any(|c| c != '0') {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut frac_digits: String = frac.chars().take(2).collect();
        while frac_digits.len() < 2 {
            frac_digits.push('0');
        }
        let frac: i64 = frac_digits.parse().map_err(|_| invalid())?;

        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(i64),
            Float(f64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Int(n) => n
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| serde::de::Error::custom(DeskError::InvalidAmount(n.to_string()))),
            Wire::Float(f) => Money::from_f64(f).map_err(serde::de::Error::custom),
            Wire::Text(s) if s.trim().is_empty() => Ok(Money::ZERO),
            Wire::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

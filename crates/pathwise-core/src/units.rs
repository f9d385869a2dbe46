//! Unit types for money and rates
//!
//! Financial state records express rates as 0–100 percentages while the
//! allocation internals work in 0–1 fractions. The two are distinct types so a
//! percentage can never be multiplied into a dollar figure unscaled.
//!
//! Money is carried as `f64` dollars on the public records and as integer
//! cents inside the rebalance arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A rate expressed on the 0–100 scale (e.g. `55.0` means 55%)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent100(pub f64);

impl Percent100 {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to a 0–1 fraction. Non-finite values become zero.
    pub fn to_fraction(self) -> Fraction {
        if self.0.is_finite() {
            Fraction(self.0 / 100.0)
        } else {
            Fraction(0.0)
        }
    }

    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Display for Percent100 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.round() as i64)
    }
}

/// A rate expressed on the 0–1 scale (e.g. `0.4` means 40%)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fraction(pub f64);

impl Fraction {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn to_percent(self) -> Percent100 {
        Percent100(self.0 * 100.0)
    }

    /// Apply this fraction to a dollar amount
    pub fn of(self, amount: f64) -> f64 {
        amount * self.0
    }
}

/// Clamp a possibly negative, NaN or infinite dollar figure to a usable one
pub fn non_negative(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Round a dollar amount to whole cents
pub fn round_cents(amount: f64) -> f64 {
    to_cents(amount) as f64 / 100.0
}

/// Largest dollar magnitude carried through cents arithmetic
pub const MAX_DOLLARS: f64 = 1e13;

/// Convert dollars to integer cents. Non-finite input maps to zero and
/// magnitudes beyond [`MAX_DOLLARS`] are clamped.
pub fn to_cents(amount: f64) -> i64 {
    if amount.is_finite() {
        (amount.clamp(-MAX_DOLLARS, MAX_DOLLARS) * 100.0).round() as i64
    } else {
        0
    }
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format a dollar amount as whole dollars with thousands separators
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

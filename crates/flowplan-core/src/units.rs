//! Ranged-unit arithmetic.
//!
//! A unit count is either a single non-negative decimal number (`"4"`,
//! `"1.5"`) or an inclusive range `"lo-hi"` with `hi > lo` (`"4-6"`), which
//! models elective flexibility. Addition is component-wise: a single number
//! behaves as the degenerate range `lo = hi`, and the result is a single
//! number only when both operands are.
//!
//! Values are held as fixed-point integers (ten-thousandths of a unit), so
//! `1.5 + 3` is exactly `4.5` and `0.1 + 0.2` is exactly `0.3`.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use crate::error::CoreError;

/// Fixed-point scale: one unit is 10^4 ticks.
const SCALE: u64 = 10_000;

/// Number of decimal places representable at [`SCALE`].
const MAX_FRACTION_DIGITS: usize = 4;

/// A non-negative unit amount in fixed-point ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitCount(u64);

impl UnitCount {
    /// Zero units.
    pub const ZERO: UnitCount = UnitCount(0);

    /// Parses a plain non-negative decimal (`"4"`, `"4.25"`).
    fn parse(text: &str) -> Option<Self> {
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (text, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: u64 = whole.parse().ok()?;
        let mut ticks = whole.checked_mul(SCALE)?;

        if let Some(fraction) = fraction {
            if fraction.is_empty()
                || fraction.len() > MAX_FRACTION_DIGITS
                || !fraction.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            let padded = format!("{fraction:0<width$}", width = MAX_FRACTION_DIGITS);
            ticks = ticks.checked_add(padded.parse::<u64>().ok()?)?;
        }

        Some(UnitCount(ticks))
    }
}

impl Add for UnitCount {
    type Output = UnitCount;

    fn add(self, rhs: UnitCount) -> UnitCount {
        UnitCount(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for UnitCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let fraction = self.0 % SCALE;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:0width$}", width = MAX_FRACTION_DIGITS);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// A ranged unit value. `lo == hi` is rendered as a single number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Units {
    lo: UnitCount,
    hi: UnitCount,
}

impl Units {
    /// Zero units.
    pub const ZERO: Units = Units {
        lo: UnitCount::ZERO,
        hi: UnitCount::ZERO,
    };

    /// Whether this value is a true range (`hi > lo`).
    pub fn is_range(&self) -> bool {
        self.hi > self.lo
    }

    /// Parses like [`FromStr`] but repairs inverted ranges (`"6-3"` becomes
    /// `"3-6"`) and collapses `"n-n"` to `"n"`.
    ///
    /// Only stored legacy data goes through this path; live input must use
    /// the strict parser.
    pub fn parse_lenient(text: &str) -> Result<Self, CoreError> {
        let (a, b) = split_bounds(text)?;
        Ok(Units {
            lo: a.min(b),
            hi: a.max(b),
        })
    }
}

fn split_bounds(text: &str) -> Result<(UnitCount, UnitCount), CoreError> {
    let invalid = || CoreError::InvalidUnits {
        value: text.to_string(),
    };
    let trimmed = text.trim();
    match trimmed.split_once('-') {
        Some((lo, hi)) => {
            let lo = UnitCount::parse(lo.trim()).ok_or_else(invalid)?;
            let hi = UnitCount::parse(hi.trim()).ok_or_else(invalid)?;
            Ok((lo, hi))
        }
        None => {
            let value = UnitCount::parse(trimmed).ok_or_else(invalid)?;
            Ok((value, value))
        }
    }
}

impl FromStr for Units {
    type Err = CoreError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = split_bounds(text)?;
        if text.contains('-') && hi <= lo {
            return Err(CoreError::InvalidUnits {
                value: text.to_string(),
            });
        }
        Ok(Units { lo, hi })
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_range() {
            write!(f, "{}-{}", self.lo, self.hi)
        } else {
            write!(f, "{}", self.lo)
        }
    }
}

impl Add for Units {
    type Output = Units;

    fn add(self, rhs: Units) -> Units {
        Units {
            lo: self.lo + rhs.lo,
            hi: self.hi + rhs.hi,
        }
    }
}

impl Sum for Units {
    fn sum<I: Iterator<Item = Units>>(iter: I) -> Units {
        iter.fold(Units::ZERO, Add::add)
    }
}

/// Adds two unit strings, returning the canonical string form of the sum.
pub fn add_units(a: &str, b: &str) -> Result<String, CoreError> {
    let sum = a.parse::<Units>()? + b.parse::<Units>()?;
    Ok(sum.to_string())
}

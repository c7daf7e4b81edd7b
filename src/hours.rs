use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

const MILLIS_PER_HOUR: i64 = 1000;

/// Largest magnitude accepted when reading hours from stored data.
pub const MAX_STORED_HOURS: f64 = 1_000_000_000.0;

/// A fixed-point quantity of hours, stored in thousandths of an hour.
///
/// Totals are summed as integers so that repeated edits never accumulate
/// floating-point drift. On the wire the value is a plain JSON number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Hours = Hours(0);

    /// Builds a value from whole hours.
    pub const fn whole(hours: i64) -> Hours {
        Hours(hours * MILLIS_PER_HOUR)
    }

    /// Builds a value from thousandths of an hour.
    pub const fn from_millis(millis: i64) -> Hours {
        Hours(millis)
    }

    /// Converts a floating-point hour count, rounding to the nearest thousandth.
    ///
    /// Returns `None` for NaN, infinities and values too large to represent.
    pub fn from_f64(hours: f64) -> Option<Hours> {
        if !hours.is_finite() {
            return None;
        }
        let millis = (hours * MILLIS_PER_HOUR as f64).round();
        if millis.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Hours(millis as i64))
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / MILLIS_PER_HOUR as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Hours) -> Option<Hours> {
        self.0.checked_add(rhs.0).map(Hours)
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Hours) {
        *self = *self + rhs;
    }
}

impl Sub for Hours {
    type Output = Hours;

    fn sub(self, rhs: Hours) -> Hours {
        Hours(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Hours>>(iter: I) -> Hours {
        iter.fold(Hours::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Hours> for Hours {
    fn sum<I: Iterator<Item = &'a Hours>>(iter: I) -> Hours {
        iter.copied().sum()
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLIS_PER_HOUR as u64;
        let frac = abs % MILLIS_PER_HOUR as u64;
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{frac:03}");
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % MILLIS_PER_HOUR == 0 {
            serializer.serialize_i64(self.0 / MILLIS_PER_HOUR)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Hours, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if raw.abs() > MAX_STORED_HOURS {
            return Err(de::Error::custom(format!("hour value {raw} is out of range")));
        }
        Hours::from_f64(raw).ok_or_else(|| de::Error::custom(format!("invalid hour value {raw}")))
    }
}

//! Exact, non-negative hour quantities.
//!
//! Estimates are stored as hundredths of an hour so that rollups are plain
//! integer additions. Quantization to 0.01h happens once, when a value enters
//! the system ([`Hours::from_f64`]); sums never round.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;

/// A non-negative number of hours with 0.01h resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(u64);

impl Hours {
    pub const ZERO: Self = Self(0);

    /// Build from hundredths of an hour.
    #[must_use]
    pub const fn from_centi(centi: u64) -> Self {
        Self(centi)
    }

    /// Build from a whole number of hours (saturating).
    #[must_use]
    pub const fn from_whole(hours: u64) -> Self {
        Self(hours.saturating_mul(100))
    }

    /// Convert a float, rejecting negative, NaN and infinite inputs.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let centi = (value * 100.0).round();
        if centi > u64::MAX as f64 {
            return None;
        }
        Some(Self(centi as u64))
    }

    /// Hundredths of an hour.
    #[must_use]
    pub const fn centi(self) -> u64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Add for Hours {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sum for Hours {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl<'a> Sum<&'a Self> for Hours {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// `10h`, `2.5h`, `0.25h`.
impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{whole}h")
        } else if frac % 10 == 0 {
            write!(f, "{whole}.{}h", frac / 10)
        } else {
            write!(f, "{whole}.{frac:02}h")
        }
    }
}

impl FromStr for Hours {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("'{s}' is not a number of hours")))?;
        Self::from_f64(value)
            .ok_or_else(|| CoreError::Validation(format!("'{s}' is not a non-negative number")))
    }
}

impl Serialize for Hours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Hours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value).ok_or_else(|| {
            serde::de::Error::custom(format!("{value} is not a non-negative number of hours"))
        })
    }
}

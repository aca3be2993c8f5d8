//! # Octas
//!
//! Escrow bookkeeping unit: 1 coin = 10^8 octas.
//!
//! Escrow totals can exceed any native integer width once enough deposits
//! accumulate, so [`Octas`] wraps an arbitrary-precision [`BigUint`]. It is
//! serialized as a decimal string and accepts either a string or a JSON
//! integer on input. There is no floating-point path anywhere in here.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use num_bigint::BigUint;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TripError;

/// Octas in one whole coin.
pub const OCTAS_PER_COIN: u64 = 100_000_000;

/// A non-negative amount of octas.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Octas(BigUint);

impl Octas {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Convert a major-unit amount into octas, truncating toward zero.
    ///
    /// `2.5` becomes `250000000`; `0.000000019` becomes `1`.
    pub fn from_major_units(amount: Decimal) -> Result<Self, TripError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TripError::validation("amount must not be negative"));
        }
        let scaled = amount
            .checked_mul(Decimal::from(OCTAS_PER_COIN))
            .ok_or_else(|| TripError::validation("amount is too large"))?;
        let whole = scaled
            .trunc()
            .to_u128()
            .ok_or_else(|| TripError::validation("amount is too large"))?;
        Ok(Self(BigUint::from(whole)))
    }

    /// `floor(self * percent / 100)`.
    pub fn percent_floor(&self, percent: u32) -> Self {
        Self(self.0.clone() * percent / 100u32)
    }

    /// `self * factor`.
    pub fn times(&self, factor: u32) -> Self {
        Self(self.0.clone() * factor)
    }

    /// `self - rhs`, or `None` when that would go below zero.
    pub fn checked_sub(&self, rhs: &Octas) -> Option<Self> {
        if rhs.0 > self.0 {
            None
        } else {
            Some(Self(&self.0 - &rhs.0))
        }
    }
}

impl From<u64> for Octas {
    fn from(v: u64) -> Self {
        Self(BigUint::from(v))
    }
}

impl FromStr for Octas {
    type Err = TripError;

    /// Accepts plain base-10 digits only: no sign, separators or whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TripError::validation(format!(
                "invalid octa amount: {s:?}"
            )));
        }
        BigUint::from_str(s)
            .map(Self)
            .map_err(|_| TripError::validation(format!("invalid octa amount: {s:?}")))
    }
}

impl fmt::Display for Octas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add<&Octas> for &Octas {
    type Output = Octas;

    fn add(self, rhs: &Octas) -> Octas {
        Octas(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Octas> for Octas {
    fn add_assign(&mut self, rhs: &Octas) {
        self.0 += &rhs.0;
    }
}

impl<'a> std::iter::Sum<&'a Octas> for Octas {
    fn sum<I: Iterator<Item = &'a Octas>>(iter: I) -> Self {
        iter.fold(Octas::zero(), |mut acc, x| {
            acc += x;
            acc
        })
    }
}

impl Serialize for Octas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOctas {
    Text(String),
    Integer(u64),
}

impl<'de> Deserialize<'de> for Octas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawOctas::deserialize(deserializer)? {
            RawOctas::Text(s) => s.parse().map_err(serde::de::Error::custom),
            RawOctas::Integer(n) => Ok(Octas::from(n)),
        }
    }
}

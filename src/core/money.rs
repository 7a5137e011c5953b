//! Cent-exact monetary amounts.
//!
//! Every regulated document carries amounts as whole euro cents. Arithmetic
//! stays in integer space; [`Decimal`] appears only at the boundaries where
//! rates and quantities come in or wire strings go out.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::FiskalError;

/// A monetary amount in euro cents.
///
/// The wire format is `-?\d+\.\d{2}` ("1234.50" / "-3.07") with the sign on
/// the whole value. Conversions from [`Decimal`] either demand cent
/// precision ([`Amount::from_decimal`]) or round half to even
/// ([`Amount::round_from_decimal`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Amount from whole cents.
    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents)
    }

    /// Amount from whole euros.
    pub const fn from_euro(euro: i64) -> Self {
        Amount(euro * 100)
    }

    /// The raw cent value.
    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Amount(self.0.abs())
    }

    /// Convert to a [`Decimal`] with two fraction digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Exact conversion from a [`Decimal`]. Fails when the value carries
    /// sub-cent precision or does not fit the cent range.
    pub fn from_decimal(value: Decimal) -> Result<Self, FiskalError> {
        if value != value.round_dp(2) {
            return Err(FiskalError::Arithmetic(format!(
                "amount {value} has sub-cent precision"
            )));
        }
        (value * Decimal::ONE_HUNDRED)
            .to_i64()
            .map(Amount)
            .ok_or_else(|| FiskalError::Arithmetic(format!("amount {value} out of cent range")))
    }

    /// Round a [`Decimal`] to cents, half to even (banker's rounding).
    /// Saturates at the representable cent range.
    pub fn round_from_decimal(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        match (rounded * Decimal::ONE_HUNDRED).to_i64() {
            Some(cents) => Amount(cents),
            None if value.is_sign_negative() => Amount(i64::MIN),
            None => Amount(i64::MAX),
        }
    }

    /// The given percentage of this amount, rounded half to even.
    pub fn percent(self, rate: Decimal) -> Amount {
        Amount::round_from_decimal(self.to_decimal() * rate / Decimal::ONE_HUNDRED)
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = FiskalError;

    fn from_str(s: &str) -> Result<Self, FiskalError> {
        let malformed =
            || FiskalError::Codec(format!("malformed amount '{s}', expected e.g. \"123.45\""));

        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = rest.split_once('.').ok_or_else(malformed)?;
        if whole.is_empty()
            || frac.len() != 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let whole: i64 = whole.parse().map_err(|_| malformed())?;
        let frac: i64 = frac.parse().map_err(|_| malformed())?;
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(malformed)?;
        Ok(Amount(if negative { -cents } else { cents }))
    }
}

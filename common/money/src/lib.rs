use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalize a monetary value to 2 decimal places. Extra digits are truncated.
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("amount must not be negative")]
    Negative,
}

/// Non-negative amount held at a fixed scale of two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(from = "BigDecimal", into = "BigDecimal")]
#[sqlx(transparent)]
pub struct Money(BigDecimal);

impl Money {
    pub fn new(raw: BigDecimal) -> Self {
        Self(normalize_scale(&raw))
    }

    pub fn zero() -> Self {
        Self::new(BigDecimal::zero())
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(BigDecimal::new(cents.into(), 2))
    }

    /// Parses a decimal string, rejecting negative amounts.
    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let value = BigDecimal::from_str(raw.trim())
            .map_err(|_| MoneyError::Invalid(raw.to_string()))?;
        if value < BigDecimal::zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self::new(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_cents(&self) -> i64 {
        (&self.0 * BigDecimal::from(100)).to_i64().unwrap_or(i64::MAX)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigDecimal> for Money {
    fn from(value: BigDecimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for BigDecimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::new(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Money> for Money {
    type Output = Money;

    fn add(self, rhs: &'a Money) -> Money {
        Money::new(self.0 + &rhs.0)
    }
}

impl AddAssign<&Money> for Money {
    fn add_assign(&mut self, rhs: &Money) {
        self.0 = normalize_scale(&(&self.0 + &rhs.0));
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, next| acc + next)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, next| acc + next)
    }
}

#[cfg(feature = "graphql")]
mod graphql {
    use async_graphql::{InputValueError, InputValueResult, Number, Scalar, ScalarType, Value};

    use super::Money;

    /// Decimal amount. Accepts a number or a decimal string, emits the number
    /// parsed from its exact decimal text.
    #[Scalar(name = "Money")]
    impl ScalarType for Money {
        fn parse(value: Value) -> InputValueResult<Self> {
            match &value {
                Value::Number(number) => {
                    Money::parse(&number.to_string()).map_err(InputValueError::custom)
                }
                Value::String(raw) => Money::parse(raw).map_err(InputValueError::custom),
                _ => Err(InputValueError::expected_type(value)),
            }
        }

        fn to_value(&self) -> Value {
            let text = self.to_string();
            match text.parse::<Number>() {
                Ok(number) => Value::Number(number),
                Err(_) => Value::String(text),
            }
        }
    }
}

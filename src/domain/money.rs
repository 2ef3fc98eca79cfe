use crate::error::{LifecycleError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minor units per major unit for every supported currency (öre per krona).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// ISO 4217 style currency code: exactly three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(LifecycleError::validation(format!(
                "Invalid currency code '{}'",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = LifecycleError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-negative monetary amount held in integer minor units.
///
/// All arithmetic is checked: mixing currencies or overflowing `i64` is a
/// validation error rather than a silent wrap, and no operation ever yields a
/// negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    pub fn new(minor_units: i64, currency: Currency) -> Result<Self> {
        if minor_units < 0 {
            return Err(LifecycleError::validation(
                "Amount must not be negative",
            ));
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            minor_units: 0,
            currency,
        }
    }

    /// Converts a major-unit decimal (e.g. `100.50`) into exact minor units.
    pub fn from_major(amount: Decimal, currency: Currency) -> Result<Self> {
        let scaled = amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or_else(|| LifecycleError::validation("Amount out of range"))?;
        if !scaled.fract().is_zero() {
            return Err(LifecycleError::validation(format!(
                "Amount {} has more precision than the currency allows",
                amount
            )));
        }
        let minor_units = scaled
            .to_i64()
            .ok_or_else(|| LifecycleError::validation("Amount out of range"))?;
        Self::new(minor_units, currency)
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    pub fn checked_add(&self, rhs: &Money) -> Result<Money> {
        self.ensure_same_currency(rhs)?;
        let minor_units = self
            .minor_units
            .checked_add(rhs.minor_units)
            .ok_or_else(|| LifecycleError::validation("Amount overflow"))?;
        Ok(Self {
            minor_units,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts `rhs`, refusing to go below zero.
    pub fn checked_sub(&self, rhs: &Money) -> Result<Money> {
        self.ensure_same_currency(rhs)?;
        if rhs.minor_units > self.minor_units {
            return Err(LifecycleError::validation(format!(
                "Cannot subtract {} from {}",
                rhs, self
            )));
        }
        Ok(Self {
            minor_units: self.minor_units - rhs.minor_units,
            currency: self.currency.clone(),
        })
    }

    pub fn times(&self, quantity: u32) -> Result<Money> {
        let minor_units = self
            .minor_units
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| LifecycleError::validation("Amount overflow"))?;
        Ok(Self {
            minor_units,
            currency: self.currency.clone(),
        })
    }

    /// Sums `amounts` in `currency`; an empty iterator yields zero.
    pub fn sum<'a>(currency: &Currency, amounts: impl IntoIterator<Item = &'a Money>) -> Result<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency.clone()), |acc, m| acc.checked_add(m))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(LifecycleError::validation(format!(
                "Currency mismatch: {} vs {}",
                self.currency, other.currency
            )))
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor_units / MINOR_UNITS_PER_MAJOR,
            self.minor_units % MINOR_UNITS_PER_MAJOR,
            self.currency
        )
    }
}

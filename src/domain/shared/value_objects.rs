use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{MoneyError, QuantityError};

// ============================================================================
// Shared Value Objects - Money & Quantity
// ============================================================================

pub const DEFAULT_CURRENCY: &str = "USD";

/// Non-negative currency amount, always held at two decimal places.
///
/// Rounding happens once, at construction, so sums of line subtotals never
/// drift from what a 2-decimal ledger would show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount: Decimal,
    currency: String,
}

#[derive(Deserialize)]
struct RawMoney {
    amount: Decimal,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.amount, &raw.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::NegativeAmount(amount));
        }

        let currency = normalize_currency(currency)?;
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);

        Ok(Self { amount, currency })
    }

    pub fn usd(amount: Decimal) -> Result<Self, MoneyError> {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    pub fn zero(currency: &str) -> Result<Self, MoneyError> {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if !self.same_currency(other) {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }

        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Money::new(sum, &self.currency)
    }

    pub fn multiply(&self, multiplier: i64) -> Result<Money, MoneyError> {
        if multiplier < 0 {
            return Err(MoneyError::NegativeMultiplier(multiplier));
        }

        let product = self
            .amount
            .checked_mul(Decimal::from(multiplier))
            .ok_or(MoneyError::Overflow)?;
        Money::new(product, &self.currency)
    }

    /// Sum a sequence of amounts, all of which must be in `currency`.
    pub fn sum<'a, I>(currency: &str, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency)?, |total, amount| total.add(amount))
    }

    /// Fixed two-decimal rendering with the currency code as suffix, e.g. `15.00 USD`.
    pub fn formatted(&self) -> String {
        format!("{} {}", self.amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

fn normalize_currency(currency: &str) -> Result<String, MoneyError> {
    let code = currency.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(MoneyError::InvalidCurrency(currency.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

/// Non-negative stock count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, QuantityError> {
        if value < 0 {
            return Err(QuantityError::Negative(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// `None` when fewer than `amount` units are available.
    pub fn checked_sub(self, amount: i32) -> Option<Quantity> {
        match self.0.checked_sub(amount) {
            Some(rest) if rest >= 0 => Some(Quantity(rest)),
            _ => None,
        }
    }

    pub fn checked_add(self, amount: i32) -> Result<Quantity, QuantityError> {
        if amount < 0 {
            return Err(QuantityError::Negative(amount));
        }
        self.0
            .checked_add(amount)
            .map(Quantity)
            .ok_or(QuantityError::Overflow)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

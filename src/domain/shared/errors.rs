use rust_decimal::Decimal;

// ============================================================================
// Value Object Construction Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("Currencies must match: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("Multiplier cannot be negative: {0}")]
    NegativeMultiplier(i64),

    #[error("Amount is out of range")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantityError {
    #[error("Quantity cannot be negative: {0}")]
    Negative(i32),

    #[error("Quantity is out of range")]
    Overflow,
}

//! Value objects shared by the cart and order aggregates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency every price in the store is denominated in.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self { amount, currency: currency.to_string() }
    }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch);
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money::new(self.amount * Decimal::from(qty), &self.currency)
    }

    /// The amount left after subtracting `percent` of it, rounded to 2 dp.
    pub fn percent_off(&self, percent: Decimal) -> Money {
        let discounted = self.amount - self.amount * percent / Decimal::from(100u32);
        Money::new(discounted.round_dp(2), &self.currency)
    }
}

impl Default for Money {
    fn default() -> Self { Self::zero(DEFAULT_CURRENCY) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[derive(Debug, Clone)]
pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_add() {
        let a = Money::new(Decimal::new(100, 0), DEFAULT_CURRENCY);
        let b = Money::new(Decimal::new(50, 0), DEFAULT_CURRENCY);
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_add_rejects_currency_mismatch() {
        let a = Money::new(Decimal::new(100, 0), "usd");
        let b = Money::new(Decimal::new(50, 0), "eur");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_multiply() {
        let price = Money::new(Decimal::new(1999, 2), DEFAULT_CURRENCY);
        assert_eq!(price.multiply(3).amount(), Decimal::new(5997, 2));
    }

    #[test]
    fn test_percent_off() {
        let total = Money::new(Decimal::new(10000, 2), DEFAULT_CURRENCY);
        assert_eq!(total.percent_off(Decimal::from(10u32)).amount(), Decimal::new(9000, 2));
    }

    #[test]
    fn test_percent_off_rounds_to_two_places() {
        // 33.33 at 15% off = 28.3305 -> 28.33 (banker's rounding, same digit here)
        let total = Money::new(Decimal::new(3333, 2), DEFAULT_CURRENCY);
        assert_eq!(total.percent_off(Decimal::from(15u32)).amount(), Decimal::new(2833, 2));
    }
}

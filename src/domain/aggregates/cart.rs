//! Cart aggregate
//!
//! One active cart per user. Line quantities are *set*, not incremented,
//! and the running total is recomputed from scratch on every mutation so
//! it can never drift from the lines.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Cart {
    id: Uuid,
    user_id: Uuid,
    currency: String,
    lines: Vec<CartLine>,
    total: Money,
    total_after_discount: Option<Money>,
}

#[derive(Clone, Debug)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(user_id: Uuid, currency: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            currency: currency.to_string(),
            lines: vec![],
            total: Money::zero(currency),
            total_after_discount: None,
        }
    }

    /// Rebuilds a cart from stored rows. The total is recomputed from the
    /// lines rather than trusted from storage.
    pub fn from_parts(
        id: Uuid,
        user_id: Uuid,
        currency: &str,
        lines: Vec<CartLine>,
        total_after_discount: Option<Money>,
    ) -> Self {
        let mut cart = Self {
            id,
            user_id,
            currency: currency.to_string(),
            lines,
            total: Money::zero(currency),
            total_after_discount,
        };
        cart.recalculate();
        cart
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn total(&self) -> &Money { &self.total }
    pub fn total_after_discount(&self) -> Option<&Money> { self.total_after_discount.as_ref() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    /// Sets the quantity for `product_id`, appending a new line at
    /// `current_price` when none exists. An existing line keeps the unit
    /// price captured when it was first added. Any previously computed
    /// discounted total no longer describes the cart and is dropped.
    pub fn set_line(&mut self, product_id: Uuid, quantity: u32, current_price: Money) -> &CartLine {
        let idx = match self.lines.iter().position(|l| l.product_id == product_id) {
            Some(idx) => {
                self.lines[idx].quantity = quantity;
                idx
            }
            None => {
                self.lines.push(CartLine { product_id, quantity, unit_price: current_price });
                self.lines.len() - 1
            }
        };
        self.total_after_discount = None;
        self.recalculate();
        &self.lines[idx]
    }

    /// Attaches a secondary discounted total; the undiscounted total is kept.
    pub fn apply_discount(&mut self, percent: Decimal) {
        self.total_after_discount = Some(self.total.percent_off(percent));
    }

    fn recalculate(&mut self) {
        self.total = self
            .lines
            .iter()
            .fold(Money::zero(&self.currency), |acc, l| acc.add(&l.line_total()).unwrap_or(acc));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DEFAULT_CURRENCY;

    fn usd(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), DEFAULT_CURRENCY)
    }

    #[test]
    fn test_new_line_captures_current_price() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        let product = Uuid::new_v4();
        cart.set_line(product, 2, usd(1000));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total().amount(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_set_line_replaces_quantity_not_appends() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        let product = Uuid::new_v4();
        cart.set_line(product, 2, usd(1000));
        cart.set_line(product, 5, usd(1000));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total().amount(), Decimal::new(5000, 2));
    }

    #[test]
    fn test_replacing_keeps_captured_price() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        let product = Uuid::new_v4();
        cart.set_line(product, 1, usd(1000));
        // price changed in the catalog since the line was added
        let line = cart.set_line(product, 3, usd(1500));
        assert_eq!(line.unit_price.amount(), Decimal::new(1000, 2));
        assert_eq!(cart.total().amount(), Decimal::new(3000, 2));
    }

    #[test]
    fn test_total_is_sum_over_lines_after_any_sequence() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cart.set_line(a, 2, usd(1050));
        cart.set_line(b, 1, usd(399));
        cart.set_line(a, 4, usd(1050));
        cart.set_line(b, 3, usd(399));
        let expected: Decimal = cart
            .lines()
            .iter()
            .map(|l| l.unit_price.amount() * Decimal::from(l.quantity))
            .sum();
        assert_eq!(cart.total().amount(), expected);
        assert_eq!(cart.total().amount(), Decimal::new(5397, 2)); // 4*10.50 + 3*3.99
    }

    #[test]
    fn test_apply_discount_keeps_both_totals() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        cart.set_line(Uuid::new_v4(), 1, usd(10000));
        cart.apply_discount(Decimal::from(10u32));
        assert_eq!(cart.total().amount(), Decimal::new(10000, 2));
        assert_eq!(cart.total_after_discount().unwrap().amount(), Decimal::new(9000, 2));
    }

    #[test]
    fn test_line_mutation_drops_stale_discount() {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        let product = Uuid::new_v4();
        cart.set_line(product, 1, usd(10000));
        cart.apply_discount(Decimal::from(10u32));
        cart.set_line(product, 2, usd(10000));
        assert!(cart.total_after_discount().is_none());
    }

    #[test]
    fn test_from_parts_recomputes_total() {
        let lines = vec![
            CartLine { product_id: Uuid::new_v4(), quantity: 2, unit_price: usd(500) },
            CartLine { product_id: Uuid::new_v4(), quantity: 1, unit_price: usd(250) },
        ];
        let cart = Cart::from_parts(Uuid::new_v4(), Uuid::new_v4(), DEFAULT_CURRENCY, lines, None);
        assert_eq!(cart.total().amount(), Decimal::new(1250, 2));
    }
}

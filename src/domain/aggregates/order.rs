//! Order aggregate
//!
//! An order is an immutable snapshot of a cart's lines plus a payment
//! intent. It is created once at commit time; only its status moves
//! afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    lines: Vec<OrderLine>,
    payment: PaymentIntent,
    status: OrderStatus,
    order_total: Money,
    total_after_discount: Option<Money>,
    coupon_applied: bool,
}

#[derive(Clone, Debug)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Identifier/amount/status record for the attempted payment.
#[derive(Clone, Debug)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Cash On Delivery")]
    CashOnDelivery,
    #[serde(rename = "Card Payment")]
    CardPayment,
    #[serde(rename = "SSlCommerz")]
    SslCommerz,
    Bkash,
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash On Delivery",
            Self::CardPayment => "Card Payment",
            Self::SslCommerz => "SSlCommerz",
            Self::Bkash => "Bkash",
            Self::Stripe => "Stripe",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    NotProcessed,
    Processing,
    Dispatched,
    Cancelled,
    Completed,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotProcessed => "Not Processed",
            Self::Processing => "Processing",
            Self::Dispatched => "Dispatched",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
            Self::Delivered => "Delivered",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    #[default]
    NotProcessed,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotProcessed => "Not Processed",
            Self::Paid => "Paid",
            Self::Refunded => "Refunded",
        }
    }
}

impl Order {
    /// Snapshots `cart` into a new order. The charged amount falls back in
    /// two steps: the discounted total is used only when the caller says a
    /// coupon was applied *and* the cart actually carries one; everything
    /// else charges the undiscounted total.
    pub fn from_cart(cart: &Cart, method: PaymentMethod, coupon_applied: bool) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let mut amount = cart.total().clone();
        if coupon_applied {
            if let Some(discounted) = cart.total_after_discount() {
                amount = discounted.clone();
            }
        }
        let payment = PaymentIntent {
            id: format!("order-{:08}", rand::random::<u32>()),
            amount,
            method,
            status: PaymentStatus::NotProcessed,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: cart.user_id(),
            lines: cart
                .lines()
                .iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                })
                .collect(),
            payment,
            status: OrderStatus::NotProcessed,
            order_total: cart.total().clone(),
            total_after_discount: cart.total_after_discount().cloned(),
            coupon_applied,
        })
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn lines(&self) -> &[OrderLine] { &self.lines }
    pub fn payment(&self) -> &PaymentIntent { &self.payment }
    pub fn status(&self) -> &OrderStatus { &self.status }
    pub fn order_total(&self) -> &Money { &self.order_total }
    pub fn total_after_discount(&self) -> Option<&Money> { self.total_after_discount.as_ref() }
    pub fn coupon_applied(&self) -> bool { self.coupon_applied }
}

#[derive(Debug, Clone)]
pub enum OrderError { EmptyCart }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cart is empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DEFAULT_CURRENCY;
    use rust_decimal::Decimal;

    fn cart_with_discount(apply: bool) -> Cart {
        let mut cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        cart.set_line(Uuid::new_v4(), 2, Money::new(Decimal::new(5000, 2), DEFAULT_CURRENCY));
        if apply {
            cart.apply_discount(Decimal::from(10u32));
        }
        cart
    }

    #[test]
    fn test_coupon_applied_with_discount_charges_discounted_total() {
        let cart = cart_with_discount(true);
        let order = Order::from_cart(&cart, PaymentMethod::CashOnDelivery, true).unwrap();
        assert_eq!(order.payment().amount.amount(), Decimal::new(9000, 2));
        assert_eq!(order.order_total().amount(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_coupon_applied_without_discount_falls_back_to_total() {
        let cart = cart_with_discount(false);
        let order = Order::from_cart(&cart, PaymentMethod::Stripe, true).unwrap();
        assert_eq!(order.payment().amount.amount(), Decimal::new(10000, 2));
    }

    #[test]
    fn test_coupon_not_applied_charges_full_total_even_if_discount_present() {
        let cart = cart_with_discount(true);
        let order = Order::from_cart(&cart, PaymentMethod::CardPayment, false).unwrap();
        assert_eq!(order.payment().amount.amount(), Decimal::new(10000, 2));
        assert_eq!(order.total_after_discount().unwrap().amount(), Decimal::new(9000, 2));
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let cart = Cart::new(Uuid::new_v4(), DEFAULT_CURRENCY);
        assert!(Order::from_cart(&cart, PaymentMethod::Bkash, false).is_err());
    }

    #[test]
    fn test_order_snapshots_cart_lines() {
        let cart = cart_with_discount(false);
        let order = Order::from_cart(&cart, PaymentMethod::CashOnDelivery, false).unwrap();
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].quantity, 2);
        assert!(order.payment().id.starts_with("order-"));
        assert_eq!(order.status(), &OrderStatus::NotProcessed);
    }
}

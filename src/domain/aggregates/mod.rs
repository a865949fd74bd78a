//! Domain aggregates

pub mod cart;
pub mod coupon;
pub mod engagement;
pub mod order;
pub mod product;

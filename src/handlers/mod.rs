//! HTTP handlers. Each module owns its row structs and request DTOs;
//! sqlx queries are written inline against the shared pool.

pub mod blogs;
pub mod cart;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;

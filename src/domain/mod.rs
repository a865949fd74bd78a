//! Domain layer: pure aggregates, value objects and events. All derived
//! values (cart totals, discounts, rating averages, reaction toggles) are
//! computed here; handlers only load and persist.

pub mod aggregates;
pub mod events;
pub mod value_objects;

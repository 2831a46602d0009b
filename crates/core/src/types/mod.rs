//! Core cart types.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::*;
pub use line_item::{CartLineItem, MAX_TITLE_LENGTH};
pub use price::{Price, PriceError};
pub use product::ProductSnapshot;

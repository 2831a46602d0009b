//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart manager and session-backed cart storage
//! - `catalog` - Product lookups against Postgres or memory, with caching

pub mod cart;
pub mod catalog;

pub use cart::{AddItemRequest, CartManager, SessionCartStorage};
pub use catalog::Catalog;

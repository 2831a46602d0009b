//! Session Cart Core - cart types, rules, and ports.
//!
//! This crate provides everything about a cart that does not depend on how it
//! is served or stored:
//! - `storefront` - the HTTP service that exposes carts per session
//! - `cli` - migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types, algorithms and traits - no network
//! I/O, no database access. Storage and catalog access are traits
//! ([`CartStorage`], [`ProductLookup`]) implemented by the service; the
//! in-memory implementations here back the tests.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, product snapshots and line items
//! - [`cart`] - the working cart: merge, ID assignment, quantity rules
//! - [`storage`] - the `CartStorage` port
//! - [`catalog`] - the `ProductLookup` port
//! - [`error`] - cart error taxonomy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod error;
pub mod storage;
pub mod types;

pub use cart::{AddOutcome, Cart, QuantityOutcome};
pub use catalog::{InMemoryCatalog, LookupError, ProductLookup};
pub use error::{CartError, ValidationError};
pub use storage::{CartStorage, MemoryCartStorage};
pub use types::*;

//! Session Cart Storefront library.
//!
//! The HTTP service that keeps a shopping cart in each visitor's session.
//! Exposed as a library so the router can be driven directly in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::build_router;

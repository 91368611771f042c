//! Catalog domain module.
//!
//! This crate contains the read-only product catalog: immutable [`Product`]
//! records partitioned into categories, an in-memory [`Catalog`] with lookup
//! by id and by name, and the fixed demo listings the application ships with.
//! No IO, no HTTP, no storage.

pub mod catalog;
pub mod product;
pub mod seed;

pub use catalog::Catalog;
pub use product::{Category, Product, ProductId};
pub use seed::seed_catalog;

//! Cart domain module.
//!
//! The cart is the one piece of state that survives navigation within a
//! session: an aggregate accumulating (product, quantity) lines and reporting
//! a fixed-point total. Implemented as deterministic domain logic in the
//! `handle`/`apply` discipline (no IO, no storage); [`CartSession`] is the
//! owned facade the presentation layer drives.

pub mod cart;
pub mod session;

pub use cart::{
    AddProduct, Cart, CartCommand, CartEvent, CartId, CartLine, CartOpened, ChangeQuantity,
    OpenCart, ProductAdded, ProductRemoved, QuantityChanged, RemoveProduct,
};
pub use session::CartSession;

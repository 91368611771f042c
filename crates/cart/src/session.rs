use chrono::Utc;

use bazaar_catalog::{Product, ProductId};
use bazaar_core::{Aggregate, AggregateId, DomainResult, Money};

use crate::cart::{
    AddProduct, Cart, CartCommand, CartId, CartLine, ChangeQuantity, OpenCart, RemoveProduct,
};

/// Owned cart session: the facade the presentation layer holds.
///
/// Exactly one caller owns a session and drives it synchronously; the cart
/// never lives in ambient/global state. The session resolves each call into a
/// command, runs it through the aggregate and applies the resulting events.
#[derive(Debug, Clone)]
pub struct CartSession {
    cart: Cart,
}

impl CartSession {
    /// Open a fresh cart for this session.
    pub fn open() -> DomainResult<Self> {
        let cart_id = CartId::new(AggregateId::new());
        let mut session = Self {
            cart: Cart::empty(cart_id),
        };
        session.run(CartCommand::OpenCart(OpenCart {
            cart_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::debug!(cart_id = %cart_id, "cart session opened");
        Ok(session)
    }

    /// Add `quantity` units of a catalog product.
    ///
    /// Repeated adds of the same product merge into one line. The discounted
    /// price is snapshotted at add time. Non-positive quantities are rejected
    /// with a validation error rather than silently accepted.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> DomainResult<()> {
        self.run(CartCommand::AddProduct(AddProduct {
            cart_id: self.cart.id_typed(),
            product_id: product.id_typed(),
            name: product.name().to_string(),
            unit_price: product.discounted_price(),
            quantity,
            occurred_at: Utc::now(),
        }))?;
        tracing::debug!(
            product = product.name(),
            quantity,
            total = %self.cart.total_price(),
            "product added to cart"
        );
        Ok(())
    }

    /// Drop a product's line entirely.
    pub fn remove_product(&mut self, product_id: ProductId) -> DomainResult<()> {
        self.run(CartCommand::RemoveProduct(RemoveProduct {
            cart_id: self.cart.id_typed(),
            product_id,
            occurred_at: Utc::now(),
        }))
    }

    /// Replace a line's quantity. Floors at one unit; use
    /// [`CartSession::remove_product`] to drop the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        self.run(CartCommand::ChangeQuantity(ChangeQuantity {
            cart_id: self.cart.id_typed(),
            product_id,
            quantity,
            occurred_at: Utc::now(),
        }))
    }

    /// Current lines in first-added order.
    pub fn items(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Cart total; `Display` renders the two-fraction-digit decimal string.
    pub fn total_price(&self) -> Money {
        self.cart.total_price()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    fn run(&mut self, command: CartCommand) -> DomainResult<()> {
        let events = self.cart.handle(&command)?;
        for event in &events {
            self.cart.apply(event);
        }
        Ok(())
    }
}

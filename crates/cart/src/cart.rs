use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_catalog::ProductId;
use bazaar_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money};
use bazaar_events::Event;

/// Cart identifier (one cart per user session).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line: one distinct product and its accumulated quantity.
///
/// `unit_price` snapshots the discounted price at the time the product was
/// first added. Quantity is strictly positive; a zero-quantity line never
/// exists (removal is an explicit command, not a decrement to zero).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Display name snapshot, so line rendering needs no catalog lookup.
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    /// Line subtotal (`unit_price * quantity`).
    pub fn subtotal(&self) -> Money {
        self.unit_price.saturating_mul(self.quantity as u64)
    }
}

/// Aggregate root: Cart.
///
/// A cart has a single open state for its whole life: it is created at
/// session start and discarded with the session. There is no checkout
/// transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    id: CartId,
    lines: Vec<CartLine>,
    version: u64,
    opened: bool,
}

impl Cart {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            version: 0,
            opened: false,
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Lines in first-added order. The slice borrows the cart immutably, so
    /// callers cannot mutate cart state through it.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn distinct_products(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<i64> {
        self.line_of(product_id).map(|line| line.quantity)
    }

    /// Sum of line subtotals.
    ///
    /// Commands reject additions that would overflow, so the saturation in
    /// here never engages for command-driven carts; it backs up hand-built
    /// event streams.
    pub fn total_price(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc.saturating_add(line.subtotal()))
    }

    fn line_of(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCart {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProduct {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub name: String,
    /// Discounted price snapshot in smallest currency unit.
    pub unit_price: Money,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveProduct {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQuantity {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    OpenCart(OpenCart),
    AddProduct(AddProduct),
    RemoveProduct(RemoveProduct),
    ChangeQuantity(ChangeQuantity),
}

/// Event: CartOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartOpened {
    pub cart_id: CartId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAdded {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRemoved {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    CartOpened(CartOpened),
    ProductAdded(ProductAdded),
    ProductRemoved(ProductRemoved),
    QuantityChanged(QuantityChanged),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartOpened(_) => "cart.opened",
            CartEvent::ProductAdded(_) => "cart.product_added",
            CartEvent::ProductRemoved(_) => "cart.product_removed",
            CartEvent::QuantityChanged(_) => "cart.quantity_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::CartOpened(e) => e.occurred_at,
            CartEvent::ProductAdded(e) => e.occurred_at,
            CartEvent::ProductRemoved(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::CartOpened(e) => {
                self.id = e.cart_id;
                self.lines.clear();
                self.opened = true;
            }
            CartEvent::ProductAdded(e) => {
                // One line per distinct product: repeated adds accumulate.
                match self.lines.iter_mut().find(|l| l.product_id == e.product_id) {
                    Some(line) => {
                        line.quantity = line.quantity.saturating_add(e.quantity);
                    }
                    None => self.lines.push(CartLine {
                        product_id: e.product_id,
                        name: e.name.clone(),
                        unit_price: e.unit_price,
                        quantity: e.quantity,
                    }),
                }
            }
            CartEvent::ProductRemoved(e) => {
                self.lines.retain(|l| l.product_id != e.product_id);
            }
            CartEvent::QuantityChanged(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == e.product_id) {
                    line.quantity = e.quantity;
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::OpenCart(cmd) => self.handle_open(cmd),
            CartCommand::AddProduct(cmd) => self.handle_add(cmd),
            CartCommand::RemoveProduct(cmd) => self.handle_remove(cmd),
            CartCommand::ChangeQuantity(cmd) => self.handle_change_quantity(cmd),
        }
    }
}

impl Cart {
    fn ensure_cart_id(&self, cart_id: CartId) -> Result<(), DomainError> {
        if self.id != cart_id {
            return Err(DomainError::invariant("cart_id mismatch"));
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if !self.opened {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    /// Reject any command whose accepted total could not be represented.
    fn ensure_representable(&self, prospective_total: Option<Money>) -> Result<Money, DomainError> {
        prospective_total.ok_or_else(|| {
            DomainError::validation("cart total would exceed the representable amount")
        })
    }

    fn handle_open(&self, cmd: &OpenCart) -> Result<Vec<CartEvent>, DomainError> {
        if self.opened {
            return Err(DomainError::conflict("cart is already open"));
        }

        Ok(vec![CartEvent::CartOpened(CartOpened {
            cart_id: cmd.cart_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add(&self, cmd: &AddProduct) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let addition = cmd.unit_price.checked_mul(cmd.quantity as u64);
        let prospective = addition.and_then(|a| self.total_price().checked_add(a));
        self.ensure_representable(prospective)?;

        Ok(vec![CartEvent::ProductAdded(ProductAdded {
            cart_id: cmd.cart_id,
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            unit_price: cmd.unit_price,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveProduct) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        if self.line_of(cmd.product_id).is_none() {
            return Err(DomainError::not_found());
        }

        Ok(vec![CartEvent::ProductRemoved(ProductRemoved {
            cart_id: cmd.cart_id,
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_quantity(&self, cmd: &ChangeQuantity) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_open()?;
        self.ensure_cart_id(cmd.cart_id)?;

        // Quantity floors at one; dropping a line is an explicit removal.
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be at least one"));
        }

        let line = self
            .line_of(cmd.product_id)
            .ok_or_else(DomainError::not_found)?;

        let remainder = self
            .total_price()
            .minor_units()
            .saturating_sub(line.subtotal().minor_units());
        let prospective = line
            .unit_price
            .checked_mul(cmd.quantity as u64)
            .and_then(|m| m.checked_add(Money::from_minor_units(remainder)));
        self.ensure_representable(prospective)?;

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            cart_id: cmd.cart_id,
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cart_id() -> CartId {
        CartId::new(AggregateId::new())
    }

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn open_cart() -> (Cart, CartId) {
        let cart_id = test_cart_id();
        let mut cart = Cart::empty(cart_id);
        let events = cart
            .handle(&CartCommand::OpenCart(OpenCart {
                cart_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        cart.apply(&events[0]);
        (cart, cart_id)
    }

    fn add(cart: &mut Cart, cart_id: CartId, product_id: ProductId, price: &str, quantity: i64) {
        let events = cart
            .handle(&CartCommand::AddProduct(AddProduct {
                cart_id,
                product_id,
                name: "Test Product".to_string(),
                unit_price: price.parse().unwrap(),
                quantity,
                occurred_at: test_time(),
            }))
            .unwrap();
        cart.apply(&events[0]);
    }

    #[test]
    fn open_cart_emits_cart_opened_event() {
        let cart_id = test_cart_id();
        let cart = Cart::empty(cart_id);
        let events = cart
            .handle(&CartCommand::OpenCart(OpenCart {
                cart_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            CartEvent::CartOpened(e) => assert_eq!(e.cart_id, cart_id),
            _ => panic!("Expected CartOpened event"),
        }
    }

    #[test]
    fn cannot_open_cart_twice() {
        let (cart, cart_id) = open_cart();
        let err = cart
            .handle(&CartCommand::OpenCart(OpenCart {
                cart_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for reopening cart"),
        }
    }

    #[test]
    fn empty_cart_total_formats_as_zero() {
        let (cart, _) = open_cart();
        assert_eq!(cart.total_price().to_string(), "0.00");
        assert_eq!(cart.distinct_products(), 0);
    }

    #[test]
    fn single_add_totals_the_unit_price() {
        let (mut cart, cart_id) = open_cart();
        add(&mut cart, cart_id, test_product_id(), "93", 1);
        assert_eq!(cart.total_price().to_string(), "93.00");
    }

    #[test]
    fn repeated_adds_of_same_product_accumulate_into_one_line() {
        let (mut cart, cart_id) = open_cart();
        let product_id = test_product_id();

        add(&mut cart, cart_id, product_id, "93", 1);
        add(&mut cart, cart_id, product_id, "93", 2);

        assert_eq!(cart.distinct_products(), 1);
        assert_eq!(cart.quantity_of(product_id), Some(3));
        assert_eq!(cart.total_price().to_string(), "279.00");
    }

    #[test]
    fn distinct_products_each_get_a_line_in_first_added_order() {
        let (mut cart, cart_id) = open_cart();
        let first = test_product_id();
        let second = test_product_id();

        add(&mut cart, cart_id, first, "93", 1);
        add(&mut cart, cart_id, second, "75", 1);

        assert_eq!(cart.distinct_products(), 2);
        assert_eq!(cart.lines()[0].product_id, first);
        assert_eq!(cart.lines()[1].product_id, second);
        assert_eq!(cart.total_price().to_string(), "168.00");
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let (cart, cart_id) = open_cart();
        for quantity in [0, -1] {
            let err = cart
                .handle(&CartCommand::AddProduct(AddProduct {
                    cart_id,
                    product_id: test_product_id(),
                    name: "Test Product".to_string(),
                    unit_price: "93".parse().unwrap(),
                    quantity,
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            match err {
                DomainError::Validation(msg) if msg.contains("quantity must be positive") => {}
                _ => panic!("Expected Validation error for quantity {quantity}"),
            }
        }
    }

    #[test]
    fn add_rejects_unopened_cart() {
        let cart_id = test_cart_id();
        let cart = Cart::empty(cart_id);
        let err = cart
            .handle(&CartCommand::AddProduct(AddProduct {
                cart_id,
                product_id: test_product_id(),
                name: "Test Product".to_string(),
                unit_price: "93".parse().unwrap(),
                quantity: 1,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for unopened cart"),
        }
    }

    #[test]
    fn add_rejects_unrepresentable_total() {
        let (mut cart, cart_id) = open_cart();
        let product_id = test_product_id();
        let events = cart
            .handle(&CartCommand::AddProduct(AddProduct {
                cart_id,
                product_id,
                name: "Test Product".to_string(),
                unit_price: Money::from_minor_units(u64::MAX / 2),
                quantity: 1,
                occurred_at: test_time(),
            }))
            .unwrap();
        cart.apply(&events[0]);

        let err = cart
            .handle(&CartCommand::AddProduct(AddProduct {
                cart_id,
                product_id,
                name: "Test Product".to_string(),
                unit_price: Money::from_minor_units(u64::MAX / 2),
                quantity: 3,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("representable") => {}
            _ => panic!("Expected Validation error for overflowing total"),
        }
    }

    #[test]
    fn remove_product_drops_its_line() {
        let (mut cart, cart_id) = open_cart();
        let keep = test_product_id();
        let drop = test_product_id();
        add(&mut cart, cart_id, keep, "93", 1);
        add(&mut cart, cart_id, drop, "75", 2);

        let events = cart
            .handle(&CartCommand::RemoveProduct(RemoveProduct {
                cart_id,
                product_id: drop,
                occurred_at: test_time(),
            }))
            .unwrap();
        cart.apply(&events[0]);

        assert_eq!(cart.distinct_products(), 1);
        assert_eq!(cart.lines()[0].product_id, keep);
        assert_eq!(cart.total_price().to_string(), "93.00");
    }

    #[test]
    fn remove_rejects_absent_product() {
        let (cart, cart_id) = open_cart();
        let err = cart
            .handle(&CartCommand::RemoveProduct(RemoveProduct {
                cart_id,
                product_id: test_product_id(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for absent product"),
        }
    }

    #[test]
    fn change_quantity_replaces_the_line_quantity() {
        let (mut cart, cart_id) = open_cart();
        let product_id = test_product_id();
        add(&mut cart, cart_id, product_id, "93", 5);

        let events = cart
            .handle(&CartCommand::ChangeQuantity(ChangeQuantity {
                cart_id,
                product_id,
                quantity: 2,
                occurred_at: test_time(),
            }))
            .unwrap();
        cart.apply(&events[0]);

        assert_eq!(cart.quantity_of(product_id), Some(2));
        assert_eq!(cart.total_price().to_string(), "186.00");
    }

    #[test]
    fn change_quantity_floors_at_one() {
        let (mut cart, cart_id) = open_cart();
        let product_id = test_product_id();
        add(&mut cart, cart_id, product_id, "93", 2);

        for quantity in [0, -3] {
            let err = cart
                .handle(&CartCommand::ChangeQuantity(ChangeQuantity {
                    cart_id,
                    product_id,
                    quantity,
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            match err {
                DomainError::Validation(msg) if msg.contains("at least one") => {}
                _ => panic!("Expected Validation error for quantity {quantity}"),
            }
        }
        assert_eq!(cart.quantity_of(product_id), Some(2));
    }

    #[test]
    fn change_quantity_rejects_absent_product() {
        let (cart, cart_id) = open_cart();
        let err = cart
            .handle(&CartCommand::ChangeQuantity(ChangeQuantity {
                cart_id,
                product_id: test_product_id(),
                quantity: 1,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for absent product"),
        }
    }

    #[test]
    fn version_increments_on_apply() {
        let (mut cart, cart_id) = open_cart();
        assert_eq!(cart.version(), 1);

        add(&mut cart, cart_id, test_product_id(), "93", 1);
        assert_eq!(cart.version(), 2);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (cart, cart_id) = open_cart();
        let before = cart.clone();

        let cmd = CartCommand::AddProduct(AddProduct {
            cart_id,
            product_id: test_product_id(),
            name: "Test Product".to_string(),
            unit_price: "93".parse().unwrap(),
            quantity: 1,
            occurred_at: test_time(),
        });

        let events1 = cart.handle(&cmd).unwrap();
        let events2 = cart.handle(&cmd).unwrap();

        assert_eq!(cart, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn apply_is_deterministic() {
        let cart_id = test_cart_id();
        let product_id = test_product_id();
        let events = vec![
            CartEvent::CartOpened(CartOpened {
                cart_id,
                occurred_at: test_time(),
            }),
            CartEvent::ProductAdded(ProductAdded {
                cart_id,
                product_id,
                name: "Test Product".to_string(),
                unit_price: "93".parse().unwrap(),
                quantity: 2,
                occurred_at: test_time(),
            }),
            CartEvent::QuantityChanged(QuantityChanged {
                cart_id,
                product_id,
                quantity: 4,
                occurred_at: test_time(),
            }),
        ];

        let mut cart1 = Cart::empty(cart_id);
        let mut cart2 = Cart::empty(cart_id);
        for event in &events {
            cart1.apply(event);
            cart2.apply(event);
        }

        assert_eq!(cart1, cart2);
        assert_eq!(cart1.version(), 3);
        assert_eq!(cart1.quantity_of(product_id), Some(4));
        assert_eq!(cart1.total_price().to_string(), "372.00");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: for any sequence of adds of the same product, the
            /// cart holds exactly one line whose quantity is the sum.
            #[test]
            fn same_product_adds_accumulate(quantities in proptest::collection::vec(1i64..=1_000, 1..20)) {
                let (mut cart, cart_id) = open_cart();
                let product_id = test_product_id();

                for &quantity in &quantities {
                    add(&mut cart, cart_id, product_id, "93", quantity);
                }

                let expected: i64 = quantities.iter().sum();
                prop_assert_eq!(cart.distinct_products(), 1);
                prop_assert_eq!(cart.quantity_of(product_id), Some(expected));
            }

            /// Property: one line per distinct product, in first-added order.
            #[test]
            fn distinct_products_keep_distinct_lines(count in 1usize..20) {
                let (mut cart, cart_id) = open_cart();
                let ids: Vec<ProductId> = (0..count).map(|_| test_product_id()).collect();

                for &product_id in &ids {
                    add(&mut cart, cart_id, product_id, "75", 1);
                }

                prop_assert_eq!(cart.distinct_products(), count);
                let order: Vec<ProductId> = cart.lines().iter().map(|l| l.product_id).collect();
                prop_assert_eq!(order, ids);
            }

            /// Property: the total equals the exact fixed-point sum of
            /// unit_price * quantity and never decreases across adds.
            #[test]
            fn total_is_exact_and_monotone(
                adds in proptest::collection::vec((1u64..=1_000_000u64, 1i64..=100), 1..20)
            ) {
                let (mut cart, cart_id) = open_cart();
                let mut expected: u64 = 0;
                let mut previous = cart.total_price();

                for &(minor, quantity) in &adds {
                    let product_id = test_product_id();
                    let events = cart
                        .handle(&CartCommand::AddProduct(AddProduct {
                            cart_id,
                            product_id,
                            name: "Test Product".to_string(),
                            unit_price: Money::from_minor_units(minor),
                            quantity,
                            occurred_at: test_time(),
                        }))
                        .unwrap();
                    cart.apply(&events[0]);

                    expected += minor * quantity as u64;
                    let current = cart.total_price();
                    prop_assert!(current >= previous);
                    previous = current;
                }

                prop_assert_eq!(cart.total_price(), Money::from_minor_units(expected));
            }
        }
    }
}

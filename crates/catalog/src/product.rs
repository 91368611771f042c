use serde::{Deserialize, Serialize};

use bazaar_core::{AggregateId, DomainError, DomainResult, Entity, Money};

/// Product identifier.
///
/// Cart lines key on this, not on structural equality of the whole record, so
/// two listings with identical display fields remain distinct products.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog partition a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PhoneAccessories,
    Furniture,
    RealEstate,
}

/// Immutable catalog entry.
///
/// Constructed once at catalog-load time and never mutated. Prices are
/// fixed-point [`Money`]; the display asset is an opaque key resolved by the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category: Category,
    name: String,
    image_key: String,
    original_price: Money,
    discounted_price: Money,
    offer: String,
}

impl Product {
    /// Build a validated product record.
    ///
    /// Rejects empty names and discounted prices above the original price.
    pub fn new(
        id: ProductId,
        category: Category,
        name: impl Into<String>,
        image_key: impl Into<String>,
        original_price: Money,
        discounted_price: Money,
        offer: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if discounted_price > original_price {
            return Err(DomainError::invariant(
                "discounted price cannot exceed original price",
            ));
        }

        Ok(Self {
            id,
            category,
            name,
            image_key: image_key.into(),
            original_price,
            discounted_price,
            offer: offer.into(),
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    pub fn original_price(&self) -> Money {
        self.original_price
    }

    pub fn discounted_price(&self) -> Money {
        self.discounted_price
    }

    pub fn offer(&self) -> &str {
        &self.offer
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

use std::collections::HashMap;

use bazaar_core::{DomainError, DomainResult};

use crate::product::{Category, Product, ProductId};

/// Read-only, in-memory product catalog.
///
/// Loaded once at startup and shared by reference afterwards; lookups never
/// fail hard - a miss is an explicit `None` the caller renders a fallback for.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<ProductId, usize>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from a list of products.
    ///
    /// Names must be unique: they are the lookup key the listing screens
    /// resolve detail views by.
    pub fn new(products: Vec<Product>) -> DomainResult<Self> {
        let mut by_id = HashMap::with_capacity(products.len());
        let mut by_name = HashMap::with_capacity(products.len());

        for (idx, product) in products.iter().enumerate() {
            if by_id.insert(product.id_typed(), idx).is_some() {
                return Err(DomainError::conflict(format!(
                    "duplicate product id: {}",
                    product.id_typed()
                )));
            }
            if by_name.insert(product.name().to_string(), idx).is_some() {
                return Err(DomainError::conflict(format!(
                    "duplicate product name: {}",
                    product.name()
                )));
            }
        }

        tracing::debug!(products = products.len(), "catalog loaded");

        Ok(Self {
            products,
            by_id,
            by_name,
        })
    }

    pub fn find_by_id(&self, id: ProductId) -> Option<&Product> {
        self.by_id.get(&id).map(|&idx| &self.products[idx])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.by_name.get(name).map(|&idx| &self.products[idx])
    }

    /// Products listed under a category, in catalog insertion order.
    pub fn list_by_category(&self, category: Category) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category() == category)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

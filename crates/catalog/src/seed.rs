//! Fixed demo listings.
//!
//! The application ships with a hardcoded catalog: two products per category,
//! prices and promotional text as published in the original listings.

use bazaar_core::{AggregateId, DomainResult, Money};

use crate::catalog::Catalog;
use crate::product::{Category, Product, ProductId};

fn seeded(
    category: Category,
    name: &str,
    image_key: &str,
    original: &str,
    discounted: &str,
    offer: &str,
) -> DomainResult<Product> {
    let original: Money = original.parse()?;
    let discounted: Money = discounted.parse()?;
    Product::new(
        ProductId::new(AggregateId::new()),
        category,
        name,
        image_key,
        original,
        discounted,
        offer,
    )
}

/// Build the built-in demo catalog.
pub fn seed_catalog() -> DomainResult<Catalog> {
    let products = vec![
        seeded(
            Category::PhoneAccessories,
            "iPhone 16 Pro",
            "iphone_image",
            "100",
            "93",
            "Free Protector",
        )?,
        seeded(
            Category::PhoneAccessories,
            "Google Pixel 7",
            "google_pixel_image",
            "80",
            "75",
            "Free Case",
        )?,
        seeded(
            Category::Furniture,
            "Dining Table",
            "table_image",
            "700",
            "630",
            "Buy 1 Get 1 Chair",
        )?,
        seeded(
            Category::Furniture,
            "Sofa Set",
            "table_image",
            "500",
            "450",
            "10% Off",
        )?,
        seeded(
            Category::RealEstate,
            "2 BHK Apartment",
            "house_image",
            "100000",
            "95000",
            "5% Discount",
        )?,
        seeded(
            Category::RealEstate,
            "Commercial Office Space",
            "house_image",
            "200000",
            "190000",
            "Includes Parking",
        )?,
    ];

    Catalog::new(products)
}

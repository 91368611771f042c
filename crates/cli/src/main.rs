//! Demo presentation shim.
//!
//! Stands in for the mobile UI: seeds the catalog, opens a cart session and
//! walks the same flow the listing/detail/cart screens drive.

use anyhow::{Context, Result};

use bazaar_cart::CartSession;
use bazaar_catalog::{seed_catalog, Catalog, Category};

const CATEGORIES: [(Category, &str); 3] = [
    (Category::PhoneAccessories, "Phone & Accessories"),
    (Category::Furniture, "Furniture Services"),
    (Category::RealEstate, "Real Estate Services"),
];

fn print_listings(catalog: &Catalog) {
    for (category, title) in CATEGORIES {
        println!("{title}");
        for product in catalog.list_by_category(category) {
            println!(
                "  {} - {} (was {}) - {}",
                product.name(),
                product.discounted_price(),
                product.original_price(),
                product.offer()
            );
        }
    }
}

fn main() -> Result<()> {
    bazaar_observability::init();

    let catalog = seed_catalog().context("failed to load seed catalog")?;
    tracing::info!(products = catalog.len(), "catalog ready");

    print_listings(&catalog);

    let mut session = CartSession::open().context("failed to open cart session")?;

    for (name, quantity) in [("iPhone 16 Pro", 1), ("Google Pixel 7", 1), ("iPhone 16 Pro", 2)] {
        match catalog.find_by_name(name) {
            Some(product) => session
                .add_product(product, quantity)
                .with_context(|| format!("failed to add {name}"))?,
            None => tracing::warn!(name, "product not in catalog, skipping"),
        }
    }

    println!("\nCart");
    for line in session.items() {
        println!("  {} x{} = {}", line.name, line.quantity, line.subtotal());
    }
    println!("Total: {}", session.total_price());

    Ok(())
}

use rust_decimal::Decimal;

use crate::application::{CommerceError, ProductService};
use crate::domain::product::CreateProduct;

// ============================================================================
// Demo Catalogue
// ============================================================================

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    stock: i32,
    sku: &'static str,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Gold Necklace",
        description: "18k gold necklace with elegant design",
        price: 15000,
        stock: 10,
        sku: "GOLD-NECK-001",
    },
    DemoProduct {
        name: "Silver Ring",
        description: "Sterling silver ring with gemstone",
        price: 5000,
        stock: 25,
        sku: "SILVER-RING-001",
    },
    DemoProduct {
        name: "Diamond Earrings",
        description: "Beautiful diamond stud earrings",
        price: 12000,
        stock: 15,
        sku: "DIAMOND-EAR-001",
    },
    DemoProduct {
        name: "Pearl Bracelet",
        description: "Classic pearl bracelet",
        price: 3500,
        stock: 20,
        sku: "PEARL-BRAC-001",
    },
    DemoProduct {
        name: "Ruby Pendant",
        description: "Stunning ruby pendant with gold chain",
        price: 8500,
        stock: 8,
        sku: "RUBY-PEND-001",
    },
];

/// Create the demo products whose SKU is not in the catalogue yet.
/// Returns how many were created.
pub async fn seed_demo_catalogue(products: &ProductService) -> Result<usize, CommerceError> {
    let mut created = 0;

    for demo in DEMO_PRODUCTS {
        let command = CreateProduct {
            name: demo.name.to_string(),
            description: Some(demo.description.to_string()),
            price: Decimal::from(demo.price),
            currency: None,
            stock_quantity: demo.stock,
            sku: demo.sku.to_string(),
            is_active: true,
        };

        match products.create_product(command).await {
            Ok(_) => created += 1,
            Err(CommerceError::DuplicateSku(sku)) => {
                tracing::debug!(sku = %sku, "Demo product already present");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(created = created, "Demo catalogue seeded");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testkit::TestApp;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let app = TestApp::new();

        assert_eq!(seed_demo_catalogue(&app.products).await.unwrap(), 5);
        assert_eq!(seed_demo_catalogue(&app.products).await.unwrap(), 0);

        let products = app.products.list_products(false).await.unwrap();
        assert_eq!(products.len(), 5);
        let ruby = products.iter().find(|p| p.sku.as_str() == "RUBY-PEND-001").unwrap();
        assert_eq!(ruby.stock_quantity.value(), 8);
    }
}

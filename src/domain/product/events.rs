use serde::{Deserialize, Serialize};

use super::aggregate::Product;

// ============================================================================
// Product Events - facts about catalog changes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    Created(ProductCreated),
    Updated(ProductUpdated),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductCreated {
    pub product: Product,
}

/// `changes` lists the field names that were modified.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductUpdated {
    pub product: Product,
    pub changes: Vec<String>,
}

impl ProductEvent {
    pub fn product(&self) -> &Product {
        match self {
            ProductEvent::Created(e) => &e.product,
            ProductEvent::Updated(e) => &e.product,
        }
    }
}

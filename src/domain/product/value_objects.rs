use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SkuError;

// ============================================================================
// Product Value Objects
// ============================================================================

pub const SKU_MAX_LEN: usize = 50;

/// Stock keeping unit, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: &str) -> Result<Self, SkuError> {
        let value = value.trim();

        if value.is_empty() {
            return Err(SkuError::Empty);
        }
        if value.len() > SKU_MAX_LEN {
            return Err(SkuError::TooLong(value.len()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SkuError::InvalidCharacters(value.to_string()));
        }

        Ok(Self(value.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Sku::new(&value)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

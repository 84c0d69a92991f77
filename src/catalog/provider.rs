//! Keyed catalog lookup

use super::QuotaProduct;
use crate::error::{EngineError, Result};
use std::collections::HashMap;

/// Supplies the flat product list for a product/term key
pub trait CatalogProvider {
    fn catalog(&self, key: &str) -> Result<Vec<QuotaProduct>>;
}

/// In-memory provider backed by per-key lists and the unfiltered full list
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogProvider {
    by_key: HashMap<String, Vec<QuotaProduct>>,
    all: Vec<QuotaProduct>,
    /// Unknown keys are an error instead of falling back to the full list
    strict: bool,
}

impl StaticCatalogProvider {
    pub fn new(by_key: HashMap<String, Vec<QuotaProduct>>, all: Vec<QuotaProduct>) -> Self {
        Self {
            by_key,
            all,
            strict: false,
        }
    }

    /// Provider with a single unkeyed list
    pub fn from_products(all: Vec<QuotaProduct>) -> Self {
        Self::new(HashMap::new(), all)
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// The unfiltered full list
    pub fn all(&self) -> &[QuotaProduct] {
        &self.all
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn catalog(&self, key: &str) -> Result<Vec<QuotaProduct>> {
        match self.by_key.get(key) {
            Some(products) if !products.is_empty() => Ok(products.clone()),
            _ if self.strict => Err(EngineError::CatalogNotFound { key: key.to_string() }),
            _ => {
                if self.all.is_empty() {
                    return Err(EngineError::EmptyCatalog);
                }
                log::debug!("No products under key '{}', using full catalog", key);
                Ok(self.all.clone())
            }
        }
    }
}

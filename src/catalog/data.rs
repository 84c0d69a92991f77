//! Quota product definition

use crate::error::{EngineError, Result};
use crate::Money;
use serde::{Deserialize, Serialize};

/// A fixed-price purchasable unit: the credit it grants and the monthly
/// installment it costs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaProduct {
    pub credit_value: Money,
    pub installment_value: Money,
}

impl QuotaProduct {
    /// Create a product, rejecting non-positive or non-finite values
    pub fn new(credit_value: Money, installment_value: Money) -> Result<Self> {
        let product = Self {
            credit_value,
            installment_value,
        };
        if product.is_valid() {
            Ok(product)
        } else {
            Err(EngineError::InvalidProduct {
                index: 0,
                credit_value,
                installment_value,
            })
        }
    }

    /// Credit obtained per unit of installment
    pub fn efficiency(&self) -> f64 {
        self.credit_value / self.installment_value
    }

    pub fn is_valid(&self) -> bool {
        self.credit_value.is_finite()
            && self.installment_value.is_finite()
            && self.credit_value > 0.0
            && self.installment_value > 0.0
    }
}

/// Check every product in a catalog, reporting the first bad position
pub fn validate_catalog(catalog: &[QuotaProduct]) -> Result<()> {
    match catalog.iter().position(|p| !p.is_valid()) {
        Some(index) => Err(EngineError::InvalidProduct {
            index,
            credit_value: catalog[index].credit_value,
            installment_value: catalog[index].installment_value,
        }),
        None => Ok(()),
    }
}

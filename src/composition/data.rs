//! Composition value types

use crate::catalog::QuotaProduct;
use crate::Money;
use serde::{Deserialize, Serialize};

/// Which end of the efficiency ranking the search starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    /// Highest credit per installment first (fewer, higher-value units)
    #[default]
    Min,
    /// Lowest credit per installment first
    Max,
}

impl std::str::FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown preference '{}', expected 'min' or 'max'", other)),
        }
    }
}

/// `count` purchased units of one product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaSelection {
    pub product: QuotaProduct,
    pub count: u64,
}

impl QuotaSelection {
    pub fn credit(&self) -> Money {
        self.product.credit_value * self.count as f64
    }

    pub fn installment(&self) -> Money {
        self.product.installment_value * self.count as f64
    }
}

/// How the solver arrived at a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionOrigin {
    /// Produced by the ranked candidate search
    #[default]
    Search,
    /// Single-product fallback; worth logging for quality monitoring
    DegenerateFallback,
}

/// A multiset of quota products with their combined credit and installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub selections: Vec<QuotaSelection>,
    pub total_credit: Money,
    pub total_installment: Money,
    pub origin: CompositionOrigin,
}

impl Composition {
    /// Build from selections, dropping zero-count lines and recomputing totals
    pub fn from_selections(selections: Vec<QuotaSelection>, origin: CompositionOrigin) -> Self {
        let selections: Vec<QuotaSelection> = selections.into_iter().filter(|s| s.count > 0).collect();
        let total_credit = selections.iter().map(QuotaSelection::credit).sum();
        let total_installment = selections.iter().map(QuotaSelection::installment).sum();
        Self {
            selections,
            total_credit,
            total_installment,
            origin,
        }
    }

    pub fn single(product: QuotaProduct, count: u64, origin: CompositionOrigin) -> Self {
        Self::from_selections(vec![QuotaSelection { product, count }], origin)
    }

    /// Amount by which the total installment overshoots `target`
    pub fn excess_over(&self, target: Money) -> Money {
        (self.total_installment - target).max(0.0)
    }

    pub fn unit_count(&self) -> u64 {
        self.selections.iter().map(|s| s.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == CompositionOrigin::DegenerateFallback
    }
}

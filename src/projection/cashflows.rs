//! Projection output rows

use crate::Money;
use serde::{Deserialize, Serialize};

/// One cycle of the flat multi-acquisition model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleProjection {
    /// 1-indexed cycle number
    pub cycle_index: u32,
    pub active_obligations: u32,
    /// Combined value of every asset acquired so far
    pub patrimony: Money,
    pub monthly_obligation: Money,
    pub monthly_income: Money,
    /// Always `monthly_income - monthly_obligation`
    pub monthly_profit: Money,
}

/// Year-end snapshot of the single-asset cash accumulation model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyPoint {
    pub year: u32,
    pub asset_value: Money,
    pub cash_balance: Money,
    pub total_wealth: Money,
}

/// Result of one projection, shaped by the asset model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", content = "rows")]
pub enum ProjectionResult {
    #[serde(rename = "flat-multi-acquisition")]
    Cycles(Vec<CycleProjection>),
    #[serde(rename = "single-asset-cash-accumulation")]
    Yearly(Vec<YearlyPoint>),
}

impl ProjectionResult {
    pub fn cycles(&self) -> Option<&[CycleProjection]> {
        match self {
            Self::Cycles(rows) => Some(rows),
            Self::Yearly(_) => None,
        }
    }

    pub fn yearly(&self) -> Option<&[YearlyPoint]> {
        match self {
            Self::Yearly(rows) => Some(rows),
            Self::Cycles(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Cycles(rows) => rows.len(),
            Self::Yearly(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

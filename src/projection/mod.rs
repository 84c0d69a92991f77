//! Multi-cycle projection of an aggregate credit and installment

mod config;
mod engine;
mod cashflows;
pub mod compounding;

pub use config::{AssetModel, SimulationConfig};
pub use engine::{Aggregate, ProjectionEngine};
pub use cashflows::{CycleProjection, ProjectionResult, YearlyPoint};

use crate::error::Result;

// ============================================================================
// Default Projection Parameters
// ============================================================================
// Asset appreciation compounds per elapsed year over 5-year cycles; income
// is a monthly yield on patrimony. Older obligations mature as new ones are
// taken on, so at most three run at once.

/// Default annual asset appreciation (4%)
pub const DEFAULT_APPRECIATION_RATE: f64 = 0.04;

/// Default monthly yield on patrimony or cash (1%)
pub const DEFAULT_MONTHLY_YIELD_RATE: f64 = 0.01;

pub const DEFAULT_CYCLE_COUNT: u32 = 4;

/// 5-year cycles
pub const DEFAULT_CYCLE_LENGTH_MONTHS: u32 = 60;

pub const DEFAULT_MAX_CONCURRENT_OBLIGATIONS: u32 = 3;

/// Default administrative share of each installment while the contract is active (20%)
pub const DEFAULT_FEE_RATIO: f64 = 0.20;

/// Default contract term before installments are invested in full (15 years)
pub const DEFAULT_ACTIVE_PERIOD_MONTHS: u32 = 180;

/// Upper bound accepted for `cycle_count`
pub const MAX_CYCLE_COUNT: u32 = 1_000;

/// Upper bound accepted for the projection horizon (1000 years)
pub const MAX_HORIZON_MONTHS: u32 = 12_000;

/// Project an aggregate under `config`; the asset model is selected by `config.model`
pub fn project_cycles(aggregate: &Aggregate, config: &SimulationConfig) -> Result<ProjectionResult> {
    ProjectionEngine::new(config.clone())?.project(aggregate)
}

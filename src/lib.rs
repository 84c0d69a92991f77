//! Quota Engine - credit-quota composition and multi-cycle investment projection
//!
//! This library provides:
//! - Bounded search for a combination of fixed-price quota products covering a
//!   target monthly installment
//! - Read-through memoization of composition results
//! - Deterministic cycle-by-cycle projection of the resulting credit and
//!   installment into patrimony, income and profit, under two asset models

pub mod catalog;
pub mod composition;
pub mod error;
pub mod projection;
pub mod session;

/// Monetary amount
pub type Money = f64;

/// Rate as a decimal fraction (0.01 = 1%)
pub type Rate = f64;

/// Tolerance when comparing a composed installment against its target
pub const MONEY_EPSILON: f64 = 1e-9;

// Re-export commonly used types
pub use catalog::{CatalogProvider, QuotaProduct, StaticCatalogProvider};
pub use composition::{
    solve_composition, Composition, CompositionCache, CompositionOrigin, CompositionSolver, Preference,
    QuotaSelection, SearchStrategy, SharedCompositionCache,
};
pub use error::{EngineError, Result};
pub use projection::{
    project_cycles, Aggregate, AssetModel, CycleProjection, ProjectionEngine, ProjectionResult, SimulationConfig,
    YearlyPoint,
};
pub use session::{SimulationOutcome, SimulationSession};

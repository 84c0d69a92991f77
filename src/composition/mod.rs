//! Composition of quota products covering a target monthly installment

mod data;
mod solver;
mod cache;

pub use data::{Composition, CompositionOrigin, Preference, QuotaSelection};
pub use solver::{
    CompositionSolver, SearchStats, SearchStrategy,
    DEFAULT_BATCH_LIMIT, DEFAULT_CANDIDATE_LIMIT, DEFAULT_MAX_SPAN_CENTS, MAX_CANDIDATE_LIMIT, MAX_SPAN_CENTS, MAX_UNITS,
};
pub use cache::{CacheKey, CompositionCache, SharedCompositionCache};

use crate::catalog::QuotaProduct;
use crate::error::Result;
use crate::Money;

/// Solve with the default bounded greedy search
pub fn solve_composition(catalog: &[QuotaProduct], target: Money, preference: Preference) -> Result<Composition> {
    CompositionSolver::default().solve(catalog, target, preference)
}

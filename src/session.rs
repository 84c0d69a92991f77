//! Per-session pipeline: catalog → cached composition → projection

use crate::catalog::{CatalogProvider, QuotaProduct};
use crate::composition::{Composition, CompositionSolver, Preference, SharedCompositionCache};
use crate::error::Result;
use crate::projection::{Aggregate, ProjectionEngine, ProjectionResult, SimulationConfig};
use crate::Money;
use serde::{Deserialize, Serialize};

/// Composition and projection for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub target: Money,
    pub preference: Preference,
    pub composition: Composition,
    pub excess: Money,
    pub projection: ProjectionResult,
}

/// Solver, projector and a composition cache scoped to one session
///
/// The cache lives as long as the session and is mutex-guarded, so `run`
/// takes `&self` and one session can serve parallel callers. Drop the
/// session to discard the cache.
#[derive(Debug)]
pub struct SimulationSession {
    solver: CompositionSolver,
    engine: ProjectionEngine,
    cache: SharedCompositionCache,
}

impl SimulationSession {
    pub fn new(solver: CompositionSolver, config: SimulationConfig) -> Result<Self> {
        solver.validate()?;
        Ok(Self {
            solver,
            engine: ProjectionEngine::new(config)?,
            cache: SharedCompositionCache::new(),
        })
    }

    pub fn run(&self, catalog: &[QuotaProduct], target: Money, preference: Preference) -> Result<SimulationOutcome> {
        let composition = self.solver.solve_cached(&self.cache, catalog, target, preference)?;
        if composition.is_fallback() {
            log::warn!(
                "Target {:.2} composed by single-product fallback ({} units)",
                target,
                composition.unit_count()
            );
        }

        let projection = self.engine.project(&Aggregate::from(&composition))?;
        Ok(SimulationOutcome {
            target,
            preference,
            excess: composition.excess_over(target),
            composition,
            projection,
        })
    }

    /// Look up the catalog for `key`, then run
    pub fn run_for_key<P: CatalogProvider>(
        &self,
        provider: &P,
        key: &str,
        target: Money,
        preference: Preference,
    ) -> Result<SimulationOutcome> {
        let catalog = provider.catalog(key)?;
        self.run(&catalog, target, preference)
    }

    /// (hits, misses, entries)
    pub fn cache_stats(&self) -> (u64, u64, usize) {
        self.cache.stats()
    }

    pub fn config(&self) -> &SimulationConfig {
        self.engine.config()
    }
}

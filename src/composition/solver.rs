//! Bounded candidate search for a quota composition covering a target installment
//!
//! The catalog is ranked by efficiency ratio, only the top candidates are
//! explored, and each candidate is filled greedily in bounded batches. The
//! result is deterministic for a fixed catalog and target but is not a
//! globally minimal-excess cover; `SearchStrategy::MinimalExcess` provides
//! that over the same candidate set.

use super::{CacheKey, Composition, CompositionOrigin, Preference, QuotaSelection, SharedCompositionCache};
use crate::catalog::{validate_catalog, QuotaProduct};
use crate::error::{EngineError, Result};
use crate::{Money, MONEY_EPSILON};
use serde::{Deserialize, Serialize};

/// Number of ranked products tried as starting candidates
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Maximum units added to a candidate in one batch step
pub const DEFAULT_BATCH_LIMIT: u32 = 10;

/// Largest target-plus-slack range (in cents) the covering table may span
pub const DEFAULT_MAX_SPAN_CENTS: u64 = 2_000_000;

/// Upper bound accepted for `candidate_limit`
pub const MAX_CANDIDATE_LIMIT: usize = 100;

/// Upper bound accepted for `max_span_cents` (40 MB of back-pointers)
pub const MAX_SPAN_CENTS: u64 = 20_000_000;

/// Most units a single selection may hold; beyond 2^53 counts stop being exact as f64
pub const MAX_UNITS: u64 = 1 << 53;

const UNREACHABLE: u16 = u16::MAX;
const ORIGIN: u16 = u16::MAX - 1;

/// How candidates are turned into a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Fill each candidate alone in bounded batches, keep the smallest excess
    #[default]
    GreedyBatchFill,
    /// Exact bin-covering over the candidates in integer cents; may mix
    /// products. Falls back to greedy fill when the span is too large.
    MinimalExcess { max_span_cents: u64 },
}

impl SearchStrategy {
    pub fn minimal_excess() -> Self {
        Self::MinimalExcess {
            max_span_cents: DEFAULT_MAX_SPAN_CENTS,
        }
    }
}

/// Instrumentation collected during one solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub candidates_examined: usize,
    pub batches: u64,
    pub largest_batch: u32,
}

/// Composition solver with its search bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSolver {
    #[serde(default)]
    pub strategy: SearchStrategy,

    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,
}

fn default_candidate_limit() -> usize { DEFAULT_CANDIDATE_LIMIT }
fn default_batch_limit() -> u32 { DEFAULT_BATCH_LIMIT }

impl Default for CompositionSolver {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::GreedyBatchFill,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

impl CompositionSolver {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CANDIDATE_LIMIT).contains(&self.candidate_limit) {
            return Err(EngineError::invalid_config(format!(
                "candidate_limit must be within 1..={}, got {}",
                MAX_CANDIDATE_LIMIT, self.candidate_limit
            )));
        }
        if self.batch_limit == 0 {
            return Err(EngineError::invalid_config("batch_limit must be at least 1"));
        }
        if let SearchStrategy::MinimalExcess { max_span_cents } = self.strategy {
            if max_span_cents > MAX_SPAN_CENTS {
                return Err(EngineError::invalid_config(format!(
                    "max_span_cents must be at most {}, got {}",
                    MAX_SPAN_CENTS, max_span_cents
                )));
            }
        }
        Ok(())
    }

    /// Find a composition whose total installment meets or slightly exceeds `target`
    pub fn solve(&self, catalog: &[QuotaProduct], target: Money, preference: Preference) -> Result<Composition> {
        self.solve_with_stats(catalog, target, preference)
            .map(|(composition, _)| composition)
    }

    /// Solve through a read-through cache keyed by target, preference and catalog size
    ///
    /// Errors are returned without being cached.
    pub fn solve_cached(
        &self,
        cache: &SharedCompositionCache,
        catalog: &[QuotaProduct],
        target: Money,
        preference: Preference,
    ) -> Result<Composition> {
        let key = CacheKey::new(target, preference, catalog.len());
        cache.get_or_compute(key, || self.solve(catalog, target, preference))
    }

    /// Same as `solve`, also reporting how much work the search did
    pub fn solve_with_stats(
        &self,
        catalog: &[QuotaProduct],
        target: Money,
        preference: Preference,
    ) -> Result<(Composition, SearchStats)> {
        self.validate()?;
        check_preconditions(catalog, target)?;

        let ranked = rank(catalog, preference);
        let limit = self.candidate_limit.min(ranked.len());
        let candidates = &ranked[..limit];
        let mut stats = SearchStats::default();

        let searched = match self.strategy {
            SearchStrategy::GreedyBatchFill => self.greedy(candidates, target, &mut stats),
            SearchStrategy::MinimalExcess { max_span_cents } => {
                minimal_excess(candidates, target, max_span_cents, &mut stats)
                    .or_else(|| self.greedy(candidates, target, &mut stats))
            }
        };

        let composition = match searched {
            Some(composition) => composition,
            None => {
                log::debug!("No candidate covered target {:.2}, using single-product fallback", target);
                fallback(catalog, target)?
            }
        };

        log::debug!(
            "Composed {} units over {} lines for target {:.2} (excess {:.2}, {} candidates, {} batches)",
            composition.unit_count(),
            composition.selections.len(),
            target,
            composition.excess_over(target),
            stats.candidates_examined,
            stats.batches,
        );

        Ok((composition, stats))
    }

    fn greedy(&self, candidates: &[QuotaProduct], target: Money, stats: &mut SearchStats) -> Option<Composition> {
        let mut best: Option<(Money, Composition)> = None;

        for (rank, product) in candidates.iter().enumerate() {
            stats.candidates_examined = stats.candidates_examined.max(rank + 1);

            let Some(count) = self.fill(product, target, stats) else {
                log::debug!(
                    "Candidate {} (installment {:.2}) needs more than {} units, skipped",
                    rank,
                    product.installment_value,
                    MAX_UNITS,
                );
                continue;
            };

            let composition = Composition::single(*product, count, CompositionOrigin::Search);
            let excess = composition.excess_over(target);
            // Strictly smaller only: earlier rank wins ties
            if best.as_ref().map_or(true, |(best_excess, _)| excess < *best_excess) {
                best = Some((excess, composition));
            }
        }

        best.map(|(_, composition)| composition)
    }

    /// Units of `product` needed to cover `target`, added in bounded batches
    ///
    /// Runs of full batches are added in one step and still counted one by
    /// one in `stats`, so the work is constant however large the target.
    /// `None` when the count would exceed `MAX_UNITS`.
    fn fill(&self, product: &QuotaProduct, target: Money, stats: &mut SearchStats) -> Option<u64> {
        let batch_limit = u64::from(self.batch_limit.max(1));
        let mut count: u64 = 0;

        loop {
            let shortfall = target - product.installment_value * count as f64;
            if count > 0 && shortfall <= MONEY_EPSILON {
                return Some(count);
            }

            // At least one unit per batch so the total strictly increases
            let needed = (shortfall / product.installment_value).ceil().max(1.0);
            if !(needed <= MAX_UNITS as f64) {
                return None;
            }
            let needed = needed as u64;

            if needed > batch_limit {
                let full = (needed - 1) / batch_limit;
                count = count.checked_add(full * batch_limit)?;
                stats.batches += full;
                stats.largest_batch = stats.largest_batch.max(batch_limit as u32);
            } else {
                count = count.checked_add(needed)?;
                stats.batches += 1;
                stats.largest_batch = stats.largest_batch.max(needed as u32);
            }
            if count > MAX_UNITS {
                return None;
            }
        }
    }
}

fn check_preconditions(catalog: &[QuotaProduct], target: Money) -> Result<()> {
    if catalog.is_empty() {
        return Err(EngineError::EmptyCatalog);
    }
    if !(target > 0.0) {
        return Err(EngineError::NonPositiveTarget { target });
    }
    validate_catalog(catalog)
}

/// Order by efficiency ratio; stable, so equal ratios keep catalog order
fn rank(catalog: &[QuotaProduct], preference: Preference) -> Vec<QuotaProduct> {
    let mut ranked = catalog.to_vec();
    match preference {
        Preference::Min => ranked.sort_by(|a, b| b.efficiency().total_cmp(&a.efficiency())),
        Preference::Max => ranked.sort_by(|a, b| a.efficiency().total_cmp(&b.efficiency())),
    }
    ranked
}

/// Highest-installment product, enough units to cover the target
fn fallback(catalog: &[QuotaProduct], target: Money) -> Result<Composition> {
    let product = catalog
        .iter()
        .copied()
        .reduce(|best, p| if p.installment_value > best.installment_value { p } else { best })
        .ok_or(EngineError::EmptyCatalog)?;

    let units = (target / product.installment_value).ceil().max(1.0);
    if !(units <= MAX_UNITS as f64) {
        return Err(EngineError::UncoverableTarget { target, max_units: MAX_UNITS });
    }
    let mut count = units as u64;
    if product.installment_value * (count as f64) < target - MONEY_EPSILON {
        count += 1;
    }

    let composition = Composition::single(product, count, CompositionOrigin::DegenerateFallback);
    if target - composition.total_installment > MONEY_EPSILON {
        return Err(EngineError::UncoverableTarget { target, max_units: MAX_UNITS });
    }
    Ok(composition)
}

fn to_cents(value: Money) -> Option<u64> {
    let cents = (value * 100.0).round();
    if cents >= 1.0 && cents < u64::MAX as f64 {
        Some(cents as u64)
    } else {
        None
    }
}

/// Unbounded bin covering over the candidates
///
/// Finds the smallest reachable total (in cents) at or above the target.
/// Any optimum lies below `target + smallest installment`, which bounds the
/// table. Among equal totals the earlier-ranked product is preferred at
/// every step.
fn minimal_excess(
    candidates: &[QuotaProduct],
    target: Money,
    max_span_cents: u64,
    stats: &mut SearchStats,
) -> Option<Composition> {
    stats.candidates_examined = stats.candidates_examined.max(candidates.len());
    if candidates.len() >= ORIGIN as usize {
        return None;
    }

    let cents: Vec<u64> = candidates
        .iter()
        .map(|p| to_cents(p.installment_value))
        .collect::<Option<Vec<_>>>()?;
    let target_cents = ((target * 100.0) - 1e-6).ceil().max(1.0) as u64;
    let min_cents = cents.iter().copied().min()?;
    let upper = target_cents.checked_add(min_cents - 1)?;

    if upper > max_span_cents {
        log::debug!("Covering span {} cents exceeds {}, using greedy fill", upper, max_span_cents);
        return None;
    }

    let upper = upper as usize;
    let target_cents = target_cents as usize;
    let mut last = vec![UNREACHABLE; upper + 1];
    last[0] = ORIGIN;

    let mut reached = None;
    for v in 1..=upper {
        for (j, &c) in cents.iter().enumerate() {
            let c = c as usize;
            if c <= v && last[v - c] != UNREACHABLE {
                last[v] = j as u16;
                break;
            }
        }
        if v >= target_cents && last[v] != UNREACHABLE {
            reached = Some(v);
            break;
        }
    }

    let mut counts = vec![0u64; candidates.len()];
    let mut v = reached?;
    while v > 0 {
        let j = last[v] as usize;
        counts[j] += 1;
        v -= cents[j] as usize;
    }

    let selections = candidates
        .iter()
        .zip(counts)
        .map(|(product, count)| QuotaSelection { product: *product, count })
        .collect();
    let composition = Composition::from_selections(selections, CompositionOrigin::Search);

    // Sub-cent installments can round the table total above the real one
    if target - composition.total_installment > MONEY_EPSILON {
        return None;
    }
    Some(composition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_default_catalog;

    fn product(credit: f64, installment: f64) -> QuotaProduct {
        QuotaProduct { credit_value: credit, installment_value: installment }
    }

    fn two_product_catalog() -> Vec<QuotaProduct> {
        vec![product(100_000.0, 500.0), product(50_000.0, 300.0)]
    }

    #[test]
    fn test_prefers_most_efficient_exact_cover() {
        let solver = CompositionSolver::default();
        let c = solver.solve(&two_product_catalog(), 1000.0, Preference::Min).unwrap();

        assert_eq!(c.selections.len(), 1);
        assert_eq!(c.selections[0].product, product(100_000.0, 500.0));
        assert_eq!(c.selections[0].count, 2);
        assert_eq!(c.total_installment, 1000.0);
        assert_eq!(c.total_credit, 200_000.0);
        assert_eq!(c.excess_over(1000.0), 0.0);
        assert_eq!(c.origin, CompositionOrigin::Search);
    }

    #[test]
    fn test_empty_catalog() {
        let solver = CompositionSolver::default();
        assert!(matches!(solver.solve(&[], 1000.0, Preference::Min), Err(EngineError::EmptyCatalog)));
    }

    #[test]
    fn test_non_positive_target() {
        let solver = CompositionSolver::default();
        let catalog = two_product_catalog();
        for target in [0.0, -50.0, f64::NAN] {
            assert!(matches!(
                solver.solve(&catalog, target, Preference::Min),
                Err(EngineError::NonPositiveTarget { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_product_rejected() {
        let solver = CompositionSolver::default();
        let catalog = vec![product(100_000.0, 500.0), product(50_000.0, 0.0)];
        assert!(matches!(
            solver.solve(&catalog, 1000.0, Preference::Min),
            Err(EngineError::InvalidProduct { index: 1, .. })
        ));
    }

    #[test]
    fn test_covers_target_and_sums_exact() {
        let catalog = load_default_catalog().expect("Failed to load catalog");
        let solvers = [
            CompositionSolver::default(),
            CompositionSolver::new(SearchStrategy::minimal_excess()),
        ];

        for solver in &solvers {
            let steps = match solver.strategy {
                SearchStrategy::GreedyBatchFill => 60,
                SearchStrategy::MinimalExcess { .. } => 15,
            };
            for preference in [Preference::Min, Preference::Max] {
                for step in 1..steps {
                    let target = step as f64 * 137.45;
                    let c = solver.solve(&catalog, target, preference).unwrap();

                    assert!(!c.selections.is_empty());
                    assert!(c.total_installment >= target - MONEY_EPSILON);

                    let credit: f64 = c.selections.iter().map(|s| s.product.credit_value * s.count as f64).sum();
                    let installment: f64 = c.selections.iter().map(|s| s.product.installment_value * s.count as f64).sum();
                    assert_eq!(c.total_credit, credit);
                    assert_eq!(c.total_installment, installment);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let catalog = load_default_catalog().expect("Failed to load catalog");
        let solver = CompositionSolver::default();
        let a = solver.solve(&catalog, 4321.0, Preference::Min).unwrap();
        let b = solver.solve(&catalog, 4321.0, Preference::Min).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_candidate_and_batch_bounds() {
        // 25 products; the exact cover sits at rank 11 and must not be reached
        let mut catalog: Vec<QuotaProduct> = (0..10).map(|i| product(90_000.0 + i as f64, 300.0)).collect();
        catalog.push(product(50_000.0, 500.0));
        catalog.extend((0..14).map(|i| product(10_000.0 + i as f64, 400.0)));

        let solver = CompositionSolver::default();
        let (c, stats) = solver.solve_with_stats(&catalog, 1000.0, Preference::Min).unwrap();

        assert_eq!(stats.candidates_examined, 10);
        assert!(stats.largest_batch <= 10);
        assert_eq!(c.selections[0].product.installment_value, 300.0);
        assert_eq!(c.total_installment, 1200.0);
    }

    #[test]
    fn test_large_shortfall_filled_in_batches() {
        let solver = CompositionSolver::default();
        let (c, stats) = solver
            .solve_with_stats(&[product(200.0, 1.0)], 95.0, Preference::Min)
            .unwrap();

        assert_eq!(c.selections[0].count, 95);
        assert_eq!(stats.batches, 10);
        assert_eq!(stats.largest_batch, 10);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let solver = CompositionSolver::default();
        let catalog = vec![product(100_000.0, 500.0), product(200_000.0, 1000.0)];
        let c = solver.solve(&catalog, 1000.0, Preference::Min).unwrap();
        assert_eq!(c.selections[0].product, catalog[0]);
        assert_eq!(c.selections[0].count, 2);
    }

    #[test]
    fn test_preference_orders_candidates() {
        let solver = CompositionSolver::default();
        let catalog = vec![product(30_000.0, 250.0), product(50_000.0, 250.0)];

        let min = solver.solve(&catalog, 1000.0, Preference::Min).unwrap();
        assert_eq!(min.selections[0].product.credit_value, 50_000.0);

        let max = solver.solve(&catalog, 1000.0, Preference::Max).unwrap();
        assert_eq!(max.selections[0].product.credit_value, 30_000.0);
    }

    #[test]
    fn test_cheap_candidate_needing_many_units_is_kept() {
        let catalog = vec![product(1000.0, 1.0), product(100_000.0, 700.0)];
        let (c, stats) = CompositionSolver::default()
            .solve_with_stats(&catalog, 10_001.0, Preference::Min)
            .unwrap();

        assert_eq!(c.origin, CompositionOrigin::Search);
        assert_eq!(c.selections.len(), 1);
        assert_eq!(c.selections[0].product, catalog[0]);
        assert_eq!(c.selections[0].count, 10_001);
        assert_eq!(c.excess_over(10_001.0), 0.0);
        // 1000 full batches of 10 plus a final single unit
        assert_eq!(stats.batches, 1_001);
        assert_eq!(stats.largest_batch, 10);
    }

    #[test]
    fn test_counts_beyond_u32_cover_target() {
        let catalog = vec![product(1000.0, 1.0)];
        let c = CompositionSolver::default().solve(&catalog, 1e10, Preference::Min).unwrap();

        assert_eq!(c.origin, CompositionOrigin::Search);
        assert_eq!(c.selections[0].count, 10_000_000_000);
        assert_eq!(c.total_installment, 1e10);
        assert_eq!(c.total_credit, 1e13);
    }

    #[test]
    fn test_degenerate_fallback() {
        // The only candidate would need ~1e18 units; the fallback product is outside the candidate set
        let solver = CompositionSolver {
            candidate_limit: 1,
            ..Default::default()
        };
        let catalog = vec![product(1e9, 1e-6), product(5000.0, 3.0)];
        let c = solver.solve(&catalog, 1e12, Preference::Min).unwrap();

        assert!(c.is_fallback());
        assert_eq!(c.selections.len(), 1);
        assert_eq!(c.selections[0].product, catalog[1]);
        assert_eq!(c.selections[0].count, 333_333_333_334);
        assert!(c.total_installment >= 1e12);
    }

    #[test]
    fn test_uncoverable_target_is_an_error() {
        let catalog = vec![product(1000.0, 1e-6)];
        assert!(matches!(
            CompositionSolver::default().solve(&catalog, 1e12, Preference::Min),
            Err(EngineError::UncoverableTarget { .. })
        ));
    }

    #[test]
    fn test_solver_bounds_validated() {
        let bad = [
            CompositionSolver { candidate_limit: 0, ..Default::default() },
            CompositionSolver { candidate_limit: MAX_CANDIDATE_LIMIT + 1, ..Default::default() },
            CompositionSolver { batch_limit: 0, ..Default::default() },
            CompositionSolver::new(SearchStrategy::MinimalExcess { max_span_cents: u64::MAX }),
        ];
        for solver in &bad {
            assert!(matches!(
                solver.solve(&two_product_catalog(), 1000.0, Preference::Min),
                Err(EngineError::InvalidConfig { .. })
            ), "{:?}", solver);
        }
        assert!(CompositionSolver::new(SearchStrategy::MinimalExcess { max_span_cents: MAX_SPAN_CENTS })
            .validate()
            .is_ok());
    }

    #[test]
    fn test_minimal_excess_mixes_products() {
        let catalog = two_product_catalog();

        let greedy = CompositionSolver::default().solve(&catalog, 800.0, Preference::Min).unwrap();
        assert_eq!(greedy.total_installment, 900.0);

        let exact = CompositionSolver::new(SearchStrategy::minimal_excess())
            .solve(&catalog, 800.0, Preference::Min)
            .unwrap();
        assert_eq!(exact.total_installment, 800.0);
        assert_eq!(exact.selections.len(), 2);
        assert_eq!(exact.total_credit, 150_000.0);
    }

    #[test]
    fn test_minimal_excess_span_limit_uses_greedy() {
        let catalog = two_product_catalog();
        let solver = CompositionSolver::new(SearchStrategy::MinimalExcess { max_span_cents: 10 });
        let c = solver.solve(&catalog, 800.0, Preference::Min).unwrap();
        assert_eq!(c, CompositionSolver::default().solve(&catalog, 800.0, Preference::Min).unwrap());
    }

    #[test]
    fn test_solver_deserializes_with_defaults() {
        let solver: CompositionSolver = serde_json::from_str(r#"{"strategy": {"kind": "greedy-batch-fill"}}"#).unwrap();
        assert_eq!(solver, CompositionSolver::default());
    }
}

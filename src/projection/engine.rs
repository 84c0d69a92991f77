//! Cycle projector for both asset models

use super::compounding::{accrue, compound_rate};
use super::{AssetModel, CycleProjection, ProjectionResult, SimulationConfig, YearlyPoint};
use crate::composition::Composition;
use crate::error::{EngineError, Result};
use crate::Money;
use serde::{Deserialize, Serialize};

/// Combined credit and monthly installment of a composition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total_credit: Money,
    pub total_installment: Money,
}

impl Aggregate {
    pub fn new(total_credit: Money, total_installment: Money) -> Self {
        Self {
            total_credit,
            total_installment,
        }
    }

    /// Refuse aggregates that would project to all zeros (e.g. from a failed composition)
    fn check(&self) -> Result<()> {
        let positive = |v: Money| v.is_finite() && v > 0.0;
        if positive(self.total_credit) && positive(self.total_installment) {
            Ok(())
        } else {
            Err(EngineError::EmptyAggregate {
                total_credit: self.total_credit,
                total_installment: self.total_installment,
            })
        }
    }
}

impl From<&Composition> for Aggregate {
    fn from(composition: &Composition) -> Self {
        Self::new(composition.total_credit, composition.total_installment)
    }
}

/// Deterministic forward projection of an aggregate under one configuration
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: SimulationConfig,
}

impl ProjectionEngine {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn project(&self, aggregate: &Aggregate) -> Result<ProjectionResult> {
        aggregate.check()?;
        let result = match self.config.model {
            AssetModel::FlatMultiAcquisition => ProjectionResult::Cycles(self.project_acquisitions(aggregate)),
            AssetModel::SingleAssetCashAccumulation => {
                ProjectionResult::Yearly(self.project_accumulation(aggregate)?)
            }
        };
        log::debug!(
            "Projected credit {:.2} / installment {:.2} over {} rows ({:?})",
            aggregate.total_credit,
            aggregate.total_installment,
            result.len(),
            self.config.model,
        );
        Ok(result)
    }

    /// One asset worth the full credit per cycle; each appreciates from its
    /// own acquisition, so the running patrimony compounds by one cycle's
    /// growth and then takes the new asset at face value.
    fn project_acquisitions(&self, aggregate: &Aggregate) -> Vec<CycleProjection> {
        let config = &self.config;
        let cycle_rate = compound_rate(config.appreciation_rate, config.cycle_length_years());

        let mut patrimony = 0.0;
        let mut rows = Vec::with_capacity(config.cycle_count as usize);

        for cycle in 1..=config.cycle_count {
            patrimony = accrue(patrimony, cycle_rate, aggregate.total_credit);

            let active_obligations = config.active_obligations(cycle);
            let monthly_obligation = aggregate.total_installment * active_obligations as f64;
            let monthly_income = patrimony * config.monthly_yield_rate;

            rows.push(CycleProjection {
                cycle_index: cycle,
                active_obligations,
                patrimony,
                monthly_obligation,
                monthly_income,
                monthly_profit: monthly_income - monthly_obligation,
            });
        }

        rows
    }

    /// Fixed asset value plus a cash balance compounding monthly; only the
    /// net-of-fee installment is invested while the contract is active
    fn project_accumulation(&self, aggregate: &Aggregate) -> Result<Vec<YearlyPoint>> {
        let config = &self.config;
        let horizon = config.horizon_months()?;
        let asset_value = aggregate.total_credit;
        let net_installment = aggregate.total_installment * (1.0 - config.fee_ratio_during_accumulation);

        let mut cash_balance = 0.0;
        let mut points = Vec::with_capacity(horizon.div_ceil(12) as usize);

        for month in 1..=horizon {
            let contribution = if month <= config.active_period_months {
                net_installment
            } else {
                aggregate.total_installment
            };
            cash_balance = accrue(cash_balance, config.monthly_yield_rate, contribution);

            // Year-end, plus a final partial year if the horizon is not whole years
            if month % 12 == 0 || month == horizon {
                points.push(YearlyPoint {
                    year: month.div_ceil(12),
                    asset_value,
                    cash_balance,
                    total_wealth: asset_value + cash_balance,
                });
            }
        }

        Ok(points)
    }
}

//! Simulation configuration and the two named projector presets

use super::{
    DEFAULT_ACTIVE_PERIOD_MONTHS, DEFAULT_APPRECIATION_RATE, DEFAULT_CYCLE_COUNT, DEFAULT_CYCLE_LENGTH_MONTHS,
    DEFAULT_FEE_RATIO, DEFAULT_MAX_CONCURRENT_OBLIGATIONS, DEFAULT_MONTHLY_YIELD_RATE, MAX_CYCLE_COUNT,
    MAX_HORIZON_MONTHS,
};
use crate::error::{EngineError, Result};
use crate::Rate;
use serde::{Deserialize, Serialize};

/// Asset model the projector runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetModel {
    /// A new asset worth the full credit is acquired every cycle; each one
    /// appreciates from its own acquisition and obligations stack up to a cap
    #[default]
    FlatMultiAcquisition,
    /// One non-appreciating asset plus a monthly-compounding cash balance
    /// fed by the installment, net of fees while the contract is active
    SingleAssetCashAccumulation,
}

/// Parameters for a projection run
///
/// The horizon is `cycle_count × cycle_length_months` for both models;
/// the flat model reports one row per cycle, the accumulation model one
/// row per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub model: AssetModel,

    #[serde(default = "default_cycle_count")]
    pub cycle_count: u32,

    #[serde(default = "default_cycle_length_months")]
    pub cycle_length_months: u32,

    /// Annual asset appreciation, compounded once per elapsed year
    #[serde(default = "default_appreciation_rate")]
    pub appreciation_rate: Rate,

    /// Monthly yield on patrimony (flat model) or cash balance (accumulation model)
    #[serde(default = "default_monthly_yield_rate")]
    pub monthly_yield_rate: Rate,

    /// Share of each installment lost to administrative fees while the
    /// contract is active (0.0 to 1.0)
    #[serde(default = "default_fee_ratio")]
    pub fee_ratio_during_accumulation: Rate,

    /// Cap on simultaneously running obligations; `None` means unbounded
    #[serde(default = "default_max_concurrent_obligations")]
    pub max_concurrent_obligations: Option<u32>,

    /// Months the contract stays in force before installments are invested in full
    #[serde(default = "default_active_period_months")]
    pub active_period_months: u32,
}

fn default_cycle_count() -> u32 { DEFAULT_CYCLE_COUNT }
fn default_cycle_length_months() -> u32 { DEFAULT_CYCLE_LENGTH_MONTHS }
fn default_appreciation_rate() -> Rate { DEFAULT_APPRECIATION_RATE }
fn default_monthly_yield_rate() -> Rate { DEFAULT_MONTHLY_YIELD_RATE }
fn default_fee_ratio() -> Rate { DEFAULT_FEE_RATIO }
fn default_max_concurrent_obligations() -> Option<u32> { Some(DEFAULT_MAX_CONCURRENT_OBLIGATIONS) }
fn default_active_period_months() -> u32 { DEFAULT_ACTIVE_PERIOD_MONTHS }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::flat_multi_acquisition()
    }
}

impl SimulationConfig {
    /// Four 5-year cycles, 4% annual appreciation, 1% monthly yield, at most
    /// three obligations running at once
    pub fn flat_multi_acquisition() -> Self {
        Self {
            model: AssetModel::FlatMultiAcquisition,
            cycle_count: DEFAULT_CYCLE_COUNT,
            cycle_length_months: DEFAULT_CYCLE_LENGTH_MONTHS,
            appreciation_rate: DEFAULT_APPRECIATION_RATE,
            monthly_yield_rate: DEFAULT_MONTHLY_YIELD_RATE,
            fee_ratio_during_accumulation: DEFAULT_FEE_RATIO,
            max_concurrent_obligations: Some(DEFAULT_MAX_CONCURRENT_OBLIGATIONS),
            active_period_months: DEFAULT_ACTIVE_PERIOD_MONTHS,
        }
    }

    /// Same horizon and yield as the flat preset, single asset with cash accumulation
    pub fn single_asset_cash_accumulation() -> Self {
        Self {
            model: AssetModel::SingleAssetCashAccumulation,
            ..Self::flat_multi_acquisition()
        }
    }

    pub fn with_model(mut self, model: AssetModel) -> Self {
        self.model = model;
        self
    }

    pub fn cycle_length_years(&self) -> f64 {
        self.cycle_length_months as f64 / 12.0
    }

    /// Total months covered by the projection
    pub fn horizon_months(&self) -> Result<u32> {
        self.cycle_count
            .checked_mul(self.cycle_length_months)
            .ok_or_else(|| EngineError::invalid_config("horizon overflows"))
    }

    /// Obligations running during 1-indexed `cycle`
    pub fn active_obligations(&self, cycle: u32) -> u32 {
        match self.max_concurrent_obligations {
            Some(cap) => cycle.min(cap),
            None => cycle,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CYCLE_COUNT).contains(&self.cycle_count) {
            return Err(EngineError::invalid_config(format!(
                "cycle_count must be within 1..={}, got {}",
                MAX_CYCLE_COUNT, self.cycle_count
            )));
        }
        if self.cycle_length_months == 0 {
            return Err(EngineError::invalid_config("cycle_length_months must be at least 1"));
        }
        let horizon = self.horizon_months()?;
        if horizon > MAX_HORIZON_MONTHS {
            return Err(EngineError::invalid_config(format!(
                "horizon of {} months exceeds {}",
                horizon, MAX_HORIZON_MONTHS
            )));
        }
        if self.max_concurrent_obligations == Some(0) {
            return Err(EngineError::invalid_config("max_concurrent_obligations must be at least 1"));
        }
        check_rate("appreciation_rate", self.appreciation_rate)?;
        check_rate("monthly_yield_rate", self.monthly_yield_rate)?;
        let fee = self.fee_ratio_during_accumulation;
        if !(0.0..=1.0).contains(&fee) {
            return Err(EngineError::invalid_config(format!(
                "fee_ratio_during_accumulation must be within 0..=1, got {}",
                fee
            )));
        }
        Ok(())
    }
}

fn check_rate(name: &str, rate: Rate) -> Result<()> {
    if rate.is_finite() && rate > -1.0 {
        Ok(())
    } else {
        Err(EngineError::invalid_config(format!("{} must be finite and above -100%, got {}", name, rate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_flat_preset() {
        let config = SimulationConfig::default();
        assert_eq!(config.model, AssetModel::FlatMultiAcquisition);
        assert_eq!(config.cycle_count, 4);
        assert_eq!(config.cycle_length_years(), 5.0);
        assert_eq!(config.max_concurrent_obligations, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_obligation_cap_sequence() {
        let config = SimulationConfig::default();
        let seq: Vec<u32> = (1..=config.cycle_count).map(|k| config.active_obligations(k)).collect();
        assert_eq!(seq, vec![1, 2, 3, 3]);

        let unbounded = SimulationConfig {
            max_concurrent_obligations: None,
            ..Default::default()
        };
        assert_eq!(unbounded.active_obligations(4), 4);
    }

    #[test]
    fn test_validation() {
        let bad = [
            SimulationConfig { cycle_count: 0, ..Default::default() },
            SimulationConfig { cycle_length_months: 0, ..Default::default() },
            SimulationConfig { max_concurrent_obligations: Some(0), ..Default::default() },
            SimulationConfig { fee_ratio_during_accumulation: 1.5, ..Default::default() },
            SimulationConfig { monthly_yield_rate: f64::NAN, ..Default::default() },
            SimulationConfig { appreciation_rate: -1.0, ..Default::default() },
            SimulationConfig { cycle_count: u32::MAX, cycle_length_months: 2, ..Default::default() },
        ];
        for config in &bad {
            assert!(matches!(config.validate(), Err(EngineError::InvalidConfig { .. })), "{:?}", config);
        }
    }

    #[test]
    fn test_horizon_bounds() {
        let huge = SimulationConfig { cycle_count: 4_000_000_000, cycle_length_months: 1, ..Default::default() };
        assert!(matches!(huge.validate(), Err(EngineError::InvalidConfig { .. })));

        let long_cycles = SimulationConfig { cycle_count: 2, cycle_length_months: 7_000, ..Default::default() };
        assert!(matches!(long_cycles.validate(), Err(EngineError::InvalidConfig { .. })));

        let at_limit = SimulationConfig {
            cycle_count: MAX_CYCLE_COUNT,
            cycle_length_months: MAX_HORIZON_MONTHS / MAX_CYCLE_COUNT,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"model": "single-asset-cash-accumulation"}"#).unwrap();
        assert_eq!(config, SimulationConfig::single_asset_cash_accumulation());

        let config: SimulationConfig =
            serde_json::from_str(r#"{"cycle_count": 6, "max_concurrent_obligations": null}"#).unwrap();
        assert_eq!(config.cycle_count, 6);
        assert_eq!(config.max_concurrent_obligations, None);
        assert_eq!(config.monthly_yield_rate, DEFAULT_MONTHLY_YIELD_RATE);
    }
}

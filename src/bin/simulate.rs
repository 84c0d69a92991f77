//! Compose and project a batch of target installments
//!
//! Outputs one row per cycle (or per year) for every target

use anyhow::Context;
use clap::{Parser, ValueEnum};
use quota_engine::catalog::loader::{load_provider_from_reader, DEFAULT_CATALOG_PATH};
use quota_engine::{
    AssetModel, CatalogProvider, CompositionSolver, EngineError, Preference, ProjectionResult, SearchStrategy,
    SimulationConfig, SimulationOutcome, SimulationSession,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flat,
    Accumulation,
}

impl From<ModelArg> for AssetModel {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Flat => AssetModel::FlatMultiAcquisition,
            ModelArg::Accumulation => AssetModel::SingleAssetCashAccumulation,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "simulate", about = "Compose quota products for target installments and project them")]
struct Args {
    /// Quota catalog CSV (product_key, credit_value, installment_value)
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Product/term key; the full catalog is used when absent or unknown
    #[arg(long)]
    key: Option<String>,

    /// Target monthly installment (repeatable)
    #[arg(long = "target", required = true, num_args = 1..)]
    targets: Vec<f64>,

    #[arg(long, default_value = "min")]
    preference: Preference,

    /// Overrides the model in --config
    #[arg(long, value_enum)]
    model: Option<ModelArg>,

    /// JSON simulation config; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimal-excess covering instead of greedy batch fill
    #[arg(long)]
    exact: bool,

    #[arg(long, default_value = "quota_projection_output.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    target: f64,
    period: u32,
    units: u64,
    total_credit: f64,
    total_installment: f64,
    active_obligations: Option<u32>,
    patrimony: Option<f64>,
    monthly_obligation: Option<f64>,
    monthly_income: Option<f64>,
    monthly_profit: Option<f64>,
    cash_balance: Option<f64>,
    total_wealth: Option<f64>,
}

fn output_rows(outcome: &SimulationOutcome) -> Vec<OutputRow> {
    let composition = &outcome.composition;
    let base = |period: u32| OutputRow {
        target: outcome.target,
        period,
        units: composition.unit_count(),
        total_credit: composition.total_credit,
        total_installment: composition.total_installment,
        active_obligations: None,
        patrimony: None,
        monthly_obligation: None,
        monthly_income: None,
        monthly_profit: None,
        cash_balance: None,
        total_wealth: None,
    };

    match &outcome.projection {
        ProjectionResult::Cycles(rows) => rows
            .iter()
            .map(|r| OutputRow {
                active_obligations: Some(r.active_obligations),
                patrimony: Some(r.patrimony),
                monthly_obligation: Some(r.monthly_obligation),
                monthly_income: Some(r.monthly_income),
                monthly_profit: Some(r.monthly_profit),
                ..base(r.cycle_index)
            })
            .collect(),
        ProjectionResult::Yearly(points) => points
            .iter()
            .map(|p| OutputRow {
                patrimony: Some(p.asset_value),
                cash_balance: Some(p.cash_balance),
                total_wealth: Some(p.total_wealth),
                ..base(p.year)
            })
            .collect(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading quota catalog from {}...", args.catalog.display());
    let file = File::open(&args.catalog)
        .with_context(|| format!("failed to open catalog {}", args.catalog.display()))?;
    let provider = load_provider_from_reader(file)?;
    let catalog = match &args.key {
        Some(key) => provider.catalog(key)?,
        None => provider.all().to_vec(),
    };
    println!("Loaded {} products in {:?}", catalog.len(), start.elapsed());

    let mut config: SimulationConfig = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open config {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(model) = args.model {
        config.model = model.into();
    }

    let strategy = if args.exact {
        SearchStrategy::minimal_excess()
    } else {
        SearchStrategy::GreedyBatchFill
    };
    let session = SimulationSession::new(CompositionSolver::new(strategy), config)?;

    println!("Solving {} targets...", args.targets.len());
    let proj_start = Instant::now();

    let outcomes: Vec<SimulationOutcome> = args
        .targets
        .par_iter()
        .map(|&target| session.run(&catalog, target, args.preference))
        .collect::<Result<_, EngineError>>()?;

    let (hits, misses, _) = session.cache_stats();
    println!(
        "Projections complete in {:?} (cache: {} hits, {} misses)",
        proj_start.elapsed(),
        hits,
        misses
    );

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    for outcome in &outcomes {
        for row in output_rows(outcome) {
            writer.serialize(row)?;
        }
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    println!("\nSummary:");
    for outcome in &outcomes {
        let composition = &outcome.composition;
        let lines: Vec<String> = composition
            .selections
            .iter()
            .map(|s| format!("{}×{:.0}/{:.2}", s.count, s.product.credit_value, s.product.installment_value))
            .collect();
        print!(
            "  Target {:>10.2}: {} → installment {:.2} (excess {:.2}), credit {:.0}",
            outcome.target,
            lines.join(" + "),
            composition.total_installment,
            outcome.excess,
            composition.total_credit,
        );
        match &outcome.projection {
            ProjectionResult::Cycles(rows) => {
                if let Some(last) = rows.last() {
                    println!(", cycle {} profit {:.2}/month", last.cycle_index, last.monthly_profit);
                }
            }
            ProjectionResult::Yearly(points) => {
                if let Some(last) = points.last() {
                    println!(", year {} wealth {:.2}", last.year, last.total_wealth);
                }
            }
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

//! Error types shared by the solver, projector and catalog loaders

use thiserror::Error;

/// Errors surfaced by the engine
///
/// Every failure is a deterministic function of the input, so none of these
/// are worth retrying.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No products available to compose from
    #[error("quota catalog is empty")]
    EmptyCatalog,

    /// Target installment is zero, negative or NaN
    #[error("target installment must be positive, got {target}")]
    NonPositiveTarget { target: f64 },

    /// No product can cover the target within `max_units` units
    #[error("target installment {target} needs more than {max_units} units of any product")]
    UncoverableTarget { target: f64, max_units: u64 },

    /// A catalog entry with a non-positive or non-finite value
    #[error("invalid quota product at position {index}: credit={credit_value}, installment={installment_value}")]
    InvalidProduct {
        index: usize,
        credit_value: f64,
        installment_value: f64,
    },

    /// Projection requested over an aggregate with nothing in it
    #[error("cannot project an empty aggregate (credit={total_credit}, installment={total_installment})")]
    EmptyAggregate {
        total_credit: f64,
        total_installment: f64,
    },

    /// Simulation configuration failed validation
    #[error("invalid simulation config: {message}")]
    InvalidConfig { message: String },

    /// Strict provider lookup for an unknown product/term key
    #[error("no quota catalog for key '{key}'")]
    CatalogNotFound { key: String },

    #[error("failed to parse quota catalog")]
    Csv(#[from] csv::Error),

    #[error("failed to read quota catalog")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;

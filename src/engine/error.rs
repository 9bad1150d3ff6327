use crate::config::ConfigError;
use crate::metrics::EquityError;
use crate::reserve::ReserveError;
use chrono::NaiveDate;
use thiserror::Error;

//everything that can stop a simulation run, none of it is retried
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("insufficient price history: need at least {required} points, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("no price for execution date {0}")]
    MissingPrice(NaiveDate),
    #[error("reserve invariant violated: {0}")]
    Reserve(#[from] ReserveError),
    #[error("equity accumulation failed: {0}")]
    Equity(#[from] EquityError),
}

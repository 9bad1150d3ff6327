pub mod simulation_config;

pub use simulation_config::{ConfigError, SimulationConfig, SimulationParams, ThresholdMode};

pub mod error;
pub mod simulation;

pub use error::SimulationError;
pub use simulation::{Simulation, SimulationReport};

pub mod machine;
pub mod state;

pub use machine::{DateOutcome, ExecutionRecord, MarketSnapshot, ReserveMachine, ThresholdPolicy};
pub use state::{DeploymentEvent, DeploymentOutcome, ReserveError, ReserveState, ResumeState};

pub mod equity;
pub mod summary;

pub use equity::{accumulate, Cashflow, EquityError, EquityPoint};
pub use summary::SummaryMetrics;

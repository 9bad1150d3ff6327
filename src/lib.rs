//a Rust-based dollar-cost-averaging backtester with rainy-day reserve deployment

pub mod calendar;
pub mod config;
pub mod data;
pub mod engine;
pub mod indicator;
pub mod metrics;
pub mod reserve;
pub mod schedule;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::calendar::{HolidayCalendar, HolidayRule, Market, TradingCalendar};
    pub use crate::config::{ConfigError, SimulationConfig, SimulationParams, ThresholdMode};
    pub use crate::data::{load_csv, DataError, PricePoint, PriceSeries};
    pub use crate::engine::{Simulation, SimulationError, SimulationReport};
    pub use crate::indicator::{IndicatorPoint, IndicatorSeries, RegimeFilter};
    pub use crate::metrics::{accumulate, Cashflow, EquityError, EquityPoint, SummaryMetrics};
    pub use crate::reserve::{
        DateOutcome, DeploymentEvent, DeploymentOutcome, ExecutionRecord, MarketSnapshot,
        ReserveError, ReserveMachine, ReserveState, ResumeState, ThresholdPolicy,
    };
    pub use crate::schedule::{schedule, ExecutionDate, Schedule, ScheduleCollision};
}

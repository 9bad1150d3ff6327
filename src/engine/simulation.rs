use crate::config::SimulationConfig;
use crate::data::PriceSeries;
use crate::engine::error::SimulationError;
use crate::indicator::{self, RegimeFilter};
use crate::metrics::{accumulate, Cashflow, EquityPoint, SummaryMetrics};
use crate::reserve::{
    DeploymentEvent, ExecutionRecord, MarketSnapshot, ReserveMachine, ReserveState, ResumeState,
};
use crate::schedule::{self, ScheduleCollision};
use serde::Serialize;

//result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub summary: SummaryMetrics,
    pub records: Vec<ExecutionRecord>,
    pub deployments: Vec<DeploymentEvent>,
    pub equity_curve: Vec<EquityPoint>,
    pub baseline_curve: Vec<EquityPoint>,
    pub collisions: Vec<ScheduleCollision>,
    pub resume: ResumeState,
}

impl SimulationReport {
    //cash flows actually invested, one per execution date
    pub fn cashflows(&self) -> Vec<Cashflow> {
        invested_flows(&self.records)
    }
}

fn invested_flows(records: &[ExecutionRecord]) -> Vec<Cashflow> {
    records
        .iter()
        .map(|r| Cashflow::new(r.date, r.invested()))
        .collect()
}

//runs the dca + rainy-day strategy over a price series
//pure and single threaded: the same inputs always give the same report
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    machine: ReserveMachine,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let machine = ReserveMachine::from_config(&config);
        Simulation { config, machine }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    //resume replaces the configured starting reserve when given
    pub fn run(
        &self,
        prices: &PriceSeries,
        resume: Option<ResumeState>,
    ) -> Result<SimulationReport, SimulationError> {
        let required = self.config.required_history();
        if prices.len() < required {
            return Err(SimulationError::InsufficientData {
                required,
                available: prices.len(),
            });
        }

        tracing::info!(
            prices = prices.len(),
            start = %self.config.start(),
            end = %self.config.end(),
            market = ?self.config.market(),
            "starting simulation"
        );

        let indicators = indicator::compute(
            prices,
            self.config.primary_period(),
            self.config.smoothing_period(),
        );
        let regime = self
            .config
            .threshold()
            .regime_window()
            .map(|window| RegimeFilter::new(prices, window));

        let plan = schedule::schedule(
            self.config.start(),
            self.config.end(),
            self.config.execution_days_of_month(),
            self.config.calendar(),
        );
        if !plan.collisions.is_empty() {
            tracing::warn!(count = plan.collisions.len(), "schedule collisions skipped");
        }

        let mut state = match resume {
            Some(resume) => ReserveState::resume(resume)?,
            None => ReserveState::new(self.config.starting_reserve()),
        };
        let opening_reserve = state.balance();

        let mut records = Vec::with_capacity(plan.len());
        for execution in &plan.dates {
            let date = execution.actual;
            let price = prices
                .price_on(date)
                .ok_or(SimulationError::MissingPrice(date))?;

            let market = MarketSnapshot {
                price,
                indicator: indicators.smoothed_on(date),
                bull: regime.as_ref().and_then(|r| r.is_bull(date, price)),
            };

            let record = self.machine.step(&mut state, *execution, market)?;
            tracing::debug!(
                %date,
                outcome = ?record.outcome,
                indicator = ?record.indicator,
                balance = record.balance_after,
                "execution date processed"
            );
            records.push(record);
        }

        let cashflows = invested_flows(&records);
        let baseline_flows: Vec<Cashflow> = records
            .iter()
            .map(|r| Cashflow::new(r.date, r.base_amount + r.topup_amount))
            .collect();

        let equity_curve = accumulate(prices, &cashflows)?;
        let baseline_curve = accumulate(prices, &baseline_flows)?;

        let summary = SummaryMetrics::from_run(
            &equity_curve,
            &records,
            &state,
            &baseline_curve,
            opening_reserve,
            plan.collisions.len(),
        );

        tracing::info!(
            execution_dates = records.len(),
            deployed = summary.deployed,
            missed = summary.missed,
            final_reserve = state.balance(),
            "simulation complete"
        );

        Ok(SimulationReport {
            summary,
            resume: state.to_resume(),
            deployments: state.deployments().to_vec(),
            records,
            equity_curve,
            baseline_curve,
            collisions: plan.collisions,
        })
    }
}

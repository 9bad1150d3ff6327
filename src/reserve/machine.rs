use crate::config::SimulationConfig;
use crate::reserve::state::{DeploymentEvent, DeploymentOutcome, ReserveError, ReserveState};
use crate::schedule::ExecutionDate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//trigger level for the smoothed indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    Fixed(f64),
    //bull level while price sits above its trailing average
    RegimeAdaptive { bear: f64, bull: f64, window: usize },
}

impl ThresholdPolicy {
    //bull is none when the regime is unknown (or not tracked)
    pub fn level(&self, bull: Option<bool>) -> f64 {
        match *self {
            ThresholdPolicy::Fixed(level) => level,
            ThresholdPolicy::RegimeAdaptive { bear, bull: high, .. } => {
                if bull == Some(true) {
                    high
                } else {
                    bear
                }
            }
        }
    }

    pub fn regime_window(&self) -> Option<usize> {
        match *self {
            ThresholdPolicy::Fixed(_) => None,
            ThresholdPolicy::RegimeAdaptive { window, .. } => Some(window),
        }
    }
}

//per-date classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateOutcome {
    //indicator not available yet, base and top-up only
    Warmup,
    NoTrigger,
    Deployed,
    InsufficientFunds,
}

//everything the machine did on one execution date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub nominal: NaiveDate,
    pub date: NaiveDate,
    pub price: f64,
    pub indicator: Option<f64>,
    pub threshold: f64,
    pub outcome: DateOutcome,
    pub base_amount: f64,
    pub extra_amount: f64,
    pub topup_amount: f64,
    pub balance_before: f64,
    pub balance_after: f64,
}

impl ExecutionRecord {
    //cash put into the asset on this date
    pub fn invested(&self) -> f64 {
        self.base_amount + self.extra_amount
    }
}

//market inputs for one execution date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSnapshot {
    pub price: f64,
    pub indicator: Option<f64>,
    pub bull: Option<bool>,
}

//decides base, extra and top-up for each execution date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReserveMachine {
    base_amount: f64,
    extra_amount: f64,
    topup_amount: f64,
    threshold: ThresholdPolicy,
}

impl ReserveMachine {
    pub fn new(
        base_amount: f64,
        extra_amount: f64,
        topup_amount: f64,
        threshold: ThresholdPolicy,
    ) -> Self {
        ReserveMachine {
            base_amount,
            extra_amount,
            topup_amount,
            threshold,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.base_amount(),
            config.extra_amount(),
            config.topup_amount(),
            config.threshold(),
        )
    }

    //applies one execution date to the reserve
    //order within a date: base (outside the reserve), deployment debit, top-up credit
    pub fn step(
        &self,
        state: &mut ReserveState,
        execution: ExecutionDate,
        market: MarketSnapshot,
    ) -> Result<ExecutionRecord, ReserveError> {
        let date = execution.actual;
        let threshold = self.threshold.level(market.bull);
        let balance_before = state.balance();
        let mut extra = 0.0;

        let outcome = match market.indicator {
            None => DateOutcome::Warmup,
            //strict: a reading equal to the threshold is not a rainy day
            Some(value) if value < threshold => {
                let funded = state.can_fund(self.extra_amount);
                if funded {
                    state.debit(date, self.extra_amount)?;
                    extra = self.extra_amount;
                }

                let outcome = if funded {
                    DeploymentOutcome::Deployed
                } else {
                    DeploymentOutcome::InsufficientFunds
                };
                state.push_event(DeploymentEvent {
                    date,
                    indicator: value,
                    threshold,
                    price: market.price,
                    amount_requested: self.extra_amount,
                    amount_deployed: extra,
                    balance_before,
                    balance_after: state.balance(),
                    outcome,
                });

                match outcome {
                    DeploymentOutcome::Deployed => {
                        tracing::debug!(
                            %date,
                            indicator = value,
                            amount = extra,
                            "rainy day deployed"
                        );
                        DateOutcome::Deployed
                    }
                    DeploymentOutcome::InsufficientFunds => {
                        tracing::warn!(
                            %date,
                            indicator = value,
                            balance = balance_before,
                            required = self.extra_amount,
                            "rainy day missed, reserve too low"
                        );
                        DateOutcome::InsufficientFunds
                    }
                }
            }
            Some(_) => DateOutcome::NoTrigger,
        };

        state.credit(self.topup_amount);
        state.record_invested(self.base_amount + extra);

        Ok(ExecutionRecord {
            nominal: execution.nominal,
            date,
            price: market.price,
            indicator: market.indicator,
            threshold,
            outcome,
            base_amount: self.base_amount,
            extra_amount: extra,
            topup_amount: self.topup_amount,
            balance_before,
            balance_after: state.balance(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution(day: u32) -> ExecutionDate {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        ExecutionDate {
            nominal: date,
            actual: date,
        }
    }

    fn snapshot(indicator: Option<f64>) -> MarketSnapshot {
        MarketSnapshot {
            price: 50.0,
            indicator,
            bull: None,
        }
    }

    fn machine() -> ReserveMachine {
        ReserveMachine::new(100.0, 300.0, 50.0, ThresholdPolicy::Fixed(30.0))
    }

    #[test]
    fn test_no_trigger_only_tops_up() {
        let mut state = ReserveState::new(1000.0);
        let record = machine()
            .step(&mut state, execution(1), snapshot(Some(45.0)))
            .unwrap();

        assert_eq!(record.outcome, DateOutcome::NoTrigger);
        assert_eq!(record.invested(), 100.0);
        assert_eq!(state.balance(), 1050.0);
        assert!(state.deployments().is_empty());
    }

    #[test]
    fn test_threshold_boundary_is_no_trigger() {
        let mut state = ReserveState::new(1000.0);
        let record = machine()
            .step(&mut state, execution(1), snapshot(Some(30.0)))
            .unwrap();
        assert_eq!(record.outcome, DateOutcome::NoTrigger);
    }

    #[test]
    fn test_exact_balance_is_deployed() {
        let mut state = ReserveState::new(300.0);
        let record = machine()
            .step(&mut state, execution(1), snapshot(Some(20.0)))
            .unwrap();

        assert_eq!(record.outcome, DateOutcome::Deployed);
        assert_eq!(record.invested(), 400.0);

        let event = state.deployments()[0];
        assert_eq!(event.outcome, DeploymentOutcome::Deployed);
        assert_eq!(event.balance_before, 300.0);
        assert_eq!(event.balance_after, 0.0);
        //top-up lands after the debit
        assert_eq!(state.balance(), 50.0);
    }

    #[test]
    fn test_one_unit_short_is_insufficient() {
        let mut state = ReserveState::new(299.0);
        let record = machine()
            .step(&mut state, execution(1), snapshot(Some(20.0)))
            .unwrap();

        assert_eq!(record.outcome, DateOutcome::InsufficientFunds);
        assert_eq!(record.invested(), 100.0);

        let event = state.deployments()[0];
        assert_eq!(event.outcome, DeploymentOutcome::InsufficientFunds);
        assert_eq!(event.amount_deployed, 0.0);
        assert_eq!(event.balance_after, 299.0);
        assert_eq!(state.balance(), 349.0);
    }

    #[test]
    fn test_warmup_gets_base_and_topup() {
        let mut state = ReserveState::new(0.0);
        let record = machine()
            .step(&mut state, execution(1), snapshot(None))
            .unwrap();

        assert_eq!(record.outcome, DateOutcome::Warmup);
        assert_eq!(record.invested(), 100.0);
        assert_eq!(state.balance(), 50.0);
        assert!(state.deployments().is_empty());
    }

    #[test]
    fn test_streak_depletes_reserve() {
        //300 covers one deployment, one 50 top-up can't refill it
        let mut state = ReserveState::new(300.0);
        let m = machine();
        let outcomes: Vec<_> = (1..=3)
            .map(|d| {
                m.step(&mut state, execution(d), snapshot(Some(10.0)))
                    .unwrap()
                    .outcome
            })
            .collect();

        assert_eq!(
            outcomes,
            vec![
                DateOutcome::Deployed,
                DateOutcome::InsufficientFunds,
                DateOutcome::InsufficientFunds
            ]
        );
        assert_eq!(state.balance(), 150.0);
        assert_eq!(state.deployed_count(), 1);
        assert_eq!(state.missed_count(), 2);
        assert_eq!(state.hit_rate(), Some(1.0 / 3.0));
        assert_eq!(state.cumulative_invested(), 3.0 * 100.0 + 300.0);
    }

    #[test]
    fn test_regime_threshold() {
        let policy = ThresholdPolicy::RegimeAdaptive {
            bear: 30.0,
            bull: 45.0,
            window: 200,
        };
        let m = ReserveMachine::new(100.0, 300.0, 50.0, policy);
        let mut state = ReserveState::new(1000.0);

        let bull_dip = MarketSnapshot {
            price: 50.0,
            indicator: Some(40.0),
            bull: Some(true),
        };
        let bear_dip = MarketSnapshot {
            bull: Some(false),
            ..bull_dip
        };
        let unknown = MarketSnapshot {
            bull: None,
            ..bull_dip
        };

        let bull = m.step(&mut state, execution(1), bull_dip).unwrap();
        let bear = m.step(&mut state, execution(2), bear_dip).unwrap();
        let unknown = m.step(&mut state, execution(3), unknown).unwrap();

        assert_eq!(bull.outcome, DateOutcome::Deployed);
        assert_eq!(bull.threshold, 45.0);
        assert_eq!(bear.outcome, DateOutcome::NoTrigger);
        assert_eq!(unknown.threshold, 30.0);
        assert_eq!(policy.regime_window(), Some(200));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReserveError {
    #[error("reserve would go negative on {date}: balance {balance:.2}, debit {amount:.2}")]
    Overdraft {
        date: NaiveDate,
        balance: f64,
        amount: f64,
    },
    #[error("invalid {field} in resume state: {value}")]
    InvalidResume { field: &'static str, value: f64 },
}

//what happened to a rainy-day opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentOutcome {
    Deployed,
    InsufficientFunds,
}

//a detected rainy day, funded or not
//appended once and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeploymentEvent {
    pub date: NaiveDate,
    pub indicator: f64,
    pub threshold: f64,
    pub price: f64,
    pub amount_requested: f64,
    pub amount_deployed: f64,
    //balances around the deployment debit, before the same-date top-up
    pub balance_before: f64,
    pub balance_after: f64,
    pub outcome: DeploymentOutcome,
}

impl DeploymentEvent {
    pub fn is_deployed(&self) -> bool {
        self.outcome == DeploymentOutcome::Deployed
    }
}

//carry-over between incremental runs, persisted by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    pub reserve_balance: f64,
    pub cumulative_invested: f64,
    pub deployment_count: usize,
}

impl ResumeState {
    pub fn validate(&self) -> Result<(), ReserveError> {
        if !self.reserve_balance.is_finite() || self.reserve_balance < 0.0 {
            return Err(ReserveError::InvalidResume {
                field: "reserve_balance",
                value: self.reserve_balance,
            });
        }
        if !self.cumulative_invested.is_finite() || self.cumulative_invested < 0.0 {
            return Err(ReserveError::InvalidResume {
                field: "cumulative_invested",
                value: self.cumulative_invested,
            });
        }
        Ok(())
    }
}

//the cash pool threaded through one run, date by date
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveState {
    balance: f64,
    cumulative_invested: f64,
    cumulative_topups: f64,
    prior_deployments: usize,
    deployments: Vec<DeploymentEvent>,
}

impl ReserveState {
    pub fn new(starting_balance: f64) -> Self {
        ReserveState {
            balance: starting_balance,
            cumulative_invested: 0.0,
            cumulative_topups: 0.0,
            prior_deployments: 0,
            deployments: Vec::new(),
        }
    }

    pub fn resume(state: ResumeState) -> Result<Self, ReserveError> {
        state.validate()?;
        Ok(ReserveState {
            balance: state.reserve_balance,
            cumulative_invested: state.cumulative_invested,
            cumulative_topups: 0.0,
            prior_deployments: state.deployment_count,
            deployments: Vec::new(),
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    //base plus extra cash put into the asset, including resumed history
    pub fn cumulative_invested(&self) -> f64 {
        self.cumulative_invested
    }

    pub fn cumulative_topups(&self) -> f64 {
        self.cumulative_topups
    }

    pub fn deployments(&self) -> &[DeploymentEvent] {
        &self.deployments
    }

    //funded deployments this run
    pub fn deployed_count(&self) -> usize {
        self.deployments.iter().filter(|e| e.is_deployed()).count()
    }

    //unfunded opportunities this run
    pub fn missed_count(&self) -> usize {
        self.deployments.len() - self.deployed_count()
    }

    //deployed / (deployed + missed), none without any rainy day
    pub fn hit_rate(&self) -> Option<f64> {
        if self.deployments.is_empty() {
            return None;
        }
        Some(self.deployed_count() as f64 / self.deployments.len() as f64)
    }

    pub fn can_fund(&self, amount: f64) -> bool {
        self.balance >= amount
    }

    pub fn to_resume(&self) -> ResumeState {
        ResumeState {
            reserve_balance: self.balance,
            cumulative_invested: self.cumulative_invested,
            deployment_count: self.prior_deployments + self.deployed_count(),
        }
    }

    //takes `amount` out of the reserve, never clamps
    pub(crate) fn debit(&mut self, date: NaiveDate, amount: f64) -> Result<(), ReserveError> {
        let after = self.balance - amount;
        if amount < 0.0 || after < 0.0 {
            return Err(ReserveError::Overdraft {
                date,
                balance: self.balance,
                amount,
            });
        }
        self.balance = after;
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.balance += amount;
        self.cumulative_topups += amount;
    }

    pub(crate) fn record_invested(&mut self, amount: f64) {
        self.cumulative_invested += amount;
    }

    pub(crate) fn push_event(&mut self, event: DeploymentEvent) {
        self.deployments.push(event);
    }
}

use crate::calendar::{HolidayCalendar, Market};
use crate::reserve::ThresholdPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositivePeriod { name: &'static str, value: usize },
    #[error("{name} must be a finite non-negative amount, got {value}")]
    InvalidAmount { name: &'static str, value: f64 },
    #[error("{name} must be within (0, 100], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("execution_days_of_month is empty")]
    NoExecutionDays,
    #[error("execution day {0} is not a day of month (1..=31)")]
    InvalidExecutionDay(u32),
    #[error("start ({start}) must be before end ({end})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

//how the rainy-day trigger level is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdMode {
    //always `indicator_threshold`
    #[default]
    Fixed,
    //`bull_threshold` while the close is above its trailing average, else `indicator_threshold`
    RegimeAdaptive {
        bull_threshold: f64,
        regime_window: usize,
    },
}

//raw, unvalidated simulation options as read from json or the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    //indicator
    pub primary_period: usize,
    pub smoothing_period: usize,
    pub indicator_threshold: f64,
    pub threshold_mode: ThresholdMode,

    //cash flows per execution date
    pub base_amount: f64,
    pub extra_amount: f64,
    pub topup_amount: f64,
    pub starting_reserve: f64,

    //schedule
    pub execution_days_of_month: BTreeSet<u32>,
    pub market: Market,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            primary_period: 14,
            smoothing_period: 7,
            indicator_threshold: 30.0,
            threshold_mode: ThresholdMode::Fixed,
            base_amount: 500.0,
            extra_amount: 1000.0,
            topup_amount: 250.0,
            starting_reserve: 2000.0,
            execution_days_of_month: [1, 15].into_iter().collect(),
            market: Market::Nyse,
            start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

impl SimulationParams {
    //load parameters from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: SimulationParams = serde_json::from_str(&contents)?;
        Ok(params)
    }

    //save parameters to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

//validated, immutable configuration for one simulation run
//only obtainable through `try_from`, so every instance satisfies the checks below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SimulationParams", into = "SimulationParams")]
pub struct SimulationConfig {
    params: SimulationParams,
    calendar: HolidayCalendar,
    threshold: ThresholdPolicy,
}

impl TryFrom<SimulationParams> for SimulationConfig {
    type Error = ConfigError;

    fn try_from(params: SimulationParams) -> Result<Self, Self::Error> {
        check_period("primary_period", params.primary_period)?;
        check_period("smoothing_period", params.smoothing_period)?;
        check_threshold("indicator_threshold", params.indicator_threshold)?;

        check_amount("base_amount", params.base_amount)?;
        check_amount("extra_amount", params.extra_amount)?;
        check_amount("topup_amount", params.topup_amount)?;
        check_amount("starting_reserve", params.starting_reserve)?;

        if params.execution_days_of_month.is_empty() {
            return Err(ConfigError::NoExecutionDays);
        }
        if let Some(&day) = params
            .execution_days_of_month
            .iter()
            .find(|&&d| !(1..=31).contains(&d))
        {
            return Err(ConfigError::InvalidExecutionDay(day));
        }

        if params.start >= params.end {
            return Err(ConfigError::InvalidDateRange {
                start: params.start,
                end: params.end,
            });
        }

        let threshold = match params.threshold_mode {
            ThresholdMode::Fixed => ThresholdPolicy::Fixed(params.indicator_threshold),
            ThresholdMode::RegimeAdaptive {
                bull_threshold,
                regime_window,
            } => {
                check_threshold("bull_threshold", bull_threshold)?;
                check_period("regime_window", regime_window)?;
                ThresholdPolicy::RegimeAdaptive {
                    bear: params.indicator_threshold,
                    bull: bull_threshold,
                    window: regime_window,
                }
            }
        };

        Ok(SimulationConfig {
            calendar: params.market.calendar(),
            threshold,
            params,
        })
    }
}

impl From<SimulationConfig> for SimulationParams {
    fn from(config: SimulationConfig) -> Self {
        config.params
    }
}

impl SimulationConfig {
    //load and validate configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let params = SimulationParams::from_json_file(path)?;
        Ok(SimulationConfig::try_from(params)?)
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn threshold(&self) -> ThresholdPolicy {
        self.threshold
    }

    pub fn primary_period(&self) -> usize {
        self.params.primary_period
    }

    pub fn smoothing_period(&self) -> usize {
        self.params.smoothing_period
    }

    //number of prices needed before the first smoothed reading exists
    pub fn required_history(&self) -> usize {
        self.params.primary_period + self.params.smoothing_period
    }

    pub fn base_amount(&self) -> f64 {
        self.params.base_amount
    }

    pub fn extra_amount(&self) -> f64 {
        self.params.extra_amount
    }

    pub fn topup_amount(&self) -> f64 {
        self.params.topup_amount
    }

    pub fn starting_reserve(&self) -> f64 {
        self.params.starting_reserve
    }

    pub fn execution_days_of_month(&self) -> &BTreeSet<u32> {
        &self.params.execution_days_of_month
    }

    pub fn market(&self) -> Market {
        self.params.market
    }

    pub fn start(&self) -> NaiveDate {
        self.params.start
    }

    pub fn end(&self) -> NaiveDate {
        self.params.end
    }
}

fn check_period(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositivePeriod { name, value });
    }
    Ok(())
}

fn check_amount(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidAmount { name, value });
    }
    Ok(())
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 || value > 100.0 {
        return Err(ConfigError::InvalidThreshold { name, value });
    }
    Ok(())
}

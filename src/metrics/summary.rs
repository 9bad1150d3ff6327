use crate::metrics::equity::{max_drawdown, time_weighted_returns, EquityPoint};
use crate::reserve::{DateOutcome, ExecutionRecord, ReserveState};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryMetrics {
    //cash flows
    pub total_invested: f64,
    pub base_invested: f64,
    pub extra_invested: f64,
    pub total_topups: f64,
    pub final_reserve: f64,

    //performance
    pub final_value: f64,
    pub profit: f64,
    pub total_return_pct: f64,
    pub max_drawdown: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,

    //rainy days
    pub execution_dates: usize,
    pub warmup_dates: usize,
    pub rainy_days: usize,
    pub deployed: usize,
    pub missed: usize,
    pub hit_rate: Option<f64>,
    pub schedule_collisions: usize,

    //plain dca spending the same base + top-up, reserve kept as cash
    pub baseline_final_value: f64,
    pub baseline_wealth: f64,
    pub strategy_wealth: f64,
    pub outperformance: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the run's outputs
    pub fn from_run(
        equity_curve: &[EquityPoint],
        records: &[ExecutionRecord],
        reserve: &ReserveState,
        baseline_curve: &[EquityPoint],
        baseline_cash: f64,
        schedule_collisions: usize,
    ) -> Self {
        let last = equity_curve.last();
        let total_invested = last.map(|p| p.invested).unwrap_or(0.0);
        let final_value = last.map(|p| p.value).unwrap_or(0.0);
        let profit = final_value - total_invested;
        let total_return_pct = if total_invested > 0.0 {
            profit / total_invested
        } else {
            0.0
        };

        let base_invested = records.iter().map(|r| r.base_amount).sum();
        let extra_invested = records.iter().map(|r| r.extra_amount).sum();
        let warmup_dates = records
            .iter()
            .filter(|r| r.outcome == DateOutcome::Warmup)
            .count();

        let returns = time_weighted_returns(equity_curve);
        let (annualized_volatility, sharpe_ratio) = if returns.len() >= 2 {
            let volatility = returns.iter().std_dev() * (252.0_f64).sqrt();
            (volatility, calculate_sharpe_ratio(&returns))
        } else {
            (0.0, 0.0)
        };

        let baseline_final_value = baseline_curve.last().map(|p| p.value).unwrap_or(0.0);
        let baseline_wealth = baseline_final_value + baseline_cash;
        let strategy_wealth = final_value + reserve.balance();

        SummaryMetrics {
            total_invested,
            base_invested,
            extra_invested,
            total_topups: reserve.cumulative_topups(),
            final_reserve: reserve.balance(),
            final_value,
            profit,
            total_return_pct,
            max_drawdown: max_drawdown(equity_curve),
            annualized_volatility,
            sharpe_ratio,
            execution_dates: records.len(),
            warmup_dates,
            rainy_days: reserve.deployments().len(),
            deployed: reserve.deployed_count(),
            missed: reserve.missed_count(),
            hit_rate: reserve.hit_rate(),
            schedule_collisions,
            baseline_final_value,
            baseline_wealth,
            strategy_wealth,
            outperformance: strategy_wealth - baseline_wealth,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Execution Dates", format!("{}", self.execution_dates)),
            ("Warm-up Dates", format!("{}", self.warmup_dates)),
            ("Schedule Collisions", format!("{}", self.schedule_collisions)),
            ("Total Invested", format!("${:.2}", self.total_invested)),
            ("  Base", format!("${:.2}", self.base_invested)),
            ("  Rainy Day", format!("${:.2}", self.extra_invested)),
            ("Reserve Top-ups", format!("${:.2}", self.total_topups)),
            ("Final Reserve", format!("${:.2}", self.final_reserve)),
            ("Final Value", format!("${:.2}", self.final_value)),
            (
                "Profit",
                format!("${:.2} ({:.2}%)", self.profit, self.total_return_pct * 100.0),
            ),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown * 100.0)),
            (
                "Volatility (ann.)",
                format!("{:.2}%", self.annualized_volatility * 100.0),
            ),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Rainy Days", format!("{}", self.rainy_days)),
            ("Deployed", format!("{}", self.deployed)),
            ("Missed", format!("{}", self.missed)),
            (
                "Hit Rate",
                self.hit_rate
                    .map(|h| format!("{:.2}%", h * 100.0))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
            ("Strategy Wealth", format!("${:.2}", self.strategy_wealth)),
            ("Plain DCA Wealth", format!("${:.2}", self.baseline_wealth)),
            ("Outperformance", format!("${:.2}", self.outperformance)),
        ];

        for (label, value) in rows {
            table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
        }

        table.printstd();
    }
}

fn calculate_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev == 0.0 || std_dev.is_nan() {
        return 0.0;
    }

    //annualize assuming daily returns
    (mean / std_dev) * (252.0_f64).sqrt()
}

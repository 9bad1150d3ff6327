use crate::data::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquityError {
    #[error("no price for cash flow on {0}")]
    MissingPrice(NaiveDate),
    #[error("cash flow dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedCashflows { previous: NaiveDate, next: NaiveDate },
    #[error("invalid cash flow amount {amount} on {date}")]
    InvalidAmount { date: NaiveDate, amount: f64 },
}

//cash put into the asset on one date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Cashflow {
    pub date: NaiveDate,
    pub amount: f64,
}

impl Cashflow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Cashflow { date, amount }
    }
}

//a point in the equity curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub shares: f64,
    pub invested: f64,
    //shares * price
    pub value: f64,
    //cash flow that landed on this date
    pub contribution: f64,
    pub drawdown: f64,
}

impl EquityPoint {
    pub fn pnl(&self) -> f64 {
        self.value - self.invested
    }
}

//marks holdings to market on every price date
//fractional shares, no rounding; every cash flow must land on a priced date
pub fn accumulate(
    prices: &PriceSeries,
    cashflows: &[Cashflow],
) -> Result<Vec<EquityPoint>, EquityError> {
    for pair in cashflows.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(EquityError::UnorderedCashflows {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    for flow in cashflows {
        if !flow.amount.is_finite() || flow.amount < 0.0 {
            return Err(EquityError::InvalidAmount {
                date: flow.date,
                amount: flow.amount,
            });
        }
        if prices.price_on(flow.date).is_none() {
            return Err(EquityError::MissingPrice(flow.date));
        }
    }

    let mut curve = Vec::with_capacity(prices.len());
    let mut pending = cashflows.iter().peekable();
    let mut shares = 0.0;
    let mut invested = 0.0;
    let mut peak = 0.0_f64;

    for point in prices.iter() {
        let mut contribution = 0.0;
        if let Some(flow) = pending.next_if(|f| f.date == point.date) {
            //prices are validated positive on load
            shares += flow.amount / point.close;
            invested += flow.amount;
            contribution = flow.amount;
        }

        let value = shares * point.close;
        peak = peak.max(value);

        let drawdown = if peak > 0.0 {
            (peak - value) / peak
        } else {
            0.0
        };

        curve.push(EquityPoint {
            date: point.date,
            price: point.close,
            shares,
            invested,
            value,
            contribution,
            drawdown,
        });
    }

    Ok(curve)
}

//calculates maximum drawdown from equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

//daily returns with the day's contribution stripped out
pub fn time_weighted_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].value > 0.0)
        .map(|w| (w[1].value - w[1].contribution) / w[0].value - 1.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn prices(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(date(i as u32 + 1), c))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn test_marks_every_date() {
        let series = prices(&[10.0, 20.0, 8.0, 16.0]);
        let flows = [Cashflow::new(date(2), 100.0), Cashflow::new(date(3), 40.0)];
        let curve = accumulate(&series, &flows).unwrap();

        assert_eq!(curve.len(), 4);
        assert_eq!(curve[0].shares, 0.0);
        assert_eq!(curve[0].value, 0.0);

        assert_eq!(curve[1].shares, 5.0);
        assert_eq!(curve[1].value, 100.0);

        //5 + 40/8 = 10 shares
        assert_eq!(curve[2].shares, 10.0);
        assert_eq!(curve[2].invested, 140.0);
        assert_eq!(curve[2].value, 80.0);
        assert!((curve[2].drawdown - 0.2).abs() < 1e-12);

        assert_eq!(curve[3].shares, 10.0);
        assert_eq!(curve[3].value, 160.0);
        assert_eq!(curve[3].pnl(), 20.0);
        assert_eq!(curve[3].drawdown, 0.0);
        assert!((max_drawdown(&curve) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_shares() {
        let series = prices(&[3.0]);
        let curve = accumulate(&series, &[Cashflow::new(date(1), 10.0)]).unwrap();
        assert!((curve[0].shares - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_price_is_fatal() {
        let series = prices(&[10.0, 11.0]);
        let err = accumulate(&series, &[Cashflow::new(date(9), 100.0)]).unwrap_err();
        assert_eq!(err, EquityError::MissingPrice(date(9)));
    }

    #[test]
    fn test_unordered_cashflows_rejected() {
        let series = prices(&[10.0, 11.0]);
        let flows = [Cashflow::new(date(2), 1.0), Cashflow::new(date(2), 1.0)];
        assert!(matches!(
            accumulate(&series, &flows),
            Err(EquityError::UnorderedCashflows { .. })
        ));
    }

    #[test]
    fn test_time_weighted_returns_ignore_contributions() {
        let series = prices(&[10.0, 20.0, 10.0]);
        let flows = [Cashflow::new(date(1), 100.0), Cashflow::new(date(2), 500.0)];
        let curve = accumulate(&series, &flows).unwrap();
        let returns = time_weighted_returns(&curve);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 1.0).abs() < 1e-12);
        assert!((returns[1] + 0.5).abs() < 1e-12);
    }
}

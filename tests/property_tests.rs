//! Property tests for simulation invariants.
//!
//! 1. Determinism: identical inputs give identical reports
//! 2. Reserve balance never goes negative
//! 3. Every execution date carries the base contribution
//! 4. Cumulative shares never decrease
//! 5. Execution dates are strictly increasing trading days

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rainyday::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    (prop::collection::vec(-0.04..0.04_f64, 60..240), 20.0..200.0_f64).prop_map(|(moves, start)| {
        let mut price = start;
        moves
            .into_iter()
            .map(|m| {
                price = (price * (1.0 + m)).max(1.0);
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_amount() -> impl Strategy<Value = f64> {
    (0u32..2000).prop_map(|a| a as f64)
}

fn arb_market() -> impl Strategy<Value = Market> {
    prop_oneof![Just(Market::Nyse), Just(Market::Xetra), Just(Market::Weekdays)]
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 1).unwrap()
}

//one close per calendar day so every rolled session is priced
fn series(closes: &[f64]) -> PriceSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(start_date() + Duration::days(i as i64), c))
        .collect();
    PriceSeries::new(points).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn config(
    closes: &[f64],
    base: f64,
    extra: f64,
    topup: f64,
    reserve: f64,
    threshold: f64,
    days: Vec<u32>,
    market: Market,
) -> SimulationConfig {
    SimulationConfig::try_from(SimulationParams {
        primary_period: 14,
        smoothing_period: 7,
        indicator_threshold: threshold,
        threshold_mode: ThresholdMode::Fixed,
        base_amount: base,
        extra_amount: extra,
        topup_amount: topup,
        starting_reserve: reserve,
        execution_days_of_month: days.into_iter().collect(),
        market,
        start: start_date(),
        end: start_date() + Duration::days(closes.len() as i64 - 1),
    })
    .unwrap()
}

proptest! {
    #[test]
    fn simulation_invariants(
        closes in arb_closes(),
        base in arb_amount(),
        extra in arb_amount(),
        topup in arb_amount(),
        reserve in arb_amount(),
        threshold in 20.0..70.0_f64,
        days in prop::collection::vec(1u32..=31, 1..6),
        market in arb_market(),
    ) {
        let prices = series(&closes);
        let cfg = config(&closes, base, extra, topup, reserve, threshold, days, market);
        let calendar = cfg.calendar().clone();
        let simulation = Simulation::new(cfg);

        let report = simulation.run(&prices, None).unwrap();
        let again = simulation.run(&prices, None).unwrap();
        prop_assert_eq!(&report, &again);

        for record in &report.records {
            prop_assert!(record.balance_before >= 0.0);
            prop_assert!(record.balance_after >= 0.0);
            prop_assert_eq!(record.base_amount, base);
            prop_assert!(calendar.is_trading_day(record.date));
        }

        for event in &report.deployments {
            prop_assert!(event.balance_after >= 0.0);
            if event.outcome == DeploymentOutcome::Deployed {
                prop_assert!(event.balance_before >= extra);
                prop_assert_eq!(event.balance_after, event.balance_before - extra);
            } else {
                prop_assert!(event.balance_before < extra);
                prop_assert_eq!(event.balance_after, event.balance_before);
            }
        }

        prop_assert!(report.records.windows(2).all(|w| w[0].date < w[1].date));
        prop_assert!(report.equity_curve.windows(2).all(|w| w[1].shares >= w[0].shares));
        prop_assert_eq!(report.equity_curve.len(), prices.len());
    }

    #[test]
    fn schedule_is_strictly_increasing(
        days in prop::collection::vec(1u32..=31, 1..10),
        market in arb_market(),
        year in 1990i32..2040,
    ) {
        let calendar = market.calendar();
        let days = days.into_iter().collect();
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();

        let plan = schedule(start, end, &days, &calendar);
        prop_assert!(plan.dates.windows(2).all(|w| w[0].actual < w[1].actual));
        prop_assert!(plan.dates.iter().all(|d| calendar.is_trading_day(d.actual)));
        for collision in &plan.collisions {
            prop_assert!(plan.actual_dates().any(|d| d == collision.skipped_for));
        }
    }
}

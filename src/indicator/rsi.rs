use crate::data::PriceSeries;
use crate::indicator::rolling_mean;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//one oscillator reading
//primary is the wilder rsi in [0, 100], smoothed is its trailing simple average
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub primary: f64,
    pub smoothed: Option<f64>,
}

//indicator readings for every date past the primary warm-up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    points: Vec<IndicatorPoint>,
    primary_period: usize,
    smoothing_period: usize,
}

impl IndicatorSeries {
    pub fn points(&self) -> &[IndicatorPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    //number of leading input dates without a smoothed value
    pub fn warmup_len(&self) -> usize {
        (self.primary_period + self.smoothing_period).saturating_sub(1)
    }

    pub fn point_on(&self, date: NaiveDate) -> Option<&IndicatorPoint> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|i| &self.points[i])
    }

    //smoothed value on a date, none during warm-up or for unknown dates
    pub fn smoothed_on(&self, date: NaiveDate) -> Option<f64> {
        self.point_on(date).and_then(|p| p.smoothed)
    }

    //first date with a smoothed value
    pub fn first_smoothed_date(&self) -> Option<NaiveDate> {
        self.points
            .iter()
            .find(|p| p.smoothed.is_some())
            .map(|p| p.date)
    }
}

//computes the smoothed momentum oscillator for a price series
//returns an empty series when there are fewer than primary + smoothing points
pub fn compute(
    prices: &PriceSeries,
    primary_period: usize,
    smoothing_period: usize,
) -> IndicatorSeries {
    let empty = IndicatorSeries {
        points: Vec::new(),
        primary_period,
        smoothing_period,
    };

    if primary_period == 0 || smoothing_period == 0 {
        return empty;
    }
    if prices.len() < primary_period + smoothing_period {
        tracing::debug!(
            available = prices.len(),
            required = primary_period + smoothing_period,
            "not enough prices for indicator warm-up"
        );
        return empty;
    }

    let closes = prices.closes();
    let primary = wilder_rsi(&closes, primary_period);

    //the secondary average only sees defined rsi values
    let defined: Vec<f64> = primary.iter().flatten().copied().collect();
    let smoothed = rolling_mean(&defined, smoothing_period);

    let points = prices
        .dates()
        .skip(primary_period)
        .zip(defined.iter().zip(smoothed))
        .map(|(date, (&primary, smoothed))| IndicatorPoint {
            date,
            primary,
            smoothed,
        })
        .collect();

    IndicatorSeries {
        points,
        primary_period,
        smoothing_period,
    }
}

//relative strength index with wilder smoothing
//index i holds the value for closes[i], none until `period` differences are seen
pub fn wilder_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let (gains, losses) = split_changes(closes);

    //seed with a plain mean of the first `period` changes
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    let n = period as f64;
    for i in (period + 1)..closes.len() {
        //changes are offset by one against closes
        avg_gain = (avg_gain * (n - 1.0) + gains[i - 1]) / n;
        avg_loss = (avg_loss * (n - 1.0) + losses[i - 1]) / n;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    out
}

//splits day-over-day changes into gain and loss magnitudes
fn split_changes(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;

    //+2 / -1 alternating from 100
    fn alternating_closes() -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 1..20 {
            let change = if i % 2 == 1 { 2.0 } else { -1.0 };
            closes.push(closes[i - 1] + change);
        }
        closes
    }

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    //plain windowed rsi over the trailing `period` changes
    fn rolling_rsi(closes: &[f64], end: usize, period: usize) -> f64 {
        let (gains, losses) = split_changes(&closes[..=end]);
        let avg_gain = gains.iter().rev().take(period).sum::<f64>() / period as f64;
        let avg_loss = losses.iter().rev().take(period).sum::<f64>() / period as f64;
        rsi_from_averages(avg_gain, avg_loss)
    }

    #[test]
    fn test_seed_is_simple_mean() {
        let rsi = wilder_rsi(&alternating_closes(), 14);
        assert!(rsi[..14].iter().all(|v| v.is_none()));

        //seven +2 gains and seven -1 losses: avg gain 1.0, avg loss 0.5
        let seed = rsi[14].unwrap();
        assert!((seed - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_wilder_recursion_matches_hand_computation() {
        let closes = alternating_closes();
        let rsi = wilder_rsi(&closes, 14);

        //index 15 (+2): gain 15/14, loss 6.5/14
        //index 16 (-1): gain 195/196, loss 98.5/196
        let expected = 100.0 - 100.0 / (1.0 + 195.0 / 98.5);
        let value = rsi[16].unwrap();
        assert!((value - expected).abs() < 1e-6, "got {}", value);
        assert!((value - 66.439523).abs() < 1e-6);

        //a windowed mean sees the same seven/seven split again
        let rolling = rolling_rsi(&closes, 16, 14);
        assert!((rolling - 200.0 / 3.0).abs() < 1e-9);
        assert!((value - rolling).abs() > 0.1);
    }

    #[test]
    fn test_all_gains_is_100() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let rsi = wilder_rsi(&closes, 5);
        assert!(rsi[5..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_all_losses_is_0() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let rsi = wilder_rsi(&closes, 5);
        assert!(rsi[5..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_compute_warmup_layout() {
        let prices = series_from(&alternating_closes());
        let series = compute(&prices, 14, 3);

        assert_eq!(series.warmup_len(), 16);
        //primary values start at the 15th date
        assert_eq!(series.points().len(), 20 - 14);
        assert!(series.points()[0].smoothed.is_none());
        assert!(series.points()[1].smoothed.is_none());

        let dates: Vec<_> = prices.dates().collect();
        assert_eq!(series.first_smoothed_date(), Some(dates[16]));
        assert!(series.smoothed_on(dates[15]).is_none());

        let rsi = wilder_rsi(&alternating_closes(), 14);
        let expected = (rsi[14].unwrap() + rsi[15].unwrap() + rsi[16].unwrap()) / 3.0;
        let smoothed = series.smoothed_on(dates[16]).unwrap();
        assert!((smoothed - expected).abs() < 1e-9);
        assert!((smoothed - 67.624544).abs() < 1e-6);
    }

    #[test]
    fn test_compute_with_short_series_is_empty() {
        let prices = series_from(&alternating_closes()[..20]);
        let series = compute(&prices, 14, 7);
        assert!(series.is_empty());
        assert!(series.first_smoothed_date().is_none());
    }

    #[test]
    fn test_compute_exact_warmup_has_one_smoothed_value() {
        let mut closes = alternating_closes();
        closes.push(110.0);
        let prices = series_from(&closes);
        let series = compute(&prices, 14, 7);

        let smoothed: Vec<_> = series.points().iter().filter_map(|p| p.smoothed).collect();
        assert_eq!(smoothed.len(), 1);
        assert_eq!(series.first_smoothed_date(), prices.last_date());
    }
}

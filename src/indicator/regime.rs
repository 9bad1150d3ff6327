use crate::data::PriceSeries;
use crate::indicator::rolling_mean;
use chrono::NaiveDate;
use std::collections::HashMap;

//classifies dates as bull or bear by close versus its trailing average
#[derive(Debug, Clone)]
pub struct RegimeFilter {
    averages: HashMap<NaiveDate, f64>,
}

impl RegimeFilter {
    pub fn new(prices: &PriceSeries, window: usize) -> Self {
        let averages = prices
            .dates()
            .zip(rolling_mean(&prices.closes(), window))
            .filter_map(|(date, avg)| avg.map(|avg| (date, avg)))
            .collect();

        RegimeFilter { averages }
    }

    pub fn average_on(&self, date: NaiveDate) -> Option<f64> {
        self.averages.get(&date).copied()
    }

    //some(true) when close is strictly above the average, none before the window fills
    pub fn is_bull(&self, date: NaiveDate, close: f64) -> Option<bool> {
        self.average_on(date).map(|avg| close > avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;

    #[test]
    fn test_bull_and_bear_classification() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let closes = [10.0, 12.0, 14.0, 9.0];
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + chrono::Duration::days(i as i64), c))
            .collect();
        let prices = PriceSeries::new(points).unwrap();
        let dates: Vec<_> = prices.dates().collect();

        let filter = RegimeFilter::new(&prices, 3);
        assert_eq!(filter.is_bull(dates[1], 12.0), None);
        //avg(10, 12, 14) = 12
        assert_eq!(filter.is_bull(dates[2], 14.0), Some(true));
        //avg(12, 14, 9) = 11.67
        assert_eq!(filter.is_bull(dates[3], 9.0), Some(false));
    }
}

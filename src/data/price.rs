use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("price series is empty")]
    Empty,
    #[error("dates must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: NaiveDate, next: NaiveDate },
    #[error("invalid close ({close}) on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, close: f64 },
    #[error("no fx rate on or before {0}")]
    MissingFxRate(NaiveDate),
}

//a single daily close
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

//ordered, date-indexed daily closes
//immutable once built, every component borrows it read-only
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: IndexMap<NaiveDate, f64>,
}

impl PriceSeries {
    //builds a series, rejecting unordered dates and unusable prices
    pub fn new(points: Vec<PricePoint>) -> Result<Self, DataError> {
        if points.is_empty() {
            return Err(DataError::Empty);
        }

        let mut closes = IndexMap::with_capacity(points.len());
        let mut previous: Option<NaiveDate> = None;

        for point in points {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(DataError::InvalidPrice {
                    date: point.date,
                    close: point.close,
                });
            }

            if let Some(previous) = previous {
                if point.date <= previous {
                    return Err(DataError::NotIncreasing {
                        previous,
                        next: point.date,
                    });
                }
            }

            previous = Some(point.date);
            closes.insert(point.date, point.close);
        }

        Ok(PriceSeries { closes })
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    //close on an exact date
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    //position of a date in the series
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.closes.first().map(|(date, _)| *date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.closes.last().map(|(date, _)| *date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.closes.keys().copied()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.closes.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.closes
            .iter()
            .map(|(&date, &close)| PricePoint::new(date, close))
    }

    //converts every close into another currency
    //uses the latest fx rate on or before each date (fx series may have its own holidays)
    pub fn convert(&self, fx: &PriceSeries) -> Result<PriceSeries, DataError> {
        let rates: Vec<PricePoint> = fx.iter().collect();
        let mut cursor = 0;
        let mut current_rate: Option<f64> = None;
        let mut converted = Vec::with_capacity(self.len());

        for point in self.iter() {
            while cursor < rates.len() && rates[cursor].date <= point.date {
                current_rate = Some(rates[cursor].close);
                cursor += 1;
            }

            let rate = current_rate.ok_or(DataError::MissingFxRate(point.date))?;
            converted.push(PricePoint::new(point.date, point.close * rate));
        }

        PriceSeries::new(converted)
    }
}

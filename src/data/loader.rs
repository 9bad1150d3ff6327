use crate::data::price::{PricePoint, PriceSeries};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

//any extra columns (open, high, low, volume) are ignored
#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    close: f64,
}

//loads a daily close series from a csv file with `date,close` columns
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut points = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let date = parse_date(&record.date).context(format!(
            "Failed to parse date '{}' at line {}",
            record.date,
            index + 2
        ))?;

        points.push(PricePoint::new(date, record.close));
    }

    //sort by date to ensure chronological order
    points.sort_by(|a, b| a.date.cmp(&b.date));

    let series = PriceSeries::new(points).context(format!("Invalid price data in {:?}", path))?;
    tracing::debug!(path = ?path, rows = series.len(), "loaded price series");

    Ok(series)
}

//accepts plain dates and rfc3339 timestamps (quote providers emit both)
fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    let timestamp = chrono::DateTime::parse_from_rfc3339(raw)?;
    Ok(timestamp.date_naive())
}

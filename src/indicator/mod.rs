pub mod regime;
pub mod rsi;

pub use regime::RegimeFilter;
pub use rsi::{compute, wilder_rsi, IndicatorPoint, IndicatorSeries};

//trailing simple moving average, none until `window` values are available
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    //summed per window, no running total
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let sum: f64 = values[i + 1 - window..=i].iter().sum();
        *slot = Some(sum / window as f64);
    }

    out
}

pub mod loader;
pub mod price;

pub use loader::load_csv;
pub use price::{DataError, PricePoint, PriceSeries};

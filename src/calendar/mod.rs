pub mod holidays;
pub mod market;

pub use holidays::{easter_sunday, HolidayRule};
pub use market::{HolidayCalendar, Market};

use chrono::NaiveDate;

//session calendar for one market jurisdiction
pub trait TradingCalendar {
    //false on weekends and holidays
    fn is_trading_day(&self, date: NaiveDate) -> bool;

    //smallest session on or after `date`
    fn next_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut candidate = date;
        while !self.is_trading_day(candidate) {
            candidate = match candidate.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        candidate
    }
}

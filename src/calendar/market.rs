use crate::calendar::holidays::HolidayRule;
use crate::calendar::TradingCalendar;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

//market jurisdiction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    //new york stock exchange
    Nyse,
    //frankfurt xetra
    Xetra,
    //every monday to friday, no holidays
    Weekdays,
}

impl Market {
    //parse market from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nyse" | "us" => Some(Market::Nyse),
            "xetra" | "de" | "fra" => Some(Market::Xetra),
            "weekdays" | "none" => Some(Market::Weekdays),
            _ => None,
        }
    }

    pub fn holiday_rules(&self) -> Vec<HolidayRule> {
        use HolidayRule::*;

        match self {
            Market::Nyse => vec![
                Observed { month: 1, day: 1, first_year: 1 },
                NthWeekday { month: 1, weekday: Weekday::Mon, n: 3 },
                NthWeekday { month: 2, weekday: Weekday::Mon, n: 3 },
                EasterOffset(-2),
                LastWeekday { month: 5, weekday: Weekday::Mon },
                Observed { month: 6, day: 19, first_year: 2022 },
                Observed { month: 7, day: 4, first_year: 1 },
                NthWeekday { month: 9, weekday: Weekday::Mon, n: 1 },
                NthWeekday { month: 11, weekday: Weekday::Thu, n: 4 },
                Observed { month: 12, day: 25, first_year: 1 },
            ],
            Market::Xetra => vec![
                Fixed { month: 1, day: 1 },
                EasterOffset(-2),
                EasterOffset(1),
                Fixed { month: 5, day: 1 },
                Fixed { month: 12, day: 24 },
                Fixed { month: 12, day: 25 },
                Fixed { month: 12, day: 26 },
                Fixed { month: 12, day: 31 },
            ],
            Market::Weekdays => Vec::new(),
        }
    }

    //resolves the jurisdiction into its concrete calendar
    pub fn calendar(&self) -> HolidayCalendar {
        HolidayCalendar::new(*self, self.holiday_rules())
    }
}

//saturday/sunday weekend plus a fixed set of annual holiday rules
//weekend shifts only apply to rules that carry them (nyse observed dates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    market: Market,
    rules: Vec<HolidayRule>,
}

impl HolidayCalendar {
    pub fn new(market: Market, rules: Vec<HolidayRule>) -> Self {
        HolidayCalendar { market, rules }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.rules.iter().any(|rule| rule.matches(date))
    }
}

impl TradingCalendar for HolidayCalendar {
    fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }
}

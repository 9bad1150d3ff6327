use chrono::{Datelike, Duration, NaiveDate, Weekday};

//an annual market holiday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayRule {
    //same month/day every year
    Fixed { month: u32, day: u32 },
    //fixed month/day from a given year, saturday observed on friday and sunday on monday
    Observed { month: u32, day: u32, first_year: i32 },
    //days relative to easter sunday (good friday = -2, easter monday = 1)
    EasterOffset(i64),
    //nth weekday of a month, n starting at 1
    NthWeekday { month: u32, weekday: Weekday, n: u8 },
    //last given weekday of a month
    LastWeekday { month: u32, weekday: Weekday },
}

impl HolidayRule {
    //the holiday's date in a given year, none if the rule doesn't apply that year
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            HolidayRule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            HolidayRule::Observed {
                month,
                day,
                first_year,
            } => {
                if year < first_year {
                    return None;
                }
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                let observed = match date.weekday() {
                    Weekday::Sat => date.pred_opt()?,
                    Weekday::Sun => date.succ_opt()?,
                    _ => date,
                };
                //a shift into another year is not observed
                (observed.year() == year).then_some(observed)
            }
            HolidayRule::EasterOffset(offset) => {
                easter_sunday(year).map(|easter| easter + Duration::days(offset))
            }
            HolidayRule::NthWeekday { month, weekday, n } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
            }
            HolidayRule::LastWeekday { month, weekday } => {
                let mut date = last_day_of_month(year, month)?;
                while date.weekday() != weekday {
                    date = date.pred_opt()?;
                }
                Some(date)
            }
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        self.date_in(date.year()) == Some(date)
    }
}

//gregorian easter sunday (anonymous / meeus-jones-butcher algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

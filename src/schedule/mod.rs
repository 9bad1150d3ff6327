use crate::calendar::TradingCalendar;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

//an intended contribution date and the session it actually executes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionDate {
    pub nominal: NaiveDate,
    pub actual: NaiveDate,
}

impl ExecutionDate {
    pub fn was_rolled(&self) -> bool {
        self.nominal != self.actual
    }
}

//a nominal date whose roll landed on an already scheduled session
//it is skipped, its contribution is not carried into the earlier execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCollision {
    pub nominal: NaiveDate,
    pub actual: NaiveDate,
    pub skipped_for: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub dates: Vec<ExecutionDate>,
    pub collisions: Vec<ScheduleCollision>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn actual_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().map(|d| d.actual)
    }
}

//builds the execution dates for a recurring day-of-month pattern over [start, end]
//days missing from a month (eg 30 in february) are skipped
//rolled sessions past `end` are dropped
pub fn schedule<C: TradingCalendar + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    days_of_month: &BTreeSet<u32>,
    calendar: &C,
) -> Schedule {
    let mut out = Schedule::default();
    if start > end || days_of_month.is_empty() {
        return out;
    }

    let mut month_start = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);

    while let Some(first) = month_start {
        if first > end {
            break;
        }

        for &day in days_of_month {
            let Some(nominal) = NaiveDate::from_ymd_opt(first.year(), first.month(), day) else {
                continue;
            };
            if nominal < start || nominal > end {
                continue;
            }

            let actual = calendar.next_trading_day(nominal);
            if actual > end {
                tracing::debug!(%nominal, %actual, "rolled execution date falls after range end");
                continue;
            }

            match out.dates.last() {
                Some(previous) if actual <= previous.actual => {
                    tracing::warn!(
                        %nominal,
                        %actual,
                        skipped_for = %previous.actual,
                        "execution dates collide after holiday roll, skipping"
                    );
                    out.collisions.push(ScheduleCollision {
                        nominal,
                        actual,
                        skipped_for: previous.actual,
                    });
                }
                _ => out.dates.push(ExecutionDate { nominal, actual }),
            }
        }

        month_start = first.checked_add_months(Months::new(1));
    }

    out
}

//! Calendar-month helpers.
//!
//! Month lengths come from fixed tables and a simplified leap-year rule
//! (`year % 400 == 0 || year % 4 == 0`), so century years such as 1900 count
//! as leap years. [`last_of_month`] inherits that: February 1900 ends on
//! March 1st.

use chrono::{DateTime, Datelike, Days, Local, LocalResult, NaiveDate, TimeZone, Utc};

const THIRTY_DAY_MONTHS: [u32; 4] = [4, 6, 9, 11];
const THIRTY_ONE_DAY_MONTHS: [u32; 7] = [1, 3, 5, 7, 8, 10, 12];

/// `true` for years divisible by 4 or 400. The century exception is not applied.
pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || year % 4 == 0
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let month = date.month();
    if THIRTY_DAY_MONTHS.contains(&month) {
        30
    } else if THIRTY_ONE_DAY_MONTHS.contains(&month) {
        31
    } else if is_leap_year(date.year()) {
        29
    } else {
        28
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Day 1 of the following month; December rolls into January of the next year.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// `first_of_month + days_in_month - 1`, rolling past the real month end when
/// the simplified leap rule overcounts February.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_days(Days::new(u64::from(days_in_month(date) - 1)))
        .unwrap_or(NaiveDate::MAX)
}

/// Half-open `[start, end)` window covering the month containing `now` in
/// `tz`, expressed in UTC.
///
/// Boundaries are local midnight. Where midnight does not exist (a DST gap)
/// the next valid instant is used; ambiguous midnights take the earlier one.
pub fn month_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let today = now.date_naive();
    (
        local_midnight(&tz, first_of_month(today)),
        local_midnight(&tz, first_of_next_month(today)),
    )
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Skip forward through the gap an hour at a time.
            (1..=3)
                .find_map(|hour| {
                    let shifted = midnight + chrono::Duration::hours(hour);
                    tz.from_local_datetime(&shifted).earliest()
                })
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}

/// A reference date with the month helpers as methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    date: NaiveDate,
}

impl DateWindow {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Today in the server's local time zone.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn first_of_month(&self) -> NaiveDate {
        first_of_month(self.date)
    }

    pub fn first_of_next_month(&self) -> NaiveDate {
        first_of_next_month(self.date)
    }

    pub fn last_of_month(&self) -> NaiveDate {
        last_of_month(self.date)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.date)
    }

    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.date.year())
    }
}

impl From<NaiveDate> for DateWindow {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

//! Calendar-date arithmetic. Weeks run Monday through Sunday.
//!
//! Every comparison here is on [`NaiveDate`]; instants are converted to a
//! calendar day before they reach this module's callers.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Source of "now" for code that needs to know what today is.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The observer's local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Reads the system clock and the process's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        local_today()
    }
}

/// A clock pinned to one instant. Its local timezone is UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on `date`, so small client offsets stay on the same day.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        Self {
            now: date
                .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
                .and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The client's local day for a UTC instant and a UTC offset in minutes.
pub fn client_today(now: DateTime<Utc>, offset_minutes: i32) -> Result<NaiveDate> {
    if offset_minutes.abs() > MAX_OFFSET_MINUTES {
        return Err(Error::Validation(format!(
            "timezone offset {offset_minutes} minutes is out of range"
        )));
    }
    let offset = FixedOffset::east_opt(offset_minutes * 60)
        .ok_or_else(|| Error::Validation(format!("invalid timezone offset {offset_minutes}")))?;
    Ok(now.with_timezone(&offset).date_naive())
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let well_formed = s.len() == 10
        && s.char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(Error::InvalidDate(format!("'{s}' is not in YYYY-MM-DD format")));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::InvalidDate(format!("'{s}': {e}")))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Monday on or before `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday on or after `date`.
#[must_use]
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

#[must_use]
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (week_start(date), week_end(date))
}

/// The Monday of the week after `date`'s week. A Monday maps to the following Monday.
#[must_use]
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(7)
}

#[must_use]
pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Strictly before today; today itself is never past.
#[must_use]
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

#[must_use]
pub fn is_monday(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() == 0
}

#[must_use]
pub fn in_week(date: NaiveDate, week_start: NaiveDate) -> bool {
    date >= week_start && date <= week_start + Duration::days(6)
}

/// Start dates of every Monday-start week that overlaps the given month.
pub fn weeks_of_month(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidDate(format!("{year}-{month:02} is not a valid month")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::InvalidDate(format!("{year}-{month:02} is out of range")))?;
    let last = next_first - Duration::days(1);

    let mut weeks = Vec::new();
    let mut cursor = week_start(first);
    while cursor <= last {
        weeks.push(cursor);
        cursor += Duration::days(7);
    }
    Ok(weeks)
}

//! Date range resolution
//!
//! Turns a (from_date, to_date, timezone) triple into absolute UTC instant
//! boundaries. `from_date` is interpreted as 00:00:00 and `to_date` as the
//! end of that calendar day, both in the request timezone, so the range
//! covers every event on the `to_date` calendar day in the user's locale.
//! Treating both bounds as UTC midnight silently drops end-of-day local
//! activity, which is the bug this type exists to prevent.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::timezone::ValidTimezone;
use crate::error::DomainError;

/// Maximum inclusive day count a single request may span
pub const MAX_RANGE_DAYS: i64 = 200;

/// An immutable, resolved query window. Constructed once per request,
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from_date: NaiveDate,
    to_date: NaiveDate,
    from_instant: DateTime<Utc>,
    to_instant: DateTime<Utc>,
    timezone: ValidTimezone,
}

impl DateRange {
    /// Resolve explicit calendar dates against `now`.
    pub fn resolve(
        from_date: &str,
        to_date: &str,
        timezone: ValidTimezone,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let from = parse_calendar_date(from_date)?;
        let to = parse_calendar_date(to_date)?;

        // Calendar comparison happens before any timezone conversion.
        if from > to {
            return Err(DomainError::InvalidDateRange {
                from: from_date.to_string(),
                to: to_date.to_string(),
            });
        }

        let days = (to - from).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(DomainError::DateRangeTooLarge {
                days,
                max: MAX_RANGE_DAYS,
            });
        }

        let today = now.with_timezone(&timezone.tz()).date_naive();
        if to > today {
            return Err(DomainError::FutureDateNotAllowed(to_date.to_string()));
        }

        Ok(Self::from_dates(from, to, timezone))
    }

    /// Rolling window of `n` whole calendar days ending yesterday in the
    /// given timezone. Today is deliberately excluded so the future-date
    /// check cannot race clock skew between caller and server.
    pub fn last_n_days(
        n: u32,
        timezone: ValidTimezone,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if n == 0 || i64::from(n) > MAX_RANGE_DAYS {
            return Err(DomainError::InvalidParameter(format!(
                "days must be between 1 and {}",
                MAX_RANGE_DAYS
            )));
        }
        let today = now.with_timezone(&timezone.tz()).date_naive();
        let from = today - Duration::days(i64::from(n));
        let to = today - Duration::days(1);
        Ok(Self::from_dates(from, to, timezone))
    }

    fn from_dates(from: NaiveDate, to: NaiveDate, timezone: ValidTimezone) -> Self {
        Self {
            from_date: from,
            to_date: to,
            from_instant: start_of_day_utc(timezone.tz(), from),
            to_instant: end_of_day_utc(timezone.tz(), to),
            timezone,
        }
    }

    pub fn from_instant(&self) -> DateTime<Utc> {
        self.from_instant
    }

    pub fn to_instant(&self) -> DateTime<Utc> {
        self.to_instant
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to_date
    }

    pub fn timezone(&self) -> ValidTimezone {
        self.timezone
    }

    /// Inclusive day count
    pub fn days(&self) -> i64 {
        (self.to_date - self.from_date).num_days() + 1
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from_instant <= instant && instant <= self.to_instant
    }
}

/// Strict `YYYY-MM-DD`: exactly ten characters, digits and hyphens in the
/// right places. chrono alone would also accept unpadded forms like
/// `2026-1-1`.
fn parse_calendar_date(input: &str) -> Result<NaiveDate, DomainError> {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if !shape_ok {
        return Err(DomainError::InvalidDateFormat(input.to_string()));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDateFormat(input.to_string()))
}

/// First instant of the calendar day in `tz`. A DST gap at midnight slides
/// forward an hour at a time until the wall clock exists; a fold takes the
/// earlier occurrence.
fn start_of_day_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let mut time = NaiveTime::MIN;
    for _ in 0..4 {
        match tz.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => time = time + Duration::hours(1),
        }
    }
    // No real zone has a gap this wide; read the wall clock as UTC.
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Last instant of the calendar day in `tz`, symmetric with
/// [`start_of_day_utc`]: folds take the later occurrence, gaps slide back.
fn end_of_day_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let mut time = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or(NaiveTime::MIN);
    for _ in 0..4 {
        match tz.from_local_datetime(&date.and_time(time)) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(_, latest) => return latest.with_timezone(&Utc),
            LocalResult::None => time = time - Duration::hours(1),
        }
    }
    Utc.from_utc_datetime(&date.and_time(time))
}

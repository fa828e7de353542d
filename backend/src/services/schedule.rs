use chrono::{DateTime, Days, Duration, LocalResult, Months, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use shared::IntervalUnit;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("unsupported interval unit: {0}")]
    UnsupportedUnit(String),
    #[error("computed date out of range")]
    OutOfRange,
}

/// Advance `base` by `value` units of `unit`.
///
/// HOURS and WEEKS are fixed-length durations. DAYS, MONTHS and YEARS are
/// calendar units evaluated as wall-clock time in `tz`: a task due at 09:00
/// local stays due at 09:00 across a DST transition, and Jan 31 plus one
/// month lands on the last day of February.
pub fn advance(
    base: DateTime<Utc>,
    unit: IntervalUnit,
    value: u32,
    tz: Tz,
) -> Result<DateTime<Utc>, ScheduleError> {
    match unit {
        IntervalUnit::Hours => base
            .checked_add_signed(Duration::hours(i64::from(value)))
            .ok_or(ScheduleError::OutOfRange),
        IntervalUnit::Weeks => base
            .checked_add_signed(Duration::weeks(i64::from(value)))
            .ok_or(ScheduleError::OutOfRange),
        IntervalUnit::Days => {
            let local = base.with_timezone(&tz).naive_local();
            let shifted = local
                .checked_add_days(Days::new(u64::from(value)))
                .ok_or(ScheduleError::OutOfRange)?;
            resolve_local(shifted, tz)
        }
        IntervalUnit::Months => add_months(base, value, tz),
        IntervalUnit::Years => {
            let months = value.checked_mul(12).ok_or(ScheduleError::OutOfRange)?;
            add_months(base, months, tz)
        }
    }
}

fn add_months(base: DateTime<Utc>, months: u32, tz: Tz) -> Result<DateTime<Utc>, ScheduleError> {
    let local = base.with_timezone(&tz).naive_local();
    let shifted = local
        .checked_add_months(Months::new(months))
        .ok_or(ScheduleError::OutOfRange)?;
    resolve_local(shifted, tz)
}

/// Resolve a local wall-clock time back to an instant. A time skipped by a
/// DST gap moves forward one hour; an ambiguous time takes the earlier
/// offset.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, ScheduleError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            let bumped = naive
                .checked_add_signed(Duration::hours(1))
                .ok_or(ScheduleError::OutOfRange)?;
            match tz.from_local_datetime(&bumped) {
                LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
                LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
                LocalResult::None => Err(ScheduleError::OutOfRange),
            }
        }
    }
}

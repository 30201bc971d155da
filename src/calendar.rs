//! Calendar arithmetic for delaying activities.
//!
//! Minutes and hours shift the instant. Days, weeks and months shift the
//! wall-clock time in the activity's zone, so "one day later" keeps the same
//! local time across a DST change. An instant in the second pass of a
//! repeated hour has no wall-clock form of its own and is rejected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta};
use chrono_tz::Tz;

use crate::activity::{localize, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl DelayUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayUnit::Minute => "minute",
            DelayUnit::Hour => "hour",
            DelayUnit::Day => "day",
            DelayUnit::Week => "week",
            DelayUnit::Month => "month",
        }
    }
}

impl FromStr for DelayUnit {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "minute" | "minutes" => Ok(DelayUnit::Minute),
            "hour" | "hours" => Ok(DelayUnit::Hour),
            "day" | "days" => Ok(DelayUnit::Day),
            "week" | "weeks" => Ok(DelayUnit::Week),
            "month" | "months" => Ok(DelayUnit::Month),
            other => Err(Error::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add `count` units to `timestamp`. Negative counts move it earlier.
///
/// Month addition clamps to the end of the target month
/// (January 31st plus one month is the last day of February).
pub fn add(timestamp: &DateTime<Tz>, count: i64, unit: DelayUnit) -> Result<DateTime<Tz>> {
    let out_of_range =
        || Error::InvalidArgument(format!("delay of {count} {unit}(s) is out of range"));

    match unit {
        DelayUnit::Minute | DelayUnit::Hour => {
            let delta = if unit == DelayUnit::Minute {
                TimeDelta::try_minutes(count)
            } else {
                TimeDelta::try_hours(count)
            };
            let shifted = delta
                .and_then(|delta| timestamp.checked_add_signed(delta))
                .ok_or_else(out_of_range)?;
            // The log keeps wall-clock time only, which reads back as the
            // first occurrence when DST ends and the hour repeats.
            match localize(shifted.timezone(), shifted.naive_local()) {
                Some(stored) if stored == shifted => Ok(shifted),
                _ => Err(Error::InvalidArgument(format!(
                    "{} occurs twice as daylight saving ends and only the first can be recorded; \
                     delay by a different amount",
                    shifted.format(TIMESTAMP_FORMAT)
                ))),
            }
        }
        DelayUnit::Day | DelayUnit::Week => {
            let days = if unit == DelayUnit::Week {
                count.checked_mul(7)
            } else {
                Some(count)
            };
            let local = timestamp.naive_local();
            days.and_then(TimeDelta::try_days)
                .and_then(|delta| local.checked_add_signed(delta))
                .and_then(|shifted| localize(timestamp.timezone(), shifted))
                .ok_or_else(out_of_range)
        }
        DelayUnit::Month => {
            let months = u32::try_from(count.unsigned_abs()).map_err(|_| out_of_range())?;
            let local = timestamp.naive_local();
            let shifted = if count >= 0 {
                local.checked_add_months(Months::new(months))
            } else {
                local.checked_sub_months(Months::new(months))
            };
            shifted
                .and_then(|shifted| localize(timestamp.timezone(), shifted))
                .ok_or_else(out_of_range)
        }
    }
}

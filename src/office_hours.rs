//! Office-hours gate
//!
//! Decides whether the support team is working at a given instant, from the
//! weekly schedule the platform returns.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Day value that applies to every weekday without its own entry
const ANY_DAY: u8 = 0;

/// Schedule as returned by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeHours {
    /// UTC offset such as `+07:00`
    pub timezone: String,
    pub office_hours: Vec<OfficeHourEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeHourEntry {
    /// 1 = Monday .. 7 = Sunday, 0 = any day
    pub day: u8,
    pub starttime: String,
    pub endtime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfficeHoursError {
    #[error("Invalid timezone offset {0:?}")]
    InvalidTimezone(String),
    #[error("Invalid time {0:?}")]
    InvalidTime(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Window {
    day: u8,
    start: NaiveTime,
    end: NaiveTime,
}

/// Parsed weekly schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklySchedule {
    offset: FixedOffset,
    windows: Vec<Window>,
}

impl TryFrom<&OfficeHours> for WeeklySchedule {
    type Error = OfficeHoursError;

    fn try_from(hours: &OfficeHours) -> Result<Self, Self::Error> {
        let windows = hours
            .office_hours
            .iter()
            .map(|entry| {
                Ok(Window {
                    day: entry.day,
                    start: parse_time(&entry.starttime)?,
                    end: parse_time(&entry.endtime)?,
                })
            })
            .collect::<Result<_, OfficeHoursError>>()?;

        Ok(Self {
            offset: parse_offset(&hours.timezone)?,
            windows,
        })
    }
}

impl WeeklySchedule {
    /// Open iff the local time falls inside the weekday's window, or the
    /// catch-all window when the weekday has none. Both ends are inclusive
    /// at minute granularity.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.offset);
        let Some(minute) = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0) else {
            return false;
        };
        let Ok(weekday) = u8::try_from(local.weekday().number_from_monday()) else {
            return false;
        };

        let for_day: Vec<&Window> = self.windows.iter().filter(|w| w.day == weekday).collect();
        let windows = if for_day.is_empty() {
            self.windows.iter().filter(|w| w.day == ANY_DAY).collect()
        } else {
            for_day
        };

        windows
            .iter()
            .any(|w| w.start <= minute && minute <= w.end)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, OfficeHoursError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| OfficeHoursError::InvalidTime(value.to_string()))
}

/// Parse `+HH:MM` / `-HH:MM`; an empty string is UTC
fn parse_offset(value: &str) -> Result<FixedOffset, OfficeHoursError> {
    let invalid = || OfficeHoursError::InvalidTimezone(value.to_string());
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let time = NaiveTime::parse_from_str(rest, "%H:%M").map_err(|_| invalid())?;
    let seconds = i32::try_from(time.hour() * 3600 + time.minute() * 60).map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * seconds).ok_or_else(invalid)
}

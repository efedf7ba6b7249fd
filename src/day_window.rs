//! Calendar-day search windows.
//!
//! Every day-relative field (sunrise, twilight, next equinox, ...) is searched
//! from the local midnight of the sample's own calendar day, so an event that
//! already happened this morning is still reported until the day ends.
use std::fmt;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};

use crate::{
    celestial_errors::CelestialError,
    constants::{UnixSeconds, MJD, SECONDS_PER_DAY},
    time::{mjd_to_unix, unix_to_mjd},
};

/// Time zone used to find the local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalZone {
    /// Zone of the host system, daylight saving included.
    #[default]
    System,
    /// Constant offset east of UTC.
    Fixed(FixedOffset),
}

impl LocalZone {
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CelestialError> {
        FixedOffset::east_opt(minutes * 60)
            .map(LocalZone::Fixed)
            .ok_or_else(|| CelestialError::InvalidConfig(format!("utc offset of {minutes} minutes")))
    }

    fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            LocalZone::System => instant.with_timezone(&Local).date_naive(),
            LocalZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// UTC instant of the first moment of `date` in this zone.
    fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            LocalZone::System => first_valid(&Local, midnight),
            LocalZone::Fixed(offset) => first_valid(offset, midnight),
        }
    }
}

/// Resolve a local wall-clock time, stepping over a daylight-saving gap.
fn first_valid<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    (0..=2)
        .map(|hours| local + Duration::hours(hours))
        .find_map(|candidate| match zone.from_local_datetime(&candidate) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        })
        .map(|t| t.with_timezone(&Utc))
}

/// A 24 hour window starting at local midnight, expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWindow {
    date: NaiveDate,
    zone: LocalZone,
    start: MJD,
    end: MJD,
}

impl DayWindow {
    /// Window of the local calendar day containing `unix`.
    pub fn containing(unix: UnixSeconds, zone: LocalZone) -> Result<Self, CelestialError> {
        let instant = DateTime::<Utc>::from_timestamp(unix.floor() as i64, 0)
            .filter(|_| unix.is_finite())
            .ok_or_else(|| CelestialError::InvalidTimestamp(format!("{unix}")))?;
        Self::for_date(zone.local_date(&instant), zone)
    }

    pub fn for_date(date: NaiveDate, zone: LocalZone) -> Result<Self, CelestialError> {
        let midnight = zone
            .start_of_day(date)
            .ok_or_else(|| CelestialError::InvalidTimestamp(format!("no local midnight on {date}")))?;
        let start = unix_to_mjd(midnight.timestamp() as f64);
        Ok(DayWindow {
            date,
            zone,
            start,
            end: start + 1.0,
        })
    }

    /// Same window moved by whole calendar days.
    pub fn shift(&self, days: i64) -> Result<Self, CelestialError> {
        let date = self
            .date
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| CelestialError::InvalidTimestamp(format!("{} + {days} days", self.date)))?;
        Self::for_date(date, self.zone)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> MJD {
        self.start
    }

    pub fn end(&self) -> MJD {
        self.end
    }

    pub fn start_unix(&self) -> UnixSeconds {
        mjd_to_unix(self.start)
    }

    /// Window length in seconds (always one day).
    pub fn length_seconds(&self) -> f64 {
        (self.end - self.start) * SECONDS_PER_DAY
    }

    /// Offset east of UTC at the start of the window, seconds.
    pub fn utc_offset_seconds(&self) -> i32 {
        match self.zone {
            LocalZone::Fixed(offset) => offset.local_minus_utc(),
            LocalZone::System => Local
                .offset_from_utc_date(&self.date)
                .fix()
                .local_minus_utc(),
        }
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (MJD {:.5} .. {:.5}, UTC{:+})",
            self.date,
            self.start,
            self.end,
            self.utc_offset_seconds() / 3600
        )
    }
}

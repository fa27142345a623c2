//! Operating-hours windows and block selection.
//!
//! All stepping is done on classroom wall-clock time and each step is then
//! localized, so a window keeps its wall-clock hours across DST changes.
//! Ambiguous local times resolve to the earlier instant. Local times that do
//! not exist (spring-forward gap) are rejected as window endpoints and
//! skipped as block steps.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use tracing::warn;

use campipe_models::{TimeBlock, BLOCK_MINUTES};

use crate::error::{SchedulerError, SchedulerResult};

const TIME_OF_DAY_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

const REPROCESS_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Operating hours anchored to one calendar day in a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    tz: Tz,
    start_local: NaiveDateTime,
    duration: Duration,
}

impl OperatingWindow {
    /// Start of the window as an instant.
    ///
    /// Always present for windows built by [`parse_range`]; may be `None` for
    /// a shifted window whose start falls into a DST gap.
    pub fn start(&self) -> Option<DateTime<Tz>> {
        self.tz.from_local_datetime(&self.start_local).earliest()
    }

    /// Start of the window in classroom wall-clock time.
    pub fn start_local(&self) -> NaiveDateTime {
        self.start_local
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The same hours one day earlier.
    pub fn previous_day(&self) -> Self {
        Self {
            start_local: self.start_local - Duration::days(1),
            ..*self
        }
    }

    /// Ten-minute blocks that fit entirely inside the window, in order.
    pub fn blocks(&self) -> Vec<TimeBlock> {
        let count = self.duration.num_minutes() / BLOCK_MINUTES;
        (0..count)
            .filter_map(|i| {
                let local = self.start_local + Duration::minutes(i * BLOCK_MINUTES);
                match self.tz.from_local_datetime(&local).earliest() {
                    Some(start) => Some(TimeBlock::new(start)),
                    None => {
                        warn!(local = %local, tz = %self.tz, "Skipping block in DST gap");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Which days contribute blocks to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPolicy {
    /// Also check the previous day's blocks.
    pub check_yesterday: bool,
    /// Treat Saturday and Sunday like weekdays.
    pub include_weekends: bool,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            check_yesterday: true,
            include_weekends: false,
        }
    }
}

impl BlockPolicy {
    /// Policy for an explicit reprocessing run: exactly the requested day.
    pub fn reprocessing() -> Self {
        Self {
            check_yesterday: false,
            include_weekends: true,
        }
    }

    /// Select the blocks to check for a run whose classroom date falls on
    /// `weekday`. `today` is the window anchored to that date.
    ///
    /// Yesterday's blocks come first. The two sets are not deduplicated.
    pub fn select(&self, today: &OperatingWindow, weekday: Weekday) -> Vec<TimeBlock> {
        let day_of_week = weekday.number_from_monday();
        let mut blocks = Vec::new();

        if self.check_yesterday && ((1 < day_of_week && day_of_week < 7) || self.include_weekends) {
            blocks.extend(today.previous_day().blocks());
        }
        if day_of_week <= 5 || self.include_weekends {
            blocks.extend(today.blocks());
        }

        blocks
    }
}

/// Parse `"HH:MM-HH:MM"` and anchor it to `date` in `tz`.
///
/// Fails if either side is not a time of day or if the end is not after the
/// start.
pub fn parse_range(hours: &str, date: NaiveDate, tz: Tz) -> SchedulerResult<OperatingWindow> {
    let (start, end) = hours
        .split_once('-')
        .ok_or_else(|| SchedulerError::invalid_hours(hours, "expected HH:MM-HH:MM"))?;

    let start_time = parse_time_of_day(start)
        .ok_or_else(|| {
            SchedulerError::invalid_hours(hours, format!("bad start time '{}'", start.trim()))
        })?;
    let end_time = parse_time_of_day(end)
        .ok_or_else(|| {
            SchedulerError::invalid_hours(hours, format!("bad end time '{}'", end.trim()))
        })?;

    let start_local = date.and_time(start_time);
    let end_local = date.and_time(end_time);
    if end_local <= start_local {
        return Err(SchedulerError::invalid_hours(hours, "end must be after start"));
    }

    localize(tz, start_local)?;
    localize(tz, end_local)?;

    Ok(OperatingWindow {
        tz,
        start_local,
        duration: end_local - start_local,
    })
}

/// Parse an explicit reprocessing date/time as classroom wall-clock time.
///
/// A bare date means midnight.
pub fn parse_reprocess_date(value: &str, tz: Tz) -> SchedulerResult<DateTime<Tz>> {
    let value = value.trim();
    let naive = REPROCESS_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| SchedulerError::InvalidReprocessDate(value.to_string()))?;

    localize(tz, naive)
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> SchedulerResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SchedulerError::InvalidTimezone(name.to_string()))
}

fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

fn localize(tz: Tz, local: NaiveDateTime) -> SchedulerResult<DateTime<Tz>> {
    tz.from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| SchedulerError::NonexistentLocalTime(local.to_string()))
}

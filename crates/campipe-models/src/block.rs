//! Ten-minute scheduling blocks.

use std::fmt;

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;

/// Length of one block in minutes.
pub const BLOCK_MINUTES: i64 = 10;

/// A fixed ten-minute window starting at `start`, in classroom time.
///
/// Blocks are generated, never mutated. They are only consumed to derive
/// the archive hour directory and the minute-digit prefix that groups the
/// block's source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBlock {
    start: DateTime<Tz>,
}

impl TimeBlock {
    pub fn new(start: DateTime<Tz>) -> Self {
        Self { start }
    }

    /// Block length.
    pub fn duration() -> Duration {
        Duration::minutes(BLOCK_MINUTES)
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.start + Self::duration()
    }

    /// Archive path portion for the block's hour, e.g. `2024/03/06/07`.
    pub fn hour_path(&self) -> String {
        self.start.format("%Y/%m/%d/%H").to_string()
    }

    /// First digit of the zero-padded minute. Prefix `3` covers minutes 30-39.
    pub fn minute_prefix(&self) -> String {
        (self.start.minute() / 10).to_string()
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn block_at(h: u32, m: u32) -> TimeBlock {
        let tz: Tz = "US/Central".parse().unwrap();
        TimeBlock::new(tz.with_ymd_and_hms(2024, 3, 6, h, m, 0).unwrap())
    }

    #[test]
    fn test_hour_path_is_zero_padded_wall_clock() {
        assert_eq!(block_at(7, 30).hour_path(), "2024/03/06/07");
    }

    #[test]
    fn test_minute_prefix() {
        assert_eq!(block_at(7, 0).minute_prefix(), "0");
        assert_eq!(block_at(7, 9).minute_prefix(), "0");
        assert_eq!(block_at(7, 30).minute_prefix(), "3");
        assert_eq!(block_at(16, 50).minute_prefix(), "5");
    }

    #[test]
    fn test_end_is_ten_minutes_later() {
        let block = block_at(7, 30);
        assert_eq!(block.end() - block.start(), Duration::minutes(10));
    }
}

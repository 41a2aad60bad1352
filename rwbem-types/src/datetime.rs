//! CIM datetime values (DSP0004 §5.2.5)
//!
//! A CIM datetime is either an absolute timestamp or an interval; both
//! serialize to a fixed 25-character string:
//!
//! - timestamp: `yyyymmddHHMMSS.mmmmmmsUUU` (s = `+`/`-`, UUU = UTC
//!   offset in minutes)
//! - interval: `ddddddddHHMMSS.mmmmmm:000`
//!
//! Parsing accepts exactly those grammars; any deviation fails with an
//! error naming the offending byte position.

use crate::error::{ModelError, ModelResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

const DATETIME_LEN: usize = 25;

const US_PER_SECOND: i64 = 1_000_000;
const US_PER_MINUTE: i64 = 60 * US_PER_SECOND;
const US_PER_HOUR: i64 = 60 * US_PER_MINUTE;
const US_PER_DAY: i64 = 24 * US_PER_HOUR;

/// An absolute point in time with microsecond precision and an explicit
/// UTC offset in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CimTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
    /// Offset from UTC in minutes, -999..=999
    pub utc_offset: i16,
}

/// A duration with microsecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CimInterval {
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub microseconds: u32,
}

/// A CIM datetime value: absolute timestamp or interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CimDateTime {
    Timestamp(CimTimestamp),
    Interval(CimInterval),
}

impl CimTimestamp {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
        utc_offset: i16,
    ) -> ModelResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ModelError::Usage(format!("month {month} out of range")));
        }
        if !(1..=31).contains(&day) {
            return Err(ModelError::Usage(format!("day {day} out of range")));
        }
        if hour > 23 {
            return Err(ModelError::Usage(format!("hour {hour} out of range")));
        }
        if minute > 59 {
            return Err(ModelError::Usage(format!("minute {minute} out of range")));
        }
        if second > 59 {
            return Err(ModelError::Usage(format!("second {second} out of range")));
        }
        if microsecond > 999_999 {
            return Err(ModelError::Usage(format!(
                "microsecond {microsecond} out of range"
            )));
        }
        if year > 9999 {
            return Err(ModelError::Usage(format!("year {year} out of range")));
        }
        if !(-999..=999).contains(&utc_offset) {
            return Err(ModelError::Usage(format!(
                "UTC offset {utc_offset} out of range"
            )));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            utc_offset,
        })
    }

    /// Convert to a chrono datetime with the carried fixed offset
    pub fn to_chrono(&self) -> ModelResult<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(i32::from(self.utc_offset) * 60).ok_or_else(|| {
            ModelError::Usage(format!("UTC offset {} not representable", self.utc_offset))
        })?;
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_micro_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                self.microsecond,
            )
        })
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .ok_or_else(|| ModelError::Usage(format!("timestamp {self} is not a valid calendar date")))
    }

    /// Build from a chrono datetime, truncating below microseconds
    pub fn from_chrono(dt: &DateTime<FixedOffset>) -> ModelResult<Self> {
        let year = u16::try_from(dt.year())
            .map_err(|_| ModelError::Usage(format!("year {} out of range", dt.year())))?;
        Self::new(
            year,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.timestamp_subsec_micros() % 1_000_000,
            (dt.offset().local_minus_utc() / 60) as i16,
        )
    }
}

impl CimInterval {
    pub fn new(days: u32, hours: u8, minutes: u8, seconds: u8, microseconds: u32) -> ModelResult<Self> {
        if days > 99_999_999 {
            return Err(ModelError::Usage(format!("days {days} out of range")));
        }
        if hours > 23 {
            return Err(ModelError::Usage(format!("hours {hours} out of range")));
        }
        if minutes > 59 {
            return Err(ModelError::Usage(format!("minutes {minutes} out of range")));
        }
        if seconds > 59 {
            return Err(ModelError::Usage(format!("seconds {seconds} out of range")));
        }
        if microseconds > 999_999 {
            return Err(ModelError::Usage(format!(
                "microseconds {microseconds} out of range"
            )));
        }
        Ok(Self {
            days,
            hours,
            minutes,
            seconds,
            microseconds,
        })
    }

    /// Total length as a chrono duration
    pub fn to_duration(&self) -> Duration {
        Duration::microseconds(
            i64::from(self.days) * US_PER_DAY
                + i64::from(self.hours) * US_PER_HOUR
                + i64::from(self.minutes) * US_PER_MINUTE
                + i64::from(self.seconds) * US_PER_SECOND
                + i64::from(self.microseconds),
        )
    }

    /// Build from a non-negative chrono duration, truncating below
    /// microseconds
    pub fn from_duration(duration: Duration) -> ModelResult<Self> {
        let total = duration
            .num_microseconds()
            .ok_or_else(|| ModelError::Usage("interval too large for microseconds".to_string()))?;
        if total < 0 {
            return Err(ModelError::Usage(
                "CIM intervals cannot be negative".to_string(),
            ));
        }
        let days = total / US_PER_DAY;
        let rem = total % US_PER_DAY;
        Self::new(
            u32::try_from(days)
                .map_err(|_| ModelError::Usage(format!("interval of {days} days out of range")))?,
            (rem / US_PER_HOUR) as u8,
            (rem % US_PER_HOUR / US_PER_MINUTE) as u8,
            (rem % US_PER_MINUTE / US_PER_SECOND) as u8,
            (rem % US_PER_SECOND) as u32,
        )
    }
}

impl CimDateTime {
    /// The current time as an absolute CIM datetime in UTC
    pub fn now() -> Self {
        // Utc::now() always lands inside the representable field ranges
        let ts = CimTimestamp::from_chrono(&Utc::now().fixed_offset())
            .unwrap_or_else(|_| CimTimestamp {
                year: 1970,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
                microsecond: 0,
                utc_offset: 0,
            });
        Self::Timestamp(ts)
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, Self::Interval(_))
    }
}

fn field(s: &str, start: usize, len: usize, what: &str) -> ModelResult<u32> {
    let text = &s[start..start + len];
    for (i, b) in text.bytes().enumerate() {
        if !b.is_ascii_digit() {
            return Err(ModelError::DateTime {
                text: s.to_string(),
                position: start + i,
                reason: format!("expected digit in {what}"),
            });
        }
    }
    text.parse().map_err(|_| ModelError::DateTime {
        text: s.to_string(),
        position: start,
        reason: format!("{what} does not parse"),
    })
}

fn range_check(s: &str, value: u32, max: u32, position: usize, what: &str) -> ModelResult<()> {
    if value > max {
        return Err(ModelError::DateTime {
            text: s.to_string(),
            position,
            reason: format!("{what} {value} out of range"),
        });
    }
    Ok(())
}

impl FromStr for CimDateTime {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        if s.len() != DATETIME_LEN || !s.is_ascii() {
            return Err(ModelError::DateTime {
                text: s.to_string(),
                position: s.len().min(DATETIME_LEN),
                reason: format!("expected exactly {DATETIME_LEN} ASCII characters"),
            });
        }
        let bytes = s.as_bytes();
        if bytes[14] != b'.' {
            return Err(ModelError::DateTime {
                text: s.to_string(),
                position: 14,
                reason: "expected '.'".to_string(),
            });
        }
        match bytes[21] {
            b'+' | b'-' => {
                let year = field(s, 0, 4, "year")?;
                let month = field(s, 4, 2, "month")?;
                let day = field(s, 6, 2, "day")?;
                let hour = field(s, 8, 2, "hour")?;
                let minute = field(s, 10, 2, "minute")?;
                let second = field(s, 12, 2, "second")?;
                let microsecond = field(s, 15, 6, "microsecond")?;
                let offset = field(s, 22, 3, "UTC offset")?;
                if !(1..=12).contains(&month) {
                    return Err(ModelError::DateTime {
                        text: s.to_string(),
                        position: 4,
                        reason: format!("month {month} out of range"),
                    });
                }
                if !(1..=31).contains(&day) {
                    return Err(ModelError::DateTime {
                        text: s.to_string(),
                        position: 6,
                        reason: format!("day {day} out of range"),
                    });
                }
                range_check(s, hour, 23, 8, "hour")?;
                range_check(s, minute, 59, 10, "minute")?;
                range_check(s, second, 59, 12, "second")?;
                let sign = if bytes[21] == b'-' { -1i16 } else { 1i16 };
                Ok(Self::Timestamp(CimTimestamp {
                    year: year as u16,
                    month: month as u8,
                    day: day as u8,
                    hour: hour as u8,
                    minute: minute as u8,
                    second: second as u8,
                    microsecond,
                    utc_offset: sign * offset as i16,
                }))
            }
            b':' => {
                let days = field(s, 0, 8, "days")?;
                let hours = field(s, 8, 2, "hours")?;
                let minutes = field(s, 10, 2, "minutes")?;
                let seconds = field(s, 12, 2, "seconds")?;
                let microseconds = field(s, 15, 6, "microseconds")?;
                if &s[22..25] != "000" {
                    return Err(ModelError::DateTime {
                        text: s.to_string(),
                        position: 22,
                        reason: "interval suffix must be ':000'".to_string(),
                    });
                }
                range_check(s, hours, 23, 8, "hours")?;
                range_check(s, minutes, 59, 10, "minutes")?;
                range_check(s, seconds, 59, 12, "seconds")?;
                Ok(Self::Interval(CimInterval {
                    days,
                    hours: hours as u8,
                    minutes: minutes as u8,
                    seconds: seconds as u8,
                    microseconds,
                }))
            }
            _ => Err(ModelError::DateTime {
                text: s.to_string(),
                position: 21,
                reason: "expected '+', '-' or ':'".to_string(),
            }),
        }
    }
}

impl fmt::Display for CimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}{:02}.{:06}{}{:03}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
            if self.utc_offset < 0 { '-' } else { '+' },
            self.utc_offset.unsigned_abs(),
        )
    }
}

impl fmt::Display for CimInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08}{:02}{:02}{:02}.{:06}:000",
            self.days, self.hours, self.minutes, self.seconds, self.microseconds,
        )
    }
}

impl fmt::Display for CimDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timestamp(ts) => ts.fmt(f),
            Self::Interval(iv) => iv.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips() {
        let s = "20240101123045.123456+060";
        let dt: CimDateTime = s.parse().unwrap();
        match dt {
            CimDateTime::Timestamp(ts) => {
                assert_eq!(ts.year, 2024);
                assert_eq!(ts.month, 1);
                assert_eq!(ts.day, 1);
                assert_eq!(ts.hour, 12);
                assert_eq!(ts.minute, 30);
                assert_eq!(ts.second, 45);
                assert_eq!(ts.microsecond, 123_456);
                assert_eq!(ts.utc_offset, 60);
            }
            CimDateTime::Interval(_) => panic!("expected timestamp"),
        }
        assert_eq!(dt.to_string(), s);
    }

    #[test]
    fn negative_offset_round_trips() {
        let s = "19981125133015.000000-300";
        let dt: CimDateTime = s.parse().unwrap();
        assert_eq!(dt.to_string(), s);
    }

    #[test]
    fn interval_round_trips() {
        let s = "00000183132542.234567:000";
        let dt: CimDateTime = s.parse().unwrap();
        match dt {
            CimDateTime::Interval(iv) => {
                assert_eq!(iv.days, 183);
                assert_eq!(iv.hours, 13);
                assert_eq!(iv.minutes, 25);
                assert_eq!(iv.seconds, 42);
                assert_eq!(iv.microseconds, 234_567);
            }
            CimDateTime::Timestamp(_) => panic!("expected interval"),
        }
        assert_eq!(dt.to_string(), s);
    }

    #[test]
    fn parse_errors_name_the_position() {
        let err = "20240101123045.123456*060".parse::<CimDateTime>().unwrap_err();
        match err {
            ModelError::DateTime { position, .. } => assert_eq!(position, 21),
            other => panic!("unexpected error {other:?}"),
        }

        let err = "2024010112304x.123456+060".parse::<CimDateTime>().unwrap_err();
        match err {
            ModelError::DateTime { position, .. } => assert_eq!(position, 13),
            other => panic!("unexpected error {other:?}"),
        }

        let err = "short".parse::<CimDateTime>().unwrap_err();
        assert!(matches!(err, ModelError::DateTime { .. }));
    }

    #[test]
    fn month_zero_is_rejected() {
        let err = "20240001123045.123456+000".parse::<CimDateTime>().unwrap_err();
        match err {
            ModelError::DateTime { position, .. } => assert_eq!(position, 4),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn interval_requires_zero_suffix() {
        let err = "00000183132542.234567:001".parse::<CimDateTime>().unwrap_err();
        match err {
            ModelError::DateTime { position, .. } => assert_eq!(position, 22),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn chrono_round_trip() {
        let ts = CimTimestamp::new(2024, 3, 15, 10, 20, 30, 400_500, -90).unwrap();
        let chrono = ts.to_chrono().unwrap();
        assert_eq!(CimTimestamp::from_chrono(&chrono).unwrap(), ts);
    }

    #[test]
    fn duration_round_trip() {
        let iv = CimInterval::new(12, 3, 4, 5, 600_700).unwrap();
        let d = iv.to_duration();
        assert_eq!(CimInterval::from_duration(d).unwrap(), iv);
        assert!(CimInterval::from_duration(Duration::seconds(-1)).is_err());
    }
}

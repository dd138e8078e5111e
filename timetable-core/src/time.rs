//! Time domain utilities.
//!
//! Every "today" and "now" computation goes through a [`ReferenceClock`], which
//! pairs a [`Clock`] (the only place the wall clock is read) with a fixed IANA
//! timezone. Host-local time is never consulted.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TimetableError, TimetableResult};

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Ho_Chi_Minh;

/// A minute of the day, `0..=1440`. 1440 (`24:00`) is only meaningful as an
/// exclusive end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(hour: u16, minute: u16) -> TimetableResult<Self> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(TimetableError::InvalidRange(format!(
                "Invalid time {hour:02}:{minute:02}"
            )));
        }
        Ok(MinuteOfDay(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl FromStr for MinuteOfDay {
    type Err = TimetableError;

    /// Parse a 24-hour `HH:MM` (or `H:MM`) string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            TimetableError::InvalidRange(format!("Invalid time '{s}'. Expected HH:MM"))
        };

        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        MinuteOfDay::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for MinuteOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MinuteOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert an `HH:MM` string to its minute of day.
pub fn minute_of_day(hhmm: &str) -> TimetableResult<u16> {
    hhmm.parse::<MinuteOfDay>().map(MinuteOfDay::minutes)
}

/// Day of the week, serialized as the two-letter iCalendar code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn code(self) -> &'static str {
        match self {
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
            Weekday::Saturday => "SA",
            Weekday::Sunday => "SU",
        }
    }

    /// Days since Monday (Monday = 0).
    pub fn days_from_monday(self) -> u64 {
        chrono::Weekday::from(self).num_days_from_monday() as u64
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

impl FromStr for Weekday {
    type Err = TimetableError;

    /// Accepts `MO`..`SU` as well as English day names and their
    /// three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let weekday = match lower.as_str() {
            "mo" | "mon" | "monday" => Weekday::Monday,
            "tu" | "tue" | "tues" | "tuesday" => Weekday::Tuesday,
            "we" | "wed" | "wednesday" => Weekday::Wednesday,
            "th" | "thu" | "thurs" | "thursday" => Weekday::Thursday,
            "fr" | "fri" | "friday" => Weekday::Friday,
            "sa" | "sat" | "saturday" => Weekday::Saturday,
            "su" | "sun" | "sunday" => Weekday::Sunday,
            _ => {
                return Err(TimetableError::InvalidBlock(format!(
                    "Unknown weekday '{s}'. Expected one of MO, TU, WE, TH, FR, SA, SU"
                )));
            }
        };
        Ok(weekday)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub fn weekday_of(date: NaiveDate) -> Weekday {
    Weekday::of(date)
}

/// Monday of the week containing `date`. Fails for the first days of the
/// earliest representable year, whose Monday does not exist.
pub fn monday_of(date: NaiveDate) -> TimetableResult<NaiveDate> {
    let offset = Weekday::of(date).days_from_monday();
    date.checked_sub_days(Days::new(offset))
        .ok_or_else(|| TimetableError::InvalidRange(format!("No Monday before {date}")))
}

/// Parse an ISO-8601 `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> TimetableResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        TimetableError::InvalidRange(format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
    })
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant. Used to pin "now" in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock bound to the reference timezone.
#[derive(Clone)]
pub struct ReferenceClock {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl ReferenceClock {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        ReferenceClock { tz, clock }
    }

    pub fn system(tz: Tz) -> Self {
        ReferenceClock::new(tz, Arc::new(SystemClock))
    }

    /// A clock frozen at `instant`.
    pub fn fixed(tz: Tz, instant: DateTime<Utc>) -> Self {
        ReferenceClock::new(tz, Arc::new(FixedClock(instant)))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.tz)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn current_minute_of_day(&self) -> MinuteOfDay {
        let now = self.now();
        MinuteOfDay((now.hour() * 60 + now.minute()) as u16)
    }

    /// Monday of the current reference-timezone week.
    pub fn week_start(&self) -> TimetableResult<NaiveDate> {
        monday_of(self.today())
    }
}

impl fmt::Debug for ReferenceClock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReferenceClock")
            .field("tz", &self.tz)
            .field("now", &self.clock.now())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_hhmm() {
        assert_eq!(minute_of_day("08:00").unwrap(), 480);
        assert_eq!(minute_of_day("9:30").unwrap(), 570);
        assert_eq!(minute_of_day("00:00").unwrap(), 0);
        assert_eq!(minute_of_day("23:59").unwrap(), 1439);
        assert_eq!(minute_of_day("24:00").unwrap(), 1440);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "8", "8:0", "08:60", "24:01", "25:00", "ab:cd", "08:00:00", "-1:00"] {
            let err = minute_of_day(bad).unwrap_err();
            assert!(
                matches!(err, TimetableError::InvalidRange(_)),
                "expected InvalidRange for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn minute_of_day_displays_zero_padded() {
        let t: MinuteOfDay = "7:05".parse().unwrap();
        assert_eq!(t.to_string(), "07:05");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
        let back: MinuteOfDay = serde_json::from_str("\"07:05\"").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn weekday_of_known_dates() {
        assert_eq!(weekday_of(date(2024, 1, 1)), Weekday::Monday);
        assert_eq!(weekday_of(date(2024, 1, 3)), Weekday::Wednesday);
        assert_eq!(weekday_of(date(2024, 1, 7)), Weekday::Sunday);
    }

    #[test]
    fn weekday_wire_codes() {
        assert_eq!(serde_json::to_string(&Weekday::Thursday).unwrap(), "\"TH\"");
        let parsed: Weekday = serde_json::from_str("\"SU\"").unwrap();
        assert_eq!(parsed, Weekday::Sunday);
        assert_eq!("fri".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert!("xx".parse::<Weekday>().is_err());
    }

    #[test]
    fn monday_of_normalizes_any_day() {
        assert_eq!(monday_of(date(2024, 1, 1)).unwrap(), date(2024, 1, 1));
        assert_eq!(monday_of(date(2024, 1, 4)).unwrap(), date(2024, 1, 1));
        assert_eq!(monday_of(date(2024, 1, 7)).unwrap(), date(2024, 1, 1));
        assert_eq!(monday_of(date(2024, 1, 8)).unwrap(), date(2024, 1, 8));
    }

    #[test]
    fn monday_before_the_earliest_date_is_an_error() {
        let err = monday_of(NaiveDate::MIN).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidRange(_)));
    }

    #[test]
    fn today_follows_reference_timezone_not_utc() {
        // 2024-01-01 20:00 UTC is already 2024-01-02 03:00 in Ho Chi Minh City.
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let clock = ReferenceClock::fixed(DEFAULT_TIMEZONE, instant);
        assert_eq!(clock.today(), date(2024, 1, 2));
        assert_eq!(clock.current_minute_of_day().to_string(), "03:00");

        let utc_clock = ReferenceClock::fixed(chrono_tz::UTC, instant);
        assert_eq!(utc_clock.today(), date(2024, 1, 1));
        assert_eq!(utc_clock.current_minute_of_day().minutes(), 20 * 60);
    }

    #[test]
    fn week_start_is_monday_in_reference_zone() {
        // Sunday 2024-01-07 18:00 UTC is Monday 2024-01-08 01:00 locally.
        let instant = Utc.with_ymd_and_hms(2024, 1, 7, 18, 0, 0).unwrap();
        let clock = ReferenceClock::fixed(DEFAULT_TIMEZONE, instant);
        assert_eq!(clock.week_start().unwrap(), date(2024, 1, 8));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
        assert!(matches!(
            parse_date("15/01/2024"),
            Err(TimetableError::InvalidRange(_))
        ));
    }
}

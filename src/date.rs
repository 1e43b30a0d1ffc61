//! Normalization of raw transfer timestamps.
//!
//! The data store records transfer times as day-first text
//! (`DD/MM/YYYY HH:MM:SS`, seconds or the whole time part optional). This
//! module turns such text into a [`CanonicalDate`], falling back to a set of
//! common unambiguous formats when the text is not day-first. Anything that
//! cannot be read becomes [`NormalizedDate::Unparseable`]; normalization
//! never fails.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Naive date-time formats tried when the text is not day-first.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only formats tried last by the fallback parser. `%B` reads both
/// full and abbreviated month names.
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d %Y", "%B %d, %Y", "%d %B %Y"];

/// A calendar moment with explicit year, month (1-12), day, hour, minute
/// and second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDateTime);

impl CanonicalDate {
    /// Builds a canonical date from its parts, or `None` if the parts do not
    /// name a real calendar moment.
    #[inline]
    #[must_use]
    pub fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)?;
        Some(Self(date.and_time(time)))
    }

    /// Calendar year.
    #[inline]
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of the year, 1 through 12.
    #[inline]
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month, starting at 1.
    #[inline]
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Hour of the day, 0 through 23.
    #[inline]
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minute of the hour.
    #[inline]
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Second of the minute.
    #[inline]
    #[must_use]
    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// Returns the underlying `chrono` value.
    #[inline]
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Zero-padded `YYYY-MM`, the form month filters compare against.
    #[inline]
    #[must_use]
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    /// Zero-padded `YYYY-MM-DD`, the form date filters compare against.
    #[inline]
    #[must_use]
    pub fn day_key(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl core::fmt::Display for CanonicalDate {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02}",
            self.day(),
            self.month(),
            self.year(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Result of normalizing a raw timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedDate {
    /// The text named a real calendar moment.
    Parsed(CanonicalDate),
    /// The text was absent or could not be read as a date.
    Unparseable,
}

impl NormalizedDate {
    /// Returns the canonical date if parsing succeeded.
    #[inline]
    #[must_use]
    pub const fn parsed(&self) -> Option<CanonicalDate> {
        match *self {
            Self::Parsed(date) => Some(date),
            Self::Unparseable => None,
        }
    }

    /// Returns `true` if parsing succeeded.
    #[inline]
    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        matches!(*self, Self::Parsed(_))
    }

    /// `YYYY-MM` of the parsed date, `None` when unparseable.
    #[inline]
    #[must_use]
    pub fn month_key(&self) -> Option<String> {
        self.parsed().as_ref().map(CanonicalDate::month_key)
    }

    /// `YYYY-MM-DD` of the parsed date, `None` when unparseable.
    #[inline]
    #[must_use]
    pub fn day_key(&self) -> Option<String> {
        self.parsed().as_ref().map(CanonicalDate::day_key)
    }
}

impl core::fmt::Display for NormalizedDate {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Parsed(date) => core::fmt::Display::fmt(&date, f),
            Self::Unparseable => f.write_str("N/A"),
        }
    }
}

/// Normalizes a raw transfer timestamp.
///
/// The first whitespace-separated token is read as `day/month/year`, the
/// second (if any) as `HH:MM:SS` or `HH:MM`. Malformed time components read
/// as zero. A date token without exactly three `/`-separated parts sends the
/// whole text through the fallback formats instead.
///
/// # Examples
///
/// ```
/// use txn_dashboard::date::normalize;
///
/// let date = normalize(Some("05/03/2024 14:30"));
/// let parsed = date.parsed().unwrap();
/// assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 3, 5));
/// assert_eq!(parsed.hour(), 14);
///
/// assert!(!normalize(Some("31/02/2024")).is_parsed());
/// assert!(!normalize(None).is_parsed());
/// ```
#[inline]
#[must_use]
pub fn normalize(raw: Option<&str>) -> NormalizedDate {
    let Some(text) = raw else {
        return NormalizedDate::Unparseable;
    };
    let mut tokens = text.split_whitespace();
    let date_token = tokens.next();
    let time_token = tokens.next();

    match date_token.and_then(split_day_first) {
        Some(parts) => from_day_first(parts, time_token),
        None => parse_fallback(text.trim()),
    }
}

/// Splits a date token into exactly three `/`-separated parts.
fn split_day_first(token: &str) -> Option<[&str; 3]> {
    let mut parts = token.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None) => Some([day, month, year]),
        _ => None,
    }
}

/// Builds a date from day-first parts and an optional time token.
fn from_day_first(parts: [&str; 3], time_token: Option<&str>) -> NormalizedDate {
    let [day_text, month_text, year_text] = parts;
    let (Ok(day), Ok(month), Ok(year)) = (
        day_text.parse::<u32>(),
        month_text.parse::<u32>(),
        year_text.parse::<i32>(),
    ) else {
        return NormalizedDate::Unparseable;
    };
    let (hour, minute, second) = time_token.map_or((0, 0, 0), parse_time);

    CanonicalDate::from_parts(year, month, day, hour, minute, second)
        .map_or(NormalizedDate::Unparseable, NormalizedDate::Parsed)
}

/// Reads `HH:MM:SS` or `HH:MM`; absent or malformed parts become zero.
fn parse_time(token: &str) -> (u32, u32, u32) {
    let mut parts = token.split(':').map(|part| part.parse::<u32>().unwrap_or(0));
    let hour = parts.next().unwrap_or(0);
    let minute = parts.next().unwrap_or(0);
    let second = parts.next().unwrap_or(0);
    (hour, minute, second)
}

/// Tries the unambiguous formats a general-purpose date parser accepts.
///
/// Offset-bearing inputs keep their local wall-clock time.
fn parse_fallback(text: &str) -> NormalizedDate {
    if text.is_empty() {
        return NormalizedDate::Unparseable;
    }
    let offset_aware = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|value| value.naive_local());
    let naive = offset_aware.ok().or_else(|| {
        FALLBACK_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    });
    let resolved = naive.or_else(|| {
        FALLBACK_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(|date| date.and_time(NaiveTime::MIN))
    });

    resolved.map_or(NormalizedDate::Unparseable, |value| {
        NormalizedDate::Parsed(CanonicalDate(value))
    })
}

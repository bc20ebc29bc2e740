//! Interval formatting
//!
//! Intervals go on the wire as `"<from>/<to>"`, both ends ISO-8601 with
//! second precision and an explicit offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::QueryError;

/// One end of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntervalBound {
    At(DateTime<FixedOffset>),
    Date(NaiveDate),
    /// Parsed on use: RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`
    /// or `YYYY-MM-DD` (UTC when no offset is given)
    Text(String),
    /// Seconds relative to today's midnight (UTC)
    OffsetSecs(i64),
}

impl IntervalBound {
    /// Resolve to a point in time, with `today` as the base of offsets
    pub fn resolve(&self, today: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, QueryError> {
        match self {
            Self::At(dt) => Ok(*dt),
            Self::Date(date) => Ok(midnight_utc(*date)),
            Self::Text(text) => parse_datetime(text),
            Self::OffsetSecs(secs) => chrono::TimeDelta::try_seconds(*secs)
                .and_then(|delta| today.checked_add_signed(delta))
                .ok_or_else(|| QueryError::InvalidInterval(format!("offset {}s out of range", secs))),
        }
    }
}

impl From<DateTime<FixedOffset>> for IntervalBound {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::At(dt)
    }
}

impl From<DateTime<Utc>> for IntervalBound {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::At(dt.fixed_offset())
    }
}

impl From<NaiveDate> for IntervalBound {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<&str> for IntervalBound {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for IntervalBound {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for IntervalBound {
    fn from(secs: i64) -> Self {
        Self::OffsetSecs(secs)
    }
}

impl From<i32> for IntervalBound {
    fn from(secs: i32) -> Self {
        Self::OffsetSecs(secs.into())
    }
}

/// `"<from>/<to>"`
pub fn format_interval(
    from: &IntervalBound,
    to: &IntervalBound,
    today: DateTime<FixedOffset>,
) -> Result<String, QueryError> {
    Ok(format!(
        "{}/{}",
        iso8601(&from.resolve(today)?),
        iso8601(&to.resolve(today)?)
    ))
}

/// Midnight of the current UTC day
pub fn today() -> DateTime<FixedOffset> {
    midnight_utc(Utc::now().date_naive())
}

pub(crate) fn iso8601(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn midnight_utc(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>, QueryError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(midnight_utc(date));
    }

    Err(QueryError::InvalidInterval(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00+00:00").unwrap()
    }

    #[test]
    fn plain_dates_are_utc_midnight() {
        let s = format_interval(&"2013-04-04".into(), &"2013-04-04".into(), base()).unwrap();
        assert_eq!(s, "2013-04-04T00:00:00+00:00/2013-04-04T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_keeps_offset() {
        let s = format_interval(
            &"2013-04-04T10:30:00+02:00".into(),
            &"2013-04-05 08:00:00".into(),
            base(),
        )
        .unwrap();
        assert_eq!(s, "2013-04-04T10:30:00+02:00/2013-04-05T08:00:00+00:00");
    }

    #[test]
    fn offsets_are_relative_to_today() {
        let s = format_interval(&(-86_400).into(), &3_600.into(), base()).unwrap();
        assert_eq!(s, "2023-12-31T00:00:00+00:00/2024-01-01T01:00:00+00:00");
    }

    #[test]
    fn naive_date_bound() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        let s = format_interval(&date.into(), &date.into(), base()).unwrap();
        assert_eq!(s, "2020-02-29T00:00:00+00:00/2020-02-29T00:00:00+00:00");
    }

    #[test]
    fn unparseable_text_fails() {
        let err = format_interval(&"yesterday-ish".into(), &"2013-04-04".into(), base()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidInterval(t) if t == "yesterday-ish"));
    }

    #[test]
    fn today_is_midnight() {
        let t = today();
        assert_eq!(t.time(), NaiveTime::MIN);
        assert_eq!(t.offset().local_minus_utc(), 0);
    }
}
